//! Optimize a batch of deposit requests from a CSV file
//!
//! Requests are independent, so they run in parallel; each request's best
//! plan is written as one row per selected bank.

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use savings_optimizer::money::{monthly, round_currency};
use savings_optimizer::profile::load_requests;
use savings_optimizer::{AllocationPlan, CalcError, RateBook, SavingsCalculator};

#[derive(Parser)]
#[command(name = "batch_optimize")]
#[command(about = "Optimize deposit distribution for every request in a CSV file")]
struct Cli {
    /// Requests CSV (RequestID, Principal, SalaryCredit, MonthlySalary, CardSpend, ...)
    requests: PathBuf,

    /// Output CSV path
    #[arg(default_value = "optimized_allocations.csv")]
    output: PathBuf,

    /// Rate book directory; compiled-in programs if omitted
    #[arg(long)]
    rates: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    #[serde(rename = "RequestID")]
    request_id: u32,
    #[serde(rename = "Scenario")]
    scenario: String,
    #[serde(rename = "SalaryBank")]
    salary_bank: &'a str,
    #[serde(rename = "Bank")]
    bank: &'a str,
    #[serde(rename = "Amount")]
    amount: Decimal,
    #[serde(rename = "CardSpend")]
    card_spend: Decimal,
    #[serde(rename = "AnnualInterest")]
    annual_interest: Decimal,
    #[serde(rename = "PlanAnnualInterest")]
    plan_annual_interest: Decimal,
    #[serde(rename = "PlanMonthlyInterest")]
    plan_monthly_interest: Decimal,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let start = Instant::now();
    let rate_book = match &cli.rates {
        Some(dir) => RateBook::from_csv_path(dir)
            .with_context(|| format!("loading rate book from {}", dir.display()))?,
        None => RateBook::default_programs(),
    };
    let calculator = SavingsCalculator::with_rate_book(rate_book);
    let all_banks = calculator.bank_names();

    let requests = load_requests(&cli.requests)
        .with_context(|| format!("loading requests from {}", cli.requests.display()))?;
    println!("Loaded {} requests in {:?}", requests.len(), start.elapsed());

    let run_start = Instant::now();
    let results: Vec<(u32, std::result::Result<Vec<AllocationPlan>, CalcError>)> = requests
        .par_iter()
        .map(|request| {
            let banks: &[String] = if request.banks.is_empty() { &all_banks } else { &request.banks };
            let plans = calculator.optimize_distribution(request.principal, &request.profile, banks);
            (request.request_id, plans)
        })
        .collect();
    println!("Optimization complete in {:?}", run_start.elapsed());

    let mut writer = csv::Writer::from_path(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;
    let mut failed = 0usize;
    let mut total_interest = Decimal::ZERO;

    for (request_id, result) in &results {
        let plans = match result {
            Ok(plans) => plans,
            Err(e) => {
                log::warn!("Request {request_id} failed: {e}");
                failed += 1;
                continue;
            }
        };
        let Some(best) = plans.first() else {
            continue;
        };
        total_interest += best.total_annual_interest;

        let rounded = best.rounded();
        let salary_bank = rounded.salary_bank.as_deref().unwrap_or("");
        for allocation in &rounded.allocations {
            writer.serialize(OutputRow {
                request_id: *request_id,
                scenario: best.kind.to_string(),
                salary_bank,
                bank: &allocation.bank,
                amount: allocation.amount,
                card_spend: allocation.card_spend,
                annual_interest: allocation.breakdown.total_annual_interest,
                plan_annual_interest: rounded.total_annual_interest,
                plan_monthly_interest: round_currency(monthly(best.total_annual_interest)),
            })?;
        }
    }
    writer.flush()?;

    println!("Output written to {}", cli.output.display());
    println!("\nBatch Summary:");
    println!("  Requests:        {}", results.len());
    println!("  Failed:          {failed}");
    println!("  Annual interest: ${}", round_currency(total_interest));
    println!("\nTotal time: {:?}", start.elapsed());

    Ok(())
}
