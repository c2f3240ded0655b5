//! Savings Optimizer CLI
//!
//! Calculate, compare and optimize bonus interest across bank savings programs

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

use savings_optimizer::money::{monthly, round_currency};
use savings_optimizer::{
    ActivityProfile, AllocationPlan, CalcError, InterestBreakdown, OptimizerConfig, RateBook,
    SavingsCalculator,
};

#[derive(Parser)]
#[command(name = "savings-optimizer")]
#[command(about = "Tiered bonus-interest calculator and deposit optimizer")]
#[command(version)]
struct Cli {
    /// Rate book directory (programs.csv + tiers.csv); compiled-in programs if omitted
    #[arg(long, global = true)]
    rates: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interest for the whole principal in one bank
    Calculate {
        /// Amount to deposit (thousands separators allowed)
        #[arg(short, long)]
        principal: String,

        /// Bank program name, e.g. "UOB One"
        #[arg(short, long)]
        bank: String,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// The same principal in each bank, best first
    Compare {
        #[arg(short, long)]
        principal: String,

        /// Banks to compare (repeatable); all banks if omitted
        #[arg(short, long)]
        bank: Vec<String>,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Split the principal across banks for maximum interest
    Optimize {
        #[arg(short, long)]
        principal: String,

        /// Banks to consider (repeatable); all banks if omitted
        #[arg(short, long)]
        bank: Vec<String>,

        /// Fund at most this many banks
        #[arg(long)]
        max_banks: Option<usize>,

        /// Skip the whole-principal-in-one-bank baselines
        #[arg(long)]
        no_baselines: bool,

        /// Let every bank see the salary credit
        #[arg(long)]
        no_salary_routing: bool,

        /// Let every bank see the whole card spend
        #[arg(long)]
        no_spend_routing: bool,

        /// Number of plans to print
        #[arg(long, default_value = "5")]
        top: usize,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// List the programs in the rate book
    Banks,
}

#[derive(Args)]
struct ProfileArgs {
    /// Salary is credited to a savings account
    #[arg(long)]
    salary_credit: bool,

    /// Monthly salary amount
    #[arg(long, default_value = "0", value_parser = parse_money)]
    salary: Decimal,

    /// Monthly eligible card spend
    #[arg(long, default_value = "0", value_parser = parse_money)]
    card_spend: Decimal,

    /// Qualifying bill payments (GIRO) per month
    #[arg(long, default_value = "0")]
    bill_payments: u32,

    /// Holds an eligible insurance policy
    #[arg(long)]
    insurance: bool,

    /// Holds an eligible investment
    #[arg(long)]
    investments: bool,

    /// Account balance increased over the previous month
    #[arg(long)]
    increased_balance: bool,

    /// Grew wealth with the bank
    #[arg(long)]
    grew_wealth: bool,
}

impl ProfileArgs {
    fn to_profile(&self) -> ActivityProfile {
        ActivityProfile::new(self.salary_credit, self.salary, self.card_spend)
            .with_bill_payments(self.bill_payments)
            .with_insurance(self.insurance)
            .with_investments(self.investments)
            .with_increased_balance(self.increased_balance)
            .with_grown_wealth(self.grew_wealth)
    }
}

/// Strip thousands separators and a leading currency sign
fn clean_amount(text: &str) -> String {
    text.trim().trim_start_matches('$').replace(',', "")
}

fn parse_money(text: &str) -> std::result::Result<Decimal, String> {
    clean_amount(text)
        .parse()
        .map_err(|e| format!("not an amount: {text:?} ({e})"))
}

fn parse_principal(text: &str) -> std::result::Result<Decimal, CalcError> {
    clean_amount(text)
        .parse()
        .map_err(|_| CalcError::unparseable_principal(text))
}

fn fmt_rate(rate: Decimal) -> String {
    format!("{:.2}%", rate * Decimal::ONE_HUNDRED)
}

fn print_breakdown(breakdown: &InterestBreakdown) {
    let rounded = breakdown.rounded();
    println!("{} on ${}", rounded.bank, rounded.principal);
    println!("  {:<48} {:>14} {:>8} {:>12}", "Tier", "Amount", "Rate", "Interest");
    println!("  {}", "-".repeat(85));
    for line in &rounded.lines {
        println!(
            "  {:<48} {:>14} {:>8} {:>12}",
            line.label,
            line.amount_applied,
            fmt_rate(line.rate),
            line.interest
        );
    }
    println!(
        "  Annual interest: ${}   Monthly: ${}   Effective rate: {}",
        rounded.total_annual_interest,
        round_currency(breakdown.monthly_interest()),
        breakdown.effective_rate().map_or_else(|| "-".to_string(), fmt_rate)
    );
}

fn print_plan(rank: usize, plan: &AllocationPlan) {
    let rounded = plan.rounded();
    println!(
        "{rank}. {}: ${} a year (${} a month)",
        plan.kind,
        rounded.total_annual_interest,
        round_currency(monthly(plan.total_annual_interest))
    );
    if let Some(bank) = &plan.salary_bank {
        println!("   Salary credited to {bank}");
    }
    for allocation in &rounded.allocations {
        let spend = if allocation.card_spend.is_zero() {
            String::new()
        } else {
            format!("card spend ${}", allocation.card_spend)
        };
        println!(
            "   {:<20} {:>14} {:>12}   {}",
            allocation.bank,
            allocation.amount,
            allocation.breakdown.total_annual_interest,
            spend
        );
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let rate_book = match &cli.rates {
        Some(dir) => RateBook::from_csv_path(dir)
            .with_context(|| format!("loading rate book from {}", dir.display()))?,
        None => RateBook::default_programs(),
    };

    match cli.command {
        Commands::Calculate { principal, bank, profile } => {
            let calculator = SavingsCalculator::with_rate_book(rate_book);
            let principal = parse_principal(&principal)?;
            let breakdown = calculator.calculate_interest(principal, &bank, &profile.to_profile())?;

            if cli.json {
                print_json(&breakdown.rounded())?;
            } else {
                print_breakdown(&breakdown);
            }
        }

        Commands::Compare { principal, bank, profile } => {
            let calculator = SavingsCalculator::with_rate_book(rate_book);
            let principal = parse_principal(&principal)?;
            let results = calculator.compare_banks(principal, bank.as_slice(), &profile.to_profile())?;

            if cli.json {
                let rounded: Vec<InterestBreakdown> =
                    results.iter().map(|r| r.breakdown.rounded()).collect();
                print_json(&rounded)?;
            } else {
                for result in &results {
                    print_breakdown(&result.breakdown);
                    println!();
                }
            }
        }

        Commands::Optimize {
            principal,
            bank,
            max_banks,
            no_baselines,
            no_salary_routing,
            no_spend_routing,
            top,
            profile,
        } => {
            let config = OptimizerConfig {
                max_banks,
                include_single_bank_baselines: !no_baselines,
                route_salary_credit: !no_salary_routing,
                route_card_spend: !no_spend_routing,
            };
            let calculator = SavingsCalculator::with_rate_book(rate_book).with_config(config);
            let principal = parse_principal(&principal)?;
            let banks = if bank.is_empty() { calculator.bank_names() } else { bank };

            let plans = calculator.optimize_distribution(principal, &profile.to_profile(), banks.as_slice())?;

            if cli.json {
                let rounded: Vec<AllocationPlan> = plans.iter().take(top).map(|p| p.rounded()).collect();
                print_json(&rounded)?;
            } else {
                for (rank, plan) in plans.iter().take(top).enumerate() {
                    print_plan(rank + 1, plan);
                    println!();
                }
            }
        }

        Commands::Banks => {
            if cli.json {
                print_json(&rate_book.products())?;
            } else {
                for product in rate_book.products() {
                    let ceiling = product
                        .bonus_ceiling
                        .map_or_else(|| "none".to_string(), |c| format!("${c}"));
                    println!(
                        "{} (base {}, bonus ceiling {}, effective {})",
                        product.name,
                        fmt_rate(product.base_rate),
                        ceiling,
                        product.effective_date
                    );
                    for tier in product.tiers() {
                        println!("  {:<40} {:>8}", tier.label, fmt_rate(tier.rate));
                    }
                }
            }
        }
    }

    Ok(())
}
