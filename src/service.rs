//! Savings calculator: the three boundary operations over a loaded rate book
//!
//! Loads the rate book once, then answers any number of independent
//! calculate / compare / optimize requests without touching the CSV files
//! again. Every call is a pure function of its arguments.

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{LoadError, Result};
use crate::interest::{calculate, InterestBreakdown};
use crate::optimizer::{AllocationPlan, DistributionOptimizer, OptimizerConfig};
use crate::profile::ActivityProfile;
use crate::rates::{BankProduct, RateBook};

/// One bank's result in a side-by-side comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankComparison {
    pub bank: String,
    pub breakdown: InterestBreakdown,
}

/// Pre-loaded calculator for interest and distribution requests
///
/// # Example
/// ```ignore
/// let calculator = SavingsCalculator::from_csv()?;
/// let profile = ActivityProfile::new(true, dec!(5000), dec!(500));
///
/// let uob = calculator.calculate_interest(dec!(10000), "UOB One", &profile)?;
/// let plans = calculator.optimize_distribution(dec!(150000), &profile, &calculator.bank_names())?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct SavingsCalculator {
    rate_book: RateBook,
    config: OptimizerConfig,
}

impl SavingsCalculator {
    /// Create calculator with the compiled-in programs
    pub fn new() -> Self {
        Self::default()
    }

    /// Create calculator by loading the rate book from CSV files
    pub fn from_csv() -> std::result::Result<Self, LoadError> {
        Ok(Self::with_rate_book(RateBook::from_csv()?))
    }

    /// Create calculator from a specific rate book directory
    pub fn from_csv_path(path: &Path) -> std::result::Result<Self, LoadError> {
        Ok(Self::with_rate_book(RateBook::from_csv_path(path)?))
    }

    /// Create calculator with a pre-built rate book
    pub fn with_rate_book(rate_book: RateBook) -> Self {
        Self {
            rate_book,
            config: OptimizerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: OptimizerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn rate_book(&self) -> &RateBook {
        &self.rate_book
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Every bank in the rate book, in rate book order
    pub fn bank_names(&self) -> Vec<String> {
        self.rate_book.bank_names().into_iter().map(String::from).collect()
    }

    /// Annual interest for `principal` held entirely in `bank`
    pub fn calculate_interest(
        &self,
        principal: Decimal,
        bank: &str,
        profile: &ActivityProfile,
    ) -> Result<InterestBreakdown> {
        let product = self.rate_book.product(bank)?;
        calculate(product, principal, profile)
    }

    /// The same principal in each bank, best earner first (ties by name)
    ///
    /// An empty selection compares every bank in the rate book.
    pub fn compare_banks<S: AsRef<str>>(
        &self,
        principal: Decimal,
        banks: &[S],
        profile: &ActivityProfile,
    ) -> Result<Vec<BankComparison>> {
        let products = if banks.is_empty() {
            self.rate_book.products().iter().collect()
        } else {
            self.resolve(banks)?
        };

        let mut results = Vec::with_capacity(products.len());
        for product in products {
            results.push(BankComparison {
                bank: product.name.clone(),
                breakdown: calculate(product, principal, profile)?,
            });
        }
        results.sort_by(|a, b| {
            b.breakdown
                .total_annual_interest
                .cmp(&a.breakdown.total_annual_interest)
                .then_with(|| a.bank.cmp(&b.bank))
        });

        Ok(results)
    }

    /// Ranked allocation plans for splitting `principal` across `banks`
    pub fn optimize_distribution<S: AsRef<str>>(
        &self,
        principal: Decimal,
        profile: &ActivityProfile,
        banks: &[S],
    ) -> Result<Vec<AllocationPlan>> {
        let products = self.resolve(banks)?;
        DistributionOptimizer::new(products, self.config.clone())?.optimize(principal, profile)
    }

    /// Look up a selection, keeping the first of any repeated name
    fn resolve<S: AsRef<str>>(&self, banks: &[S]) -> Result<Vec<&BankProduct>> {
        let mut seen = HashSet::new();
        let mut products = Vec::with_capacity(banks.len());

        for name in banks {
            let name = name.as_ref().trim();
            if !seen.insert(name) {
                log::warn!("Bank {name:?} selected more than once; ignoring repeat");
                continue;
            }
            products.push(self.rate_book.product(name)?);
        }

        Ok(products)
    }
}
