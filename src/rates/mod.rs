//! Rate rule model: savings programs, tier rules and eligibility conditions

mod condition;
mod product;
pub mod programs;
pub mod loader;

pub use condition::{Condition, Requirements};
pub use product::{BankProduct, Stacking, TierRule};

use std::collections::HashSet;
use std::path::Path;

use crate::error::{CalcError, LoadError, Result};

/// Container for every savings program the calculator knows about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateBook {
    products: Vec<BankProduct>,
}

impl RateBook {
    /// Build a rate book, validating every program and name uniqueness
    pub fn new(products: Vec<BankProduct>) -> std::result::Result<Self, LoadError> {
        let mut seen = HashSet::new();
        for product in &products {
            product.validate()?;
            if !seen.insert(product.name.as_str()) {
                return Err(LoadError::DuplicateBank(product.name.clone()));
            }
        }
        Ok(Self { products })
    }

    /// The five compiled-in programs (rates as of 16 Jan 2025)
    pub fn default_programs() -> Self {
        Self {
            products: programs::default_programs(),
        }
    }

    /// Load the rate book from CSV files in the default location (data/rates/)
    pub fn from_csv() -> std::result::Result<Self, LoadError> {
        Self::from_csv_path(Path::new(loader::DEFAULT_RATES_PATH))
    }

    /// Load the rate book from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> std::result::Result<Self, LoadError> {
        let products = loader::load_products(path)?;
        log::info!("Loaded {} savings programs from {}", products.len(), path.display());
        Self::new(products)
    }

    /// Add or replace a program
    pub fn with_product(mut self, product: BankProduct) -> std::result::Result<Self, LoadError> {
        product.validate()?;
        match self.products.iter_mut().find(|p| p.name == product.name) {
            Some(existing) => *existing = product,
            None => self.products.push(product),
        }
        Ok(self)
    }

    /// Look up a program by name
    pub fn product(&self, name: &str) -> Result<&BankProduct> {
        self.products
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| CalcError::unknown_bank(name))
    }

    /// Ordered tier rules of a program
    pub fn tiers(&self, name: &str) -> Result<&[TierRule]> {
        self.product(name).map(BankProduct::tiers)
    }

    pub fn products(&self) -> &[BankProduct] {
        &self.products
    }

    pub fn bank_names(&self) -> Vec<&str> {
        self.products.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Default for RateBook {
    fn default() -> Self {
        Self::default_programs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_programs_are_valid() {
        let book = RateBook::default_programs();
        assert_eq!(
            book.bank_names(),
            vec!["UOB One", "SC BonusSaver", "OCBC 360", "BOC SmartSaver", "Chocolate"]
        );
        let rebuilt = RateBook::new(book.products().to_vec());
        assert!(rebuilt.is_ok(), "{:?}", rebuilt.err());
    }

    #[test]
    fn test_csv_matches_compiled_programs() {
        let loaded = RateBook::from_csv().expect("Failed to load data/rates");
        assert_eq!(loaded, RateBook::default_programs());
    }

    #[test]
    fn test_programs_differ_in_structure() {
        let book = RateBook::default_programs();
        let tier_counts: HashSet<usize> = book.products().iter().map(|p| p.tiers.len()).collect();
        assert!(tier_counts.len() >= 4);

        // Salary-blind programs are expressed purely through their rules
        assert!(!book.product("UOB One").unwrap().uses_salary());
        assert!(!book.product("Chocolate").unwrap().uses_salary());
        assert!(book.product("OCBC 360").unwrap().uses_salary());
    }

    #[test]
    fn test_unknown_bank() {
        let book = RateBook::default_programs();
        assert_eq!(
            book.tiers("DBS Multiplier").unwrap_err(),
            CalcError::unknown_bank("DBS Multiplier")
        );
    }

    #[test]
    fn test_duplicate_bank_rejected() {
        let uob = programs::uob_one();
        let err = RateBook::new(vec![uob.clone(), uob]).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateBank(name) if name == "UOB One"));
    }

    #[test]
    fn test_with_product_adds_bank_as_data() {
        let extra = BankProduct::new("Flat Saver", dec!(0.01), programs::chocolate().effective_date)
            .with_tier(TierRule::new("First $10K", dec!(0.03), dec!(0), Some(dec!(10000))));
        let book = RateBook::default_programs().with_product(extra).unwrap();
        assert_eq!(book.len(), 6);
        assert_eq!(book.tiers("Flat Saver").unwrap().len(), 1);
    }
}
