//! CSV-based rate book loader
//!
//! Loads savings programs from `programs.csv` and `tiers.csv` in data/rates/

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{BankProduct, Condition, Requirements, Stacking, TierRule};
use crate::error::LoadError;

/// Default path to the rate book directory
pub const DEFAULT_RATES_PATH: &str = "data/rates";

const PROGRAMS_FILE: &str = "programs.csv";
const TIERS_FILE: &str = "tiers.csv";

#[derive(Debug, Deserialize)]
struct ProgramRow {
    #[serde(rename = "Bank")]
    bank: String,
    #[serde(rename = "BaseRate")]
    base_rate: String,
    #[serde(rename = "BonusCeiling")]
    bonus_ceiling: String,
    #[serde(rename = "EffectiveDate")]
    effective_date: String,
}

#[derive(Debug, Deserialize)]
struct TierRow {
    #[serde(rename = "Bank")]
    bank: String,
    #[serde(rename = "Label")]
    label: String,
    #[serde(rename = "Rate")]
    rate: String,
    #[serde(rename = "From")]
    from: String,
    #[serde(rename = "Cap")]
    cap: String,
    #[serde(rename = "Stacking")]
    stacking: String,
    #[serde(rename = "MinSalary")]
    min_salary: String,
    #[serde(rename = "MaxSalary")]
    max_salary: String,
    #[serde(rename = "MinSpend")]
    min_spend: String,
    #[serde(rename = "MaxSpend")]
    max_spend: String,
    #[serde(rename = "MinBillPayments")]
    min_bill_payments: String,
    #[serde(rename = "Insurance")]
    insurance: String,
    #[serde(rename = "Investment")]
    investment: String,
    #[serde(rename = "IncreasedBalance", default)]
    increased_balance: String,
    #[serde(rename = "GrewWealth", default)]
    grew_wealth: String,
    #[serde(rename = "MinBalance", default)]
    min_balance: String,
}

/// Field parser that remembers where it is for error messages
struct Cell {
    file: &'static str,
    row: usize,
}

impl Cell {
    fn error(&self, message: String) -> LoadError {
        LoadError::Parse {
            file: self.file,
            row: self.row,
            message,
        }
    }

    /// Rate written either as a percentage ("3.25%") or a fraction ("0.0325")
    fn rate(&self, column: &str, value: &str) -> Result<Decimal, LoadError> {
        let value = value.trim();
        match value.strip_suffix('%') {
            Some(pct) => Ok(self.decimal(column, pct)? / Decimal::ONE_HUNDRED),
            None => self.decimal(column, value),
        }
    }

    fn decimal(&self, column: &str, value: &str) -> Result<Decimal, LoadError> {
        value
            .trim()
            .replace(',', "")
            .parse()
            .map_err(|e| self.error(format!("{column} {value:?}: {e}")))
    }

    fn optional_decimal(&self, column: &str, value: &str) -> Result<Option<Decimal>, LoadError> {
        if value.trim().is_empty() {
            Ok(None)
        } else {
            self.decimal(column, value).map(Some)
        }
    }

    fn optional_count(&self, column: &str, value: &str) -> Result<Option<u32>, LoadError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        value
            .parse()
            .map(Some)
            .map_err(|e| self.error(format!("{column} {value:?}: {e}")))
    }

    fn flag(&self, column: &str, value: &str) -> Result<bool, LoadError> {
        match value.trim() {
            "Y" => Ok(true),
            "N" | "" => Ok(false),
            other => Err(self.error(format!("{column} must be Y or N, got {other:?}"))),
        }
    }

    fn stacking(&self, value: &str) -> Result<Stacking, LoadError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "exclusive" | "" => Ok(Stacking::Exclusive),
            "cumulative" => Ok(Stacking::Cumulative),
            other => Err(self.error(format!("unknown Stacking {other:?}"))),
        }
    }

    fn date(&self, value: &str) -> Result<NaiveDate, LoadError> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|e| self.error(format!("EffectiveDate {value:?}: {e}")))
    }
}

fn open(dir: &Path, name: &str) -> Result<csv::Reader<File>, LoadError> {
    let path = dir.join(name);
    let file = File::open(&path).map_err(|source| LoadError::Io { path, source })?;
    Ok(csv::Reader::from_reader(file))
}

/// Load program headers (no tiers yet), in file order
pub fn load_programs(path: &Path) -> Result<Vec<BankProduct>, LoadError> {
    let mut reader = open(path, PROGRAMS_FILE)?;
    let mut programs = Vec::new();

    for (idx, result) in reader.deserialize().enumerate() {
        let row: ProgramRow = result?;
        let cell = Cell {
            file: PROGRAMS_FILE,
            row: idx + 1,
        };

        let mut product = BankProduct::new(
            row.bank.trim(),
            cell.rate("BaseRate", &row.base_rate)?,
            cell.date(&row.effective_date)?,
        );
        product.bonus_ceiling = cell.optional_decimal("BonusCeiling", &row.bonus_ceiling)?;
        programs.push(product);
    }

    Ok(programs)
}

/// Load tier rules grouped by bank name, each group in file order
pub fn load_tiers(path: &Path) -> Result<HashMap<String, Vec<TierRule>>, LoadError> {
    let mut reader = open(path, TIERS_FILE)?;
    let mut tiers: HashMap<String, Vec<TierRule>> = HashMap::new();

    for (idx, result) in reader.deserialize().enumerate() {
        let row: TierRow = result?;
        let cell = Cell {
            file: TIERS_FILE,
            row: idx + 1,
        };

        let requirements = Requirements {
            min_salary: cell.optional_decimal("MinSalary", &row.min_salary)?,
            max_salary: cell.optional_decimal("MaxSalary", &row.max_salary)?,
            min_spend: cell.optional_decimal("MinSpend", &row.min_spend)?,
            max_spend: cell.optional_decimal("MaxSpend", &row.max_spend)?,
            min_bill_payments: cell.optional_count("MinBillPayments", &row.min_bill_payments)?,
            insurance: cell.flag("Insurance", &row.insurance)?,
            investment: cell.flag("Investment", &row.investment)?,
            increased_balance: cell.flag("IncreasedBalance", &row.increased_balance)?,
            grew_wealth: cell.flag("GrewWealth", &row.grew_wealth)?,
        };

        let tier = TierRule {
            label: row.label.trim().to_string(),
            condition: Condition::from_requirements(&requirements),
            rate: cell.rate("Rate", &row.rate)?,
            from: cell.optional_decimal("From", &row.from)?.unwrap_or(Decimal::ZERO),
            cap: cell.optional_decimal("Cap", &row.cap)?,
            stacking: cell.stacking(&row.stacking)?,
            min_balance: cell.optional_decimal("MinBalance", &row.min_balance)?,
        };

        tiers.entry(row.bank.trim().to_string()).or_default().push(tier);
    }

    Ok(tiers)
}

/// Load all programs with their tiers from a rate book directory
pub fn load_products(path: &Path) -> Result<Vec<BankProduct>, LoadError> {
    let mut programs = load_programs(path)?;
    let mut tiers = load_tiers(path)?;

    for product in &mut programs {
        product.tiers = tiers.remove(&product.name).unwrap_or_default();
    }

    // Tiers for a bank with no program row would silently vanish
    if let Some(orphan) = tiers.keys().next() {
        return Err(LoadError::invalid_product(
            orphan.clone(),
            format!("has tiers in {TIERS_FILE} but no row in {PROGRAMS_FILE}"),
        ));
    }

    Ok(programs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rate_formats() {
        let cell = Cell { file: TIERS_FILE, row: 1 };
        assert_eq!(cell.rate("Rate", "3.25%").unwrap(), dec!(0.0325));
        assert_eq!(cell.rate("Rate", "0.0325").unwrap(), dec!(0.0325));
        assert!(matches!(
            cell.rate("Rate", "abc%"),
            Err(LoadError::Parse { row: 1, .. })
        ));
    }

    #[test]
    fn test_load_default_rate_book() {
        let result = load_products(Path::new(DEFAULT_RATES_PATH));
        assert!(result.is_ok(), "Failed to load rate book: {:?}", result.err());

        let products = result.unwrap();
        assert_eq!(products.len(), 5);

        let uob = products.iter().find(|p| p.name == "UOB One").unwrap();
        assert_eq!(uob.tiers.len(), 4);
        assert_eq!(uob.bonus_ceiling, Some(dec!(150000)));

        let boc = products.iter().find(|p| p.name == "BOC SmartSaver").unwrap();
        assert_eq!(boc.minimum_balance(), Some(dec!(1500)));
        assert_eq!(boc.tiers[0].min_balance, None);

        let chocolate = products.iter().find(|p| p.name == "Chocolate").unwrap();
        assert_eq!(chocolate.bonus_ceiling, None);
        assert_eq!(chocolate.tiers[1].from, dec!(20000));
    }

    #[test]
    fn test_missing_directory() {
        let err = load_products(Path::new("data/does-not-exist")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
