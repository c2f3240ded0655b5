//! Bank savings programs and their tier rules

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Condition;
use crate::error::LoadError;

/// How a tier combines with other tiers covering the same balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stacking {
    /// All-in rate for its band. Overlapping exclusive tiers are resolved in
    /// declared order: the first active one claims the band.
    Exclusive,
    /// Bonus added on top of whatever rate covers its band
    Cumulative,
}

impl Default for Stacking {
    fn default() -> Self {
        Stacking::Exclusive
    }
}

/// One tier of a bank's interest schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRule {
    /// Human-readable tier label (e.g. "First $75K")
    pub label: String,

    /// Eligibility predicate
    pub condition: Condition,

    /// Annual rate as a decimal fraction (0.0325 = 3.25%)
    pub rate: Decimal,

    /// Balance position where this tier's band starts
    #[serde(default)]
    pub from: Decimal,

    /// Maximum principal this tier applies to (None = unbounded)
    pub cap: Option<Decimal>,

    #[serde(default)]
    pub stacking: Stacking,

    /// Balance the account must hold before the tier pays at all
    #[serde(default)]
    pub min_balance: Option<Decimal>,
}

impl TierRule {
    /// Unconditional exclusive tier covering `[from, from + cap)`
    pub fn new(label: impl Into<String>, rate: Decimal, from: Decimal, cap: Option<Decimal>) -> Self {
        Self {
            label: label.into(),
            condition: Condition::Always,
            rate,
            from,
            cap,
            stacking: Stacking::Exclusive,
            min_balance: None,
        }
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    pub fn cumulative(mut self) -> Self {
        self.stacking = Stacking::Cumulative;
        self
    }

    pub fn with_min_balance(mut self, min_balance: Decimal) -> Self {
        self.min_balance = Some(min_balance);
        self
    }

    /// Whether a balance is large enough for the tier to pay
    pub fn pays_at(&self, balance: Decimal) -> bool {
        self.min_balance.map_or(true, |min| balance >= min)
    }

    /// End of the band (exclusive), None when unbounded
    pub fn band_end(&self) -> Option<Decimal> {
        self.cap.map(|cap| self.from + cap)
    }
}

/// A named savings program: base rate, bonus ceiling and ordered tiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankProduct {
    /// Unique program name (e.g. "UOB One")
    pub name: String,

    /// Residual rate for principal not covered by any active tier
    pub base_rate: Decimal,

    /// Program-wide ceiling on the balance any tier may cover ("first $S")
    pub bonus_ceiling: Option<Decimal>,

    /// Date the published rates took effect
    pub effective_date: NaiveDate,

    /// Tiers in the bank's declared order
    pub tiers: Vec<TierRule>,
}

impl BankProduct {
    pub fn new(name: impl Into<String>, base_rate: Decimal, effective_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            base_rate,
            bonus_ceiling: None,
            effective_date,
            tiers: Vec::new(),
        }
    }

    pub fn with_ceiling(mut self, ceiling: Decimal) -> Self {
        self.bonus_ceiling = Some(ceiling);
        self
    }

    pub fn with_tier(mut self, tier: TierRule) -> Self {
        self.tiers.push(tier);
        self
    }

    /// Ordered tier rules
    pub fn tiers(&self) -> &[TierRule] {
        &self.tiers
    }

    /// Whether any tier's eligibility can depend on salary crediting
    pub fn uses_salary(&self) -> bool {
        self.tiers.iter().any(|t| t.condition.references_salary())
    }

    /// Distinct positive card spend amounts at which some tier changes, ascending
    pub fn spend_thresholds(&self) -> Vec<Decimal> {
        let mut thresholds = Vec::new();
        for tier in &self.tiers {
            tier.condition.collect_spend_thresholds(&mut thresholds);
        }
        thresholds.retain(|t| *t > Decimal::ZERO);
        thresholds.sort();
        thresholds.dedup();
        thresholds
    }

    pub fn uses_card_spend(&self) -> bool {
        !self.spend_thresholds().is_empty()
    }

    /// Smallest balance gate on any tier, if the program has one
    pub fn minimum_balance(&self) -> Option<Decimal> {
        self.tiers.iter().filter_map(|t| t.min_balance).min()
    }

    /// Check the structural invariants the calculator and optimizer rely on
    pub fn validate(&self) -> Result<(), LoadError> {
        let fail = |message: String| -> Result<(), LoadError> {
            Err(LoadError::invalid_product(&self.name, message))
        };

        if self.name.trim().is_empty() {
            return fail("name must not be empty".into());
        }
        if self.base_rate < Decimal::ZERO {
            return fail(format!("base rate {} is negative", self.base_rate));
        }
        if let Some(ceiling) = self.bonus_ceiling {
            if ceiling <= Decimal::ZERO {
                return fail(format!("bonus ceiling {ceiling} must be positive"));
            }
        }

        for tier in &self.tiers {
            if tier.rate < Decimal::ZERO {
                return fail(format!("tier {:?} has negative rate {}", tier.label, tier.rate));
            }
            if tier.from < Decimal::ZERO {
                return fail(format!("tier {:?} starts at negative balance {}", tier.label, tier.from));
            }
            if let Some(cap) = tier.cap {
                if cap <= Decimal::ZERO {
                    return fail(format!("tier {:?} has non-positive cap {cap}", tier.label));
                }
            }
            if let Some(min) = tier.min_balance {
                if min < Decimal::ZERO {
                    return fail(format!("tier {:?} has negative minimum balance {min}", tier.label));
                }
            }
            // Marginal rates never fall below the residual rate
            if tier.stacking == Stacking::Exclusive && tier.rate < self.base_rate {
                return fail(format!(
                    "exclusive tier {:?} rate {} is below base rate {}",
                    tier.label, tier.rate, self.base_rate
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 16).unwrap()
    }

    #[test]
    fn test_band_end() {
        let tier = TierRule::new("Next $30K", dec!(0.032), dec!(20000), Some(dec!(30000)));
        assert_eq!(tier.band_end(), Some(dec!(50000)));
        assert_eq!(TierRule::new("Open", dec!(0.01), dec!(0), None).band_end(), None);
    }

    #[test]
    fn test_validate_rejects_rate_below_base() {
        let product = BankProduct::new("Odd Bank", dec!(0.01), date())
            .with_tier(TierRule::new("Low", dec!(0.005), dec!(0), Some(dec!(1000))));
        assert!(matches!(product.validate(), Err(LoadError::InvalidProduct { .. })));

        // A cumulative bonus is added on top, so it may be small
        let product = BankProduct::new("Odd Bank", dec!(0.01), date())
            .with_tier(TierRule::new("Bonus", dec!(0.005), dec!(0), Some(dec!(1000))).cumulative());
        assert!(product.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_cap() {
        let product = BankProduct::new("Odd Bank", dec!(0), date())
            .with_tier(TierRule::new("Empty", dec!(0.02), dec!(0), Some(dec!(0))));
        assert!(product.validate().is_err());
    }

    #[test]
    fn test_uses_salary() {
        let product = BankProduct::new("Spend Bank", dec!(0.0005), date()).with_tier(
            TierRule::new("Spend", dec!(0.02), dec!(0), Some(dec!(50000)))
                .when(Condition::spend_at_least(dec!(500))),
        );
        assert!(!product.uses_salary());

        let product = product.with_tier(
            TierRule::new("Salary", dec!(0.02), dec!(0), Some(dec!(50000)))
                .when(Condition::salary_at_least(dec!(2000)))
                .cumulative(),
        );
        assert!(product.uses_salary());
    }

    #[test]
    fn test_spend_thresholds_include_upper_bounds() {
        let product = BankProduct::new("Graded", dec!(0.0005), date())
            .with_tier(
                TierRule::new("Low spend", dec!(0.005), dec!(0), Some(dec!(1000)))
                    .when(Condition::all(vec![
                        Condition::spend_at_least(dec!(500)),
                        Condition::spend_at_least(dec!(1500)).negate(),
                    ]))
                    .cumulative(),
            )
            .with_tier(
                TierRule::new("High spend", dec!(0.008), dec!(0), Some(dec!(1000)))
                    .when(Condition::spend_at_least(dec!(1500)))
                    .cumulative(),
            );

        assert_eq!(product.spend_thresholds(), vec![dec!(500), dec!(1500)]);
        assert!(product.uses_card_spend());

        let flat = BankProduct::new("Flat", dec!(0.01), date());
        assert!(!flat.uses_card_spend());
    }

    #[test]
    fn test_min_balance_gate() {
        let tier = TierRule::new("Bonus", dec!(0.02), dec!(0), Some(dec!(1000)))
            .cumulative()
            .with_min_balance(dec!(1500));
        assert!(!tier.pays_at(dec!(1499.99)));
        assert!(tier.pays_at(dec!(1500)));
        assert!(TierRule::new("Open", dec!(0.02), dec!(0), None).pays_at(dec!(0)));

        let product = BankProduct::new("Gated", dec!(0), date()).with_tier(tier.with_min_balance(dec!(-1)));
        assert!(product.validate().is_err());
    }
}
