//! Activity profile: the recurring banking behaviour that gates bonus tiers

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, Result};

/// A customer's monthly banking activity.
///
/// Built once per request and never mutated; derived variants (such as the
/// profile a non-salary bank sees) are new values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityProfile {
    /// Whether salary is credited into a savings account
    pub has_salary_credit: bool,

    /// Monthly salary amount credited
    pub monthly_salary: Decimal,

    /// Monthly eligible card spend
    pub monthly_card_spend: Decimal,

    /// Number of qualifying bill payments (GIRO) per month
    #[serde(default)]
    pub bill_payments: u32,

    /// Holds an eligible insurance policy with the bank
    #[serde(default)]
    pub has_insurance: bool,

    /// Holds an eligible investment with the bank
    #[serde(default)]
    pub has_investments: bool,

    /// Account balance increased over the previous month
    #[serde(default)]
    pub increased_balance: bool,

    /// Grew wealth with the bank (average daily balance of at least $200K)
    #[serde(default)]
    pub grew_wealth: bool,
}

impl ActivityProfile {
    /// Create a profile from the three core activity values
    pub fn new(has_salary_credit: bool, monthly_salary: Decimal, monthly_card_spend: Decimal) -> Self {
        Self {
            has_salary_credit,
            monthly_salary,
            monthly_card_spend,
            bill_payments: 0,
            has_insurance: false,
            has_investments: false,
            increased_balance: false,
            grew_wealth: false,
        }
    }

    /// Profile with no qualifying activity at all
    pub fn inactive() -> Self {
        Self::new(false, Decimal::ZERO, Decimal::ZERO)
    }

    pub fn with_bill_payments(mut self, count: u32) -> Self {
        self.bill_payments = count;
        self
    }

    pub fn with_insurance(mut self, has_insurance: bool) -> Self {
        self.has_insurance = has_insurance;
        self
    }

    pub fn with_investments(mut self, has_investments: bool) -> Self {
        self.has_investments = has_investments;
        self
    }

    pub fn with_increased_balance(mut self, increased_balance: bool) -> Self {
        self.increased_balance = increased_balance;
        self
    }

    pub fn with_grown_wealth(mut self, grew_wealth: bool) -> Self {
        self.grew_wealth = grew_wealth;
        self
    }

    /// The same activity with only `spend` of the card spend routed here
    pub fn with_card_spend(&self, spend: Decimal) -> Self {
        Self {
            monthly_card_spend: spend,
            ..self.clone()
        }
    }

    /// The same activity with salary credited elsewhere
    pub fn without_salary_credit(&self) -> Self {
        Self {
            has_salary_credit: false,
            ..self.clone()
        }
    }

    /// Salary amount that counts towards salary conditions
    ///
    /// Zero unless the salary is actually credited.
    pub fn credited_salary(&self) -> Decimal {
        if self.has_salary_credit {
            self.monthly_salary
        } else {
            Decimal::ZERO
        }
    }

    /// Reject negative monetary values
    pub fn validate(&self) -> Result<()> {
        if self.monthly_salary < Decimal::ZERO {
            return Err(CalcError::InvalidProfile {
                field: "monthly_salary",
                value: self.monthly_salary,
            });
        }
        if self.monthly_card_spend < Decimal::ZERO {
            return Err(CalcError::InvalidProfile {
                field: "monthly_card_spend",
                value: self.monthly_card_spend,
            });
        }
        Ok(())
    }
}

impl Default for ActivityProfile {
    fn default() -> Self {
        Self::inactive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_rejects_negative_values() {
        let profile = ActivityProfile::new(true, dec!(-100), dec!(500));
        assert_eq!(
            profile.validate(),
            Err(CalcError::InvalidProfile {
                field: "monthly_salary",
                value: dec!(-100),
            })
        );

        let profile = ActivityProfile::new(false, dec!(0), dec!(-0.01));
        assert!(matches!(
            profile.validate(),
            Err(CalcError::InvalidProfile { field: "monthly_card_spend", .. })
        ));

        assert!(ActivityProfile::new(true, dec!(5000), dec!(0)).validate().is_ok());
    }

    #[test]
    fn test_without_salary_credit() {
        let profile = ActivityProfile::new(true, dec!(5000), dec!(500)).with_bill_payments(3);
        let elsewhere = profile.without_salary_credit();

        assert!(!elsewhere.has_salary_credit);
        assert_eq!(elsewhere.monthly_salary, dec!(5000));
        assert_eq!(elsewhere.credited_salary(), Decimal::ZERO);
        assert_eq!(elsewhere.bill_payments, 3);
        // Original untouched
        assert_eq!(profile.credited_salary(), dec!(5000));
    }

    #[test]
    fn test_with_card_spend_keeps_other_activity() {
        let profile = ActivityProfile::new(true, dec!(5000), dec!(1200)).with_increased_balance(true);
        let share = profile.with_card_spend(dec!(500));

        assert_eq!(share.monthly_card_spend, dec!(500));
        assert!(share.has_salary_credit);
        assert!(share.increased_balance);
        assert_eq!(profile.monthly_card_spend, dec!(1200));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{"has_salary_credit":true,"monthly_salary":"3000","monthly_card_spend":"800"}"#;
        let profile: ActivityProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile, ActivityProfile::new(true, dec!(3000), dec!(800)));
    }
}
