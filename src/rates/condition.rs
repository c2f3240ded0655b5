//! Declarative eligibility predicates over an activity profile

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::profile::ActivityProfile;

/// Predicate that unlocks a tier.
///
/// Bank-specific quirks live here as data: a program that never pays a
/// salary bonus simply has no tier whose condition mentions salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// Unconditional
    Always,
    /// Salary is credited and at least `min_salary`
    SalaryCredit { min_salary: Decimal },
    /// Monthly card spend of at least `min_spend`
    CardSpend { min_spend: Decimal },
    /// At least `min_count` bill payments per month
    BillPayments { min_count: u32 },
    /// Holds an eligible insurance policy
    Insurance,
    /// Holds an eligible investment
    Investment,
    /// Balance grew on the previous month
    IncreasedBalance,
    /// Grew wealth with the bank (e.g. a large average daily balance)
    GrewWealth,
    All { of: Vec<Condition> },
    Any { of: Vec<Condition> },
    Not { condition: Box<Condition> },
}

impl Condition {
    pub fn salary_at_least(min_salary: Decimal) -> Self {
        Condition::SalaryCredit { min_salary }
    }

    pub fn spend_at_least(min_spend: Decimal) -> Self {
        Condition::CardSpend { min_spend }
    }

    pub fn bills_at_least(min_count: u32) -> Self {
        Condition::BillPayments { min_count }
    }

    pub fn negate(self) -> Self {
        Condition::Not {
            condition: Box::new(self),
        }
    }

    /// Conjunction of the given conditions, collapsed to its simplest form
    pub fn all(mut of: Vec<Condition>) -> Self {
        match of.len() {
            0 => Condition::Always,
            1 => of.remove(0),
            _ => Condition::All { of },
        }
    }

    /// Build the conjunction of optional threshold requirements.
    ///
    /// `max_*` bounds are exclusive. This is the canonical form produced by
    /// the CSV loader, so compiled-in programs use it too.
    pub fn from_requirements(req: &Requirements) -> Self {
        let mut of = Vec::new();
        if let Some(min) = req.min_salary {
            of.push(Condition::salary_at_least(min));
        }
        if let Some(max) = req.max_salary {
            of.push(Condition::salary_at_least(max).negate());
        }
        if let Some(min) = req.min_spend {
            of.push(Condition::spend_at_least(min));
        }
        if let Some(max) = req.max_spend {
            of.push(Condition::spend_at_least(max).negate());
        }
        if let Some(count) = req.min_bill_payments {
            of.push(Condition::bills_at_least(count));
        }
        if req.insurance {
            of.push(Condition::Insurance);
        }
        if req.investment {
            of.push(Condition::Investment);
        }
        if req.increased_balance {
            of.push(Condition::IncreasedBalance);
        }
        if req.grew_wealth {
            of.push(Condition::GrewWealth);
        }
        Condition::all(of)
    }

    /// Evaluate against a profile
    pub fn is_met(&self, profile: &ActivityProfile) -> bool {
        match self {
            Condition::Always => true,
            Condition::SalaryCredit { min_salary } => {
                profile.has_salary_credit && profile.monthly_salary >= *min_salary
            }
            Condition::CardSpend { min_spend } => profile.monthly_card_spend >= *min_spend,
            Condition::BillPayments { min_count } => profile.bill_payments >= *min_count,
            Condition::Insurance => profile.has_insurance,
            Condition::Investment => profile.has_investments,
            Condition::IncreasedBalance => profile.increased_balance,
            Condition::GrewWealth => profile.grew_wealth,
            Condition::All { of } => of.iter().all(|c| c.is_met(profile)),
            Condition::Any { of } => of.iter().any(|c| c.is_met(profile)),
            Condition::Not { condition } => !condition.is_met(profile),
        }
    }

    /// Whether the outcome can depend on salary crediting at all
    pub fn references_salary(&self) -> bool {
        match self {
            Condition::SalaryCredit { .. } => true,
            Condition::All { of } | Condition::Any { of } => of.iter().any(Condition::references_salary),
            Condition::Not { condition } => condition.references_salary(),
            _ => false,
        }
    }

    /// Push every card spend amount the outcome switches at, negated bounds included
    pub fn collect_spend_thresholds(&self, into: &mut Vec<Decimal>) {
        match self {
            Condition::CardSpend { min_spend } => into.push(*min_spend),
            Condition::All { of } | Condition::Any { of } => {
                for condition in of {
                    condition.collect_spend_thresholds(into);
                }
            }
            Condition::Not { condition } => condition.collect_spend_thresholds(into),
            _ => {}
        }
    }
}

impl Default for Condition {
    fn default() -> Self {
        Condition::Always
    }
}

/// Flat threshold requirements, as written in rate tables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    pub min_salary: Option<Decimal>,
    pub max_salary: Option<Decimal>,
    pub min_spend: Option<Decimal>,
    pub max_spend: Option<Decimal>,
    pub min_bill_payments: Option<u32>,
    pub insurance: bool,
    pub investment: bool,
    pub increased_balance: bool,
    pub grew_wealth: bool,
}
