//! Allocation plans returned by the optimizer

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::interest::InterestBreakdown;
use crate::money::{monthly, round_currency};

/// Which question a plan answers
///
/// Variant order is the tie-break order when plans earn the same interest.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Best plan over every bank subset and salary routing
    Optimal,
    /// Best plan funding at most this many banks
    AtMostBanks(usize),
    /// Whole principal in one bank
    SingleBank(String),
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioKind::Optimal => write!(f, "Optimal"),
            ScenarioKind::AtMostBanks(1) => write!(f, "Best single bank"),
            ScenarioKind::AtMostBanks(k) => write!(f, "Best with at most {k} banks"),
            ScenarioKind::SingleBank(name) => write!(f, "{name} only"),
        }
    }
}

/// Principal placed in one bank and what it earns there
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAllocation {
    pub bank: String,

    pub amount: Decimal,

    /// Monthly card spend routed to this bank
    #[serde(default)]
    pub card_spend: Decimal,

    pub breakdown: InterestBreakdown,
}

impl BankAllocation {
    pub fn annual_interest(&self) -> Decimal {
        self.breakdown.total_annual_interest
    }
}

/// A split of the principal across the selected banks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub kind: ScenarioKind,

    pub principal: Decimal,

    /// Bank receiving the salary credit, if any
    pub salary_bank: Option<String>,

    /// One entry per selected bank, in selection order (zero amounts included)
    pub allocations: Vec<BankAllocation>,

    pub total_annual_interest: Decimal,
}

impl AllocationPlan {
    pub fn new(
        kind: ScenarioKind,
        principal: Decimal,
        salary_bank: Option<String>,
        allocations: Vec<BankAllocation>,
    ) -> Self {
        let total_annual_interest = allocations.iter().map(BankAllocation::annual_interest).sum();
        Self {
            kind,
            principal,
            salary_bank,
            allocations,
            total_annual_interest,
        }
    }

    /// Amount placed in a bank, None when the bank is not in the selection
    pub fn amount_for(&self, bank: &str) -> Option<Decimal> {
        self.allocations
            .iter()
            .find(|a| a.bank == bank)
            .map(|a| a.amount)
    }

    /// Banks receiving a non-zero amount
    pub fn funded_banks(&self) -> Vec<&str> {
        self.allocations
            .iter()
            .filter(|a| !a.amount.is_zero())
            .map(|a| a.bank.as_str())
            .collect()
    }

    pub fn funded_count(&self) -> usize {
        self.allocations.iter().filter(|a| !a.amount.is_zero()).count()
    }

    /// Sum of all allocations (equals `principal`)
    pub fn allocated(&self) -> Decimal {
        self.allocations.iter().map(|a| a.amount).sum()
    }

    pub fn monthly_interest(&self) -> Decimal {
        monthly(self.total_annual_interest)
    }

    /// Same amounts, salary and spend routing, whatever the scenario kind
    pub fn same_split(&self, other: &AllocationPlan) -> bool {
        self.salary_bank == other.salary_bank
            && self.allocations.len() == other.allocations.len()
            && self
                .allocations
                .iter()
                .zip(&other.allocations)
                .all(|(a, b)| a.bank == b.bank && a.amount == b.amount && a.card_spend == b.card_spend)
    }

    /// Banks receiving card spend, with the amount each
    pub fn spend_routing(&self) -> Vec<(&str, Decimal)> {
        self.allocations
            .iter()
            .filter(|a| !a.card_spend.is_zero())
            .map(|a| (a.bank.as_str(), a.card_spend))
            .collect()
    }

    /// Copy with every money amount rounded to the currency minor unit
    pub fn rounded(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            principal: round_currency(self.principal),
            salary_bank: self.salary_bank.clone(),
            allocations: self
                .allocations
                .iter()
                .map(|a| BankAllocation {
                    bank: a.bank.clone(),
                    amount: round_currency(a.amount),
                    card_spend: round_currency(a.card_spend),
                    breakdown: a.breakdown.rounded(),
                })
                .collect(),
            total_annual_interest: round_currency(self.total_annual_interest),
        }
    }
}
