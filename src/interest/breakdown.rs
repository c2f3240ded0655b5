//! Per-bank interest breakdown records

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::{monthly, round_currency};

/// Whether a line comes from a resolved tier band or the residual base rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Tier,
    Residual,
}

/// One line of the waterfall: how much principal earned which rate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLine {
    pub label: String,

    pub kind: LineKind,

    /// Principal this line applied to
    pub amount_applied: Decimal,

    /// Annual rate as a decimal fraction
    pub rate: Decimal,

    /// amount_applied * rate
    pub interest: Decimal,
}

impl TierLine {
    pub fn new(label: impl Into<String>, kind: LineKind, amount_applied: Decimal, rate: Decimal) -> Self {
        Self {
            label: label.into(),
            kind,
            amount_applied,
            rate,
            interest: amount_applied * rate,
        }
    }
}

/// Annual interest for one bank, tier by tier
///
/// Amounts are unrounded; use [`InterestBreakdown::rounded`] for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestBreakdown {
    pub bank: String,

    pub principal: Decimal,

    /// Waterfall lines in application order, residual last
    pub lines: Vec<TierLine>,

    pub total_annual_interest: Decimal,
}

impl InterestBreakdown {
    pub fn new(bank: impl Into<String>, principal: Decimal, lines: Vec<TierLine>) -> Self {
        let total_annual_interest = lines.iter().map(|l| l.interest).sum();
        Self {
            bank: bank.into(),
            principal,
            lines,
            total_annual_interest,
        }
    }

    /// Total principal across every line (always equals `principal`)
    pub fn amount_applied(&self) -> Decimal {
        self.lines.iter().map(|l| l.amount_applied).sum()
    }

    /// Principal that fell through to the base rate
    pub fn residual(&self) -> Decimal {
        self.lines
            .iter()
            .filter(|l| l.kind == LineKind::Residual)
            .map(|l| l.amount_applied)
            .sum()
    }

    /// Blended annual rate, None for a zero principal
    pub fn effective_rate(&self) -> Option<Decimal> {
        if self.principal.is_zero() {
            None
        } else {
            Some(self.total_annual_interest / self.principal)
        }
    }

    /// Unrounded monthly equivalent of the annual total
    pub fn monthly_interest(&self) -> Decimal {
        monthly(self.total_annual_interest)
    }

    /// Copy with every money amount rounded to the currency minor unit
    pub fn rounded(&self) -> Self {
        Self {
            bank: self.bank.clone(),
            principal: round_currency(self.principal),
            lines: self
                .lines
                .iter()
                .map(|l| TierLine {
                    amount_applied: round_currency(l.amount_applied),
                    interest: round_currency(l.interest),
                    ..l.clone()
                })
                .collect(),
            total_annual_interest: round_currency(self.total_annual_interest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_totals_and_rates() {
        let breakdown = InterestBreakdown::new(
            "Test Bank",
            dec!(30000),
            vec![
                TierLine::new("First $20K", LineKind::Tier, dec!(20000), dec!(0.036)),
                TierLine::new("Base rate", LineKind::Residual, dec!(10000), dec!(0.0005)),
            ],
        );

        assert_eq!(breakdown.total_annual_interest, dec!(725));
        assert_eq!(breakdown.amount_applied(), dec!(30000));
        assert_eq!(breakdown.residual(), dec!(10000));
        assert_eq!(breakdown.effective_rate().unwrap().round_dp(6), dec!(0.024167));
    }

    #[test]
    fn test_rounded_only_at_boundary() {
        let breakdown = InterestBreakdown::new(
            "Test Bank",
            dec!(333.33),
            vec![TierLine::new("Only", LineKind::Tier, dec!(333.33), dec!(0.0325))],
        );

        assert_eq!(breakdown.total_annual_interest, dec!(10.8332250));
        assert_eq!(breakdown.rounded().total_annual_interest, dec!(10.83));
        assert_eq!(breakdown.rounded().lines[0].rate, dec!(0.0325));
    }

    #[test]
    fn test_zero_principal_has_no_rate() {
        let breakdown = InterestBreakdown::new("Test Bank", dec!(0), Vec::new());
        assert_eq!(breakdown.total_annual_interest, dec!(0));
        assert_eq!(breakdown.effective_rate(), None);
    }
}
