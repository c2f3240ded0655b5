//! Interest calculator: waterfall of principal through resolved tier bands

use rust_decimal::Decimal;

use super::breakdown::{InterestBreakdown, LineKind, TierLine};
use super::eligibility::{evaluate_at, BASE_RATE_LABEL};
use crate::error::{CalcError, Result};
use crate::profile::ActivityProfile;
use crate::rates::BankProduct;

/// Annual interest earned by `principal` held in one program
///
/// Each band takes `min(remaining, cap)` of the principal in balance order;
/// whatever is left after the last band earns the base rate. Tiers gated on
/// a minimum balance are judged against the whole principal.
pub fn calculate(
    product: &BankProduct,
    principal: Decimal,
    profile: &ActivityProfile,
) -> Result<InterestBreakdown> {
    if principal < Decimal::ZERO {
        return Err(CalcError::invalid_principal(principal));
    }
    profile.validate()?;

    let bands = evaluate_at(product, profile, principal);
    let mut lines = Vec::with_capacity(bands.len() + 1);
    let mut remaining = principal;

    for band in &bands {
        if remaining.is_zero() {
            break;
        }
        let applied = band.cap.map_or(remaining, |cap| remaining.min(cap));
        lines.push(TierLine::new(band.label.clone(), LineKind::Tier, applied, band.rate));
        remaining -= applied;
    }

    if remaining > Decimal::ZERO {
        lines.push(TierLine::new(
            BASE_RATE_LABEL,
            LineKind::Residual,
            remaining,
            product.base_rate,
        ));
    }

    let breakdown = InterestBreakdown::new(product.name.clone(), principal, lines);
    log::debug!(
        "{}: {} on {} over {} lines",
        product.name,
        breakdown.total_annual_interest,
        principal,
        breakdown.lines.len()
    );

    Ok(breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::{programs, Condition, TierRule};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn spend_bank() -> BankProduct {
        BankProduct::new("Spend Bank", dec!(0.0005), NaiveDate::from_ymd_opt(2025, 1, 16).unwrap())
            .with_tier(
                TierRule::new("First $50K", dec!(0.0325), dec!(0), Some(dec!(50000)))
                    .when(Condition::spend_at_least(dec!(500))),
            )
    }

    #[test]
    fn test_single_tier_interest() {
        let profile = ActivityProfile::new(false, dec!(0), dec!(500));
        let breakdown = calculate(&spend_bank(), dec!(10000), &profile).unwrap();

        assert_eq!(breakdown.total_annual_interest, dec!(325));
        assert_eq!(breakdown.rounded().total_annual_interest, dec!(325.00));
        assert_eq!(breakdown.lines.len(), 1);
        assert_eq!(breakdown.residual(), dec!(0));
    }

    #[test]
    fn test_inactive_tier_falls_back_to_base() {
        let profile = ActivityProfile::new(false, dec!(0), dec!(499.99));
        let breakdown = calculate(&spend_bank(), dec!(10000), &profile).unwrap();

        assert_eq!(breakdown.total_annual_interest, dec!(5));
        assert_eq!(breakdown.lines[0].kind, LineKind::Residual);
    }

    #[test]
    fn test_remainder_above_cap_earns_base() {
        let profile = ActivityProfile::new(false, dec!(0), dec!(500));
        let breakdown = calculate(&spend_bank(), dec!(60000), &profile).unwrap();

        assert_eq!(breakdown.lines.len(), 2);
        assert_eq!(breakdown.lines[0].amount_applied, dec!(50000));
        assert_eq!(breakdown.residual(), dec!(10000));
        assert_eq!(breakdown.total_annual_interest, dec!(1625) + dec!(5));
        assert_eq!(breakdown.amount_applied(), dec!(60000));
    }

    #[test]
    fn test_uob_ignores_salary() {
        let product = programs::uob_one();
        let with_salary = ActivityProfile::new(true, dec!(5000), dec!(500));
        let without_salary = ActivityProfile::new(false, dec!(0), dec!(500));

        let a = calculate(&product, dec!(10000), &with_salary).unwrap();
        let b = calculate(&product, dec!(10000), &without_salary).unwrap();

        assert_eq!(a.total_annual_interest, dec!(65));
        assert_eq!(a, b);
    }

    #[test]
    fn test_uob_giro_ladder() {
        let profile = ActivityProfile::new(false, dec!(0), dec!(500)).with_bill_payments(3);
        let breakdown = calculate(&programs::uob_one(), dec!(150000), &profile).unwrap();

        // 75K @ 2% + 50K @ 3% + 25K @ 0.05%
        assert_eq!(breakdown.total_annual_interest, dec!(1500) + dec!(1500) + dec!(12.5));
        assert_eq!(breakdown.lines[2].label, "GIRO + card spend (next $25K)");
        assert_eq!(breakdown.lines[2].amount_applied, dec!(25000));
        assert_eq!(breakdown.residual(), dec!(0));

        let above = calculate(&programs::uob_one(), dec!(200000), &profile).unwrap();
        assert_eq!(above.residual(), dec!(50000));
        assert_eq!(above.total_annual_interest, dec!(3012.5) + dec!(25));
    }

    #[test]
    fn test_boc_bonuses_need_minimum_balance() {
        let product = programs::boc_smartsaver();
        let profile = ActivityProfile::new(false, dec!(0), dec!(0)).with_insurance(true);

        // 0.15% base only
        let small = calculate(&product, dec!(1000), &profile).unwrap();
        assert_eq!(small.total_annual_interest, dec!(1.5));

        // 0.15% base + 2.4% wealth bonus
        let gated = calculate(&product, dec!(1500), &profile).unwrap();
        assert_eq!(gated.total_annual_interest, dec!(1500) * dec!(0.0255));
    }

    #[test]
    fn test_boc_tiered_base_above_ceiling() {
        let breakdown =
            calculate(&programs::boc_smartsaver(), dec!(120000), &ActivityProfile::inactive()).unwrap();

        // 50K @ 0.15% + 50K @ 0.20% + 20K @ 0.05%
        assert_eq!(breakdown.total_annual_interest, dec!(75) + dec!(100) + dec!(10));
        assert_eq!(breakdown.residual(), dec!(20000));
    }

    #[test]
    fn test_chocolate_two_bands() {
        let breakdown =
            calculate(&programs::chocolate(), dec!(60000), &ActivityProfile::inactive()).unwrap();

        let amounts: Vec<Decimal> = breakdown.lines.iter().map(|l| l.amount_applied).collect();
        assert_eq!(amounts, vec![dec!(20000), dec!(30000), dec!(10000)]);
        assert_eq!(breakdown.total_annual_interest, dec!(720) + dec!(960));
    }

    #[test]
    fn test_ocbc_stacked_split() {
        let profile = ActivityProfile::new(true, dec!(2000), dec!(500));
        let breakdown = calculate(&programs::ocbc_360(), dec!(100000), &profile).unwrap();

        // first 75K: 0.05% + 2% + 0.6%; next 25K: 0.05% + 4% + 1.2%
        let first = dec!(75000) * dec!(0.0265);
        let next = dec!(25000) * dec!(0.0525);
        assert_eq!(breakdown.total_annual_interest, first + next);
    }

    #[test]
    fn test_zero_principal() {
        let breakdown =
            calculate(&programs::sc_bonussaver(), dec!(0), &ActivityProfile::inactive()).unwrap();
        assert!(breakdown.lines.is_empty());
        assert_eq!(breakdown.total_annual_interest, dec!(0));
    }

    #[test]
    fn test_rejects_negative_principal() {
        let err = calculate(&spend_bank(), dec!(-1), &ActivityProfile::inactive()).unwrap_err();
        assert_eq!(err, CalcError::invalid_principal(dec!(-1)));
    }

    #[test]
    fn test_rejects_negative_spend() {
        let profile = ActivityProfile::new(false, dec!(0), dec!(-10));
        let err = calculate(&spend_bank(), dec!(100), &profile).unwrap_err();
        assert!(matches!(err, CalcError::InvalidProfile { field: "monthly_card_spend", .. }));
    }
}
