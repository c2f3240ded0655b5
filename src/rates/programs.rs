//! Compiled-in savings programs, as published on 16 Jan 2025
//!
//! `data/rates/` carries the same programs as CSV; keep the two in sync.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{BankProduct, Condition, Requirements, Stacking, TierRule};

fn published() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 16).unwrap_or(NaiveDate::MIN)
}

fn tier(
    label: &str,
    rate: Decimal,
    from: Decimal,
    cap: Decimal,
    stacking: Stacking,
    requirements: Requirements,
) -> TierRule {
    TierRule {
        label: label.to_string(),
        condition: Condition::from_requirements(&requirements),
        rate,
        from,
        cap: Some(cap),
        stacking,
        min_balance: None,
    }
}

fn spend(min: Decimal, max: Option<Decimal>) -> Requirements {
    Requirements {
        min_spend: Some(min),
        max_spend: max,
        ..Default::default()
    }
}

fn salary(min: Decimal, max: Option<Decimal>) -> Requirements {
    Requirements {
        min_salary: Some(min),
        max_salary: max,
        ..Default::default()
    }
}

fn bills(count: u32) -> Requirements {
    Requirements {
        min_bill_payments: Some(count),
        ..Default::default()
    }
}

fn insurance() -> Requirements {
    Requirements {
        insurance: true,
        ..Default::default()
    }
}

fn investment() -> Requirements {
    Requirements {
        investment: true,
        ..Default::default()
    }
}

fn increased_balance() -> Requirements {
    Requirements {
        increased_balance: true,
        ..Default::default()
    }
}

fn grew_wealth() -> Requirements {
    Requirements {
        grew_wealth: true,
        ..Default::default()
    }
}

/// UOB One: card spend gates everything; GIRO upgrades the ladder.
/// No tier references salary. Balances above the $150K ceiling earn the
/// 0.05% base rate, which is the published "above $150K" rate.
pub fn uob_one() -> BankProduct {
    use Stacking::Exclusive;
    let giro_and_spend = Requirements {
        min_spend: Some(dec!(500)),
        min_bill_payments: Some(3),
        ..Default::default()
    };

    BankProduct::new("UOB One", dec!(0.0005), published())
        .with_ceiling(dec!(150000))
        .with_tier(tier("GIRO + card spend (first $75K)", dec!(0.0200), dec!(0), dec!(75000), Exclusive, giro_and_spend.clone()))
        .with_tier(tier("GIRO + card spend (next $50K)", dec!(0.0300), dec!(75000), dec!(50000), Exclusive, giro_and_spend.clone()))
        .with_tier(tier("GIRO + card spend (next $25K)", dec!(0.0005), dec!(125000), dec!(25000), Exclusive, giro_and_spend))
        .with_tier(tier("Card spend only (first $75K)", dec!(0.0065), dec!(0), dec!(75000), Exclusive, spend(dec!(500), None)))
}

/// SC BonusSaver: stacked category bonuses on the first $100K
pub fn sc_bonussaver() -> BankProduct {
    use Stacking::Cumulative;
    let first = dec!(0);
    let cap = dec!(100000);

    BankProduct::new("SC BonusSaver", dec!(0.0005), published())
        .with_ceiling(dec!(100000))
        .with_tier(tier("Card spend bonus", dec!(0.0060), first, cap, Cumulative, spend(dec!(500), Some(dec!(2000)))))
        .with_tier(tier("Card spend bonus (>= $2,000)", dec!(0.0140), first, cap, Cumulative, spend(dec!(2000), None)))
        .with_tier(tier("Salary credit bonus", dec!(0.0200), first, cap, Cumulative, salary(dec!(3000), None)))
        .with_tier(tier("Bill payment bonus", dec!(0.0023), first, cap, Cumulative, bills(3)))
        .with_tier(tier("Investment bonus", dec!(0.0200), first, cap, Cumulative, investment()))
        .with_tier(tier("Insurance bonus", dec!(0.0200), first, cap, Cumulative, insurance()))
}

/// OCBC 360: stacked bonuses, split into first $75K and next $25K
pub fn ocbc_360() -> BankProduct {
    use Stacking::Cumulative;
    let (first, next) = (dec!(0), dec!(75000));
    let (first_cap, next_cap) = (dec!(75000), dec!(25000));

    BankProduct::new("OCBC 360", dec!(0.0005), published())
        .with_ceiling(dec!(100000))
        .with_tier(tier("Salary bonus (first $75K)", dec!(0.0200), first, first_cap, Cumulative, salary(dec!(1800), None)))
        .with_tier(tier("Salary bonus (next $25K)", dec!(0.0400), next, next_cap, Cumulative, salary(dec!(1800), None)))
        .with_tier(tier("Save bonus (first $75K)", dec!(0.0120), first, first_cap, Cumulative, increased_balance()))
        .with_tier(tier("Save bonus (next $25K)", dec!(0.0240), next, next_cap, Cumulative, increased_balance()))
        .with_tier(tier("Spend bonus (first $75K)", dec!(0.0060), first, first_cap, Cumulative, spend(dec!(500), None)))
        .with_tier(tier("Spend bonus (next $25K)", dec!(0.0120), next, next_cap, Cumulative, spend(dec!(500), None)))
        .with_tier(tier("Insure bonus (first $75K)", dec!(0.0120), first, first_cap, Cumulative, insurance()))
        .with_tier(tier("Insure bonus (next $25K)", dec!(0.0240), next, next_cap, Cumulative, insurance()))
        .with_tier(tier("Invest bonus (first $75K)", dec!(0.0120), first, first_cap, Cumulative, investment()))
        .with_tier(tier("Invest bonus (next $25K)", dec!(0.0240), next, next_cap, Cumulative, investment()))
        .with_tier(tier("Grow bonus (first $75K)", dec!(0.0240), first, first_cap, Cumulative, grew_wealth()))
        .with_tier(tier("Grow bonus (next $25K)", dec!(0.0240), next, next_cap, Cumulative, grew_wealth()))
}

/// BOC SmartSaver: balance-tiered base interest, then stacked bonuses with
/// graded salary and spend thresholds. Bonuses need a $1,500 balance.
pub fn boc_smartsaver() -> BankProduct {
    use Stacking::{Cumulative, Exclusive};
    let first = dec!(0);
    let cap = dec!(100000);
    let minimum = dec!(1500);

    BankProduct::new("BOC SmartSaver", dec!(0.0005), published())
        .with_ceiling(dec!(100000))
        .with_tier(tier("Base interest (first $50K)", dec!(0.0015), first, dec!(50000), Exclusive, Requirements::default()))
        .with_tier(tier("Base interest (next $50K)", dec!(0.0020), dec!(50000), dec!(50000), Exclusive, Requirements::default()))
        .with_tier(tier("Wealth bonus", dec!(0.0240), first, cap, Cumulative, insurance()).with_min_balance(minimum))
        .with_tier(tier("Card spend bonus ($500)", dec!(0.0050), first, cap, Cumulative, spend(dec!(500), Some(dec!(1500)))).with_min_balance(minimum))
        .with_tier(tier("Card spend bonus ($1,500)", dec!(0.0080), first, cap, Cumulative, spend(dec!(1500), None)).with_min_balance(minimum))
        .with_tier(tier("Salary bonus ($2,000)", dec!(0.0190), first, cap, Cumulative, salary(dec!(2000), Some(dec!(6000)))).with_min_balance(minimum))
        .with_tier(tier("Salary bonus ($6,000)", dec!(0.0250), first, cap, Cumulative, salary(dec!(6000), None)).with_min_balance(minimum))
        .with_tier(tier("Bill payment bonus", dec!(0.0090), first, cap, Cumulative, bills(3)).with_min_balance(minimum))
}

/// Chocolate: no conditions at all, nothing paid above $50K
pub fn chocolate() -> BankProduct {
    use Stacking::Exclusive;

    BankProduct::new("Chocolate", dec!(0), published())
        .with_tier(tier("First $20K", dec!(0.0360), dec!(0), dec!(20000), Exclusive, Requirements::default()))
        .with_tier(tier("Next $30K", dec!(0.0320), dec!(20000), dec!(30000), Exclusive, Requirements::default()))
}

/// All compiled-in programs, in display order
pub fn default_programs() -> Vec<BankProduct> {
    vec![uob_one(), sc_bonussaver(), ocbc_360(), boc_smartsaver(), chocolate()]
}
