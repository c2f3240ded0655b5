//! Currency rounding applied at the reporting boundary only

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Decimal places of the currency minor unit (cents)
pub const CURRENCY_DP: u32 = 2;

/// Months per year, for callers converting annual interest to monthly
pub const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Round an amount to the currency minor unit using banker's rounding
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointNearestEven)
}

/// Convert an annual interest figure to a monthly one (unrounded)
pub fn monthly(annual: Decimal) -> Decimal {
    annual / MONTHS_PER_YEAR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_currency() {
        assert_eq!(round_currency(dec!(325.004)), dec!(325.00));
        assert_eq!(round_currency(dec!(0.125)), dec!(0.12));
        assert_eq!(round_currency(dec!(0.135)), dec!(0.14));
    }

    #[test]
    fn test_monthly() {
        assert_eq!(monthly(dec!(1200)), dec!(100));
    }
}
