//! Marginal-rate slices of a bank's resolved schedule

use rust_decimal::Decimal;

use crate::interest::ActiveTier;

/// A run of balance in one bank that earns a single marginal rate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    /// Index of the bank in the optimizer's selection
    pub bank: usize,

    /// Balance position where the slice starts
    pub start: Decimal,

    /// Principal the slice can absorb (None = unbounded)
    pub capacity: Option<Decimal>,

    /// Marginal annual rate
    pub rate: Decimal,

    /// Bands of the same bank still ahead of this one
    pub tiers_remaining: usize,
}

impl Slice {
    /// Balance position where the slice ends (None = unbounded)
    pub fn end(&self) -> Option<Decimal> {
        self.capacity.map(|capacity| self.start + capacity)
    }

    fn holds(&self, position: Decimal) -> bool {
        self.start < position && self.end().map_or(true, |end| position < end)
    }
}

/// Decompose resolved bands into slices, ending with an unbounded base-rate slice
pub fn bank_slices(bank: usize, bands: &[ActiveTier], base_rate: Decimal) -> Vec<Slice> {
    let mut slices: Vec<Slice> = bands
        .iter()
        .enumerate()
        .map(|(i, band)| Slice {
            bank,
            start: band.start,
            capacity: band.cap,
            rate: band.rate,
            tiers_remaining: bands.len() - i - 1,
        })
        .collect();

    let open_ended = bands.last().map_or(false, |band| band.cap.is_none());
    if !open_ended {
        let start = bands.last().and_then(ActiveTier::end).unwrap_or(Decimal::ZERO);
        slices.push(Slice {
            bank,
            start,
            capacity: None,
            rate: base_rate,
            tiers_remaining: 0,
        });
    }

    slices
}

/// Merge two adjacent slices of one bank into their average
fn merge(first: Slice, second: Slice) -> Slice {
    let (capacity, rate) = match (first.capacity, second.capacity) {
        (Some(a), Some(b)) if first.rate == second.rate => (Some(a + b), first.rate),
        (Some(a), Some(b)) => (Some(a + b), (first.rate * a + second.rate * b) / (a + b)),
        // Everything up to an unbounded slice averages out to its rate
        _ => (None, second.rate),
    };

    Slice {
        bank: first.bank,
        start: first.start,
        capacity,
        rate,
        tiers_remaining: second.tiers_remaining,
    }
}

/// Replace one bank's slices with their concave envelope
///
/// Any slice paying at least as much as the one before it is merged into it,
/// so the result has strictly decreasing marginal rates. Greedy filling is
/// only exact on concave schedules; the envelope is what a rising ladder is
/// worth on average once it is filled far enough.
pub fn iron(slices: Vec<Slice>) -> Vec<Slice> {
    let mut hull: Vec<Slice> = Vec::with_capacity(slices.len());

    for slice in slices {
        let mut current = slice;
        while hull.last().map_or(false, |prev| current.rate >= prev.rate) {
            if let Some(prev) = hull.pop() {
                current = merge(prev, current);
            }
        }
        hull.push(current);
    }

    hull
}

/// Where to stop a bank that was filled to `amount` inside an averaged slice
///
/// Returns the raw band starts within that slice below `amount`, ascending.
/// Empty when `amount` ends a slice or the slice it stops in pays one rate
/// throughout, since the average is then exact.
pub fn cut_points(raw: &[Slice], ironed: &[Slice], amount: Decimal) -> Vec<Decimal> {
    let Some(hull) = ironed.iter().find(|slice| slice.holds(amount)) else {
        return Vec::new();
    };
    let inside: Vec<&Slice> = raw
        .iter()
        .filter(|slice| slice.start >= hull.start && hull.end().map_or(true, |end| slice.start < end))
        .collect();
    if inside.iter().all(|slice| slice.rate == hull.rate) {
        return Vec::new();
    }

    inside
        .iter()
        .map(|slice| slice.start)
        .filter(|start| *start < amount)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn band(start: Decimal, cap: Option<Decimal>, rate: Decimal) -> ActiveTier {
        ActiveTier {
            label: "band".to_string(),
            sources: vec!["band".to_string()],
            start,
            cap,
            rate,
        }
    }

    #[test]
    fn test_slices_end_with_base_rate() {
        let bands = vec![
            band(dec!(0), Some(dec!(20000)), dec!(0.036)),
            band(dec!(20000), Some(dec!(30000)), dec!(0.032)),
        ];
        let slices = bank_slices(3, &bands, dec!(0.0005));

        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].tiers_remaining, 1);
        assert_eq!(slices[2].start, dec!(50000));
        assert_eq!(slices[2].capacity, None);
        assert_eq!(slices[2].rate, dec!(0.0005));
        assert!(slices.iter().all(|s| s.bank == 3));
    }

    #[test]
    fn test_no_bands_is_one_base_slice() {
        let slices = bank_slices(0, &[], dec!(0.0015));
        assert_eq!(slices.len(), 1);
        assert_eq!((slices[0].start, slices[0].capacity), (dec!(0), None));
    }

    #[test]
    fn test_concave_schedule_unchanged() {
        let bands = vec![
            band(dec!(0), Some(dec!(20000)), dec!(0.036)),
            band(dec!(20000), Some(dec!(30000)), dec!(0.032)),
        ];
        let slices = bank_slices(0, &bands, dec!(0));
        assert_eq!(iron(slices.clone()), slices);
    }

    #[test]
    fn test_rising_ladder_is_averaged() {
        let bands = vec![
            band(dec!(0), Some(dec!(75000)), dec!(0.02)),
            band(dec!(75000), Some(dec!(50000)), dec!(0.03)),
        ];
        let ironed = iron(bank_slices(0, &bands, dec!(0.0005)));

        assert_eq!(ironed.len(), 2);
        assert_eq!(ironed[0].capacity, Some(dec!(125000)));
        // (75K * 2% + 50K * 3%) / 125K
        assert_eq!(ironed[0].rate, dec!(0.024));
        assert_eq!(ironed[0].tiers_remaining, 0);
        assert_eq!(ironed[1].rate, dec!(0.0005));
    }

    #[test]
    fn test_cut_points_inside_averaged_ladder() {
        let bands = vec![
            band(dec!(0), Some(dec!(75000)), dec!(0.02)),
            band(dec!(75000), Some(dec!(50000)), dec!(0.03)),
        ];
        let raw = bank_slices(0, &bands, dec!(0.0005));
        let ironed = iron(raw.clone());

        assert_eq!(cut_points(&raw, &ironed, dec!(60000)), vec![dec!(0)]);
        assert_eq!(cut_points(&raw, &ironed, dec!(100000)), vec![dec!(0), dec!(75000)]);
        // A filled slice earns exactly its average
        assert!(cut_points(&raw, &ironed, dec!(125000)).is_empty());
        assert!(cut_points(&raw, &ironed, dec!(0)).is_empty());
        // Past the ladder the schedule is flat
        assert!(cut_points(&raw, &ironed, dec!(200000)).is_empty());
    }

    #[test]
    fn test_no_cut_points_on_concave_schedule() {
        let bands = vec![
            band(dec!(0), Some(dec!(20000)), dec!(0.036)),
            band(dec!(20000), Some(dec!(30000)), dec!(0.032)),
        ];
        let raw = bank_slices(0, &bands, dec!(0));
        let ironed = iron(raw.clone());
        assert!(cut_points(&raw, &ironed, dec!(10000)).is_empty());
        assert!(cut_points(&raw, &ironed, dec!(35000)).is_empty());
    }

    #[test]
    fn test_equal_rates_merge_exactly() {
        let bands = vec![
            band(dec!(0), Some(dec!(10000)), dec!(0.01)),
            band(dec!(10000), Some(dec!(10000)), dec!(0.01)),
        ];
        let ironed = iron(bank_slices(0, &bands, dec!(0)));
        assert_eq!(ironed[0].capacity, Some(dec!(20000)));
        assert_eq!(ironed[0].rate, dec!(0.01));
    }
}
