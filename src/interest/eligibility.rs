//! Eligibility evaluation: which tiers a profile unlocks, and for how much
//!
//! Active tier rules are resolved into contiguous, non-overlapping bands
//! starting at a zero balance. Within a band the rate is the first active
//! exclusive tier covering it (declared order), or the base rate, plus every
//! active cumulative bonus covering it. Every band is clipped to the
//! program's bonus ceiling. Tiers gated on a minimum balance only count once
//! the balance held reaches it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::profile::ActivityProfile;
use crate::rates::{BankProduct, Stacking, TierRule};

pub const BASE_RATE_LABEL: &str = "Base rate";

/// A resolved band of a bank's schedule for one profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTier {
    /// Display label combining the contributing rules
    pub label: String,

    /// Labels of the tier rules contributing to this band, exclusive first
    pub sources: Vec<String>,

    /// Balance position where the band starts
    pub start: Decimal,

    /// Effective cap after clipping (None = unbounded)
    pub cap: Option<Decimal>,

    /// Combined annual rate earned inside the band
    pub rate: Decimal,
}

impl ActiveTier {
    pub fn end(&self) -> Option<Decimal> {
        self.cap.map(|cap| self.start + cap)
    }
}

/// An active tier's band after applying the bonus ceiling
struct Claim<'a> {
    tier: &'a TierRule,
    start: Decimal,
    end: Option<Decimal>,
}

impl Claim<'_> {
    fn covers(&self, start: Decimal, end: Option<Decimal>) -> bool {
        if self.start > start {
            return false;
        }
        match (self.end, end) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(mine), Some(theirs)) => mine >= theirs,
        }
    }
}

fn clip(tier: &TierRule, ceiling: Option<Decimal>) -> Option<Claim<'_>> {
    let start = tier.from;
    let mut end = tier.band_end();

    if let Some(ceiling) = ceiling {
        if start >= ceiling {
            return None;
        }
        end = Some(end.map_or(ceiling, |e| e.min(ceiling)));
    }

    match end {
        Some(e) if e <= start => None,
        _ => Some(Claim { tier, start, end }),
    }
}

/// Resolve the bands a profile unlocks for a program, ordered by balance
///
/// Balance gates are taken as met; use [`evaluate_at`] for a known balance.
pub fn evaluate(product: &BankProduct, profile: &ActivityProfile) -> Vec<ActiveTier> {
    resolve(product, profile, None)
}

/// Bands a profile unlocks when `balance` is held in the program
pub fn evaluate_at(product: &BankProduct, profile: &ActivityProfile, balance: Decimal) -> Vec<ActiveTier> {
    resolve(product, profile, Some(balance))
}

fn resolve(product: &BankProduct, profile: &ActivityProfile, balance: Option<Decimal>) -> Vec<ActiveTier> {
    let claims: Vec<Claim> = product
        .tiers()
        .iter()
        .filter(|tier| tier.condition.is_met(profile))
        .filter(|tier| balance.map_or(true, |b| tier.pays_at(b)))
        .filter_map(|tier| clip(tier, product.bonus_ceiling))
        .collect();

    if claims.is_empty() {
        return Vec::new();
    }

    let mut points: Vec<Decimal> = std::iter::once(Decimal::ZERO)
        .chain(claims.iter().map(|c| c.start))
        .chain(claims.iter().filter_map(|c| c.end))
        .collect();
    points.sort();
    points.dedup();

    let mut segments: Vec<(Decimal, Option<Decimal>)> = points
        .windows(2)
        .filter_map(|pair| match pair {
            [start, end] => Some((*start, Some(*end))),
            _ => None,
        })
        .collect();
    if claims.iter().any(|c| c.end.is_none()) {
        if let Some(&last) = points.last() {
            segments.push((last, None));
        }
    }

    let mut bands: Vec<ActiveTier> = Vec::with_capacity(segments.len());
    for (start, end) in segments {
        let covering: Vec<&Claim> = claims.iter().filter(|c| c.covers(start, end)).collect();
        let exclusive = covering
            .iter()
            .find(|c| c.tier.stacking == Stacking::Exclusive);
        let bonuses: Vec<&TierRule> = covering
            .iter()
            .filter(|c| c.tier.stacking == Stacking::Cumulative)
            .map(|c| c.tier)
            .collect();

        let mut rate = exclusive.map_or(product.base_rate, |c| c.tier.rate);
        let mut sources = Vec::with_capacity(bonuses.len() + 1);
        if let Some(c) = exclusive {
            sources.push(c.tier.label.clone());
        }
        for bonus in &bonuses {
            rate += bonus.rate;
            sources.push(bonus.label.clone());
        }

        // Consecutive segments fed by the same rules form one band
        if let Some(prev) = bands.last_mut() {
            if prev.sources == sources && prev.end() == Some(start) {
                prev.cap = end.map(|e| e - prev.start);
                continue;
            }
        }

        let label = match (exclusive, sources.is_empty()) {
            (_, true) => BASE_RATE_LABEL.to_string(),
            (Some(_), false) => sources.join(" + "),
            (None, false) => format!("{BASE_RATE_LABEL} + {}", sources.join(" + ")),
        };

        bands.push(ActiveTier {
            label,
            sources,
            start,
            cap: end.map(|e| e - start),
            rate,
        });
    }

    log::debug!(
        "{}: {} of {} tiers active, resolved into {} bands",
        product.name,
        claims.len(),
        product.tiers().len(),
        bands.len()
    );

    bands
}
