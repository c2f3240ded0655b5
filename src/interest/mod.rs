//! Eligibility evaluation and interest calculation

mod breakdown;
mod calculator;
mod eligibility;

pub use breakdown::{InterestBreakdown, LineKind, TierLine};
pub use calculator::calculate;
pub use eligibility::{evaluate, evaluate_at, ActiveTier, BASE_RATE_LABEL};
