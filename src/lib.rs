//! Savings Optimizer - tiered bonus-interest calculator for bank savings programs
//!
//! This library provides:
//! - A declarative rate rule model (conditions, tier bands, stacking, ceilings)
//! - Eligibility evaluation of an activity profile against each program
//! - Waterfall interest calculation with exact decimal arithmetic
//! - Water-filling distribution of a principal across programs, with
//!   salary routing and alternative scenarios

pub mod error;
pub mod money;
pub mod profile;
pub mod rates;
pub mod interest;
pub mod optimizer;
pub mod service;

// Re-export commonly used types
pub use error::{CalcError, LoadError, Result};
pub use profile::{ActivityProfile, OptimizationRequest};
pub use rates::{BankProduct, Condition, RateBook, Stacking, TierRule};
pub use interest::{ActiveTier, InterestBreakdown, TierLine};
pub use optimizer::{AllocationPlan, BankAllocation, DistributionOptimizer, OptimizerConfig, ScenarioKind};
pub use service::{BankComparison, SavingsCalculator};
