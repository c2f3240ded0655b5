//! Distribution optimizer: split a principal across banks for maximum interest

mod engine;
mod plan;
mod slices;

pub use engine::{DistributionOptimizer, OptimizerConfig, EXHAUSTIVE_SEARCH_LIMIT};
pub use plan::{AllocationPlan, BankAllocation, ScenarioKind};
pub use slices::{bank_slices, cut_points, iron, Slice};
