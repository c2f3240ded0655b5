//! Customer activity profile and batch request loading

mod data;
pub mod loader;

pub use data::ActivityProfile;
pub use loader::{load_requests, load_requests_from_reader, OptimizationRequest};
