//! cloudsweep library
//!
//! Core pipeline: provider → classifiers → cost model → aggregator →
//! report. The binary in `main.rs` is a thin CLI over `scan::run_scan`.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod error;
pub mod finding;
pub mod policy;
pub mod pricing;
pub mod provider;
pub mod providers;
pub mod report;
pub mod retry;
pub mod scan;

// Re-export commonly used types
pub use aggregate::{Aggregated, SavingsSummary};
pub use error::{Result, SweepError};
pub use finding::{Age, Confidence, ResourceKind, WasteFinding};
pub use pricing::{CostModel, PriceTable};
pub use report::ScanReport;
