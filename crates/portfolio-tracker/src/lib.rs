//! Portfolio Ranker & Diff Engine
//!
//! Builds a scored snapshot of the held portfolio each run, diffs it
//! against the previous snapshot, and turns the differences into
//! notification events. The first run establishes a baseline and stays
//! silent.

pub mod diff;
pub mod snapshot;
pub mod summary;
pub mod tracker;

pub use diff::diff_snapshots;
pub use snapshot::build_snapshot;
pub use summary::{PositionMetrics, PortfolioSummary};
pub use tracker::{PortfolioTracker, RunReport};
