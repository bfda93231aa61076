//! Opportunity Radar
//!
//! Scans a ticker universe with bounded concurrency, ranks results per
//! market-cap bucket, and diffs consecutive scans into NewOpportunity
//! events. A failed ticker is recorded and skipped, never fatal.

pub mod scan;
pub mod scanner;

pub use scan::{diff_scans, BucketScan, RadarScan, ScanFailure};
pub use scanner::RadarScanner;
