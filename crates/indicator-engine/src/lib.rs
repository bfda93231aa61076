//! Indicator Calculator
//!
//! Pure derivation of technical and fundamental indicators from a raw
//! per-ticker snapshot. Indicators that cannot be computed (short price
//! history, missing fundamentals) are marked unavailable, never zeroed.

pub mod engine;
pub mod indicators;

#[cfg(test)]
mod indicators_tests;

pub use engine::IndicatorEngine;
