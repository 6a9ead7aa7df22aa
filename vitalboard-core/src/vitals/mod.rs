//! PPG Vitals Pipeline
//!
//! Turns the rolling optical window into a heart rate and SpO2 estimate:
//!
//! - [`filter`]: zero-phase Butterworth low-pass on the IR channel
//! - [`peaks`]: pulse peak and valley detection
//! - [`estimator`]: plausibility gating, heart rate, ratio-of-ratios SpO2

pub mod estimator;
pub mod filter;
pub mod peaks;

pub use estimator::{EstimatorConfig, VitalsEstimate, VitalsEstimator};
pub use filter::LowPass;
