//! Significant lag detection.
//!
//! A lag is reported as significant when either:
//! - its confidence interval excludes zero and it is a local ACF peak, or
//! - it falls within the head window (first 10 lags by default) and its
//!   interval excludes zero.

pub mod analyzer;
pub mod peaks;

pub use analyzer::{AnalyzerConfig, LagAnalysis, LagSignificanceAnalyzer};
pub use peaks::local_peaks;
