//! Forecasting date-window calculator.
//!
//! Translates forecast length, gap and max delay into observation and feature
//! date ranges for a training block and a validation block:
//! - Training: every day of a fixed reference range
//! - Validation: `forecast_length` days starting `gap + 1` days after training

pub mod calculator;

pub use calculator::{
    WindowCalculator, WindowConfig, WindowError, WindowInputs, WindowPlan, WindowResult, WindowRow,
};
