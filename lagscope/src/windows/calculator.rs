//! Date-window computation.
//!
//! For an observation date `d` the features span
//! `[d - (max_delay + forecast_length + gap), d - (forecast_length + gap)]`.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("Please specify non-negative values for forecast length, gap and max delay")]
    MissingInput,

    #[error("All values must be non-negative")]
    InvalidRange,

    #[error("Forecast length and max delay must be greater than zero")]
    DegenerateWindow,

    #[error("Forecast length must be at most {max} to fit on one page")]
    UnsupportedRange { max: usize },

    #[error("Training range starts on {start}, after it ends on {end}")]
    InvalidTrainingRange { start: NaiveDate, end: NaiveDate },

    #[error("Window offsets move dates outside the supported calendar")]
    DateOverflow,
}

pub type WindowResult<T> = Result<T, WindowError>;

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Calculator limits and the reference training range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Largest accepted forecast length.
    pub max_forecast_length: usize,
    /// First observation date of the training block.
    pub training_start: NaiveDate,
    /// Last observation date of the training block (inclusive).
    pub training_end: NaiveDate,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            max_forecast_length: 5,
            training_start: ymd(2021, 8, 1),
            training_end: ymd(2021, 8, 10),
        }
    }
}

/// Raw user inputs; any field may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInputs {
    pub forecast_length: Option<i64>,
    pub gap: Option<i64>,
    pub max_delay: Option<i64>,
}

impl WindowInputs {
    pub fn new(forecast_length: i64, gap: i64, max_delay: i64) -> Self {
        Self {
            forecast_length: Some(forecast_length),
            gap: Some(gap),
            max_delay: Some(max_delay),
        }
    }
}

/// Validated, non-negative window parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WindowParams {
    forecast_length: u64,
    gap: u64,
    max_delay: u64,
}

impl WindowParams {
    /// Days between an observation and its most recent feature.
    fn latest_offset(&self) -> WindowResult<u64> {
        self.forecast_length
            .checked_add(self.gap)
            .ok_or(WindowError::DateOverflow)
    }

    /// Days between an observation and its oldest feature.
    fn earliest_offset(&self) -> WindowResult<u64> {
        self.latest_offset()?
            .checked_add(self.max_delay)
            .ok_or(WindowError::DateOverflow)
    }
}

/// One observation with its feature date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRow {
    pub observation_date: NaiveDate,
    pub earliest_feature_date: NaiveDate,
    pub latest_feature_date: NaiveDate,
    /// Offset in days used for `earliest_feature_date`.
    pub earliest_offset_days: u64,
    /// Offset in days used for `latest_feature_date`.
    pub latest_offset_days: u64,
}

impl WindowRow {
    fn for_observation(observation_date: NaiveDate, params: &WindowParams) -> WindowResult<Self> {
        let earliest_offset_days = params.earliest_offset()?;
        let latest_offset_days = params.latest_offset()?;

        let earliest_feature_date = observation_date
            .checked_sub_days(Days::new(earliest_offset_days))
            .ok_or(WindowError::DateOverflow)?;
        let latest_feature_date = observation_date
            .checked_sub_days(Days::new(latest_offset_days))
            .ok_or(WindowError::DateOverflow)?;

        Ok(Self {
            observation_date,
            earliest_feature_date,
            latest_feature_date,
            earliest_offset_days,
            latest_offset_days,
        })
    }

    /// Number of feature days in the window (inclusive).
    pub fn feature_days(&self) -> i64 {
        (self.latest_feature_date - self.earliest_feature_date).num_days() + 1
    }
}

/// Training and validation rows for one set of inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPlan {
    pub training: Vec<WindowRow>,
    pub validation: Vec<WindowRow>,
}

impl WindowPlan {
    /// First validation observation date.
    pub fn validation_start(&self) -> Option<NaiveDate> {
        self.validation.first().map(|row| row.observation_date)
    }

    /// Last validation observation date.
    pub fn validation_end(&self) -> Option<NaiveDate> {
        self.validation.last().map(|row| row.observation_date)
    }

    /// All rows, training first.
    pub fn rows(&self) -> impl Iterator<Item = &WindowRow> {
        self.training.iter().chain(self.validation.iter())
    }
}

/// Computes training/validation date windows.
#[derive(Debug, Clone, Default)]
pub struct WindowCalculator {
    config: WindowConfig,
}

impl WindowCalculator {
    pub fn new(config: WindowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Compute both blocks over the configured training range.
    pub fn compute(&self, inputs: WindowInputs) -> WindowResult<WindowPlan> {
        self.compute_windows(inputs, self.config.training_start, self.config.training_end)
    }

    /// Compute both blocks for an explicit training range.
    pub fn compute_windows(
        &self,
        inputs: WindowInputs,
        training_start: NaiveDate,
        training_end: NaiveDate,
    ) -> WindowResult<WindowPlan> {
        let params = self.validate(inputs)?;

        if training_start > training_end {
            return Err(WindowError::InvalidTrainingRange {
                start: training_start,
                end: training_end,
            });
        }

        let training = training_start
            .iter_days()
            .take_while(|date| *date <= training_end)
            .map(|date| WindowRow::for_observation(date, &params))
            .collect::<WindowResult<Vec<_>>>()?;

        let validation_start = training_end
            .checked_add_days(Days::new(params.gap + 1))
            .ok_or(WindowError::DateOverflow)?;
        let validation = validation_start
            .iter_days()
            .take(params.forecast_length as usize)
            .map(|date| WindowRow::for_observation(date, &params))
            .collect::<WindowResult<Vec<_>>>()?;

        debug!(
            forecast_length = params.forecast_length,
            gap = params.gap,
            max_delay = params.max_delay,
            training_rows = training.len(),
            validation_rows = validation.len(),
            "Computed date windows"
        );

        Ok(WindowPlan {
            training,
            validation,
        })
    }

    /// Check inputs in order; the first failing rule wins.
    fn validate(&self, inputs: WindowInputs) -> WindowResult<WindowParams> {
        let (Some(forecast_length), Some(gap), Some(max_delay)) =
            (inputs.forecast_length, inputs.gap, inputs.max_delay)
        else {
            return Err(WindowError::MissingInput);
        };

        if forecast_length < 0 || gap < 0 || max_delay < 0 {
            return Err(WindowError::InvalidRange);
        }

        if forecast_length == 0 || max_delay == 0 {
            return Err(WindowError::DegenerateWindow);
        }

        let max = self.config.max_forecast_length;
        if forecast_length as u64 > max as u64 {
            return Err(WindowError::UnsupportedRange { max });
        }

        Ok(WindowParams {
            forecast_length: forecast_length as u64,
            gap: gap as u64,
            max_delay: max_delay as u64,
        })
    }
}
