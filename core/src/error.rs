use chrono::NaiveDate;
use thiserror::Error;

/// Failures raised by the forecasting engine.
///
/// A weekday missing from history is not an error: the forecaster flags
/// those days instead of refusing to project.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("insufficient data: no historical sales records were supplied")]
    InsufficientData,

    #[error("invalid target month {month}/{year}")]
    InvalidMonth { month: u32, year: i32 },

    #[error("no weekday averages available, nothing can be projected")]
    NoWeekdayData,

    #[error("data integrity violation on {date}: {reason}")]
    DataIntegrity { date: NaiveDate, reason: String },
}

pub type ForecastResult<T> = Result<T, ForecastError>;
