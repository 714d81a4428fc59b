use anyhow::{anyhow, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

use crate::error::{ForecastError, ForecastResult};

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

const DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// Excel's day zero, accounting for the 1900 leap-year bug.
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

pub fn first_of_month(month: u32, year: i32) -> ForecastResult<NaiveDate> {
    if !(1..=12).contains(&month) {
        return Err(ForecastError::InvalidMonth { month, year });
    }
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(ForecastError::InvalidMonth { month, year })
}

pub fn days_in_month(month: u32, year: i32) -> ForecastResult<u32> {
    Ok(month_dates(month, year)?.len() as u32)
}

/// Every calendar date of the month, ascending.
pub fn month_dates(month: u32, year: i32) -> ForecastResult<Vec<NaiveDate>> {
    let first = first_of_month(month, year)?;
    Ok(first
        .iter_days()
        .take_while(|d| d.month() == month)
        .collect())
}

pub fn contains_date(month: u32, year: i32, date: NaiveDate) -> bool {
    date.year() == year && date.month() == month
}

/// Accepts `1`..`12`, full English month names, or three-letter abbreviations.
pub fn parse_month(input: &str) -> Result<u32> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return Err(anyhow!("Empty month"));
    }

    if let Ok(num) = input.parse::<u32>() {
        if (1..=12).contains(&num) {
            return Ok(num);
        }
        return Err(anyhow!("Month out of range: {}", num));
    }

    MONTH_NAMES
        .iter()
        .map(|name| name.to_lowercase())
        .position(|name| name == input || (input.len() == 3 && name.starts_with(&input)))
        .map(|idx| idx as u32 + 1)
        .ok_or_else(|| anyhow!("Unknown month: {}", input))
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1..=12 => MONTH_NAMES[(month - 1) as usize],
        _ => "Unknown",
    }
}

pub fn parse_weekday_str(s: &str) -> Result<Weekday> {
    match s.trim().to_lowercase().as_str() {
        "mon" | "monday" => Ok(Weekday::Mon),
        "tue" | "tuesday" => Ok(Weekday::Tue),
        "wed" | "wednesday" => Ok(Weekday::Wed),
        "thu" | "thursday" => Ok(Weekday::Thu),
        "fri" | "friday" => Ok(Weekday::Fri),
        "sat" | "saturday" => Ok(Weekday::Sat),
        "sun" | "sunday" => Ok(Weekday::Sun),
        _ => Err(anyhow!("Invalid weekday: {}", s)),
    }
}

/// Parses a spreadsheet date cell: textual dates, date-times, or Excel serial numbers.
pub fn parse_sales_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return Err(anyhow!("Empty date"));
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(input, fmt) {
            return Ok(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, fmt) {
            return Ok(dt.date());
        }
    }

    if let Ok(serial) = input.parse::<f64>() {
        return from_excel_serial(serial);
    }

    Err(anyhow!("Could not parse date: {}", input))
}

fn from_excel_serial(serial: f64) -> Result<NaiveDate> {
    // Serials below 61 fall before the phantom 1900-02-29 and are not sales dates.
    if !serial.is_finite() || serial < 61.0 || serial > 2_958_465.0 {
        return Err(anyhow!("Not an Excel date serial: {}", serial));
    }
    let (y, m, d) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| anyhow!("Invalid Excel epoch"))?;
    Ok(epoch + Duration::days(serial.trunc() as i64))
}
