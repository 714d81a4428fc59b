use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Mean daily total per weekday, indexed Monday..Sunday.
///
/// A weekday that was never observed holds `None`; it is never filled with zero,
/// so an average of exactly `0.0` stays distinguishable from "no data".
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct WeekdayAverages {
    averages: [Option<f64>; 7],
    observations: [usize; 7],
}

impl WeekdayAverages {
    /// Returns a copy with `weekday` set to `average`, backed by `observations` samples.
    pub fn with(mut self, weekday: Weekday, average: f64, observations: usize) -> Self {
        let idx = weekday.num_days_from_monday() as usize;
        self.averages[idx] = Some(average);
        self.observations[idx] = observations;
        self
    }

    pub fn get(&self, weekday: Weekday) -> Option<f64> {
        self.averages[weekday.num_days_from_monday() as usize]
    }

    pub fn observations(&self, weekday: Weekday) -> usize {
        self.observations[weekday.num_days_from_monday() as usize]
    }

    pub fn contains(&self, weekday: Weekday) -> bool {
        self.get(weekday).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.averages.iter().all(Option::is_none)
    }

    /// Number of weekdays with at least one observation.
    pub fn len(&self) -> usize {
        self.averages.iter().filter(|a| a.is_some()).count()
    }

    /// Observed weekdays only, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, f64)> + '_ {
        WEEKDAYS
            .iter()
            .filter_map(move |&wd| self.get(wd).map(|avg| (wd, avg)))
    }

    pub fn missing(&self) -> Vec<Weekday> {
        WEEKDAYS
            .iter()
            .copied()
            .filter(|&wd| !self.contains(wd))
            .collect()
    }
}

/// Operator-set monthly goal. Zero is a valid, explicit target.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ForecastTarget {
    pub monthly_amount: f64,
}

impl ForecastTarget {
    pub fn new(monthly_amount: f64) -> Option<Self> {
        if monthly_amount.is_finite() && monthly_amount >= 0.0 {
            Some(Self { monthly_amount })
        } else {
            None
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub projected_amount: f64,
    /// `false` marks a flagged day: its weekday had no history and it was projected as zero.
    pub estimated: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ForecastReport {
    pub month: u32,
    pub year: i32,
    pub daily_forecast: Vec<DailyForecast>,
    /// `None` when `current_date` is outside the month or falls on a flagged day.
    pub today_projected: Option<f64>,
    pub month_to_date_projected: Option<f64>,
    pub total_projected: f64,
    pub target: Option<ForecastTarget>,
    pub gap_to_target: Option<f64>,
}

impl ForecastReport {
    pub fn projected_on(&self, date: NaiveDate) -> Option<&DailyForecast> {
        self.daily_forecast.iter().find(|d| d.date == date)
    }

    pub fn unestimated_days(&self) -> Vec<NaiveDate> {
        self.daily_forecast
            .iter()
            .filter(|d| !d.estimated)
            .map(|d| d.date)
            .collect()
    }

    pub fn is_degraded(&self) -> bool {
        self.daily_forecast.iter().any(|d| !d.estimated)
    }
}
