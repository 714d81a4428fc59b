use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::forecast::ForecastReport;
use crate::model::sales::HistoricalDataset;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DayComparison {
    pub date: NaiveDate,
    pub projected: f64,
    pub actual: Option<f64>,
    /// `actual - projected`, present only when an actual was recorded.
    pub variance: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActualComparison {
    pub month: u32,
    pub year: i32,
    pub days: Vec<DayComparison>,
    pub days_with_actuals: usize,
    pub actual_total: f64,
    /// Projection summed over the same days that have actuals.
    pub projected_for_actual_days: f64,
    pub variance: f64,
}

impl ActualComparison {
    /// Percentage of the like-for-like projection achieved so far.
    pub fn attainment(&self) -> Option<f64> {
        if self.projected_for_actual_days > 0.0 {
            Some(self.actual_total / self.projected_for_actual_days * 100.0)
        } else {
            None
        }
    }
}

/// Lines the current month's actual uploads up against a forecast.
///
/// Actual records dated outside the forecast month are ignored.
pub fn compare_actuals(report: &ForecastReport, actual: &HistoricalDataset) -> ActualComparison {
    let days: Vec<DayComparison> = report
        .daily_forecast
        .iter()
        .map(|day| {
            let actual_total = actual.get(day.date).map(|r| r.total);
            DayComparison {
                date: day.date,
                projected: day.projected_amount,
                actual: actual_total,
                variance: actual_total.map(|a| a - day.projected_amount),
            }
        })
        .collect();

    let matched: Vec<&DayComparison> = days.iter().filter(|d| d.actual.is_some()).collect();
    let actual_total: f64 = matched.iter().filter_map(|d| d.actual).sum();
    let projected_for_actual_days: f64 = matched.iter().map(|d| d.projected).sum();

    ActualComparison {
        month: report.month,
        year: report.year,
        days_with_actuals: matched.len(),
        days,
        actual_total,
        projected_for_actual_days,
        variance: actual_total - projected_for_actual_days,
    }
}
