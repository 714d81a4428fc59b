use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::model::sales::HistoricalDataset;

/// One historical day on the sales trend.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub total: f64,
    /// Number of uploaded datasets that recorded this date.
    pub uploads: usize,
}

/// Daily totals across every upload, oldest first.
///
/// A date present in several uploads appears once, with the mean of its totals.
pub fn sales_trend(datasets: &[HistoricalDataset]) -> Vec<TrendPoint> {
    let mut by_date: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for record in datasets.iter().flat_map(|d| d.records()) {
        let entry = by_date.entry(record.date).or_insert((0.0, 0));
        entry.0 += record.total;
        entry.1 += 1;
    }

    by_date
        .into_iter()
        .map(|(date, (sum, uploads))| TrendPoint {
            date,
            weekday: date.weekday(),
            total: sum / uploads as f64,
            uploads,
        })
        .collect()
}
