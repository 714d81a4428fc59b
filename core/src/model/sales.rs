use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, ForecastResult};

/// Allowed drift between a branch breakdown and the stored total.
pub const BRANCH_SUM_TOLERANCE: f64 = 0.01;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DailySalesRecord {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_breakdown: Option<BTreeMap<String, f64>>,
}

impl DailySalesRecord {
    pub fn new(date: NaiveDate, total: f64) -> Self {
        Self {
            date,
            weekday: date.weekday(),
            total,
            branch_breakdown: None,
        }
    }

    /// Builds a record whose total is the sum of its branches.
    pub fn from_branches(date: NaiveDate, breakdown: BTreeMap<String, f64>) -> Self {
        let total = breakdown.values().sum();
        Self {
            date,
            weekday: date.weekday(),
            total,
            branch_breakdown: Some(breakdown),
        }
    }

    pub fn validate(&self) -> ForecastResult<()> {
        if self.weekday != self.date.weekday() {
            return Err(ForecastError::DataIntegrity {
                date: self.date,
                reason: format!(
                    "stored weekday {} does not match date weekday {}",
                    self.weekday,
                    self.date.weekday()
                ),
            });
        }

        if let Some(breakdown) = &self.branch_breakdown {
            let branch_sum: f64 = breakdown.values().sum();
            if (branch_sum - self.total).abs() > BRANCH_SUM_TOLERANCE {
                return Err(ForecastError::DataIntegrity {
                    date: self.date,
                    reason: format!(
                        "branch breakdown sums to {:.2} but total is {:.2}",
                        branch_sum, self.total
                    ),
                });
            }
        }

        Ok(())
    }
}

/// One uploaded month (or partial month) of daily totals.
///
/// Immutable once built; records are held in ascending date order.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct HistoricalDataset {
    month_label: String,
    records: Vec<DailySalesRecord>,
}

impl HistoricalDataset {
    pub fn new(month_label: impl Into<String>, mut records: Vec<DailySalesRecord>) -> ForecastResult<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            record.validate()?;
            if !seen.insert(record.date) {
                return Err(ForecastError::DataIntegrity {
                    date: record.date,
                    reason: "date appears more than once in the dataset".to_string(),
                });
            }
        }
        records.sort_by_key(|r| r.date);

        Ok(Self {
            month_label: month_label.into(),
            records,
        })
    }

    pub fn month_label(&self) -> &str {
        &self.month_label
    }

    pub fn records(&self) -> &[DailySalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }

    pub fn total(&self) -> f64 {
        self.records.iter().map(|r| r.total).sum()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailySalesRecord> {
        self.records
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|idx| &self.records[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_derives_weekday() {
        let record = DailySalesRecord::new(date(2026, 1, 5), 100.0);
        assert_eq!(record.weekday, Weekday::Mon);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_mismatched_weekday_is_rejected() {
        let mut record = DailySalesRecord::new(date(2026, 1, 5), 100.0);
        record.weekday = Weekday::Fri;
        assert!(matches!(
            record.validate(),
            Err(ForecastError::DataIntegrity { .. })
        ));
    }

    #[test]
    fn test_branch_breakdown_must_match_total() {
        let mut branches = BTreeMap::new();
        branches.insert("Marina".to_string(), 60.0);
        branches.insert("Downtown".to_string(), 40.0);

        let record = DailySalesRecord::from_branches(date(2026, 1, 6), branches);
        assert_eq!(record.total, 100.0);
        assert!(record.validate().is_ok());

        let mut broken = record.clone();
        broken.total = 120.0;
        assert!(broken.validate().is_err());

        let mut within_tolerance = record;
        within_tolerance.total = 100.005;
        assert!(within_tolerance.validate().is_ok());
    }

    #[test]
    fn test_dataset_rejects_duplicate_dates() {
        let records = vec![
            DailySalesRecord::new(date(2025, 11, 3), 10.0),
            DailySalesRecord::new(date(2025, 11, 3), 20.0),
        ];
        let err = HistoricalDataset::new("November", records).unwrap_err();
        assert_eq!(
            err,
            ForecastError::DataIntegrity {
                date: date(2025, 11, 3),
                reason: "date appears more than once in the dataset".to_string(),
            }
        );
    }

    #[test]
    fn test_dataset_sorts_and_summarizes() {
        let records = vec![
            DailySalesRecord::new(date(2025, 11, 10), 30.0),
            DailySalesRecord::new(date(2025, 11, 2), 10.0),
            DailySalesRecord::new(date(2025, 11, 5), 20.0),
        ];
        let dataset = HistoricalDataset::new("November", records).unwrap();

        assert_eq!(dataset.month_label(), "November");
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.total(), 60.0);
        assert_eq!(
            dataset.date_range(),
            Some((date(2025, 11, 2), date(2025, 11, 10)))
        );
        assert_eq!(dataset.get(date(2025, 11, 5)).map(|r| r.total), Some(20.0));
        assert!(dataset.get(date(2025, 11, 6)).is_none());
    }
}
