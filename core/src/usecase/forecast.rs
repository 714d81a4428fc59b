use anyhow::Result;
use chrono::NaiveDate;

use crate::model::forecast::{ForecastReport, ForecastTarget, WeekdayAverages};
use crate::model::sales::HistoricalDataset;
use crate::repository::TargetRepository;
use crate::service::month_forecaster::forecast_month;
use crate::service::weekday_aggregator::aggregate_weekdays;

/// Averages and report from one forecast request.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastOutcome {
    pub weekday_averages: WeekdayAverages,
    pub report: ForecastReport,
}

pub struct ForecastUseCase<'a, T: TargetRepository> {
    target_repo: &'a T,
}

impl<'a, T: TargetRepository> ForecastUseCase<'a, T> {
    pub fn new(target_repo: &'a T) -> Self {
        Self { target_repo }
    }

    /// Aggregates `datasets` and forecasts `month`/`year` as seen from `today`.
    ///
    /// An explicit `override_target` wins over the target stored for that month.
    pub fn run(
        &self,
        datasets: &[HistoricalDataset],
        month: u32,
        year: i32,
        today: NaiveDate,
        override_target: Option<ForecastTarget>,
    ) -> Result<ForecastOutcome> {
        let weekday_averages = aggregate_weekdays(datasets)?;

        let target = match override_target {
            Some(t) => Some(t),
            None => self.target_repo.get(year, month)?,
        };
        tracing::debug!(
            month,
            year,
            %today,
            target = ?target.map(|t| t.monthly_amount),
            observed_weekdays = weekday_averages.len(),
            "running month forecast"
        );

        let report = forecast_month(month, year, &weekday_averages, today, target.as_ref())?;
        if report.is_degraded() {
            tracing::warn!(
                missing = ?weekday_averages.missing(),
                "some weekdays have no history and are projected as zero"
            );
        }

        Ok(ForecastOutcome {
            weekday_averages,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForecastError;
    use crate::model::sales::DailySalesRecord;
    use chrono::Weekday;

    struct MockTargetRepo {
        stored: Option<ForecastTarget>,
    }

    impl TargetRepository for MockTargetRepo {
        fn get(&self, _year: i32, _month: u32) -> Result<Option<ForecastTarget>> {
            Ok(self.stored)
        }

        fn upsert(&self, _year: i32, _month: u32, _target: ForecastTarget) -> Result<()> {
            unimplemented!()
        }

        fn remove(&self, _year: i32, _month: u32) -> Result<bool> {
            unimplemented!()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn history() -> Vec<HistoricalDataset> {
        let november = HistoricalDataset::new(
            "November",
            vec![
                DailySalesRecord::new(date(2025, 11, 24), 100.0), // Mon
                DailySalesRecord::new(date(2025, 11, 25), 150.0), // Tue
            ],
        )
        .unwrap();
        let december = HistoricalDataset::new(
            "December",
            vec![
                DailySalesRecord::new(date(2025, 12, 1), 120.0), // Mon
                DailySalesRecord::new(date(2025, 12, 2), 130.0), // Tue
            ],
        )
        .unwrap();
        vec![november, december]
    }

    #[test]
    fn test_uses_stored_target() {
        let repo = MockTargetRepo {
            stored: Some(ForecastTarget { monthly_amount: 2000.0 }),
        };
        let outcome = ForecastUseCase::new(&repo)
            .run(&history(), 1, 2026, date(2026, 1, 12), None)
            .unwrap();

        assert_eq!(outcome.weekday_averages.get(Weekday::Mon), Some(110.0));
        assert_eq!(outcome.weekday_averages.get(Weekday::Tue), Some(140.0));
        // January 2026: four Mondays, four Tuesdays.
        assert_eq!(outcome.report.total_projected, 1000.0);
        assert_eq!(outcome.report.gap_to_target, Some(-1000.0));
        assert_eq!(outcome.report.today_projected, Some(110.0));
    }

    #[test]
    fn test_override_target_wins() {
        let repo = MockTargetRepo {
            stored: Some(ForecastTarget { monthly_amount: 2000.0 }),
        };
        let outcome = ForecastUseCase::new(&repo)
            .run(
                &history(),
                1,
                2026,
                date(2026, 1, 12),
                Some(ForecastTarget { monthly_amount: 900.0 }),
            )
            .unwrap();
        assert_eq!(outcome.report.gap_to_target, Some(100.0));
    }

    #[test]
    fn test_no_target_anywhere() {
        let repo = MockTargetRepo { stored: None };
        let outcome = ForecastUseCase::new(&repo)
            .run(&history(), 1, 2026, date(2026, 1, 12), None)
            .unwrap();
        assert_eq!(outcome.report.target, None);
        assert_eq!(outcome.report.gap_to_target, None);
    }

    #[test]
    fn test_engine_errors_surface() {
        let repo = MockTargetRepo { stored: None };
        let err = ForecastUseCase::new(&repo)
            .run(&[], 1, 2026, date(2026, 1, 12), None)
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ForecastError>(),
            Some(&ForecastError::InsufficientData)
        );
    }
}
