use chrono::{Datelike, NaiveDate};

use crate::error::{ForecastError, ForecastResult};
use crate::model::forecast::{DailyForecast, ForecastReport, ForecastTarget, WeekdayAverages};
use crate::time::{contains_date, month_dates};

/// Projects every day of `target_month`/`target_year` from weekday averages.
///
/// A day whose weekday has no history is projected as `0.0` with
/// `estimated == false`, and if that day is `current_date` the today
/// projection is left undefined. Only a completely empty average map is an error.
/// `current_date` is the caller's notion of "today"; nothing here reads the clock.
pub fn forecast_month(
    target_month: u32,
    target_year: i32,
    weekday_averages: &WeekdayAverages,
    current_date: NaiveDate,
    target: Option<&ForecastTarget>,
) -> ForecastResult<ForecastReport> {
    let dates = month_dates(target_month, target_year)?;

    if weekday_averages.is_empty() {
        return Err(ForecastError::NoWeekdayData);
    }

    let daily_forecast: Vec<DailyForecast> = dates
        .into_iter()
        .map(|date| {
            let weekday = date.weekday();
            match weekday_averages.get(weekday) {
                Some(avg) => DailyForecast {
                    date,
                    weekday,
                    projected_amount: avg,
                    estimated: true,
                },
                None => DailyForecast {
                    date,
                    weekday,
                    projected_amount: 0.0,
                    estimated: false,
                },
            }
        })
        .collect();

    let total_projected: f64 = daily_forecast.iter().map(|d| d.projected_amount).sum();

    let (today_projected, month_to_date_projected) =
        if contains_date(target_month, target_year, current_date) {
            let today = daily_forecast
                .iter()
                .find(|d| d.date == current_date)
                .filter(|d| d.estimated)
                .map(|d| d.projected_amount);
            let to_date: f64 = daily_forecast
                .iter()
                .take_while(|d| d.date <= current_date)
                .map(|d| d.projected_amount)
                .sum();
            (today, Some(to_date))
        } else {
            (None, None)
        };

    let gap_to_target = target.map(|t| total_projected - t.monthly_amount);

    Ok(ForecastReport {
        month: target_month,
        year: target_year,
        daily_forecast,
        today_projected,
        month_to_date_projected,
        total_projected,
        target: target.copied(),
        gap_to_target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::forecast::WEEKDAYS;
    use crate::time::days_in_month;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn mon_tue() -> WeekdayAverages {
        WeekdayAverages::default()
            .with(Weekday::Mon, 110.0, 2)
            .with(Weekday::Tue, 140.0, 2)
    }

    fn flat(avg: f64) -> WeekdayAverages {
        WEEKDAYS
            .iter()
            .fold(WeekdayAverages::default(), |acc, &wd| acc.with(wd, avg, 1))
    }

    #[test]
    fn test_missing_weekdays_are_flagged_zero() {
        // October 2025 starts on a Wednesday.
        let report = forecast_month(10, 2025, &mon_tue(), date(2025, 10, 15), None).unwrap();

        let first = &report.daily_forecast[0];
        assert_eq!(first.weekday, Weekday::Wed);
        assert_eq!(first.projected_amount, 0.0);
        assert!(!first.estimated);

        for day in &report.daily_forecast {
            match day.weekday {
                Weekday::Mon => assert_eq!((day.projected_amount, day.estimated), (110.0, true)),
                Weekday::Tue => assert_eq!((day.projected_amount, day.estimated), (140.0, true)),
                _ => assert_eq!((day.projected_amount, day.estimated), (0.0, false)),
            }
        }

        // Four Mondays and four Tuesdays in October 2025.
        assert_eq!(report.total_projected, 4.0 * 110.0 + 4.0 * 140.0);
        assert_eq!(report.unestimated_days().len(), 31 - 8);
        assert!(report.is_degraded());
    }

    #[test]
    fn test_daily_forecast_covers_whole_month() {
        for year in [1900, 2000, 2024, 2025, 2026] {
            for month in 1..=12 {
                let report = forecast_month(month, year, &flat(1.0), date(2026, 10, 17), None).unwrap();
                let expected = days_in_month(month, year).unwrap() as usize;
                assert_eq!(report.daily_forecast.len(), expected, "{}-{}", year, month);
                assert!(report
                    .daily_forecast
                    .windows(2)
                    .all(|w| w[0].date < w[1].date));
                assert_eq!(report.daily_forecast[0].date.day(), 1);
            }
        }
    }

    #[test]
    fn test_leap_february_has_29_days() {
        let report = forecast_month(2, 2024, &flat(10.0), date(2024, 2, 29), None).unwrap();
        assert_eq!(report.daily_forecast.len(), 29);
        assert_eq!(report.today_projected, Some(10.0));
    }

    #[test]
    fn test_total_is_sum_of_days() {
        let averages = WeekdayAverages::default()
            .with(Weekday::Mon, 0.1, 1)
            .with(Weekday::Thu, 1234.567, 3)
            .with(Weekday::Sat, 99.99, 2);
        let report = forecast_month(3, 2026, &averages, date(2026, 3, 1), None).unwrap();

        let summed: f64 = report.daily_forecast.iter().map(|d| d.projected_amount).sum();
        assert_eq!(report.total_projected, summed);
    }

    #[test]
    fn test_today_inside_and_outside_month() {
        // 2026-01-13 is a Tuesday.
        let inside = forecast_month(1, 2026, &mon_tue(), date(2026, 1, 13), None).unwrap();
        assert_eq!(inside.today_projected, Some(140.0));
        assert_eq!(
            inside.today_projected,
            inside.projected_on(date(2026, 1, 13)).map(|d| d.projected_amount)
        );
        // Mondays 5 and 12, Tuesdays 6 and 13.
        assert_eq!(inside.month_to_date_projected, Some(2.0 * 110.0 + 2.0 * 140.0));

        // Same day of month, different year.
        let outside = forecast_month(1, 2026, &mon_tue(), date(2025, 1, 13), None).unwrap();
        assert_eq!(outside.today_projected, None);
        assert_eq!(outside.month_to_date_projected, None);
    }

    #[test]
    fn test_today_on_unobserved_weekday_is_undefined() {
        // 2026-01-14 is a Wednesday.
        let report = forecast_month(1, 2026, &mon_tue(), date(2026, 1, 14), None).unwrap();
        assert_eq!(report.today_projected, None);
        assert!(report.unestimated_days().contains(&date(2026, 1, 14)));
        // Month-to-date still counts the days that were projected.
        assert_eq!(report.month_to_date_projected, Some(2.0 * 110.0 + 2.0 * 140.0));
    }

    #[test]
    fn test_gap_to_target() {
        // February 2026 has exactly four of each weekday: 28 * 150 = 4200.
        let target = ForecastTarget::new(5000.0).unwrap();
        let report = forecast_month(2, 2026, &flat(150.0), date(2026, 2, 1), Some(&target)).unwrap();

        assert_eq!(report.total_projected, 4200.0);
        assert_eq!(report.gap_to_target, Some(-800.0));
        assert_eq!(report.target, Some(target));
    }

    #[test]
    fn test_zero_target_is_not_missing_target() {
        let zero = ForecastTarget::new(0.0).unwrap();
        let with_zero = forecast_month(2, 2026, &flat(1.0), date(2026, 2, 1), Some(&zero)).unwrap();
        assert_eq!(with_zero.gap_to_target, Some(28.0));

        let without = forecast_month(2, 2026, &flat(1.0), date(2026, 2, 1), None).unwrap();
        assert_eq!(without.gap_to_target, None);
        assert_eq!(without.target, None);
    }

    #[test]
    fn test_invalid_month() {
        assert_eq!(
            forecast_month(0, 2026, &flat(1.0), date(2026, 1, 1), None),
            Err(ForecastError::InvalidMonth { month: 0, year: 2026 })
        );
        assert_eq!(
            forecast_month(13, 2026, &flat(1.0), date(2026, 1, 1), None),
            Err(ForecastError::InvalidMonth { month: 13, year: 2026 })
        );
    }

    #[test]
    fn test_empty_averages_cannot_forecast() {
        assert_eq!(
            forecast_month(5, 2026, &WeekdayAverages::default(), date(2026, 5, 1), None),
            Err(ForecastError::NoWeekdayData)
        );
    }

    #[test]
    fn test_identical_inputs_give_identical_reports() {
        let target = ForecastTarget::new(12_345.6).unwrap();
        let a = forecast_month(7, 2026, &mon_tue(), date(2026, 7, 20), Some(&target)).unwrap();
        let b = forecast_month(7, 2026, &mon_tue(), date(2026, 7, 20), Some(&target)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.total_projected.to_bits(), b.total_projected.to_bits());
    }
}
