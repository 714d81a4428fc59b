use crate::error::{ForecastError, ForecastResult};
use crate::model::forecast::{WeekdayAverages, WEEKDAYS};
use crate::model::sales::{DailySalesRecord, HistoricalDataset};

/// Averages daily totals per weekday across every supplied dataset.
///
/// The datasets are pooled first, so a short month carries the same per-day
/// weight as a long one.
pub fn aggregate_weekdays(datasets: &[HistoricalDataset]) -> ForecastResult<WeekdayAverages> {
    aggregate_records(datasets.iter().flat_map(|d| d.records()))
}

pub fn aggregate_records<'a, I>(records: I) -> ForecastResult<WeekdayAverages>
where
    I: IntoIterator<Item = &'a DailySalesRecord>,
{
    let mut sums = [0.0_f64; 7];
    let mut counts = [0_usize; 7];

    for record in records {
        record.validate()?;
        let idx = record.weekday.num_days_from_monday() as usize;
        sums[idx] += record.total;
        counts[idx] += 1;
    }

    if counts.iter().all(|&c| c == 0) {
        return Err(ForecastError::InsufficientData);
    }

    let averages = WEEKDAYS
        .iter()
        .zip(sums.iter().zip(counts.iter()))
        .filter(|(_, (_, count))| **count > 0)
        .fold(WeekdayAverages::default(), |acc, (&wd, (&sum, &count))| {
            acc.with(wd, sum / count as f64, count)
        });

    Ok(averages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset(label: &str, days: &[(NaiveDate, f64)]) -> HistoricalDataset {
        let records = days
            .iter()
            .map(|(d, total)| DailySalesRecord::new(*d, *total))
            .collect();
        HistoricalDataset::new(label, records).unwrap()
    }

    #[test]
    fn test_monday_tuesday_scenario() {
        // 2025-12-01 and 2025-12-08 are Mondays.
        let december = dataset(
            "December",
            &[
                (date(2025, 12, 1), 100.0),
                (date(2025, 12, 2), 150.0),
                (date(2025, 12, 8), 120.0),
                (date(2025, 12, 9), 130.0),
            ],
        );

        let averages = aggregate_weekdays(&[december]).unwrap();

        assert_eq!(averages.get(Weekday::Mon), Some(110.0));
        assert_eq!(averages.get(Weekday::Tue), Some(140.0));
        for wd in [Weekday::Wed, Weekday::Thu, Weekday::Fri, Weekday::Sat, Weekday::Sun] {
            assert_eq!(averages.get(wd), None);
        }
        assert_eq!(averages.observations(Weekday::Mon), 2);
    }

    #[test]
    fn test_pools_records_instead_of_averaging_averages() {
        // One Friday in November, three in December.
        let november = dataset("November", &[(date(2025, 11, 28), 400.0)]);
        let december = dataset(
            "December",
            &[
                (date(2025, 12, 5), 100.0),
                (date(2025, 12, 12), 100.0),
                (date(2025, 12, 19), 100.0),
            ],
        );

        let averages = aggregate_weekdays(&[november, december]).unwrap();

        // Pooled mean is 700/4; the mean of per-dataset means would be 250.
        assert_eq!(averages.get(Weekday::Fri), Some(175.0));
        assert_eq!(averages.observations(Weekday::Fri), 4);
    }

    #[test]
    fn test_matches_manual_mean_for_every_weekday() {
        let days: Vec<(NaiveDate, f64)> = date(2025, 11, 1)
            .iter_days()
            .take(61)
            .enumerate()
            .map(|(i, d)| (d, (i * 37 % 500) as f64 + 0.25))
            .collect();
        let pool = dataset("Nov-Dec", &days);

        let averages = aggregate_weekdays(std::slice::from_ref(&pool)).unwrap();

        for (wd, avg) in averages.iter() {
            let matching: Vec<f64> = pool
                .records()
                .iter()
                .filter(|r| r.date.weekday() == wd)
                .map(|r| r.total)
                .collect();
            let expected = matching.iter().sum::<f64>() / matching.len() as f64;
            assert_eq!(avg, expected, "weekday {}", wd);
        }
        assert_eq!(averages.len(), 7);
    }

    #[test]
    fn test_zero_average_is_kept() {
        let quiet = dataset("Quiet", &[(date(2025, 12, 7), 0.0)]);
        let averages = aggregate_weekdays(&[quiet]).unwrap();
        assert_eq!(averages.get(Weekday::Sun), Some(0.0));
        assert!(!averages.contains(Weekday::Sat));
    }

    #[test]
    fn test_empty_pool_is_insufficient() {
        assert_eq!(aggregate_weekdays(&[]), Err(ForecastError::InsufficientData));

        let empty = HistoricalDataset::new("Empty", Vec::new()).unwrap();
        assert_eq!(
            aggregate_weekdays(&[empty.clone(), empty]),
            Err(ForecastError::InsufficientData)
        );
    }

    #[test]
    fn test_tampered_record_is_rejected() {
        let mut record = DailySalesRecord::new(date(2025, 12, 1), 10.0);
        record.weekday = Weekday::Sun;
        assert!(matches!(
            aggregate_records([&record]),
            Err(ForecastError::DataIntegrity { .. })
        ));
    }
}
