use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::data_dir;
use crate::model::forecast::ForecastTarget;
use crate::repository::traits::TargetRepository;

const TARGET_FILE_NAME: &str = "targets.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct StoredTarget {
    year: i32,
    month: u32,
    monthly_amount: f64,
}

#[derive(Clone)]
pub struct FileTargetRepository {
    file_path: PathBuf,
}

impl FileTargetRepository {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut path = data_dir(base_dir)?;
        path.push(TARGET_FILE_NAME);

        if !path.exists() {
            let mut writer = BufWriter::new(File::create(&path)?);
            serde_json::to_writer_pretty(&mut writer, &Vec::<StoredTarget>::new())?;
            writer.flush()?;
        }

        Ok(FileTargetRepository { file_path: path })
    }

    fn read_targets(&self) -> Result<Vec<StoredTarget>> {
        let file = File::open(&self.file_path)?;
        let reader = BufReader::new(file);
        let targets = serde_json::from_reader(reader)?;
        Ok(targets)
    }

    fn write_targets(&self, targets: &[StoredTarget]) -> Result<()> {
        let file = File::create(&self.file_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, targets)?;
        writer.flush()?;
        Ok(())
    }
}

impl TargetRepository for FileTargetRepository {
    fn get(&self, year: i32, month: u32) -> Result<Option<ForecastTarget>> {
        let targets = self.read_targets()?;
        Ok(targets
            .into_iter()
            .find(|t| t.year == year && t.month == month)
            .map(|t| ForecastTarget {
                monthly_amount: t.monthly_amount,
            }))
    }

    fn upsert(&self, year: i32, month: u32, target: ForecastTarget) -> Result<()> {
        let mut targets = self.read_targets()?;
        let stored = StoredTarget {
            year,
            month,
            monthly_amount: target.monthly_amount,
        };
        if let Some(pos) = targets.iter().position(|t| t.year == year && t.month == month) {
            targets[pos] = stored;
        } else {
            targets.push(stored);
        }
        self.write_targets(&targets)?;
        tracing::info!(year, month, amount = target.monthly_amount, "stored monthly target");
        Ok(())
    }

    fn remove(&self, year: i32, month: u32) -> Result<bool> {
        let mut targets = self.read_targets()?;
        let initial_len = targets.len();
        targets.retain(|t| !(t.year == year && t.month == month));

        if targets.len() == initial_len {
            return Ok(false);
        }

        self.write_targets(&targets)?;
        tracing::info!(year, month, "removed monthly target");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_file() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = FileTargetRepository::new(Some(tmp.path().to_path_buf())).unwrap();

        assert_eq!(repo.get(2026, 1).unwrap(), None);

        repo.upsert(2026, 1, ForecastTarget { monthly_amount: 5000.0 }).unwrap();
        repo.upsert(2026, 2, ForecastTarget { monthly_amount: 0.0 }).unwrap();
        repo.upsert(2026, 1, ForecastTarget { monthly_amount: 6500.0 }).unwrap();

        // A fresh handle sees the persisted state.
        let reopened = FileTargetRepository::new(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(
            reopened.get(2026, 1).unwrap(),
            Some(ForecastTarget { monthly_amount: 6500.0 })
        );
        assert_eq!(
            reopened.get(2026, 2).unwrap(),
            Some(ForecastTarget { monthly_amount: 0.0 })
        );
        assert_eq!(reopened.get(2025, 1).unwrap(), None);
    }

    #[test]
    fn test_remove() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = FileTargetRepository::new(Some(tmp.path().to_path_buf())).unwrap();

        repo.upsert(2026, 3, ForecastTarget { monthly_amount: 100.0 }).unwrap();
        assert!(repo.remove(2026, 3).unwrap());
        assert!(!repo.remove(2026, 3).unwrap());
        assert_eq!(repo.get(2026, 3).unwrap(), None);
    }
}
