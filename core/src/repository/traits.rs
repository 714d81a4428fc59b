use std::path::Path;

use anyhow::Result;

use crate::model::forecast::ForecastTarget;
use crate::model::sales::HistoricalDataset;

pub trait TargetRepository {
    fn get(&self, year: i32, month: u32) -> Result<Option<ForecastTarget>>;
    fn upsert(&self, year: i32, month: u32, target: ForecastTarget) -> Result<()>;
    /// Returns `false` when no target was stored for that month.
    fn remove(&self, year: i32, month: u32) -> Result<bool>;
}

pub trait DatasetLoader {
    fn load(&self, path: &Path) -> Result<HistoricalDataset>;
}
