use anyhow::{anyhow, Result};

use crate::model::forecast::ForecastTarget;
use crate::repository::TargetRepository;
use crate::time::first_of_month;

pub struct TargetService<R: TargetRepository> {
    repo: R,
}

impl<R: TargetRepository> TargetService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn get_target(&self, year: i32, month: u32) -> Result<Option<ForecastTarget>> {
        first_of_month(month, year)?;
        self.repo.get(year, month)
    }

    pub fn set_target(&self, year: i32, month: u32, amount: f64) -> Result<ForecastTarget> {
        first_of_month(month, year)?;
        let target = ForecastTarget::new(amount)
            .ok_or_else(|| anyhow!("Target must be a non-negative amount, got {}", amount))?;
        self.repo.upsert(year, month, target)?;
        Ok(target)
    }

    pub fn clear_target(&self, year: i32, month: u32) -> Result<bool> {
        first_of_month(month, year)?;
        self.repo.remove(year, month)
    }
}
