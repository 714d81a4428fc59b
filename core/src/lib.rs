pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod service;
pub mod time;
pub mod usecase;

pub use config::{data_dir, Settings};
pub use error::{ForecastError, ForecastResult};
pub use model::forecast::{DailyForecast, ForecastReport, ForecastTarget, WeekdayAverages, WEEKDAYS};
pub use model::sales::{DailySalesRecord, HistoricalDataset};
pub use repository::{DatasetLoader, FileTargetRepository, SpreadsheetLoader, TargetRepository};
pub use service::month_forecaster::forecast_month;
pub use service::target_service::TargetService;
pub use service::weekday_aggregator::{aggregate_records, aggregate_weekdays};
pub use time::{month_name, parse_month};
pub use usecase::comparison::{compare_actuals, ActualComparison, DayComparison};
pub use usecase::forecast::{ForecastOutcome, ForecastUseCase};
pub use usecase::trend::{sales_trend, TrendPoint};
