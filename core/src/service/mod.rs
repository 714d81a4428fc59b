pub mod month_forecaster;
pub mod target_service;
pub mod weekday_aggregator;
