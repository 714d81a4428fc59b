pub mod comparison;
pub mod forecast;
pub mod trend;
