//! `skywatch` - personal weather alerts, climate history, and dashboard
//!
//! This library provides the core functionality: geocoding a place name,
//! fetching hourly/daily/historical weather from Open-Meteo, evaluating
//! alert rules against the forecast, and analysing multi-decade history.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod forecast;
pub mod geocode;
pub mod history;
pub mod models;
pub mod notify;
pub mod report;
pub mod retry;
pub mod rules;
pub mod runlog;
pub mod schedule;
pub mod web;

// Re-export core types for public API
pub use config::SkywatchConfig;
pub use error::Error;
pub use models::{
    DailyForecastRecord, DailyHistoricalRecord, ExtremesSummary, HourlyRecord,
    MonthlyClimatology, ResolvedLocation, TrendLabel, TrendResult, YearlySummary,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
