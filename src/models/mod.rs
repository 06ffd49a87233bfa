//! Typed domain records shared across the fetch and analysis pipeline
//!
//! Every entity is an immutable value record with named fields and documented
//! units, created fresh on each fetch/analysis call and discarded after use.

pub mod analysis;
pub mod forecast;
pub mod history;
pub mod location;

pub use analysis::{
    ExtremesSummary, MonthlyClimatology, TrendLabel, TrendResult, YearlySummary,
};
pub use forecast::{
    DailyForecastRecord, HourlyRecord, degrees_to_compass, snow_depth_to_cm, weather_code_label,
};
pub use history::DailyHistoricalRecord;
pub use location::ResolvedLocation;
