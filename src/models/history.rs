//! Daily historical archive records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of archived weather, as returned by the historical archive.
///
/// Archive data is assumed complete; any null numeric field was coerced to
/// 0.0 during parsing (unlike the hourly forecast, which preserves the null
/// for precipitation probability).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyHistoricalRecord {
    /// Calendar day
    pub date: NaiveDate,
    /// Daily maximum temperature in Celsius
    pub temp_max: f64,
    /// Daily minimum temperature in Celsius
    pub temp_min: f64,
    /// Daily mean temperature in Celsius
    pub temp_mean: f64,
    /// Total precipitation in mm
    pub precipitation: f64,
    /// Total snowfall in cm
    pub snowfall: f64,
    /// Maximum snow depth in cm
    pub snow_depth_max: f64,
    /// Maximum wind speed in km/h
    pub wind_max: f64,
}
