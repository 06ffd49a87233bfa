//! Derived aggregates produced by the historical analyzer

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate of one calendar year of daily records
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct YearlySummary {
    /// Calendar year
    pub year: i32,
    /// Mean of daily maximum temperatures in Celsius
    pub avg_temp_max: f64,
    /// Mean of daily minimum temperatures in Celsius
    pub avg_temp_min: f64,
    /// Mean of daily mean temperatures in Celsius
    pub avg_temp_mean: f64,
    /// Total precipitation in mm
    pub total_precipitation: f64,
    /// Total snowfall in cm
    pub total_snowfall: f64,
    /// Maximum snow depth in cm
    pub max_snow_depth: f64,
    /// Count of days with snowfall > 0
    pub snow_days: u32,
    /// Count of days with precipitation strictly above 1.0 mm
    pub rain_days: u32,
    /// Highest daily maximum temperature of the year in Celsius
    pub max_temp: f64,
    /// Lowest daily minimum temperature of the year in Celsius
    pub min_temp: f64,
    /// Date of the hottest day
    pub hottest_date: NaiveDate,
    /// Date of the coldest day
    pub coldest_date: NaiveDate,
}

/// Long-run average conditions for one calendar month across all years
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MonthlyClimatology {
    /// Calendar month 1-12
    pub month: u32,
    /// Mean daily temperature in Celsius
    pub avg_temp_mean: f64,
    /// Mean daily precipitation in mm
    pub avg_precipitation: f64,
    /// Mean daily snowfall in cm
    pub avg_snowfall: f64,
}

/// Direction of the long-run temperature trend
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrendLabel {
    Warming,
    Cooling,
    Stable,
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendLabel::Warming => "warming",
            TrendLabel::Cooling => "cooling",
            TrendLabel::Stable => "stable",
        };
        f.write_str(s)
    }
}

/// Result of the ordinary-least-squares temperature trend fit
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TrendResult {
    /// Trend slope in Celsius per year
    pub slope: f64,
    /// Trend slope in Celsius per decade (slope x 10)
    pub slope_per_decade: f64,
    /// Coefficient of determination, 0-1
    pub r_squared: f64,
    /// Classification of the trend direction
    pub label: TrendLabel,
}

impl TrendResult {
    /// The flat trend returned for degenerate inputs
    #[must_use]
    pub fn stable() -> Self {
        Self {
            slope: 0.0,
            slope_per_decade: 0.0,
            r_squared: 0.0,
            label: TrendLabel::Stable,
        }
    }
}

/// Extremal years across a historical record, one independent scan per metric
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExtremesSummary {
    pub hottest_year: i32,
    /// Highest daily maximum in Celsius across all years
    pub hottest_year_max_temp: f64,
    pub hottest_date: NaiveDate,
    pub coldest_year: i32,
    /// Lowest daily minimum in Celsius across all years
    pub coldest_year_min_temp: f64,
    pub coldest_date: NaiveDate,
    pub wettest_year: i32,
    pub wettest_year_precip: f64,
    pub driest_year: i32,
    pub driest_year_precip: f64,
    pub snowiest_year: i32,
    pub snowiest_year_snowfall: f64,
    pub snowiest_year_snow_days: u32,
    pub least_snow_year: i32,
    pub least_snow_year_snowfall: f64,
    pub least_snow_year_snow_days: u32,
    pub most_snow_days_year: i32,
    pub most_snow_days_count: u32,
}
