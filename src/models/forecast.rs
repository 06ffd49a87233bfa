//! Hourly and daily forecast records, plus the unit conversions applied at
//! the provider boundary (wind bearing to compass label, snow depth to cm)

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 16-point compass rose, clockwise from north
const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Convert a wind bearing in degrees to a 16-point compass label.
///
/// 0 and 360 both map to "N"; sector boundaries round to the nearer point
/// (22.5 rounds up to "NNE").
#[must_use]
pub fn degrees_to_compass(degrees: f64) -> &'static str {
    let index = (degrees / 22.5).round() as usize % 16;
    COMPASS_POINTS[index]
}

/// Convert a snow depth reported in metres to centimetres, rounded to one
/// decimal. Open-Meteo reports `snow_depth` in metres; everything downstream
/// works in centimetres, and this is the single place the conversion happens.
#[must_use]
pub fn snow_depth_to_cm(metres: f64) -> f64 {
    (metres * 100.0 * 10.0).round() / 10.0
}

/// Human-readable label for a WMO weather code
#[must_use]
pub fn weather_code_label(code: u8) -> String {
    let label = match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Icy fog",
        51 => "Light drizzle",
        53 => "Drizzle",
        55 => "Heavy drizzle",
        61 => "Light rain",
        63 => "Rain",
        65 => "Heavy rain",
        71 => "Light snow",
        73 => "Snow",
        75 => "Heavy snow",
        77 => "Snow grains",
        80 => "Rain showers",
        81 => "Showers",
        82 => "Heavy showers",
        85 => "Snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm + hail",
        99 => "Thunderstorm + heavy hail",
        other => return format!("Code {other}"),
    };
    label.to_string()
}

/// One hour of forecast data, normalized from the provider's parallel arrays
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HourlyRecord {
    /// Forecast hour (local time, hour resolution)
    pub time: NaiveDateTime,
    /// Air temperature in Celsius
    pub temperature: f64,
    /// Apparent (feels-like) temperature in Celsius
    pub feels_like: f64,
    /// Precipitation probability 0-100; the provider may omit this and the
    /// null is preserved rather than coerced (rules apply their own default)
    pub precipitation_probability: Option<u8>,
    /// Wind speed in km/h
    pub wind_speed: f64,
    /// Wind direction as a 16-point compass label
    pub wind_direction: String,
    /// WMO weather code
    pub weather_code: u8,
    /// Relative humidity 0-100
    pub humidity: u8,
    /// Snowfall in cm
    pub snowfall: f64,
    /// Snow depth in cm (converted from the provider's metres)
    pub snow_depth: f64,
}

/// One calendar day of aggregated forecast data
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyForecastRecord {
    /// Calendar day
    pub date: NaiveDate,
    /// Daily maximum temperature in Celsius
    pub temp_max: f64,
    /// Daily minimum temperature in Celsius
    pub temp_min: f64,
    /// Total precipitation in mm
    pub precip_mm: f64,
    /// Maximum precipitation probability 0-100
    pub rain_probability: u8,
    /// Total snowfall in cm
    pub snowfall_cm: f64,
    /// Maximum snow depth in cm (converted from the provider's metres)
    pub snow_depth_cm: f64,
    /// Maximum wind speed in km/h
    pub wind_max: f64,
    /// Dominant wind direction as a 16-point compass label
    pub wind_direction: String,
}
