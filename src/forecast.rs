//! Fetch hourly and daily forecast grids from Open-Meteo
//!
//! Open-Meteo returns every variable as a parallel array indexed by position
//! against a `time` array. Both entry points normalize those grids into
//! ordered per-hour / per-day records with stable units.
//!
//! API docs: <https://open-meteo.com/en/docs>

use std::time::Duration;

use anyhow::Context;
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::Error;
use crate::models::{
    DailyForecastRecord, HourlyRecord, degrees_to_compass, snow_depth_to_cm,
};
use crate::retry::with_retry;
use crate::Result;

/// Open-Meteo forecast endpoint
pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Provider limit on daily-aggregated forecasts
pub const MAX_FORECAST_DAYS: u8 = 16;

/// Hourly requests always cover the full 7-day window the provider offers;
/// the slice the caller asked for is cut out of it afterwards
const HOURLY_FORECAST_DAYS: u8 = 7;

const TIMEOUT: Duration = Duration::from_secs(10);

/// Hour format used both by the provider's time array and for target lookup
const HOUR_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Fields requested from the hourly forecast
const HOURLY_VARIABLES: [&str; 9] = [
    "temperature_2m",
    "apparent_temperature",
    "precipitation_probability",
    "windspeed_10m",
    "winddirection_10m",
    "weathercode",
    "relativehumidity_2m",
    "snowfall",
    "snow_depth",
];

/// Fields requested from the daily forecast
const DAILY_VARIABLES: [&str; 8] = [
    "temperature_2m_max",
    "temperature_2m_min",
    "precipitation_sum",
    "precipitation_probability_max",
    "snowfall_sum",
    "snow_depth_max",
    "windspeed_10m_max",
    "winddirection_10m_dominant",
];

#[derive(Debug, Deserialize)]
struct HourlyResponse {
    hourly: Option<HourlyGrid>,
}

#[derive(Debug, Deserialize)]
struct HourlyGrid {
    time: Vec<String>,
    #[serde(rename = "temperature_2m", default)]
    temperature: Vec<Option<f64>>,
    #[serde(rename = "apparent_temperature", default)]
    feels_like: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<u8>>,
    #[serde(rename = "windspeed_10m", default)]
    wind_speed: Vec<Option<f64>>,
    #[serde(rename = "winddirection_10m", default)]
    wind_direction: Vec<Option<f64>>,
    #[serde(rename = "weathercode", default)]
    weather_code: Vec<Option<u8>>,
    #[serde(rename = "relativehumidity_2m", default)]
    humidity: Vec<Option<u8>>,
    #[serde(default)]
    snowfall: Vec<Option<f64>>,
    #[serde(default)]
    snow_depth: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct DailyResponse {
    daily: Option<DailyGrid>,
}

#[derive(Debug, Deserialize)]
struct DailyGrid {
    time: Vec<String>,
    #[serde(rename = "temperature_2m_max", default)]
    temp_max: Vec<Option<f64>>,
    #[serde(rename = "temperature_2m_min", default)]
    temp_min: Vec<Option<f64>>,
    #[serde(rename = "precipitation_sum", default)]
    precipitation: Vec<Option<f64>>,
    #[serde(rename = "precipitation_probability_max", default)]
    rain_probability: Vec<Option<u8>>,
    #[serde(rename = "snowfall_sum", default)]
    snowfall: Vec<Option<f64>>,
    #[serde(rename = "snow_depth_max", default)]
    snow_depth: Vec<Option<f64>>,
    #[serde(rename = "windspeed_10m_max", default)]
    wind_max: Vec<Option<f64>>,
    #[serde(rename = "winddirection_10m_dominant", default)]
    wind_direction: Vec<Option<f64>>,
}

/// Fetch `forecast_hours` hours of forecast starting at `target_time` (or
/// the current local hour when `None`), as ordered hourly records.
///
/// The provider grid starts at midnight, so the start index is located by
/// matching the target hour against the returned time array; fewer than
/// `forecast_hours` entries may come back near the end of the window.
///
/// # Errors
///
/// [`Error::TimeOutOfRange`] when the target hour is not in the returned
/// window, [`Error::MalformedResponse`] when the payload has no `hourly`
/// key, [`Error::RetryExhausted`] when the HTTP call fails on every attempt.
pub fn fetch_hourly(
    latitude: f64,
    longitude: f64,
    forecast_hours: usize,
    target_time: Option<NaiveDateTime>,
) -> Result<Vec<HourlyRecord>> {
    let target = match target_time {
        Some(t) => t.format("%Y-%m-%dT%H:00").to_string(),
        None => Local::now().format("%Y-%m-%dT%H:00").to_string(),
    };
    info!(
        "Fetching {forecast_hours}h forecast for ({latitude:.4}, {longitude:.4}) from {target}"
    );

    let url = format!(
        "{FORECAST_URL}?latitude={latitude}&longitude={longitude}&hourly={}&forecast_days={HOURLY_FORECAST_DAYS}&timezone=auto",
        HOURLY_VARIABLES.join(",")
    );
    debug!("forecast request URL: {url}");

    let response = with_retry("Open-Meteo forecast API", || fetch_json(&url))?;
    parse_hourly(response, forecast_hours, &target)
}

/// Fetch `forecast_days` days of daily-aggregated forecast starting today.
///
/// The provider returns exactly the requested count, so no windowing is
/// needed; requests above the provider limit are clamped to 16 days.
///
/// # Errors
///
/// [`Error::MalformedResponse`] when the payload has no `daily` key,
/// [`Error::RetryExhausted`] when the HTTP call fails on every attempt.
pub fn fetch_daily(
    latitude: f64,
    longitude: f64,
    forecast_days: u8,
) -> Result<Vec<DailyForecastRecord>> {
    let days = forecast_days.min(MAX_FORECAST_DAYS);
    if days < forecast_days {
        debug!("clamping forecast_days from {forecast_days} to provider limit {days}");
    }
    info!("Fetching {days}-day forecast for ({latitude:.4}, {longitude:.4})");

    let url = format!(
        "{FORECAST_URL}?latitude={latitude}&longitude={longitude}&daily={}&forecast_days={days}&timezone=auto",
        DAILY_VARIABLES.join(",")
    );
    debug!("daily forecast request URL: {url}");

    let response = with_retry("Open-Meteo daily forecast API", || fetch_json(&url))?;
    parse_daily(response)
}

fn fetch_json<T: serde::de::DeserializeOwned>(url: &str) -> anyhow::Result<T> {
    let client = reqwest::blocking::Client::builder()
        .timeout(TIMEOUT)
        .user_agent(concat!("skywatch/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")?;
    let parsed = client
        .get(url)
        .send()?
        .error_for_status()?
        .json()
        .context("Failed to parse Open-Meteo response")?;
    Ok(parsed)
}

/// Cut `forecast_hours` records out of the full grid, starting at the entry
/// whose time string equals `target` and clipped to the available length.
fn parse_hourly(
    response: HourlyResponse,
    forecast_hours: usize,
    target: &str,
) -> Result<Vec<HourlyRecord>> {
    let Some(grid) = response.hourly else {
        return Err(Error::malformed("hourly"));
    };

    let times = &grid.time;
    let start = times
        .iter()
        .position(|t| t == target)
        .ok_or_else(|| Error::TimeOutOfRange {
            target: target.to_string(),
            first: times.first().cloned().unwrap_or_default(),
            last: times.last().cloned().unwrap_or_default(),
        })?;

    let end = (start + forecast_hours).min(times.len());
    let mut records = Vec::with_capacity(end - start);
    for i in start..end {
        let time = NaiveDateTime::parse_from_str(&times[i], HOUR_FORMAT)
            .map_err(|_| Error::malformed("hourly.time"))?;
        records.push(HourlyRecord {
            time,
            // a null temperature must never trigger the cold rules
            temperature: value_at(&grid.temperature, i).unwrap_or(f64::INFINITY),
            feels_like: value_at(&grid.feels_like, i).unwrap_or(f64::INFINITY),
            // preserved as-is; rules apply their own zero default
            precipitation_probability: value_at(&grid.precipitation_probability, i),
            wind_speed: value_at(&grid.wind_speed, i).unwrap_or(0.0),
            wind_direction: degrees_to_compass(value_at(&grid.wind_direction, i).unwrap_or(0.0))
                .to_string(),
            weather_code: value_at(&grid.weather_code, i).unwrap_or(0),
            humidity: value_at(&grid.humidity, i).unwrap_or(0),
            snowfall: value_at(&grid.snowfall, i).unwrap_or(0.0),
            snow_depth: snow_depth_to_cm(value_at(&grid.snow_depth, i).unwrap_or(0.0)),
        });
    }

    Ok(records)
}

fn parse_daily(response: DailyResponse) -> Result<Vec<DailyForecastRecord>> {
    let Some(grid) = response.daily else {
        return Err(Error::malformed("daily"));
    };

    let mut records = Vec::with_capacity(grid.time.len());
    for (i, date_str) in grid.time.iter().enumerate() {
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|_| Error::malformed("daily.time"))?;
        records.push(DailyForecastRecord {
            date,
            temp_max: value_at(&grid.temp_max, i).unwrap_or(0.0),
            temp_min: value_at(&grid.temp_min, i).unwrap_or(0.0),
            precip_mm: value_at(&grid.precipitation, i).unwrap_or(0.0),
            rain_probability: value_at(&grid.rain_probability, i).unwrap_or(0),
            snowfall_cm: value_at(&grid.snowfall, i).unwrap_or(0.0),
            snow_depth_cm: snow_depth_to_cm(value_at(&grid.snow_depth, i).unwrap_or(0.0)),
            wind_max: value_at(&grid.wind_max, i).unwrap_or(0.0),
            wind_direction: degrees_to_compass(value_at(&grid.wind_direction, i).unwrap_or(0.0))
                .to_string(),
        });
    }

    Ok(records)
}

fn value_at<T: Copy>(values: &[Option<T>], index: usize) -> Option<T> {
    values.get(index).copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn make_hourly_grid(n: usize, base_time: &str) -> HourlyResponse {
        let base = NaiveDateTime::parse_from_str(base_time, HOUR_FORMAT).expect("valid base time");
        let times = (0..n)
            .map(|i| (base + ChronoDuration::hours(i as i64)).format(HOUR_FORMAT).to_string())
            .collect();

        HourlyResponse {
            hourly: Some(HourlyGrid {
                time: times,
                temperature: (0..n).map(|i| Some(10.0 + i as f64)).collect(),
                feels_like: (0..n).map(|i| Some(9.0 + i as f64)).collect(),
                precipitation_probability: vec![Some(0); n],
                wind_speed: vec![Some(5.0); n],
                wind_direction: vec![Some(0.0); n],
                weather_code: vec![Some(0); n],
                humidity: vec![Some(70); n],
                snowfall: vec![Some(0.0); n],
                snow_depth: vec![Some(0.0); n],
            }),
        }
    }

    fn make_daily_grid(n: usize) -> DailyResponse {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        let times = (0..n)
            .map(|i| (base + ChronoDuration::days(i as i64)).format("%Y-%m-%d").to_string())
            .collect();

        DailyResponse {
            daily: Some(DailyGrid {
                time: times,
                temp_max: vec![Some(15.0); n],
                temp_min: vec![Some(5.0); n],
                precipitation: vec![Some(0.0); n],
                rain_probability: vec![Some(20); n],
                snowfall: vec![Some(0.0); n],
                snow_depth: vec![Some(0.0); n],
                wind_max: vec![Some(10.0); n],
                wind_direction: vec![Some(90.0); n],
            }),
        }
    }

    #[test]
    fn test_parse_hourly_returns_requested_count() {
        let data = make_hourly_grid(10, "2024-01-01T00:00");
        let result = parse_hourly(data, 4, "2024-01-01T00:00").expect("parses");
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_parse_hourly_slices_from_target_hour() {
        let data = make_hourly_grid(10, "2024-01-01T00:00");
        let result = parse_hourly(data, 2, "2024-01-01T03:00").expect("parses");
        assert_eq!(result[0].temperature, 13.0);
        assert_eq!(result[1].temperature, 14.0);
    }

    #[test]
    fn test_parse_hourly_clips_to_available_length() {
        let data = make_hourly_grid(5, "2024-01-01T00:00");
        let result = parse_hourly(data, 10, "2024-01-01T03:00").expect("parses");
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_parse_hourly_unknown_target_is_out_of_range() {
        let data = make_hourly_grid(5, "2024-01-01T00:00");
        match parse_hourly(data, 1, "1990-01-01T00:00") {
            Err(Error::TimeOutOfRange { target, first, last }) => {
                assert_eq!(target, "1990-01-01T00:00");
                assert_eq!(first, "2024-01-01T00:00");
                assert_eq!(last, "2024-01-01T04:00");
            }
            other => panic!("expected TimeOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_hourly_missing_grid_is_malformed() {
        let response = HourlyResponse { hourly: None };
        assert!(matches!(
            parse_hourly(response, 1, "2024-01-01T00:00"),
            Err(Error::MalformedResponse { what: "hourly" })
        ));
    }

    #[test]
    fn test_parse_hourly_converts_snow_depth_to_cm() {
        let mut data = make_hourly_grid(2, "2024-01-01T00:00");
        data.hourly.as_mut().unwrap().snow_depth = vec![Some(0.25), Some(0.0)];
        let result = parse_hourly(data, 1, "2024-01-01T00:00").expect("parses");
        assert_eq!(result[0].snow_depth, 25.0);
    }

    #[test]
    fn test_parse_hourly_preserves_null_precipitation_probability() {
        let mut data = make_hourly_grid(2, "2024-01-01T00:00");
        data.hourly.as_mut().unwrap().precipitation_probability = vec![None, None];
        let result = parse_hourly(data, 1, "2024-01-01T00:00").expect("parses");
        assert_eq!(result[0].precipitation_probability, None);
    }

    #[test]
    fn test_parse_hourly_defaults_null_snowfall_to_zero() {
        let mut data = make_hourly_grid(2, "2024-01-01T00:00");
        data.hourly.as_mut().unwrap().snowfall = vec![None, None];
        let result = parse_hourly(data, 1, "2024-01-01T00:00").expect("parses");
        assert_eq!(result[0].snowfall, 0.0);
    }

    #[test]
    fn test_parse_hourly_converts_wind_direction() {
        let data = make_hourly_grid(2, "2024-01-01T00:00");
        let result = parse_hourly(data, 1, "2024-01-01T00:00").expect("parses");
        assert_eq!(result[0].wind_direction, "N");
    }

    #[test]
    fn test_hourly_response_deserializes_from_api_json() {
        let json = r#"{
            "latitude": 42.58, "longitude": 1.67, "timezone": "Europe/Andorra",
            "hourly": {
                "time": ["2024-01-01T00:00"],
                "temperature_2m": [1.5],
                "apparent_temperature": [-0.5],
                "precipitation_probability": [null],
                "windspeed_10m": [12.0],
                "winddirection_10m": [180.0],
                "weathercode": [3],
                "relativehumidity_2m": [80],
                "snowfall": [0.0],
                "snow_depth": [0.1]
            }
        }"#;
        let response: HourlyResponse = serde_json::from_str(json).expect("deserializes");
        let records = parse_hourly(response, 1, "2024-01-01T00:00").expect("parses");
        assert_eq!(records[0].temperature, 1.5);
        assert_eq!(records[0].feels_like, -0.5);
        assert_eq!(records[0].precipitation_probability, None);
        assert_eq!(records[0].wind_direction, "S");
        assert_eq!(records[0].snow_depth, 10.0);
    }

    #[test]
    fn test_parse_daily_returns_all_days() {
        let result = parse_daily(make_daily_grid(5)).expect("parses");
        assert_eq!(result.len(), 5);
        assert_eq!(
            result[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")
        );
        assert_eq!(
            result[4].date,
            NaiveDate::from_ymd_opt(2024, 1, 5).expect("valid date")
        );
    }

    #[test]
    fn test_parse_daily_converts_wind_direction() {
        let result = parse_daily(make_daily_grid(1)).expect("parses");
        assert_eq!(result[0].wind_direction, "E");
    }

    #[test]
    fn test_parse_daily_coerces_nulls_to_zero() {
        let mut data = make_daily_grid(1);
        let grid = data.daily.as_mut().unwrap();
        grid.precipitation = vec![None];
        grid.rain_probability = vec![None];
        grid.wind_max = vec![None];
        let result = parse_daily(data).expect("parses");
        assert_eq!(result[0].precip_mm, 0.0);
        assert_eq!(result[0].rain_probability, 0);
        assert_eq!(result[0].wind_max, 0.0);
    }

    #[test]
    fn test_parse_daily_missing_grid_is_malformed() {
        let response = DailyResponse { daily: None };
        assert!(matches!(
            parse_daily(response),
            Err(Error::MalformedResponse { what: "daily" })
        ));
    }
}
