//! Fetch historical daily weather from the Open-Meteo Archive API
//!
//! API docs: <https://open-meteo.com/en/docs/historical-weather-api>

use std::time::Duration;

use anyhow::Context;
use chrono::{Datelike, Duration as ChronoDuration, Local, NaiveDate};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::Error;
use crate::models::DailyHistoricalRecord;
use crate::retry::with_retry;
use crate::Result;

/// Open-Meteo historical archive endpoint
pub const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Multi-decade payloads are large; the archive gets a longer timeout than
/// the forecast endpoints
const TIMEOUT: Duration = Duration::from_secs(60);

/// Fields requested from the daily archive
const DAILY_VARIABLES: [&str; 7] = [
    "temperature_2m_max",
    "temperature_2m_min",
    "temperature_2m_mean",
    "precipitation_sum",
    "snowfall_sum",
    "snow_depth_max",
    "windspeed_10m_max",
];

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: Option<ArchiveGrid>,
}

#[derive(Debug, Deserialize)]
struct ArchiveGrid {
    time: Vec<String>,
    #[serde(rename = "temperature_2m_max", default)]
    temp_max: Vec<Option<f64>>,
    #[serde(rename = "temperature_2m_min", default)]
    temp_min: Vec<Option<f64>>,
    #[serde(rename = "temperature_2m_mean", default)]
    temp_mean: Vec<Option<f64>>,
    #[serde(rename = "precipitation_sum", default)]
    precipitation: Vec<Option<f64>>,
    #[serde(rename = "snowfall_sum", default)]
    snowfall: Vec<Option<f64>>,
    #[serde(rename = "snow_depth_max", default)]
    snow_depth: Vec<Option<f64>>,
    #[serde(rename = "windspeed_10m_max", default)]
    wind_max: Vec<Option<f64>>,
}

/// Return (start, end) for the past `years` calendar years ending yesterday.
///
/// The end date is always yesterday; archives are not same-day complete. The
/// start date is the same month/day exactly `years` earlier, with a Feb 29
/// start clamped to Feb 28 when the target year is not a leap year.
#[must_use]
pub fn date_range_for_years(years: u32) -> (NaiveDate, NaiveDate) {
    let end = Local::now().date_naive() - ChronoDuration::days(1);
    let target_year = end.year() - years as i32;
    let start = end
        .with_year(target_year)
        .or_else(|| NaiveDate::from_ymd_opt(target_year, 2, 28))
        .unwrap_or(end);
    (start, end)
}

/// Fetch `years` of daily archive data for a coordinate pair in one call.
///
/// Ranges up to ~75 years arrive in a single response; there is no
/// pagination. Records come back in provider order; downstream consumers
/// sort by date. An empty range yields an empty Vec, not an error.
///
/// # Errors
///
/// [`Error::MalformedResponse`] when the payload has no `daily` key,
/// [`Error::RetryExhausted`] when the HTTP call fails on every attempt.
pub fn fetch_historical(
    latitude: f64,
    longitude: f64,
    years: u32,
) -> Result<Vec<DailyHistoricalRecord>> {
    let (start, end) = date_range_for_years(years);
    info!(
        "Fetching {years}y archive for ({latitude:.4}, {longitude:.4}): {start} to {end}"
    );

    let url = format!(
        "{ARCHIVE_URL}?latitude={latitude}&longitude={longitude}&start_date={start}&end_date={end}&daily={}&timezone=auto",
        DAILY_VARIABLES.join(",")
    );
    debug!("archive request URL: {url}");

    let response = with_retry("Open-Meteo historical archive API", || {
        let client = reqwest::blocking::Client::builder()
            .timeout(TIMEOUT)
            .user_agent(concat!("skywatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        let parsed: ArchiveResponse = client
            .get(&url)
            .send()?
            .error_for_status()?
            .json()
            .context("Failed to parse Open-Meteo archive response")?;
        Ok(parsed)
    })?;

    parse_archive(response)
}

/// Archive data is assumed complete; a null here defensively means
/// "absent/0", so every numeric field coerces to 0.0
fn parse_archive(response: ArchiveResponse) -> Result<Vec<DailyHistoricalRecord>> {
    let Some(grid) = response.daily else {
        return Err(Error::malformed("daily"));
    };

    let mut records = Vec::with_capacity(grid.time.len());
    for (i, date_str) in grid.time.iter().enumerate() {
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|_| Error::malformed("daily.time"))?;
        records.push(DailyHistoricalRecord {
            date,
            temp_max: value_at(&grid.temp_max, i),
            temp_min: value_at(&grid.temp_min, i),
            temp_mean: value_at(&grid.temp_mean, i),
            precipitation: value_at(&grid.precipitation, i),
            snowfall: value_at(&grid.snowfall, i),
            snow_depth_max: value_at(&grid.snow_depth, i),
            wind_max: value_at(&grid.wind_max, i),
        });
    }

    Ok(records)
}

fn value_at(values: &[Option<f64>], index: usize) -> f64 {
    values.get(index).copied().flatten().unwrap_or(0.0)
}
