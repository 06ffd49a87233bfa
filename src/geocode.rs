//! Look up coordinates for a place name via the Open-Meteo Geocoding API
//!
//! Free, no API key required.
//! API docs: <https://open-meteo.com/en/docs/geocoding-api>

use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::Error;
use crate::models::ResolvedLocation;
use crate::retry::with_retry;
use crate::Result;

/// Open-Meteo geocoding endpoint
pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

const TIMEOUT: Duration = Duration::from_secs(10);

/// Geocoding response from Open-Meteo; `results` is absent when nothing
/// matched
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    admin1: Option<String>,
    country: Option<String>,
}

/// Resolve a free-text place name to coordinates and a canonical display
/// name. The request is capped at one result; when the upstream returns
/// several matches the first wins.
///
/// # Errors
///
/// [`Error::LocationNotFound`] when the upstream returns no results;
/// [`Error::RetryExhausted`] when the HTTP call fails on every attempt.
pub fn geocode(place: &str) -> Result<ResolvedLocation> {
    info!("Geocoding location: '{place}'");
    let url = format!(
        "{GEOCODING_URL}?name={}&count=1&language=en&format=json",
        urlencoding::encode(place)
    );
    debug!("geocoding request URL: {url}");

    let response = with_retry("Open-Meteo geocoding API", || {
        let client = reqwest::blocking::Client::builder()
            .timeout(TIMEOUT)
            .user_agent(concat!("skywatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        let parsed: GeocodingResponse = client
            .get(&url)
            .send()?
            .error_for_status()?
            .json()
            .context("Failed to parse Open-Meteo geocoding response")?;
        Ok(parsed)
    })?;

    resolve(response, place)
}

fn resolve(response: GeocodingResponse, place: &str) -> Result<ResolvedLocation> {
    let Some(first) = response.results.unwrap_or_default().into_iter().next() else {
        return Err(Error::LocationNotFound {
            place: place.to_string(),
        });
    };

    let display_name = display_name(&first);
    info!(
        "Resolved '{place}' to {display_name} ({:.4}, {:.4})",
        first.latitude, first.longitude
    );
    Ok(ResolvedLocation::new(
        first.latitude,
        first.longitude,
        display_name,
    ))
}

/// Join the non-empty parts of {name, admin1, country} with ", ". Absent
/// parts are skipped entirely; a missing region must never surface as a
/// literal "None" in the display name.
fn display_name(result: &GeocodingResult) -> String {
    let mut parts = vec![result.name.as_str()];
    for part in [&result.admin1, &result.country] {
        if let Some(value) = part
            && !value.is_empty()
        {
            parts.push(value.as_str());
        }
    }
    parts.join(", ")
}
