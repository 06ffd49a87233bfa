//! Terminal report formatting for the forecast path

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::HourlyRecord;

/// Format a date as a short human-readable label like `Mon 24 Feb`
#[must_use]
pub fn fmt_day(date: NaiveDate) -> String {
    date.format("%a %d %b").to_string()
}

/// Format a forecast hour as a short label like `15:00`
#[must_use]
pub fn fmt_hour(time: NaiveDateTime) -> String {
    time.format("%H:%M").to_string()
}

/// Highest precipitation probability across the window, nulls counting as 0
#[must_use]
pub fn max_rain_probability(forecast: &[HourlyRecord]) -> u8 {
    forecast
        .iter()
        .map(|h| h.precipitation_probability.unwrap_or(0))
        .max()
        .unwrap_or(0)
}

/// Render the current-conditions report printed by `run-once`.
///
/// `time_label` distinguishes a report for "now" from one for a requested
/// forecast hour. Returns `None` for an empty forecast.
#[must_use]
pub fn forecast_report(
    display_name: &str,
    forecast: &[HourlyRecord],
    lookahead_hours: usize,
    time_label: &str,
) -> Option<String> {
    let current = forecast.first()?;
    let time_str = current.time.format("%a %d %b, %H:%M");
    let max_rain = max_rain_probability(forecast);

    let lines = [
        format!("\u{1f4cd} {display_name} \u{2014} {time_str} ({time_label})"),
        format!(
            "\u{1f321}  Temperature:    {}\u{b0}C  (feels like {}\u{b0}C)",
            current.temperature, current.feels_like
        ),
        format!("\u{1f4a7} Humidity:        {}%", current.humidity),
        format!("\u{1f327}  Rain chance:    {max_rain}%  (next {lookahead_hours} hours)"),
        format!(
            "\u{1f4a8} Wind:            {} km/h {}",
            current.wind_speed, current.wind_direction
        ),
    ];
    Some(lines.join("\n"))
}
