//! Evaluate alert conditions against a fetched forecast
//!
//! Each check receives a forecast window and a threshold and returns a
//! human-readable alert string when the condition triggers, or `None` when
//! everything looks fine. All checks are pure and do no I/O.
//!
//! Boundary semantics are part of the contract: rain and wind trigger at
//! exactly the threshold (>=), the two cold checks trigger only strictly
//! below their minimum (<).

use crate::config::AlertsConfig;
use crate::models::{DailyForecastRecord, HourlyRecord};

const HOUR_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// How many leading hours the two cold checks examine
const COLD_WINDOW_HOURS: usize = 3;

/// Trigger when precipitation probability reaches `threshold` within the
/// next `lookahead_hours` hours. A null probability never triggers.
#[must_use]
pub fn check_rain(
    forecast: &[HourlyRecord],
    threshold: u8,
    lookahead_hours: usize,
) -> Option<String> {
    let window = &forecast[..lookahead_hours.min(forecast.len())];
    for hour in window {
        let prob = hour.precipitation_probability.unwrap_or(0);
        if prob >= threshold {
            return Some(format!(
                "Rain likely: {prob}% chance at {} (threshold: {threshold}%)",
                hour.time.format(HOUR_FORMAT)
            ));
        }
    }
    None
}

/// Trigger when the wind speed in the next hour reaches `threshold` km/h.
/// Only one hour ahead is examined because wind changes quickly.
#[must_use]
pub fn check_wind(forecast: &[HourlyRecord], threshold: f64) -> Option<String> {
    let next_hour = forecast.first()?;
    if next_hour.wind_speed >= threshold {
        return Some(format!(
            "High wind: {} km/h at {} (threshold: {threshold} km/h)",
            next_hour.wind_speed,
            next_hour.time.format(HOUR_FORMAT)
        ));
    }
    None
}

/// Trigger when the temperature drops below `min_temp` in the next 3 hours
#[must_use]
pub fn check_temperature(forecast: &[HourlyRecord], min_temp: f64) -> Option<String> {
    let window = &forecast[..COLD_WINDOW_HOURS.min(forecast.len())];
    for hour in window {
        if hour.temperature < min_temp {
            return Some(format!(
                "Cold temperature: {}\u{b0}C at {} (min: {min_temp}\u{b0}C)",
                hour.temperature,
                hour.time.format(HOUR_FORMAT)
            ));
        }
    }
    None
}

/// Trigger when the apparent temperature drops below `min_feels_like` in the
/// next 3 hours. Feels-like (wind chill / heat index) can diverge
/// significantly from the actual temperature.
#[must_use]
pub fn check_feels_like(forecast: &[HourlyRecord], min_feels_like: f64) -> Option<String> {
    let window = &forecast[..COLD_WINDOW_HOURS.min(forecast.len())];
    for hour in window {
        if hour.feels_like < min_feels_like {
            return Some(format!(
                "Feels very cold: {}\u{b0}C at {} (min feels-like: {min_feels_like}\u{b0}C)",
                hour.feels_like,
                hour.time.format(HOUR_FORMAT)
            ));
        }
    }
    None
}

/// Run all checks against the forecast using the configured thresholds.
///
/// The check order (rain, wind, temperature, feels-like) is fixed so that
/// output is deterministic. Returns only the triggered messages.
#[must_use]
pub fn evaluate_rules(forecast: &[HourlyRecord], alerts: &AlertsConfig) -> Vec<String> {
    let checks = [
        check_rain(
            forecast,
            alerts.rain_probability_threshold,
            alerts.lookahead_hours,
        ),
        check_wind(forecast, alerts.wind_speed_threshold),
        check_temperature(forecast, alerts.temperature_min),
        check_feels_like(forecast, alerts.feels_like_min),
    ];

    checks.into_iter().flatten().collect()
}

/// Apply the rain/wind/min-temperature semantics to one forecast day.
///
/// Each day is evaluated independently; there is no cross-day lookahead.
#[must_use]
pub fn evaluate_daily_rules(day: &DailyForecastRecord, alerts: &AlertsConfig) -> Vec<String> {
    let mut triggered = Vec::new();

    if day.rain_probability >= alerts.rain_probability_threshold {
        triggered.push(format!(
            "Rain likely on {}: {}% chance (threshold: {}%)",
            day.date, day.rain_probability, alerts.rain_probability_threshold
        ));
    }
    if day.wind_max >= alerts.wind_speed_threshold {
        triggered.push(format!(
            "Wind up to {} km/h on {} (threshold: {} km/h)",
            day.wind_max, day.date, alerts.wind_speed_threshold
        ));
    }
    if day.temp_min < alerts.temperature_min {
        triggered.push(format!(
            "Min temperature {}\u{b0}C on {} (min: {}\u{b0}C)",
            day.temp_min, day.date, alerts.temperature_min
        ));
    }

    triggered
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn hour_at(time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(time, HOUR_FORMAT).expect("valid time")
    }

    fn make_hour(
        time: &str,
        temperature: f64,
        feels_like: f64,
        precipitation_probability: Option<u8>,
        wind_speed: f64,
    ) -> HourlyRecord {
        HourlyRecord {
            time: hour_at(time),
            temperature,
            feels_like,
            precipitation_probability,
            wind_speed,
            wind_direction: "N".to_string(),
            weather_code: 0,
            humidity: 70,
            snowfall: 0.0,
            snow_depth: 0.0,
        }
    }

    fn calm_hour(time: &str) -> HourlyRecord {
        make_hour(time, 15.0, 14.0, Some(0), 10.0)
    }

    fn make_day(rain_probability: u8, wind_max: f64, temp_min: f64) -> DailyForecastRecord {
        DailyForecastRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
            temp_max: 20.0,
            temp_min,
            precip_mm: 0.0,
            rain_probability,
            snowfall_cm: 0.0,
            snow_depth_cm: 0.0,
            wind_max,
            wind_direction: "N".to_string(),
        }
    }

    fn alerts_config() -> AlertsConfig {
        AlertsConfig {
            rain_probability_threshold: 50,
            wind_speed_threshold: 30.0,
            temperature_min: 5.0,
            feels_like_min: 2.0,
            lookahead_hours: 3,
        }
    }

    #[test]
    fn test_rain_triggers_when_above_threshold() {
        let forecast = vec![make_hour("2024-01-01T12:00", 15.0, 14.0, Some(80), 10.0)];
        let alert = check_rain(&forecast, 50, 3).expect("should trigger");
        assert!(alert.contains("80%"));
        assert!(alert.contains("2024-01-01T12:00"));
    }

    #[test]
    fn test_rain_does_not_trigger_when_below_threshold() {
        let forecast = vec![make_hour("2024-01-01T12:00", 15.0, 14.0, Some(30), 10.0)];
        assert_eq!(check_rain(&forecast, 50, 3), None);
    }

    #[test]
    fn test_rain_triggers_at_exact_threshold() {
        let forecast = vec![make_hour("2024-01-01T12:00", 15.0, 14.0, Some(50), 10.0)];
        assert!(check_rain(&forecast, 50, 3).is_some());
    }

    #[test]
    fn test_rain_respects_lookahead_hours() {
        // rain only in hour 4, lookahead of 3 must not see it
        let forecast = vec![
            calm_hour("2024-01-01T12:00"),
            calm_hour("2024-01-01T13:00"),
            calm_hour("2024-01-01T14:00"),
            make_hour("2024-01-01T15:00", 15.0, 14.0, Some(90), 10.0),
        ];
        assert_eq!(check_rain(&forecast, 50, 3), None);
        assert!(check_rain(&forecast, 50, 4).is_some());
    }

    #[test]
    fn test_rain_null_probability_does_not_trigger() {
        let forecast = vec![make_hour("2024-01-01T12:00", 15.0, 14.0, None, 10.0)];
        assert_eq!(check_rain(&forecast, 50, 3), None);
    }

    #[test]
    fn test_null_probability_triggers_at_zero_threshold() {
        // the null coerces to 0, and 0 >= 0
        let forecast = vec![make_hour("2024-01-01T12:00", 15.0, 14.0, None, 10.0)];
        assert!(check_rain(&forecast, 0, 3).is_some());
    }

    #[test]
    fn test_wind_triggers_when_above_threshold() {
        let forecast = vec![make_hour("2024-01-01T12:00", 15.0, 14.0, Some(0), 45.0)];
        let alert = check_wind(&forecast, 30.0).expect("should trigger");
        assert!(alert.contains("45 km/h"));
    }

    #[test]
    fn test_wind_does_not_trigger_when_below_threshold() {
        let forecast = vec![make_hour("2024-01-01T12:00", 15.0, 14.0, Some(0), 20.0)];
        assert_eq!(check_wind(&forecast, 30.0), None);
    }

    #[test]
    fn test_wind_triggers_at_exact_threshold() {
        let forecast = vec![make_hour("2024-01-01T12:00", 15.0, 14.0, Some(0), 30.0)];
        assert!(check_wind(&forecast, 30.0).is_some());
    }

    #[test]
    fn test_wind_only_checks_next_hour() {
        let forecast = vec![
            calm_hour("2024-01-01T12:00"),
            make_hour("2024-01-01T13:00", 15.0, 14.0, Some(0), 60.0),
        ];
        assert_eq!(check_wind(&forecast, 30.0), None);
    }

    #[test]
    fn test_wind_empty_forecast_returns_none() {
        assert_eq!(check_wind(&[], 30.0), None);
    }

    #[test]
    fn test_temperature_triggers_when_below_min() {
        let forecast = vec![make_hour("2024-01-01T12:00", -3.0, -5.0, Some(0), 10.0)];
        let alert = check_temperature(&forecast, 5.0).expect("should trigger");
        assert!(alert.contains("-3"));
    }

    #[test]
    fn test_temperature_does_not_trigger_when_above_min() {
        let forecast = vec![make_hour("2024-01-01T12:00", 10.0, 9.0, Some(0), 10.0)];
        assert_eq!(check_temperature(&forecast, 5.0), None);
    }

    #[test]
    fn test_temperature_does_not_trigger_at_exact_min() {
        let forecast = vec![make_hour("2024-01-01T12:00", 5.0, 5.0, Some(0), 10.0)];
        assert_eq!(check_temperature(&forecast, 5.0), None);
    }

    #[test]
    fn test_temperature_checks_only_first_three_hours() {
        let forecast = vec![
            calm_hour("2024-01-01T12:00"),
            calm_hour("2024-01-01T13:00"),
            calm_hour("2024-01-01T14:00"),
            make_hour("2024-01-01T15:00", -10.0, -12.0, Some(0), 10.0),
        ];
        assert_eq!(check_temperature(&forecast, 5.0), None);
    }

    #[test]
    fn test_feels_like_triggers_when_below_min() {
        let forecast = vec![make_hour("2024-01-01T12:00", 5.0, -1.0, Some(0), 10.0)];
        let alert = check_feels_like(&forecast, 2.0).expect("should trigger");
        assert!(alert.contains("-1"));
    }

    #[test]
    fn test_feels_like_does_not_trigger_at_exact_min() {
        let forecast = vec![make_hour("2024-01-01T12:00", 5.0, 2.0, Some(0), 10.0)];
        assert_eq!(check_feels_like(&forecast, 2.0), None);
    }

    #[test]
    fn test_evaluate_rules_returns_all_triggered_in_order() {
        let forecast = vec![make_hour("2024-01-01T12:00", -5.0, -10.0, Some(90), 50.0)];
        let alerts = evaluate_rules(&forecast, &alerts_config());
        assert_eq!(alerts.len(), 4);
        assert!(alerts[0].starts_with("Rain likely"));
        assert!(alerts[1].starts_with("High wind"));
        assert!(alerts[2].starts_with("Cold temperature"));
        assert!(alerts[3].starts_with("Feels very cold"));
    }

    #[test]
    fn test_evaluate_rules_returns_empty_when_no_trigger() {
        let forecast = vec![calm_hour("2024-01-01T12:00")];
        assert!(evaluate_rules(&forecast, &alerts_config()).is_empty());
    }

    #[test]
    fn test_daily_rules_no_alerts() {
        let day = make_day(20, 10.0, 15.0);
        assert!(evaluate_daily_rules(&day, &alerts_config()).is_empty());
    }

    #[test]
    fn test_daily_rules_rain_triggers() {
        let day = make_day(60, 10.0, 15.0);
        let alerts = evaluate_daily_rules(&day, &alerts_config());
        assert!(alerts.iter().any(|a| a.contains("Rain")));
    }

    #[test]
    fn test_daily_rules_wind_triggers() {
        let day = make_day(0, 50.0, 15.0);
        let alerts = evaluate_daily_rules(&day, &alerts_config());
        assert!(alerts.iter().any(|a| a.contains("Wind")));
    }

    #[test]
    fn test_daily_rules_temp_min_triggers() {
        let day = make_day(0, 10.0, -3.0);
        let alerts = evaluate_daily_rules(&day, &alerts_config());
        assert!(alerts.iter().any(|a| a.contains("Min temperature")));
    }

    #[test]
    fn test_daily_rules_all_trigger() {
        let day = make_day(80, 60.0, -10.0);
        assert_eq!(evaluate_daily_rules(&day, &alerts_config()).len(), 3);
    }

    #[test]
    fn test_daily_rules_boundaries() {
        // rain and wind are inclusive, temp_min is exclusive
        let day = make_day(50, 30.0, 5.0);
        let alerts = evaluate_daily_rules(&day, &alerts_config());
        assert_eq!(alerts.len(), 2);
        assert!(!alerts.iter().any(|a| a.contains("Min temperature")));
    }
}
