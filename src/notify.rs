//! Deliver alerts via desktop notifications and/or the alert log
//!
//! Desktop delivery uses macOS `osascript` (AppleScript via subprocess);
//! nothing third-party is involved. Delivery failures print warnings and
//! never crash the run that produced the alerts.

use std::process::Command;

use tracing::warn;

use crate::config::SkywatchConfig;
use crate::models::HourlyRecord;
use crate::report::max_rain_probability;
use crate::runlog;

const NOTIFICATION_TITLE: &str = "Weather Alert";

/// Send every triggered alert through the channels enabled in
/// `[notifications]`
pub fn send_notifications(alerts: &[String], config: &SkywatchConfig) {
    for alert in alerts {
        if config.notifications.desktop {
            send_desktop_notification(alert, NOTIFICATION_TITLE);
        }
        if config.notifications.log {
            runlog::log_alert(&config.log.dir, alert);
        }
    }
}

/// Send a fake alert to verify that desktop notifications are working
pub fn send_test_notification(config: &SkywatchConfig) {
    let test_message = "Test alert: notifications are working correctly.";
    send_desktop_notification(test_message, NOTIFICATION_TITLE);
    if config.notifications.log {
        runlog::log_alert(&config.log.dir, test_message);
    }
    println!("Test notification sent: {test_message}");
}

/// Send the full weather summary for a run as one desktop notification,
/// alongside the per-alert fan-out of [`send_notifications`]
pub fn send_weather_notification(
    location_line: &str,
    current: &HourlyRecord,
    forecast: &[HourlyRecord],
    lookahead_hours: usize,
    alerts: &[String],
    config: &SkywatchConfig,
) {
    let max_rain = max_rain_probability(forecast);
    let mut message = format!(
        "{}\u{b0}C (feels like {}\u{b0}C) \u{b7} Rain {max_rain}% next {lookahead_hours}h \u{b7} Wind {} km/h {}",
        current.temperature, current.feels_like, current.wind_speed, current.wind_direction
    );
    if alerts.is_empty() {
        message.push_str(" \u{b7} No alerts");
    } else {
        message.push_str(&format!(" \u{b7} {} alert(s)", alerts.len()));
    }

    if config.notifications.desktop {
        send_desktop_notification(&message, location_line);
    }
    send_notifications(alerts, config);
}

/// Display a macOS native notification via osascript.
///
/// The AppleScript command is `display notification "..." with title "..."`;
/// quotes in the message are escaped so the text cannot break out of the
/// script string.
fn send_desktop_notification(message: &str, title: &str) {
    let script = format!(
        "display notification \"{}\" with title \"{}\"",
        applescript_escape(message),
        applescript_escape(title)
    );

    match Command::new("osascript").args(["-e", &script]).output() {
        Ok(output) if !output.status.success() => {
            warn!(
                "desktop notification failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("osascript not found; desktop notifications need macOS");
        }
        Err(e) => {
            warn!("failed to run osascript: {e}");
        }
    }
}

fn applescript_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applescript_escape_quotes() {
        assert_eq!(
            applescript_escape("say \"hello\""),
            "say \\\"hello\\\""
        );
    }

    #[test]
    fn test_applescript_escape_backslashes_before_quotes() {
        assert_eq!(applescript_escape("a\\\"b"), "a\\\\\\\"b");
    }

    #[test]
    fn test_applescript_escape_plain_text_unchanged() {
        assert_eq!(applescript_escape("Rain likely: 80%"), "Rain likely: 80%");
    }
}
