//! Command-line interface definitions
//!
//! Commands:
//!   skywatch run-once            - fetch + evaluate + notify
//!   skywatch history             - multi-decade climate analysis
//!   skywatch dashboard           - serve the web dashboard
//!   skywatch test-notification   - send a fake alert
//!   skywatch install-schedule    - install hourly cron job
//!   skywatch uninstall-schedule  - remove cron job
//!   skywatch status              - print the most recent run record

use std::path::PathBuf;

use chrono::{Local, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};

use crate::error::Error;
use crate::Result;

#[derive(Debug, Parser)]
#[command(
    name = "skywatch",
    version,
    about = "Personal weather alerts, climate history, and dashboard powered by Open-Meteo"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the forecast, evaluate alert rules, and send notifications
    RunOnce {
        /// Look up coordinates by place name, e.g. "Tokyo" or "London, UK"
        #[arg(long, value_name = "PLACE")]
        location: Option<String>,

        /// Forecast for a specific time, e.g. "15:00" or "2026-02-25 09:00"
        #[arg(long, value_name = "TIME")]
        time: Option<String>,
    },

    /// Fetch the historical archive and print a climate analysis
    History {
        /// Look up coordinates by place name instead of the configured location
        #[arg(long, value_name = "PLACE")]
        location: Option<String>,

        /// Years of history to analyse
        #[arg(long, default_value_t = 50)]
        years: u32,
    },

    /// Serve the web dashboard
    Dashboard {
        /// Port to listen on
        #[arg(long, default_value_t = 8787)]
        port: u16,
    },

    /// Send a test desktop notification
    TestNotification,

    /// Install a cron job that runs `skywatch run-once` every hour
    InstallSchedule,

    /// Remove the skywatch cron job
    UninstallSchedule,

    /// Print the most recent run record from the status log
    Status,
}

/// Parse a `--time` argument.
///
/// Accepts `HH:MM` (today's date assumed) or `YYYY-MM-DD HH:MM`. Minutes are
/// carried through; the forecast lookup truncates to the hour.
pub fn parse_target_time(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();

    if raw.len() == 5 && raw.contains(':') {
        let time = NaiveTime::parse_from_str(raw, "%H:%M")
            .map_err(|_| unrecognised_time(raw))?;
        return Ok(Local::now().date_naive().and_time(time));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M").map_err(|_| unrecognised_time(raw))
}

fn unrecognised_time(raw: &str) -> Error {
    Error::invalid_argument(format!(
        "Unrecognised --time format: '{raw}'. Use 'HH:MM' or 'YYYY-MM-DD HH:MM'."
    ))
}
