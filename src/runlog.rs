//! Append-only status and failure logs
//!
//! Three plain-text files live under the log directory:
//! - `last_run.txt` - one pipe-delimited `timestamp|status|detail` record per
//!   run; readers consume only the most recent line
//! - `skywatch.log` - one timestamped line per retry-exhaustion failure
//! - `alerts.log` - one timestamped line per delivered alert
//!
//! None of the files are rotated or capped. Concurrent appends from multiple
//! processes are not synchronized; this is a known race accepted for the
//! write frequency involved. A log write must never crash the primary
//! operation, so every I/O failure here is swallowed with a warning.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default log directory, relative to the working directory
pub const DEFAULT_LOG_DIR: &str = "logs";

/// File holding one status record per run
pub const LAST_RUN_FILE: &str = "last_run.txt";

/// File holding retry-exhaustion failures
pub const ERROR_LOG_FILE: &str = "skywatch.log";

/// File holding delivered alerts
pub const ALERT_LOG_FILE: &str = "alerts.log";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of a run, recorded in the status log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Ok,
    Error,
}

impl RunStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Ok => "OK",
            RunStatus::Error => "ERROR",
        }
    }
}

/// The most recent status record
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LastRun {
    pub timestamp: String,
    pub status: String,
    pub detail: String,
}

/// Append a status record to `last_run.txt`.
///
/// Format: `2026-02-23 20:00:01|OK|No alerts`
pub fn write_last_run(log_dir: &Path, status: RunStatus, detail: &str) {
    let timestamp = Local::now().format(TIMESTAMP_FORMAT);
    let line = format!("{timestamp}|{}|{detail}\n", status.as_str());
    append_line(&log_dir.join(LAST_RUN_FILE), &line);
}

/// Read the most recent run record from `last_run.txt`.
///
/// Returns `None` if the file is missing, empty, or its last line is not a
/// three-part pipe-delimited record.
#[must_use]
pub fn read_last_run(log_dir: &Path) -> Option<LastRun> {
    let contents = fs::read_to_string(log_dir.join(LAST_RUN_FILE)).ok()?;
    let last = contents.lines().filter(|l| !l.is_empty()).next_back()?;
    let mut parts = last.splitn(3, '|');
    let (timestamp, status, detail) = (parts.next()?, parts.next()?, parts.next()?);
    Some(LastRun {
        timestamp: timestamp.to_string(),
        status: status.to_string(),
        detail: detail.to_string(),
    })
}

/// Append a timestamped ERROR line to the failure log
pub fn log_error(log_dir: &Path, message: &str) {
    let timestamp = Local::now().format(TIMESTAMP_FORMAT);
    let line = format!("{timestamp} [ERROR] {message}\n");
    append_line(&log_dir.join(ERROR_LOG_FILE), &line);
}

/// Append a timestamped alert line to the alert log
pub fn log_alert(log_dir: &Path, message: &str) {
    let timestamp = Local::now().format(TIMESTAMP_FORMAT);
    let line = format!("[{timestamp}] {message}\n");
    append_line(&log_dir.join(ALERT_LOG_FILE), &line);
}

fn append_line(path: &Path, line: &str) {
    let result = (|| -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(line.as_bytes())
    })();

    if let Err(e) = result {
        warn!("failed to write log line to {}: {e}", path.display());
    }
}
