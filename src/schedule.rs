//! Install and remove the hourly cron job
//!
//! The crontab is read and written through the `crontab` binary itself, so
//! existing entries from other tools are preserved untouched.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};

use crate::config::SkywatchConfig;

/// Marker used to find our line in the crontab
const CRON_MARKER: &str = "skywatch";

/// Install a cron job running `skywatch run-once` at minute 0 of every hour,
/// with output appended to `cron.log` in the configured log directory.
pub fn install(config: &SkywatchConfig) -> Result<()> {
    let binary = std::env::current_exe().context("Could not resolve the skywatch binary path")?;

    std::fs::create_dir_all(&config.log.dir)
        .with_context(|| format!("Failed to create log directory {}", config.log.dir.display()))?;
    let log_dir = config
        .log
        .dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve log directory {}", config.log.dir.display()))?;
    let cron_log = log_dir.join("cron.log");

    let cron_line = format!(
        "0 * * * * {} run-once >> {} 2>&1",
        binary.display(),
        cron_log.display()
    );

    let existing = read_crontab()?;
    if existing.contains(CRON_MARKER) {
        println!("[schedule] Already installed. Run uninstall-schedule first.");
        return Ok(());
    }

    let mut updated = existing.trim_end_matches('\n').to_string();
    if !updated.is_empty() {
        updated.push('\n');
    }
    updated.push_str(&cron_line);
    updated.push('\n');

    write_crontab(&updated)?;
    println!("[schedule] Cron job installed. skywatch will run every hour.");
    println!("[schedule] To verify: crontab -l");
    Ok(())
}

/// Remove the skywatch cron job, leaving every other entry in place
pub fn uninstall() -> Result<()> {
    let output = Command::new("crontab")
        .arg("-l")
        .output()
        .context("Failed to run crontab")?;
    if !output.status.success() {
        // no crontab at all, nothing to remove
        println!("[schedule] No crontab found. Nothing to remove.");
        return Ok(());
    }

    let existing = String::from_utf8_lossy(&output.stdout).to_string();
    let filtered: Vec<&str> = existing
        .lines()
        .filter(|line| !line.contains(CRON_MARKER))
        .collect();

    if filtered.len() == existing.lines().count() {
        println!("[schedule] No skywatch cron job found. Nothing to remove.");
        return Ok(());
    }

    let mut updated = filtered.join("\n");
    if !updated.is_empty() {
        updated.push('\n');
    }
    write_crontab(&updated)?;
    println!("[schedule] Cron job removed.");
    Ok(())
}

fn read_crontab() -> Result<String> {
    let output = Command::new("crontab")
        .arg("-l")
        .output()
        .context("Failed to run crontab")?;
    // crontab -l exits non-zero when no crontab exists; treat that as empty
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        Ok(String::new())
    }
}

fn write_crontab(contents: &str) -> Result<()> {
    let mut child = Command::new("crontab")
        .arg("-")
        .stdin(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("Failed to run crontab")?;

    if let Some(stdin) = child.stdin.as_mut() {
        stdin
            .write_all(contents.as_bytes())
            .context("Failed to write crontab")?;
    }

    let output = child.wait_with_output().context("Failed to write crontab")?;
    if !output.status.success() {
        bail!(
            "Failed to write crontab: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}
