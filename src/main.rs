use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use skywatch::cli::{Cli, Command, parse_target_time};
use skywatch::config::SkywatchConfig;
use skywatch::error::Error;
use skywatch::models::ResolvedLocation;
use skywatch::runlog::{self, RunStatus};
use skywatch::{analysis, forecast, geocode, history, notify, report, rules, schedule, web};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        match e.downcast_ref::<Error>() {
            Some(err) => eprintln!("[error] {}", err.user_message()),
            None => eprintln!("[error] {e:#}"),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = SkywatchConfig::load_from_path(cli.config)?;

    match cli.command {
        Command::RunOnce { location, time } => {
            let log_dir = config.log.dir.clone();
            match cmd_run_once(&config, location.as_deref(), time.as_deref()) {
                Ok(detail) => {
                    runlog::write_last_run(&log_dir, RunStatus::Ok, &detail);
                    Ok(())
                }
                Err(e) => {
                    runlog::write_last_run(&log_dir, RunStatus::Error, &format!("{e}"));
                    Err(e)
                }
            }
        }
        Command::History { location, years } => cmd_history(&config, location.as_deref(), years),
        Command::Dashboard { port } => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Failed to start async runtime")?
            .block_on(web::serve(port, config)),
        Command::TestNotification => {
            notify::send_test_notification(&config);
            Ok(())
        }
        Command::InstallSchedule => schedule::install(&config),
        Command::UninstallSchedule => schedule::uninstall(),
        Command::Status => {
            cmd_status(&config);
            Ok(())
        }
    }
}

/// `--location` overrides the configured location via geocoding
fn resolve_location(config: &SkywatchConfig, place: Option<&str>) -> Result<ResolvedLocation> {
    match place {
        Some(place) => Ok(geocode::geocode(place)?),
        None => Ok(ResolvedLocation::new(
            config.location.latitude,
            config.location.longitude,
            config.location.name.clone(),
        )),
    }
}

/// Fetch weather, print the report, evaluate rules, send notifications.
/// Returns the detail line recorded in the status log.
fn cmd_run_once(
    config: &SkywatchConfig,
    location: Option<&str>,
    time: Option<&str>,
) -> Result<String> {
    let resolved = resolve_location(config, location)?;
    let (target, time_label) = match time {
        Some(raw) => (Some(parse_target_time(raw)?), "forecast"),
        None => (None, "now"),
    };

    println!("Fetching forecast for {}...", resolved.display_name);

    let lookahead = config.alerts.lookahead_hours;
    let hourly = forecast::fetch_hourly(
        resolved.latitude,
        resolved.longitude,
        lookahead + 1,
        target,
    )?;
    let Some(current) = hourly.first() else {
        bail!("No forecast data returned.");
    };

    if let Some(report) =
        report::forecast_report(&resolved.display_name, &hourly, lookahead, time_label)
    {
        println!("\n{report}");
    }

    let alerts = rules::evaluate_rules(&hourly, &config.alerts);
    if alerts.is_empty() {
        println!("\u{2705} No alerts triggered.");
    } else {
        println!();
        for alert in &alerts {
            println!("\u{26a0}\u{fe0f}  ALERT: {alert}");
        }
    }

    let location_line = format!(
        "{} \u{2014} {}",
        resolved.display_name,
        current.time.format("%a %d %b, %H:%M")
    );
    notify::send_weather_notification(&location_line, current, &hourly, lookahead, &alerts, config);

    Ok(if alerts.is_empty() {
        "No alerts".to_string()
    } else {
        format!("{} alert(s)", alerts.len())
    })
}

/// Fetch the archive and print the climate analysis
fn cmd_history(config: &SkywatchConfig, location: Option<&str>, years: u32) -> Result<()> {
    let resolved = resolve_location(config, location)?;

    println!(
        "Fetching {years} years of history for {}...",
        resolved.display_name
    );

    let mut records = history::fetch_historical(resolved.latitude, resolved.longitude, years)?;
    records.sort_by_key(|r| r.date);

    let yearly = analysis::yearly_summary(&records);
    let trend = analysis::temperature_trend(&yearly);
    let extremes = analysis::find_extremes(&yearly);

    println!();
    println!(
        "{}",
        analysis::terminal_summary(&resolved.display_name, &yearly, extremes.as_ref(), &trend)
    );
    Ok(())
}

fn cmd_status(config: &SkywatchConfig) {
    match runlog::read_last_run(&config.log.dir) {
        Some(last) => println!("{} [{}] {}", last.timestamp, last.status, last.detail),
        None => println!("No runs recorded yet."),
    }
}
