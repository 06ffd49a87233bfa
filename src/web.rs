//! Web dashboard: JSON API plus a minimal embedded page
//!
//! Each render is a pure function of the query parameters; there is no
//! session state on the server. The fetch pipeline underneath is blocking,
//! so handlers run it on the blocking thread pool.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::SkywatchConfig;
use crate::error::Error;
use crate::models::{
    DailyForecastRecord, ExtremesSummary, MonthlyClimatology, ResolvedLocation, TrendResult,
    YearlySummary, weather_code_label,
};
use crate::report::max_rain_probability;
use crate::runlog::LastRun;
use crate::{analysis, forecast, geocode, history, rules, runlog};

const DEFAULT_FORECAST_DAYS: u8 = 7;
const DEFAULT_HISTORY_YEARS: u32 = 50;

/// Serve the dashboard until the process is stopped
pub async fn serve(port: u16, config: SkywatchConfig) -> anyhow::Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(Arc::new(config)).layer(cors);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Dashboard running at http://localhost:{port}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(config: Arc<SkywatchConfig>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/forecast", get(forecast_handler))
        .route("/api/history", get(history_handler))
        .route("/api/status", get(status_handler))
        .with_state(config)
}

#[derive(Debug, Deserialize)]
struct ForecastQuery {
    /// Place name to geocode; the configured location when absent
    place: Option<String>,
    /// Days of daily forecast to include, up to the provider limit
    days: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    place: Option<String>,
    years: Option<u32>,
}

/// Current-hour conditions shown in the dashboard hero section
#[derive(Debug, Serialize)]
struct CurrentConditions {
    time: String,
    temperature: f64,
    feels_like: f64,
    humidity: u8,
    wind_speed: f64,
    wind_direction: String,
    precipitation_probability: Option<u8>,
    snow_depth_cm: f64,
    condition: String,
}

#[derive(Debug, Serialize)]
struct ForecastView {
    location: ResolvedLocation,
    current: Option<CurrentConditions>,
    max_rain_probability: u8,
    lookahead_hours: usize,
    alerts: Vec<String>,
    days: Vec<DailyForecastRecord>,
}

#[derive(Debug, Serialize)]
struct HistoryView {
    location: ResolvedLocation,
    years: Vec<YearlySummary>,
    climatology: Vec<MonthlyClimatology>,
    trend: TrendResult,
    extremes: Option<ExtremesSummary>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn internal(message: String) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::LocationNotFound { .. } => StatusCode::NOT_FOUND,
            Error::TimeOutOfRange { .. } | Error::InvalidArgument { .. } => {
                StatusCode::BAD_REQUEST
            }
            Error::RetryExhausted { .. } | Error::MalformedResponse { .. } => {
                StatusCode::BAD_GATEWAY
            }
            Error::Config { .. } | Error::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.user_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

async fn forecast_handler(
    State(config): State<Arc<SkywatchConfig>>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<ForecastView>, ApiError> {
    let view = tokio::task::spawn_blocking(move || build_forecast_view(&config, query))
        .await
        .map_err(|e| ApiError::internal(format!("forecast task failed: {e}")))??;
    Ok(Json(view))
}

async fn history_handler(
    State(config): State<Arc<SkywatchConfig>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryView>, ApiError> {
    let view = tokio::task::spawn_blocking(move || build_history_view(&config, query))
        .await
        .map_err(|e| ApiError::internal(format!("history task failed: {e}")))??;
    Ok(Json(view))
}

async fn status_handler(
    State(config): State<Arc<SkywatchConfig>>,
) -> Json<Option<LastRun>> {
    Json(runlog::read_last_run(&config.log.dir))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Resolve the queried place, or fall back to the configured location
fn resolve_place(
    config: &SkywatchConfig,
    place: Option<&str>,
) -> crate::Result<ResolvedLocation> {
    match place {
        Some(place) if !place.trim().is_empty() => geocode::geocode(place.trim()),
        _ => Ok(ResolvedLocation::new(
            config.location.latitude,
            config.location.longitude,
            config.location.name.clone(),
        )),
    }
}

fn build_forecast_view(
    config: &SkywatchConfig,
    query: ForecastQuery,
) -> crate::Result<ForecastView> {
    let location = resolve_place(config, query.place.as_deref())?;
    let lookahead = config.alerts.lookahead_hours;

    let hourly = forecast::fetch_hourly(location.latitude, location.longitude, lookahead + 1, None)?;
    let alerts = rules::evaluate_rules(&hourly, &config.alerts);
    let days = forecast::fetch_daily(
        location.latitude,
        location.longitude,
        query.days.unwrap_or(DEFAULT_FORECAST_DAYS),
    )?;

    let current = hourly.first().map(|h| CurrentConditions {
        time: h.time.format("%Y-%m-%dT%H:%M").to_string(),
        temperature: h.temperature,
        feels_like: h.feels_like,
        humidity: h.humidity,
        wind_speed: h.wind_speed,
        wind_direction: h.wind_direction.clone(),
        precipitation_probability: h.precipitation_probability,
        snow_depth_cm: h.snow_depth,
        condition: weather_code_label(h.weather_code),
    });

    Ok(ForecastView {
        location,
        current,
        max_rain_probability: max_rain_probability(&hourly),
        lookahead_hours: lookahead,
        alerts,
        days,
    })
}

fn build_history_view(config: &SkywatchConfig, query: HistoryQuery) -> crate::Result<HistoryView> {
    let location = resolve_place(config, query.place.as_deref())?;

    let mut records = history::fetch_historical(
        location.latitude,
        location.longitude,
        query.years.unwrap_or(DEFAULT_HISTORY_YEARS),
    )?;
    records.sort_by_key(|r| r.date);

    let years = analysis::yearly_summary(&records);
    let climatology = analysis::monthly_climatology(&records);
    let trend = analysis::temperature_trend(&years);
    let extremes = analysis::find_extremes(&years);

    Ok(HistoryView {
        location,
        years,
        climatology,
        trend,
        extremes,
    })
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>skywatch</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 720px; margin: 2rem auto; color: #222; }
  input, button, select { font-size: 1rem; padding: 0.4rem 0.8rem; }
  table { border-collapse: collapse; width: 100%; margin-top: 1rem; }
  th, td { text-align: right; padding: 0.3rem 0.6rem; border-bottom: 1px solid #ddd; }
  th:first-child, td:first-child { text-align: left; }
  .alert { color: #b00020; font-weight: 600; }
  .muted { color: #777; }
</style>
</head>
<body>
<h1>skywatch</h1>
<form id="search">
  <input id="place" placeholder="Enter a location" autofocus>
  <button>Get weather</button>
</form>
<div id="out" class="muted">Search for a place, or submit empty for the configured location.</div>
<script>
document.getElementById('search').addEventListener('submit', async (e) => {
  e.preventDefault();
  const out = document.getElementById('out');
  out.textContent = 'Loading...';
  const place = document.getElementById('place').value.trim();
  const params = place ? '?place=' + encodeURIComponent(place) : '';
  try {
    const res = await fetch('/api/forecast' + params);
    const data = await res.json();
    if (!res.ok) { out.textContent = data.error; return; }
    let html = '<h2>' + data.location.display_name + '</h2>';
    if (data.current) {
      html += '<p>' + data.current.temperature + '&deg;C (feels like '
        + data.current.feels_like + '&deg;C) &middot; ' + data.current.condition
        + ' &middot; wind ' + data.current.wind_speed + ' km/h '
        + data.current.wind_direction + '</p>';
    }
    for (const alert of data.alerts) {
      html += '<p class="alert">&#9888; ' + alert + '</p>';
    }
    html += '<table><tr><th>Date</th><th>Max</th><th>Min</th><th>Rain</th><th>Wind</th></tr>';
    for (const d of data.days) {
      html += '<tr><td>' + d.date + '</td><td>' + d.temp_max + '&deg;C</td><td>'
        + d.temp_min + '&deg;C</td><td>' + d.rain_probability + '%</td><td>'
        + d.wind_max + ' km/h ' + d.wind_direction + '</td></tr>';
    }
    html += '</table>';
    out.innerHTML = html;
  } catch (err) {
    out.textContent = 'Request failed: ' + err;
  }
});
</script>
</body>
</html>
"#;
