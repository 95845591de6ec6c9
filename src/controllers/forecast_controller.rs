use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::ApiError;
use crate::models::forecast::{
    CalendarDate, ChartResponse, DailyForecast, ForecastResponse, HealthStatus, SiteInfo, SunTimes,
};
use crate::services::summary;
use crate::shared_state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DateQuery {
    /// Day to forecast (`YYYY-MM-DD`); defaults to today at the site
    pub date: Option<String>,
}

impl DateQuery {
    fn resolve(&self, state: &AppState) -> Result<CalendarDate, ApiError> {
        match self.date.as_deref() {
            None | Some("") => Ok(state.today()),
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(CalendarDate::from)
                .map_err(|_| ApiError::BadRequest(format!("invalid date '{}', expected YYYY-MM-DD", raw))),
        }
    }
}

/// GET /api/health
/// Service liveness and publisher state
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service health", body = HealthStatus)
    )
)]
pub async fn get_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthStatus {
        status: "OK".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        site: state.site_name().to_string(),
        local_date: state.today().label(),
        cached_forecast_date: state.cached_forecast().map(|f| f.date),
        mqtt_connected: state.is_mqtt_connected(),
    })
}

/// GET /api/site
/// Installation site and panel geometry
#[utoipa::path(
    get,
    path = "/api/site",
    responses(
        (status = 200, description = "Configured site", body = SiteInfo)
    )
)]
pub async fn get_site(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.site_info())
}

/// GET /api/forecast
/// Hour-by-hour clear-sky energy on the panel, with sunrise and sunset
#[utoipa::path(
    get,
    path = "/api/forecast",
    params(DateQuery),
    responses(
        (status = 200, description = "Daily forecast", body = ForecastResponse),
        (status = 400, description = "Malformed date")
    )
)]
pub async fn get_forecast(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<ForecastResponse>, ApiError> {
    let date = query.resolve(&state)?;
    Ok(Json(ForecastResponse {
        site: state.site_name().to_string(),
        forecast: state.forecast(date),
        sun: state.sun_times(date),
    }))
}

/// GET /api/sun
/// Sunrise and sunset in local clock hours; polar days report no crossing
#[utoipa::path(
    get,
    path = "/api/sun",
    params(DateQuery),
    responses(
        (status = 200, description = "Sunrise and sunset", body = SunTimes),
        (status = 400, description = "Malformed date")
    )
)]
pub async fn get_sun_times(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<SunTimes>, ApiError> {
    let date = query.resolve(&state)?;
    Ok(Json(state.sun_times(date)))
}

/// GET /api/forecast/chart
/// Hourly bars scaled for display
#[utoipa::path(
    get,
    path = "/api/forecast/chart",
    params(DateQuery),
    responses(
        (status = 200, description = "Chart bars", body = ChartResponse),
        (status = 400, description = "Malformed date")
    )
)]
pub async fn get_chart(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<ChartResponse>, ApiError> {
    let date = query.resolve(&state)?;
    let forecast: DailyForecast = state.forecast(date);
    Ok(Json(summary::chart(&forecast)))
}

/// GET /api/forecast/summary
/// The text message sent by the daily notification
#[utoipa::path(
    get,
    path = "/api/forecast/summary",
    params(DateQuery),
    responses(
        (status = 200, description = "Plain-text summary", body = String, content_type = "text/plain"),
        (status = 400, description = "Malformed date")
    )
)]
pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<String, ApiError> {
    let date = query.resolve(&state)?;
    let forecast = state.forecast(date);
    Ok(summary::format_daily_message(&forecast, state.site_name()))
}
