use axum::{routing::get, Router};

use crate::controllers::forecast_controller::{
    get_chart, get_forecast, get_health, get_site, get_summary, get_sun_times,
};
use crate::shared_state::AppState;

/// Build the `/api/*` sub-router.
pub fn forecast_routes(state: AppState) -> Router {
    Router::new()
        .route("/health",           get(get_health))
        .route("/site",             get(get_site))
        .route("/forecast",         get(get_forecast))
        .route("/forecast/chart",   get(get_chart))
        .route("/forecast/summary", get(get_summary))
        .route("/sun",              get(get_sun_times))
        .with_state(state)
}
