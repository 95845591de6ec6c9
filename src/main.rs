mod routes;
mod controllers;
mod services;
mod models;
mod api_docs;
mod shared_state;
mod config;
mod error;

use std::net::SocketAddr;
use axum::{Router, routing::get, response::Html};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_scalar::Scalar;

use crate::api_docs::ApiDoc;
use crate::config::Config;
use crate::routes::forecast_routes::forecast_routes;
use crate::services::whatsapp_service::WhatsAppClient;
use crate::services::{mqtt_service, scheduler};
use crate::shared_state::AppState;

const DEFAULT_CONFIG_PATH: &str = "config.json";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "solar_gain=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 1. Load configuration
    let config_path = std::env::var("SOLAR_GAIN_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path).map_err(|e| {
        tracing::error!(path = %config_path, error = %e, "failed to load configuration");
        e
    })?;
    tracing::info!(
        site = %config.location.name,
        latitude = config.location.latitude,
        longitude = config.location.longitude,
        tilt = config.panel.tilt,
        azimuth = config.panel.azimuth,
        "configuration loaded"
    );

    // 2. Shared state (engine + single-day cache)
    let state = AppState::new(config.clone());

    let today = state.today();
    let forecast = state.forecast(today);
    let sun = state.sun_times(today);
    tracing::info!(
        date = %forecast.date,
        total_kwh_m2 = %format!("{:.2}", forecast.total_irradiance),
        sunrise = %sun.sunrise.clock_label(),
        sunset = %sun.sunset.clock_label(),
        "today's clear-sky forecast"
    );

    // 3. Daily notification
    match (&config.whatsapp, config.notifications.enabled) {
        (Some(wa), true) => {
            let client = WhatsAppClient::new(wa.clone());
            match client.test_connection().await {
                Ok(number) => tracing::info!(
                    sender = number.as_deref().unwrap_or("unknown"),
                    "WhatsApp credentials accepted"
                ),
                Err(e) => tracing::warn!(error = %e, "WhatsApp credential check failed"),
            }
            tokio::spawn(scheduler::run_daily_notifications(state.clone(), client));
        }
        _ => tracing::info!("daily notifications disabled"),
    }

    // 4. MQTT publisher
    if let Some(mqtt) = config.mqtt.clone() {
        tokio::spawn(mqtt_service::run_publisher(mqtt, state.clone()));
    }

    // 5. HTTP server
    let app = Router::new()
        .nest("/api", forecast_routes(state.clone()))
        .route("/scalar", get(|| async {
            Html(Scalar::new(ApiDoc::openapi()).to_html())
        }))
        .fallback_service(ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("API server listening on http://{}", addr);
    tracing::info!("Scalar UI: http://{}/scalar", addr);

    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
