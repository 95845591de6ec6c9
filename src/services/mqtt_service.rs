/// MQTT forecast publisher
///
/// Publishes the site's forecast for the current local day as JSON.
/// Topics:
///   `{prefix}/system/status`   birth message (retained)
///   `{prefix}/forecast/today`  DailyForecast (retained)
///   `{prefix}/forecast/sun`    sunrise / sunset (retained)

use std::time::Duration;
use rumqttc::{AsyncClient, MqttOptions, QoS};
use serde::Serialize;

use crate::config::MqttConfig;
use crate::error::PublishError;
use crate::models::forecast::{DailyForecast, SunTimes};
use crate::shared_state::AppState;

pub fn forecast_topic(prefix: &str) -> String {
    format!("{}/forecast/today", prefix.trim_end_matches('/'))
}

pub fn sun_topic(prefix: &str) -> String {
    format!("{}/forecast/sun", prefix.trim_end_matches('/'))
}

pub fn forecast_payload(site: &str, forecast: &DailyForecast, sun: &SunTimes) -> serde_json::Value {
    serde_json::json!({
        "site":             site,
        "date":             forecast.date,
        "timestamp":        chrono::Utc::now().to_rfc3339(),
        "total_kwh_m2":     forecast.total_irradiance,
        "hourly":           forecast.hourly_data,
        "sunrise":          sun.sunrise,
        "sunset":           sun.sunset,
    })
}

/// Queue `value` as a retained JSON message on `topic`.
pub async fn publish_retained<T: Serialize>(
    client: &AsyncClient,
    topic: String,
    value: &T,
) -> Result<(), PublishError> {
    let payload = serde_json::to_vec(value)?;
    client.publish(topic, QoS::AtLeastOnce, true, payload).await?;
    Ok(())
}

pub async fn run_publisher(cfg: MqttConfig, state: AppState) {
    if !cfg.enabled || cfg.broker_host.is_empty() {
        tracing::info!("MQTT disabled or no broker configured, skipping publisher");
        return;
    }

    let client_id = if cfg.client_id.is_empty() {
        format!("solar-gain-{}", uuid::Uuid::new_v4())
    } else {
        cfg.client_id.clone()
    };

    let interval_s = cfg.publish_interval_s.unwrap_or(300).max(1);
    let prefix = cfg.topic_prefix.trim_end_matches('/').to_string();

    tracing::info!(
        broker = %cfg.broker_host,
        port = cfg.broker_port,
        client_id = %client_id,
        interval_s,
        "connecting to MQTT broker"
    );

    let mut opts = MqttOptions::new(&client_id, &cfg.broker_host, cfg.broker_port);
    opts.set_keep_alive(Duration::from_secs(30));
    opts.set_clean_session(true);

    if let (Some(user), Some(pass)) = (&cfg.username, &cfg.password) {
        opts.set_credentials(user, pass);
    }

    let (client, mut eventloop) = AsyncClient::new(opts, 16);

    let birth_topic = format!("{}/system/status", prefix);
    let birth_payload = serde_json::json!({
        "status": "ONLINE",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    if let Err(e) = publish_retained(&client, birth_topic, &birth_payload).await {
        tracing::warn!(error = %e, "failed to queue MQTT birth message");
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_s));

    loop {
        // Keep the event loop polled between publishes
        tokio::select! {
            _ = ticker.tick() => {}
            event = eventloop.poll() => {
                match event {
                    Ok(_) => state.set_mqtt_connected(true),
                    Err(e) => {
                        tracing::warn!(error = %e, "MQTT event loop error, reconnecting");
                        state.set_mqtt_connected(false);
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                }
                continue;
            }
        }

        let date = state.today();
        let forecast = state.forecast(date);
        let sun = state.sun_times(date);

        let payload = forecast_payload(state.site_name(), &forecast, &sun);
        let published = match publish_retained(&client, forecast_topic(&prefix), &payload).await {
            Ok(()) => publish_retained(&client, sun_topic(&prefix), &sun).await,
            Err(e) => Err(e),
        };
        if let Err(e) = published {
            tracing::warn!(error = %e, date = %forecast.date, "failed to publish forecast");
            state.set_mqtt_connected(false);
            continue;
        }

        tracing::debug!(date = %forecast.date, "forecast published over MQTT");
    }
}
