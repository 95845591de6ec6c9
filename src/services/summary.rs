/// Presentation helpers over a finished forecast
///
/// The plain-text message body pushed to the user, and the bar scaling
/// used by charts. Neither feeds back into the engine.

use crate::models::forecast::{ChartBar, ChartResponse, DailyForecast};

/// Smallest full-scale value for charts (kWh/m²).
const MIN_CHART_SCALE: f64 = 1.0;
/// Chart scale is rounded up to a multiple of this step.
const CHART_SCALE_STEP: f64 = 0.2;

/// Human-readable daily summary. Sunrise/sunset here are the first and last
/// lit hour buckets, not the precise horizon crossings.
pub fn format_daily_message(forecast: &DailyForecast, location_name: &str) -> String {
    let mut message = String::from("🌞 *Solar Gain Forecast*\n");
    message.push_str(&format!("📍 {}\n", location_name));
    message.push_str(&format!("📅 {}\n\n", forecast.date));
    message.push_str(&format!("⚡ *Daily Total: {:.2} kWh/m²*\n\n", forecast.total_irradiance));

    let (Some(first), Some(last)) = (forecast.first_lit_hour(), forecast.last_lit_hour()) else {
        message.push_str("🌑 No sunlight expected today\n");
        return message;
    };

    message.push_str("📊 *Hourly Breakdown:*\n");
    for h in forecast.hourly_data.iter().filter(|h| (first..=last).contains(&h.hour)) {
        let bars = (h.irradiance * 10.0).round().max(0.0) as usize;
        message.push_str(&format!(
            "{:02}:00 → {} {:.2} kWh/m²\n",
            h.hour,
            "▪".repeat(bars),
            h.irradiance
        ));
    }

    if let Some(peak) = forecast.peak_hour() {
        message.push_str(&format!("\n🔆 Peak: {:02}:00 ({:.2} kWh/m²)\n", peak.hour, peak.irradiance));
    }
    message.push_str(&format!("\n🌅 Sunrise: {:02}:00\n", first));
    message.push_str(&format!("🌇 Sunset: {:02}:00\n", last));
    message
}

/// Full-scale value: peak hour rounded up to the next 0.2, never below 1.0.
pub fn chart_scale(forecast: &DailyForecast) -> f64 {
    let peak = forecast
        .hourly_data
        .iter()
        .map(|h| h.irradiance)
        .fold(0.0_f64, f64::max);

    ((peak / CHART_SCALE_STEP).ceil() * CHART_SCALE_STEP).max(MIN_CHART_SCALE)
}

/// Bar height as a fraction of `max_value`, in [0, 1].
pub fn bar_ratio(value: f64, max_value: f64) -> f64 {
    let max_value = if max_value > 0.0 { max_value } else { 1.0 };
    (value / max_value).clamp(0.0, 1.0)
}

pub fn chart(forecast: &DailyForecast) -> ChartResponse {
    let scale = chart_scale(forecast);
    let bars = forecast
        .hourly_data
        .iter()
        .map(|h| ChartBar {
            hour: h.hour,
            irradiance: h.irradiance,
            ratio: bar_ratio(h.irradiance, scale),
        })
        .collect();

    ChartResponse {
        date: forecast.date.clone(),
        scale,
        total_irradiance: forecast.total_irradiance,
        bars,
    }
}
