/// Site-local clock and the daily notification task.
///
/// The site's local time is UTC shifted by the configured fixed offset;
/// the host clock is assumed to be synchronised already.

use chrono::{DateTime, Days, FixedOffset, NaiveTime, Offset, Utc};

use crate::models::forecast::CalendarDate;
use crate::services::whatsapp_service::WhatsAppClient;
use crate::shared_state::AppState;

pub fn site_offset(timezone_offset_h: f64) -> FixedOffset {
    let seconds = (timezone_offset_h * 3600.0).round() as i32;
    FixedOffset::east_opt(seconds).unwrap_or_else(|| {
        tracing::warn!(timezone_offset_h, "timezone offset out of range, using UTC");
        Utc.fix()
    })
}

pub fn local_now(timezone_offset_h: f64) -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&site_offset(timezone_offset_h))
}

pub fn local_today(timezone_offset_h: f64) -> CalendarDate {
    CalendarDate::from(local_now(timezone_offset_h).date_naive())
}

/// Next instant strictly after `now` whose local wall-clock reads `hour:minute`.
pub fn next_fire_after(now: DateTime<FixedOffset>, hour: u32, minute: u32) -> Option<DateTime<FixedOffset>> {
    let at = NaiveTime::from_hms_opt(hour, minute, 0)?;
    let tz = *now.offset();

    let today = now.date_naive().and_time(at).and_local_timezone(tz).single()?;
    if today > now {
        return Some(today);
    }

    now.date_naive()
        .checked_add_days(Days::new(1))?
        .and_time(at)
        .and_local_timezone(tz)
        .single()
}

/// Next instant to notify at. Never at or before `last_fired`, so a wall clock
/// that reads slightly behind after a long sleep cannot repeat a send.
pub fn next_notification(
    now: DateTime<FixedOffset>,
    last_fired: Option<DateTime<FixedOffset>>,
    hour: u32,
    minute: u32,
) -> Option<DateTime<FixedOffset>> {
    let from = last_fired.map_or(now, |last| now.max(last));
    next_fire_after(from, hour, minute)
}

/// Sends the forecast for the local date every day at the configured time.
pub async fn run_daily_notifications(state: AppState, client: WhatsAppClient) {
    let n = state.config.notifications;
    let offset_h = state.engine.location().timezone_offset;

    tracing::info!(
        hour = n.hour,
        minute = n.minute,
        recipient = client.recipient(),
        "daily notifications scheduled"
    );

    let mut last_fired = None;

    loop {
        let now = local_now(offset_h);
        let Some(fire_at) = next_notification(now, last_fired, n.hour, n.minute) else {
            tracing::error!(hour = n.hour, minute = n.minute, "invalid notification time, scheduler stopped");
            return;
        };

        let wait = (fire_at - now).to_std().unwrap_or_default();
        tracing::debug!(next = %fire_at, "sleeping until next notification");
        tokio::time::sleep(wait).await;

        last_fired = Some(fire_at);

        let date = CalendarDate::from(fire_at.date_naive());
        let forecast = state.forecast(date);
        match client.send_daily_forecast(&forecast, state.site_name()).await {
            Ok(_) => tracing::info!(date = %forecast.date, total = forecast.total_irradiance, "daily forecast sent"),
            Err(e) => tracing::error!(error = %e, date = %forecast.date, "failed to send daily forecast"),
        }
    }
}
