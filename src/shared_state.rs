use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::config::Config;
use crate::models::forecast::{CalendarDate, DailyForecast, SiteInfo, SunTimes};
use crate::services::scheduler;
use crate::services::solar_algorithm::SolarEngine;

#[derive(Clone, Debug)]
pub struct AppState {
    pub engine: Arc<SolarEngine>,
    pub config: Arc<Config>,
    /// Most recently computed forecast. A single slot: no history is kept.
    latest: Arc<RwLock<Option<DailyForecast>>>,
    pub mqtt_connected: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let engine = SolarEngine::with_clear_sky(config.location(), config.panel(), config.clear_sky);
        Self {
            engine: Arc::new(engine),
            config: Arc::new(config),
            latest: Arc::new(RwLock::new(None)),
            mqtt_connected: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn site_name(&self) -> &str {
        &self.config.location.name
    }

    pub fn site_info(&self) -> SiteInfo {
        SiteInfo {
            name: self.site_name().to_string(),
            location: *self.engine.location(),
            panel: *self.engine.panel(),
            clear_sky: *self.engine.clear_sky(),
        }
    }

    /// Current calendar date at the site.
    pub fn today(&self) -> CalendarDate {
        scheduler::local_today(self.engine.location().timezone_offset)
    }

    pub fn forecast(&self, date: CalendarDate) -> DailyForecast {
        let label = date.label();
        if let Ok(slot) = self.latest.read() {
            if let Some(f) = slot.as_ref().filter(|f| f.date == label) {
                return f.clone();
            }
        }

        let forecast = self.engine.daily_forecast(date);
        if let Ok(mut slot) = self.latest.write() {
            *slot = Some(forecast.clone());
        }
        tracing::debug!(date = %forecast.date, total = forecast.total_irradiance, "forecast computed");
        forecast
    }

    pub fn sun_times(&self, date: CalendarDate) -> SunTimes {
        self.engine.sun_times(date)
    }

    pub fn cached_forecast(&self) -> Option<DailyForecast> {
        self.latest.read().ok().and_then(|slot| slot.clone())
    }

    pub fn is_mqtt_connected(&self) -> bool {
        self.mqtt_connected.load(Ordering::Relaxed)
    }

    pub fn set_mqtt_connected(&self, value: bool) {
        self.mqtt_connected.store(value, Ordering::Relaxed);
    }
}
