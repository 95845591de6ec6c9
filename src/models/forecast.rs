use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ─── Site inputs (degrees at the boundary) ───────────────────────────────────

/// Fixed installation site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    /// Geographic latitude (−90 … +90, degrees)
    pub latitude: f64,
    /// Geographic longitude (−180 … +180, degrees, east positive)
    pub longitude: f64,
    /// Site elevation above sea level (m)
    pub elevation: f64,
    /// Local clock offset from UTC (hours, east positive)
    pub timezone_offset: f64,
}

/// Fixed panel geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PanelOrientation {
    /// Tilt from horizontal (0 = flat, 90 = vertical, degrees)
    pub tilt: f64,
    /// Compass bearing the panel faces (0 = north, 180 = south, degrees)
    pub azimuth: f64,
}

/// Tunable constants of the simplified clear-sky model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ClearSkyParams {
    /// Diffuse horizontal irradiance as a fraction of DNI
    pub diffuse_fraction: f64,
    /// Ground reflectance used for the reflected component
    pub albedo: f64,
}

impl Default for ClearSkyParams {
    fn default() -> Self {
        Self {
            diffuse_fraction: 0.1,
            albedo: 0.2,
        }
    }
}

// ─── Calendar date ───────────────────────────────────────────────────────────

/// Day being forecast. Only constructible from a valid Gregorian date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDate {
    year: i32,
    month: u32,
    day: u32,
}

impl CalendarDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::from)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// ISO label, e.g. `2024-06-21`.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(d: NaiveDate) -> Self {
        Self {
            year: d.year(),
            month: d.month(),
            day: d.day(),
        }
    }
}

// ─── Instantaneous geometry & radiation (radians internally) ─────────────────

/// Sun geometry at one instant. All angles in radians; azimuth is measured
/// from north, clockwise. Azimuth carries no meaning while `elevation <= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPosition {
    pub declination: f64,
    pub hour_angle: f64,
    pub elevation: f64,
    pub azimuth: f64,
}

impl SolarPosition {
    pub fn is_daylight(&self) -> bool {
        self.elevation > 0.0
    }
}

/// Clear-sky radiative decomposition (W/m²).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IrradianceComponents {
    pub direct_normal: f64,
    pub diffuse_horizontal: f64,
    pub global_horizontal: f64,
}

// ─── Daily output ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HourlyIrradiance {
    /// Local clock hour (0–23)
    pub hour: u8,
    /// Energy on the panel plane during this hour (kWh/m²)
    pub irradiance: f64,
}

/// One day's hour-by-hour estimate on the panel plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailyForecast {
    pub date: String,
    /// Sum of `hourly_data` (kWh/m²)
    pub total_irradiance: f64,
    pub hourly_data: Vec<HourlyIrradiance>,
}

impl DailyForecast {
    /// First hour with non-zero irradiance, if any.
    pub fn first_lit_hour(&self) -> Option<u8> {
        self.hourly_data
            .iter()
            .find(|h| h.irradiance > 0.0)
            .map(|h| h.hour)
    }

    /// Last hour with non-zero irradiance, if any.
    pub fn last_lit_hour(&self) -> Option<u8> {
        self.hourly_data
            .iter()
            .rev()
            .find(|h| h.irradiance > 0.0)
            .map(|h| h.hour)
    }

    pub fn peak_hour(&self) -> Option<HourlyIrradiance> {
        self.hourly_data
            .iter()
            .copied()
            .filter(|h| h.irradiance > 0.0)
            .max_by(|a, b| a.irradiance.total_cmp(&b.irradiance))
    }
}

// ─── Sunrise / sunset ────────────────────────────────────────────────────────

/// Outcome of a sunrise or sunset query. The polar variants mean the sun
/// does not cross the horizon on that date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SunTransition {
    /// Local clock time of the crossing (fractional hours)
    At { hour: f64 },
    /// Sun stays below the horizon all day
    PolarNight,
    /// Sun stays above the horizon all day
    PolarDay,
}

impl SunTransition {
    pub fn hour(&self) -> Option<f64> {
        match self {
            SunTransition::At { hour } => Some(*hour),
            _ => None,
        }
    }

    /// `HH:MM` for display, `--:--` without a crossing.
    pub fn clock_label(&self) -> String {
        match self.hour() {
            Some(h) => {
                let minutes = (h.rem_euclid(24.0) * 60.0).round() as u32 % (24 * 60);
                format!("{:02}:{:02}", minutes / 60, minutes % 60)
            }
            None => "--:--".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SunTimes {
    pub sunrise: SunTransition,
    pub sunset: SunTransition,
}

// ─── REST API response types ─────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct SiteInfo {
    pub name: String,
    pub location: Location,
    pub panel: PanelOrientation,
    pub clear_sky: ClearSkyParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ForecastResponse {
    pub site: String,
    pub forecast: DailyForecast,
    pub sun: SunTimes,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub site: String,
    /// Today's date at the site
    pub local_date: String,
    /// Date of the forecast currently held in memory
    pub cached_forecast_date: Option<String>,
    pub mqtt_connected: bool,
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct ChartBar {
    pub hour: u8,
    pub irradiance: f64,
    /// Bar height as a fraction of the chart scale (0–1)
    pub ratio: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChartResponse {
    pub date: String,
    /// Value mapped to full bar height (kWh/m²)
    pub scale: f64,
    pub total_irradiance: f64,
    pub bars: Vec<ChartBar>,
}
