/// ============================================================
///  Daily Clear-Sky Solar Gain Engine
///
///  Algorithm pipeline (per local clock hour, evaluated at the
///  middle of the hour):
///   1. Solar geometry  – Julian day, declination, equation of
///                        time (once per day), hour angle,
///                        elevation, azimuth
///   2. Clear-sky model – air mass, DNI, DHI, GHI
///   3. Panel tilt      – irradiance on the panel plane
///   4. Aggregation     – W/m² over one hour → kWh/m², daily sum
///
///  Sunrise / sunset come from the horizon-crossing hour angle
///  of the same day.
///
///  Degrees at the boundary (Location, PanelOrientation), radians
///  everywhere inside.
/// ============================================================

use crate::models::forecast::{
    CalendarDate, ClearSkyParams, DailyForecast, HourlyIrradiance, Location,
    PanelOrientation, SolarPosition, SunTimes, SunTransition,
};
use crate::services::{clear_sky, solar_position, transposition};

pub const HOURS_PER_DAY: u8 = 24;

/// Quantities that stay constant over one calendar day.
#[derive(Debug, Clone, Copy)]
struct DayConstants {
    declination: f64,
    /// minutes
    equation_of_time: f64,
}

impl DayConstants {
    fn for_date(date: CalendarDate) -> Self {
        let jd = solar_position::julian_day(date);
        Self {
            declination: solar_position::solar_declination(jd),
            equation_of_time: solar_position::equation_of_time(jd),
        }
    }
}

/// Fold a clock hour into [0, 24). A site whose offset is far from its
/// longitude (e.g. +14 h at 157° W) would otherwise land on the wrong day.
fn wrap_clock_hour(hour: f64) -> f64 {
    let h = hour.rem_euclid(24.0);
    if h >= 24.0 { 0.0 } else { h }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Crossing {
    Rise,
    Set,
}

/// One engine per physical installation. Holds only immutable site data,
/// so a single instance can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct SolarEngine {
    location: Location,
    panel: PanelOrientation,
    clear_sky: ClearSkyParams,
    latitude_rad: f64,
}

impl SolarEngine {
    pub fn new(location: Location, panel: PanelOrientation) -> Self {
        Self::with_clear_sky(location, panel, ClearSkyParams::default())
    }

    pub fn with_clear_sky(location: Location, panel: PanelOrientation, clear_sky: ClearSkyParams) -> Self {
        Self {
            location,
            panel,
            clear_sky,
            latitude_rad: location.latitude.to_radians(),
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn panel(&self) -> &PanelOrientation {
        &self.panel
    }

    pub fn clear_sky(&self) -> &ClearSkyParams {
        &self.clear_sky
    }

    /// Hours between local clock time and local solar time for the day.
    fn solar_time_correction(&self, day: &DayConstants) -> f64 {
        day.equation_of_time / 60.0 + self.location.longitude / 15.0 - self.location.timezone_offset
    }

    fn position_for(&self, day: &DayConstants, local_time_h: f64) -> SolarPosition {
        let solar_time = local_time_h + self.solar_time_correction(day);
        solar_position::solar_position(self.latitude_rad, day.declination, solar_time)
    }

    /// Sun geometry at a local clock time (fractional hours) on `date`.
    #[allow(dead_code)]
    pub fn solar_position(&self, date: CalendarDate, local_time_h: f64) -> SolarPosition {
        self.position_for(&DayConstants::for_date(date), local_time_h)
    }

    /// Plane-of-array irradiance (W/m²) for a given sun position.
    pub fn panel_irradiance(&self, sun: &SolarPosition) -> f64 {
        if !sun.is_daylight() {
            return 0.0;
        }

        let components = clear_sky::clear_sky_irradiance(
            sun.elevation,
            self.location.elevation,
            self.clear_sky.diffuse_fraction,
        );
        transposition::tilted_surface_irradiance(&components, sun, &self.panel, self.clear_sky.albedo)
    }

    /// Hour-by-hour clear-sky energy on the panel for one day.
    pub fn daily_forecast(&self, date: CalendarDate) -> DailyForecast {
        let day = DayConstants::for_date(date);

        let mut total_irradiance = 0.0;
        let mut hourly_data = Vec::with_capacity(HOURS_PER_DAY as usize);

        for hour in 0..HOURS_PER_DAY {
            let sun = self.position_for(&day, hour as f64 + 0.5);
            // One-hour average power density: W/m² → kWh/m²
            let irradiance = self.panel_irradiance(&sun) / 1000.0;

            hourly_data.push(HourlyIrradiance { hour, irradiance });
            total_irradiance += irradiance;
        }

        DailyForecast {
            date: date.label(),
            total_irradiance,
            hourly_data,
        }
    }

    fn transition(&self, date: CalendarDate, crossing: Crossing) -> SunTransition {
        let day = DayConstants::for_date(date);

        let cos_omega = -self.latitude_rad.tan() * day.declination.tan();
        if cos_omega > 1.0 {
            return SunTransition::PolarNight;
        }
        if cos_omega < -1.0 {
            return SunTransition::PolarDay;
        }

        let half_day_h = cos_omega.acos().to_degrees() / 15.0;
        let solar_time = match crossing {
            Crossing::Rise => 12.0 - half_day_h,
            Crossing::Set => 12.0 + half_day_h,
        };

        SunTransition::At {
            hour: wrap_clock_hour(solar_time - self.solar_time_correction(&day)),
        }
    }

    pub fn sunrise(&self, date: CalendarDate) -> SunTransition {
        self.transition(date, Crossing::Rise)
    }

    pub fn sunset(&self, date: CalendarDate) -> SunTransition {
        self.transition(date, Crossing::Set)
    }

    pub fn sun_times(&self, date: CalendarDate) -> SunTimes {
        SunTimes {
            sunrise: self.sunrise(date),
            sunset: self.sunset(date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Harare
    const LAT: f64 = -17.7831;
    const LON: f64 = 31.0909;
    const ELEV: f64 = 650.0;
    const TZ: f64 = 2.0;

    fn site(elevation: f64) -> Location {
        Location { latitude: LAT, longitude: LON, elevation, timezone_offset: TZ }
    }

    fn engine(tilt: f64, azimuth: f64) -> SolarEngine {
        SolarEngine::new(site(ELEV), PanelOrientation { tilt, azimuth })
    }

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::from_ymd(y, m, d).unwrap()
    }

    fn sum(f: &DailyForecast) -> f64 {
        f.hourly_data.iter().map(|h| h.irradiance).sum()
    }

    #[test]
    fn test_24_ordered_hours_and_consistent_total() {
        let e = engine(30.0, 180.0);
        for (m, d) in [(1, 15), (3, 21), (6, 21), (9, 21), (12, 21)] {
            let f = e.daily_forecast(date(2024, m, d));
            assert_eq!(f.hourly_data.len(), 24);
            for (i, h) in f.hourly_data.iter().enumerate() {
                assert_eq!(h.hour as usize, i);
            }
            assert!((f.total_irradiance - sum(&f)).abs() < 1e-4,
                "Total {:.6} != sum {:.6} on {}", f.total_irradiance, sum(&f), f.date);
        }
    }

    #[test]
    fn test_night_hours_are_exactly_zero() {
        let e = engine(30.0, 180.0);
        let d = date(2024, 9, 21);
        let f = e.daily_forecast(d);

        for h in [0usize, 3, 22, 23] {
            assert_eq!(f.hourly_data[h].irradiance, 0.0, "hour {} should be dark", h);
        }
        for h in &f.hourly_data {
            let sun = e.solar_position(d, h.hour as f64 + 0.5);
            if sun.elevation <= 0.0 {
                assert_eq!(h.irradiance, 0.0, "hour {} below horizon but lit", h.hour);
            }
        }
    }

    #[test]
    fn test_never_negative_for_extreme_orientations() {
        for (tilt, az) in [(0.0, 180.0), (90.0, 180.0), (90.0, 0.0), (45.0, 90.0), (30.0, 270.0)] {
            let e = engine(tilt, az);
            for m in 1..=12 {
                let f = e.daily_forecast(date(2024, m, 10));
                for h in &f.hourly_data {
                    assert!(h.irradiance >= 0.0 && h.irradiance.is_finite(),
                        "tilt={} az={} {} hour {} -> {}", tilt, az, f.date, h.hour, h.irradiance);
                }
            }
        }
    }

    #[test]
    fn test_noon_peak_winter_solstice() {
        let f = engine(30.0, 180.0).daily_forecast(date(2024, 6, 21));
        let noon = f.hourly_data[12].irradiance;
        assert!(noon > f.hourly_data[8].irradiance, "noon {:.4} vs 08:00 {:.4}", noon, f.hourly_data[8].irradiance);
        assert!(noon > f.hourly_data[16].irradiance, "noon {:.4} vs 16:00 {:.4}", noon, f.hourly_data[16].irradiance);
    }

    #[test]
    fn test_daily_total_in_plausible_range() {
        // Equator-facing panel in southern winter
        let f = engine(30.0, 0.0).daily_forecast(date(2024, 6, 21));
        assert!(f.total_irradiance > 2.0 && f.total_irradiance < 8.0,
            "Winter total should be 2-8 kWh/m², got {:.3}", f.total_irradiance);
    }

    #[test]
    fn test_pole_facing_panel_loses_to_flat_in_winter() {
        // A south-facing panel in the southern hemisphere sees the winter sun
        // from behind; a flat panel collects more.
        let d = date(2024, 6, 21);
        let tilted = engine(30.0, 180.0).daily_forecast(d);
        let flat = engine(0.0, 180.0).daily_forecast(d);
        let equator_facing = engine(30.0, 0.0).daily_forecast(d);
        assert!(flat.total_irradiance > tilted.total_irradiance);
        assert!(equator_facing.total_irradiance > flat.total_irradiance);
    }

    #[test]
    fn test_southern_summer_beats_winter() {
        let e = engine(30.0, 180.0);
        let june = e.daily_forecast(date(2024, 6, 21));
        let december = e.daily_forecast(date(2024, 12, 21));
        assert!(december.total_irradiance > june.total_irradiance,
            "December {:.3} should exceed June {:.3}", december.total_irradiance, june.total_irradiance);
    }

    #[test]
    fn test_altitude_increases_gain() {
        let d = date(2024, 6, 21);
        let panel = PanelOrientation { tilt: 30.0, azimuth: 180.0 };
        let sea = SolarEngine::new(site(0.0), panel).daily_forecast(d);
        let raised = SolarEngine::new(site(ELEV), panel).daily_forecast(d);
        assert!(raised.total_irradiance > sea.total_irradiance,
            "650 m {:.4} should exceed sea level {:.4}", raised.total_irradiance, sea.total_irradiance);
    }

    #[test]
    fn test_sunrise_sunset_near_equinox() {
        let e = engine(30.0, 180.0);
        let d = date(2024, 3, 21);
        let rise = e.sunrise(d).hour().expect("sunrise expected at equinox");
        let set = e.sunset(d).hour().expect("sunset expected at equinox");
        assert!(rise > 5.5 && rise < 6.5, "sunrise {:.3}", rise);
        assert!(set > 17.5 && set < 18.5, "sunset {:.3}", set);
    }

    #[test]
    fn test_sunrise_sunset_bracket_lit_hours() {
        let e = engine(30.0, 0.0);
        let d = date(2024, 12, 21);
        let f = e.daily_forecast(d);
        let times = e.sun_times(d);
        let rise = times.sunrise.hour().unwrap();
        let set = times.sunset.hour().unwrap();

        for h in &f.hourly_data {
            let mid = h.hour as f64 + 0.5;
            if mid < rise - 0.05 || mid > set + 0.05 {
                assert_eq!(h.irradiance, 0.0, "hour {} outside {:.2}-{:.2} is lit", h.hour, rise, set);
            }
            if mid > rise + 0.05 && mid < set - 0.05 {
                assert!(h.irradiance > 0.0, "hour {} inside {:.2}-{:.2} is dark", h.hour, rise, set);
            }
        }
    }

    #[test]
    fn test_polar_night_and_day_have_no_transition() {
        let panel = PanelOrientation { tilt: 30.0, azimuth: 180.0 };
        let arctic = SolarEngine::new(
            Location { latitude: 80.0, longitude: 15.0, elevation: 0.0, timezone_offset: 1.0 },
            panel,
        );
        let winter = date(2024, 12, 21);
        let summer = date(2024, 6, 21);

        assert_eq!(arctic.sunrise(winter), SunTransition::PolarNight);
        assert_eq!(arctic.sunset(winter), SunTransition::PolarNight);
        assert_eq!(arctic.sunrise(summer), SunTransition::PolarDay);
        assert_eq!(arctic.sunset(summer), SunTransition::PolarDay);

        let dark = arctic.daily_forecast(winter);
        assert_eq!(dark.total_irradiance, 0.0);
        assert!(dark.hourly_data.iter().all(|h| h.irradiance == 0.0));

        let bright = arctic.daily_forecast(summer);
        assert!(bright.hourly_data.iter().all(|h| h.irradiance > 0.0),
            "midnight sun should light every hour");
    }

    #[test]
    fn test_idempotent() {
        let e = engine(30.0, 180.0);
        let d = date(2024, 6, 21);
        assert_eq!(e.daily_forecast(d), e.daily_forecast(d));
        assert_eq!(e.sun_times(d), e.sun_times(d));
    }

    #[test]
    fn test_zero_timezone_uses_raw_longitude_correction() {
        // With no timezone offset local time is shifted by longitude alone
        let panel = PanelOrientation { tilt: 30.0, azimuth: 180.0 };
        let utc = SolarEngine::new(Location { timezone_offset: 0.0, ..site(ELEV) }, panel);
        let local = engine(30.0, 180.0);
        let d = date(2024, 3, 21);
        let shift = local.sunrise(d).hour().unwrap() - utc.sunrise(d).hour().unwrap();
        assert!((shift - TZ).abs() < 1e-9);
    }

    #[test]
    fn test_clock_hours_stay_within_one_day() {
        let panel = PanelOrientation { tilt: 30.0, azimuth: 180.0 };
        for tz in [-12.0, 0.0, 14.0] {
            for lat in (-85..=85).step_by(5) {
                let e = SolarEngine::new(
                    Location { latitude: lat as f64, longitude: 180.0, elevation: 0.0, timezone_offset: tz },
                    panel,
                );
                for m in [3, 6, 12] {
                    let times = e.sun_times(date(2024, m, 21));
                    for t in [times.sunrise, times.sunset] {
                        if let Some(h) = t.hour() {
                            assert!((0.0..24.0).contains(&h), "lat={} tz={} m={} -> {}", lat, tz, m, h);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_offset_a_full_day_from_longitude_matches_aligned_site() {
        // 180° E at UTC−12 is 24 h of correction away from Greenwich at UTC
        let panel = PanelOrientation { tilt: 30.0, azimuth: 180.0 };
        let greenwich = SolarEngine::new(
            Location { latitude: LAT, longitude: 0.0, elevation: ELEV, timezone_offset: 0.0 },
            panel,
        );
        let dateline = SolarEngine::new(
            Location { latitude: LAT, longitude: 180.0, elevation: ELEV, timezone_offset: -12.0 },
            panel,
        );
        let d = date(2024, 3, 21);

        let a = greenwich.daily_forecast(d);
        let b = dateline.daily_forecast(d);
        for (x, y) in a.hourly_data.iter().zip(&b.hourly_data) {
            assert!((x.irradiance - y.irradiance).abs() < 1e-9, "hour {}: {} vs {}", x.hour, x.irradiance, y.irradiance);
        }

        let rise_a = greenwich.sunrise(d).hour().unwrap();
        let rise_b = dateline.sunrise(d).hour().unwrap();
        assert!((rise_a - rise_b).abs() < 1e-9, "{} vs {}", rise_a, rise_b);
    }

    #[test]
    fn test_clear_sky_params_are_honoured() {
        let d = date(2024, 12, 21);
        let base = engine(30.0, 0.0).daily_forecast(d);
        let hazy = SolarEngine::with_clear_sky(
            site(ELEV),
            PanelOrientation { tilt: 30.0, azimuth: 0.0 },
            ClearSkyParams { diffuse_fraction: 0.3, albedo: 0.2 },
        )
        .daily_forecast(d);
        assert!(hazy.total_irradiance > base.total_irradiance);
    }

    #[test]
    fn test_engine_is_shareable_across_threads() {
        let e = std::sync::Arc::new(engine(30.0, 180.0));
        let d = date(2024, 6, 21);
        let expected = e.daily_forecast(d);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let e = e.clone();
                std::thread::spawn(move || e.daily_forecast(d))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    }
}
