/// ============================================================
///  Astronomical position
///
///   date → Julian day number → declination (Spencer) and
///   equation of time; local solar time → hour angle →
///   elevation and azimuth of the sun at the site.
///
///  Angles returned here are radians. Site latitude arrives in
///  radians too; the conversion from configured degrees happens
///  once, in the engine.
/// ============================================================

use std::f64::consts::PI;

use crate::models::forecast::{CalendarDate, SolarPosition};

/// Gregorian calendar date → Julian day number (integer arithmetic, noon-based).
pub fn julian_day(date: CalendarDate) -> f64 {
    let month = date.month() as i64;
    let a = (14 - month) / 12;
    let y = date.year() as i64 + 4800 - a;
    let m = month + 12 * a - 3;

    (date.day() as i64 + (153 * m + 2) / 5 + 365 * y + y / 4 - y / 100 + y / 400 - 32045) as f64
}

/// Solar declination (rad), Spencer's Fourier series.
pub fn solar_declination(julian_day: f64) -> f64 {
    let g = 2.0 * PI * (julian_day - 1.0) / 365.25;

    0.006918 - 0.399912 * g.cos() + 0.070257 * g.sin()
        - 0.006758 * (2.0 * g).cos()
        + 0.000907 * (2.0 * g).sin()
        - 0.002697 * (3.0 * g).cos()
        + 0.00148 * (3.0 * g).sin()
}

/// Equation of time (minutes): sundial minus mean clock time.
pub fn equation_of_time(julian_day: f64) -> f64 {
    let b = 2.0 * PI * (julian_day - 81.0) / 365.0;

    229.2
        * (0.000075 + 0.001868 * b.cos()
            - 0.032077 * b.sin()
            - 0.014615 * (2.0 * b).cos()
            - 0.04089 * (2.0 * b).sin())
}

/// Hour angle (rad) in [−π, π); negative in the morning, positive in the
/// afternoon. Solar times outside one day wrap onto it.
pub fn hour_angle(solar_time_h: f64) -> f64 {
    (15.0 * (solar_time_h.rem_euclid(24.0) - 12.0)).to_radians()
}

/// Solar elevation (rad) in [−π/2, π/2].
pub fn solar_elevation(latitude: f64, declination: f64, hour_angle: f64) -> f64 {
    let sin_alpha = latitude.sin() * declination.sin()
        + latitude.cos() * declination.cos() * hour_angle.cos();
    sin_alpha.clamp(-1.0, 1.0).asin()
}

/// Solar azimuth (rad from north, clockwise) in [0, 2π).
pub fn solar_azimuth(latitude: f64, declination: f64, hour_angle: f64, elevation: f64) -> f64 {
    let cos_el = elevation.cos();
    if cos_el.abs() < 1e-9 {
        // Sun at the zenith: every bearing is equivalent
        return 0.0;
    }

    let cos_az = (declination.sin() * latitude.cos()
        - declination.cos() * latitude.sin() * hour_angle.cos())
        / cos_el;
    let az = cos_az.clamp(-1.0, 1.0).acos();

    if hour_angle > 0.0 { 2.0 * PI - az } else { az }
}

/// Full sun geometry for one local solar time on a day with the given
/// declination.
pub fn solar_position(latitude: f64, declination: f64, solar_time_h: f64) -> SolarPosition {
    let hour_angle = hour_angle(solar_time_h);
    let elevation = solar_elevation(latitude, declination, hour_angle);
    let azimuth = solar_azimuth(latitude, declination, hour_angle, elevation);

    SolarPosition {
        declination,
        hour_angle,
        elevation,
        azimuth,
    }
}
