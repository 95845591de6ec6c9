/// ============================================================
///  Clear-sky irradiance
///
///   solar elevation + site elevation → air mass (Kasten & Young,
///   barometric altitude correction) → DNI by exponential
///   extinction → DHI as a fixed fraction of DNI → GHI.
///
///  No clouds, no turbidity climatology: an idealised clear sky.
/// ============================================================

use crate::models::forecast::IrradianceComponents;

// ─── Physical constants ──────────────────────────────────────
pub const SOLAR_CONSTANT: f64 = 1367.0; // W/m²
/// Air mass reported when the sun is at or below the horizon.
pub const AIR_MASS_SENTINEL: f64 = 40.0;
/// Barometric scale height (m).
const SCALE_HEIGHT_M: f64 = 8000.0;
const EXTINCTION_SEA_LEVEL: f64 = 0.75;
const EXTINCTION_PER_METRE: f64 = 2e-5;

/// Relative optical path length, corrected for site altitude.
pub fn air_mass(elevation: f64, site_elevation_m: f64) -> f64 {
    if elevation <= 0.0 {
        return AIR_MASS_SENTINEL;
    }

    let elevation_deg = elevation.to_degrees();
    let am = 1.0 / (elevation.sin() + 0.50572 * (elevation_deg + 6.07995).powf(-1.6364));
    let pressure_ratio = (-site_elevation_m / SCALE_HEIGHT_M).exp();

    am * pressure_ratio
}

/// Direct normal irradiance (W/m²).
pub fn direct_normal_irradiance(air_mass: f64, site_elevation_m: f64) -> f64 {
    if air_mass > AIR_MASS_SENTINEL {
        return 0.0;
    }

    let k = EXTINCTION_SEA_LEVEL + EXTINCTION_PER_METRE * site_elevation_m;
    (SOLAR_CONSTANT * (-k * air_mass).exp()).max(0.0)
}

/// Diffuse horizontal irradiance (W/m²).
pub fn diffuse_horizontal_irradiance(dni: f64, diffuse_fraction: f64) -> f64 {
    diffuse_fraction * dni
}

/// Global horizontal irradiance (W/m²); zero unless the sun is up.
pub fn global_horizontal_irradiance(dni: f64, dhi: f64, elevation: f64) -> f64 {
    if elevation <= 0.0 {
        return 0.0;
    }
    dni * elevation.sin() + dhi
}

/// Full clear-sky decomposition for one instant. All components are zero
/// while the sun is at or below the horizon.
pub fn clear_sky_irradiance(
    elevation: f64,
    site_elevation_m: f64,
    diffuse_fraction: f64,
) -> IrradianceComponents {
    if elevation <= 0.0 {
        return IrradianceComponents::default();
    }

    let am = air_mass(elevation, site_elevation_m);
    let dni = direct_normal_irradiance(am, site_elevation_m);
    let dhi = diffuse_horizontal_irradiance(dni, diffuse_fraction);

    IrradianceComponents {
        direct_normal: dni,
        diffuse_horizontal: dhi,
        global_horizontal: global_horizontal_irradiance(dni, dhi, elevation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air_mass_sentinel_at_night() {
        assert_eq!(air_mass(0.0, 0.0), AIR_MASS_SENTINEL);
        assert_eq!(air_mass(-0.3, 650.0), AIR_MASS_SENTINEL);
    }

    #[test]
    fn test_air_mass_zenith_is_about_one() {
        let am = air_mass(90f64.to_radians(), 0.0);
        assert!((am - 1.0).abs() < 0.01, "Zenith air mass should be ~1, got {:.4}", am);
    }

    #[test]
    fn test_air_mass_grows_towards_horizon() {
        let high = air_mass(60f64.to_radians(), 0.0);
        let low = air_mass(5f64.to_radians(), 0.0);
        let grazing = air_mass(0.01f64.to_radians(), 0.0);
        assert!(low > high);
        assert!(grazing > low && grazing < AIR_MASS_SENTINEL, "grazing air mass {:.2}", grazing);
    }

    #[test]
    fn test_air_mass_thinner_at_altitude() {
        let el = 45f64.to_radians();
        assert!(air_mass(el, 2000.0) < air_mass(el, 0.0));
    }

    #[test]
    fn test_dni_cut_off_beyond_sentinel() {
        assert_eq!(direct_normal_irradiance(AIR_MASS_SENTINEL + 0.1, 0.0), 0.0);
        assert!(direct_normal_irradiance(AIR_MASS_SENTINEL, 0.0) >= 0.0);
    }

    #[test]
    fn test_dni_at_zenith_sea_level() {
        let dni = direct_normal_irradiance(1.0, 0.0);
        let expected = SOLAR_CONSTANT * (-0.75f64).exp();
        assert!((dni - expected).abs() < 1e-9, "DNI {:.2} vs {:.2}", dni, expected);
    }

    #[test]
    fn test_diffuse_fraction_applied() {
        assert!((diffuse_horizontal_irradiance(600.0, 0.1) - 60.0).abs() < 1e-12);
        assert_eq!(diffuse_horizontal_irradiance(600.0, 0.0), 0.0);
    }

    #[test]
    fn test_ghi_zero_at_night() {
        assert_eq!(global_horizontal_irradiance(800.0, 80.0, 0.0), 0.0);
        assert_eq!(global_horizontal_irradiance(800.0, 80.0, -0.1), 0.0);
        let ghi = global_horizontal_irradiance(800.0, 80.0, 30f64.to_radians());
        assert!((ghi - 480.0).abs() < 1e-9);
    }

    #[test]
    fn test_components_zero_when_sun_down() {
        let c = clear_sky_irradiance(-0.01, 650.0, 0.1);
        assert_eq!(c, IrradianceComponents::default());
    }

    #[test]
    fn test_components_non_negative_across_elevations() {
        for deg in 1..=90 {
            let c = clear_sky_irradiance((deg as f64).to_radians(), 650.0, 0.1);
            assert!(c.direct_normal >= 0.0 && c.diffuse_horizontal >= 0.0 && c.global_horizontal >= 0.0);
            assert!(c.direct_normal < SOLAR_CONSTANT);
        }
    }
}
