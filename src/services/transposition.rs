/// ============================================================
///  Tilted-surface projection (isotropic sky)
///
///   POA = beam · cos θ  +  DHI · (1 + cos β)/2
///                       +  ρ · GHI · (1 − cos β)/2
///
///   θ: angle of incidence, β: panel tilt, ρ: ground albedo.
/// ============================================================

use crate::models::forecast::{IrradianceComponents, PanelOrientation, SolarPosition};

/// Cosine of the angle between the sun and the panel normal, floored at 0
/// (sun behind the panel).
pub fn cos_incidence(sun: &SolarPosition, panel: &PanelOrientation) -> f64 {
    let tilt = panel.tilt.to_radians();
    let az_diff = sun.azimuth - panel.azimuth.to_radians();

    (sun.elevation.sin() * tilt.cos() + sun.elevation.cos() * tilt.sin() * az_diff.cos()).max(0.0)
}

/// Irradiance on the panel plane (W/m²).
pub fn tilted_surface_irradiance(
    components: &IrradianceComponents,
    sun: &SolarPosition,
    panel: &PanelOrientation,
    albedo: f64,
) -> f64 {
    if !sun.is_daylight() {
        return 0.0;
    }

    let tilt = panel.tilt.to_radians();

    let direct = components.direct_normal * cos_incidence(sun, panel);
    let diffuse = components.diffuse_horizontal * (1.0 + tilt.cos()) / 2.0;
    let reflected = albedo * components.global_horizontal * (1.0 - tilt.cos()) / 2.0;

    direct + diffuse + reflected
}
