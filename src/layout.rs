// layout.rs — 斐波那契球面分布 + 极点排斥 + 随机扰动

use crate::angle;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalPosition {
    /// Azimuth in degrees, [0, 360).
    pub theta: f32,
    /// Polar angle in degrees, [0, 180].
    pub phi: f32,
    pub radius: f32,
}

impl SphericalPosition {
    /// Images near the poles get a gentler center-distance penalty.
    pub fn is_near_pole(&self) -> bool {
        self.phi < 30.0 || self.phi > 150.0
    }
}

const POLE_BONUS_MAX: f32 = 35.0;
const POLE_BONUS_EXP: f32 = 0.6;
const PHI_BAND: (f32, f32) = (15.0, 150.0); // (起点, 跨度)
const THETA_JITTER: f32 = 10.0;
const PHI_JITTER: f32 = 5.0;

/// Spread `count` points over the sphere, biased toward mid-latitudes.
pub fn generate_positions<R: Rng>(
    count: usize,
    radius: f32,
    rng: &mut R,
) -> Vec<SphericalPosition> {
    let golden_ratio = (1.0 + 5f32.sqrt()) / 2.0;
    let angle_increment = std::f32::consts::TAU / golden_ratio;

    let mut positions = Vec::with_capacity(count);
    for i in 0..count {
        let t = i as f32 / count as f32;
        let inclination = (1.0 - 2.0 * t).clamp(-1.0, 1.0).acos();
        let azimuth = angle_increment * i as f32;

        let mut phi = inclination.to_degrees();
        let mut theta = azimuth.to_degrees() % 360.0;

        let pole_bonus = ((phi - 90.0).abs() / 90.0).powf(POLE_BONUS_EXP) * POLE_BONUS_MAX;
        phi = if phi < 90.0 {
            (phi - pole_bonus).max(5.0)
        } else {
            (phi + pole_bonus).min(175.0)
        };

        phi = PHI_BAND.0 + (phi / 180.0) * PHI_BAND.1;

        theta = angle::wrap_360(theta + rng.gen_range(-THETA_JITTER..THETA_JITTER));
        phi = (phi + rng.gen_range(-PHI_JITTER..PHI_JITTER)).clamp(0.0, 180.0);

        positions.push(SphericalPosition { theta, phi, radius });
    }

    log::debug!("generated {} sphere positions (radius {:.1})", count, radius);
    positions
}
