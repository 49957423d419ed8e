// projection.rs — 球坐标 -> 旋转 -> 屏幕平面，附带深度淡出与缩放

use crate::layout::SphericalPosition;
use crate::motion::RotationState;
use glam::{Mat3, Vec3};

/// Fully opaque in front of this depth.
pub const FADE_ZONE_START: f32 = -10.0;
/// Hidden at or behind this depth.
pub const FADE_ZONE_END: f32 = -30.0;

const MIN_CENTER_SCALE: f32 = 0.3;
const POLE_DISTANCE_PENALTY: f32 = 0.4;
const EQUATOR_DISTANCE_PENALTY: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub scale: f32,
    pub z_index: i32,
    pub is_visible: bool,
    pub fade_opacity: f32,
    pub original_index: usize,
}

/// Cartesian point on the sphere, y pointing to the north pole.
pub fn spherical_to_cartesian(pos: &SphericalPosition) -> Vec3 {
    let theta = pos.theta.to_radians();
    let phi = pos.phi.to_radians();
    Vec3::new(
        pos.radius * phi.sin() * theta.cos(),
        pos.radius * phi.cos(),
        pos.radius * phi.sin() * theta.sin(),
    )
}

/// Yaw around the vertical axis, then pitch around the horizontal one.
pub fn rotation_matrix(rotation: &RotationState) -> Mat3 {
    Mat3::from_rotation_x(rotation.x.to_radians()) * Mat3::from_rotation_y(rotation.y.to_radians())
}

pub fn is_visible(z: f32) -> bool {
    z > FADE_ZONE_END
}

pub fn fade_opacity(z: f32) -> f32 {
    if z > FADE_ZONE_START {
        1.0
    } else {
        ((z - FADE_ZONE_END) / (FADE_ZONE_START - FADE_ZONE_END)).max(0.0)
    }
}

/// Shrinks points away from the screen center, grows points nearer the viewer.
pub fn depth_scale(world: Vec3, near_pole: bool, sphere_radius: f32) -> f32 {
    let distance_ratio = (world.x.hypot(world.y) / sphere_radius).min(1.0);
    let penalty = if near_pole {
        POLE_DISTANCE_PENALTY
    } else {
        EQUATOR_DISTANCE_PENALTY
    };
    let center_scale = (1.0 - distance_ratio * penalty).max(MIN_CENTER_SCALE);
    let depth = (world.z + sphere_radius) / (2.0 * sphere_radius);
    center_scale * (0.8 + depth * 0.3).max(0.5)
}

pub fn project(
    pos: &SphericalPosition,
    rotation: &Mat3,
    sphere_radius: f32,
    original_index: usize,
) -> WorldPosition {
    let world = *rotation * spherical_to_cartesian(pos);

    WorldPosition {
        x: world.x,
        y: world.y,
        z: world.z,
        scale: depth_scale(world, pos.is_near_pole(), sphere_radius),
        z_index: (1000.0 + world.z).round() as i32,
        is_visible: is_visible(world.z),
        fade_opacity: fade_opacity(world.z),
        original_index,
    }
}

pub fn project_all(
    positions: &[SphericalPosition],
    rotation: &RotationState,
    sphere_radius: f32,
) -> Vec<WorldPosition> {
    let m = rotation_matrix(rotation);
    positions
        .iter()
        .enumerate()
        .map(|(i, p)| project(p, &m, sphere_radius, i))
        .collect()
}
