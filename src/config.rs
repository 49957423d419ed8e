// config.rs — 球体参数（JSON 可配置，键名 camelCase）

use crate::error::{Result, SphereError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How overlapping neighbours are shrunk, see [`crate::collision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollisionMode {
    /// Left-to-right, in place; later points see already-reduced scales.
    #[default]
    Sequential,
    /// Every pair is judged against the pre-collision scales.
    Simultaneous,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SphereConfig {
    /// Width and height of the square viewport, in pixels.
    pub container_size: f32,
    /// Falls back to half the container when unset.
    pub sphere_radius: Option<f32>,
    pub drag_sensitivity: f32,
    /// Per-frame velocity multiplier, 0..=1.
    pub momentum_decay: f32,
    /// Degrees per frame, per axis.
    pub max_rotation_speed: f32,
    /// Image edge at scale 1, as a fraction of `container_size`.
    pub base_image_scale: f32,
    pub hover_scale: f32,
    pub auto_rotate: bool,
    /// Degrees of yaw per frame.
    pub auto_rotate_speed: f32,
    /// Width / height of every image tile.
    pub aspect_ratio: f32,
    pub collision_padding: f32,
    pub min_image_scale: f32,
    pub collision_mode: CollisionMode,
    /// Pitch / yaw in degrees at start.
    pub initial_rotation: [f32; 2],
    /// CSS-style perspective distance; carried for renderers only.
    pub perspective: f32,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            container_size: 400.0,
            sphere_radius: None,
            drag_sensitivity: 0.5,
            momentum_decay: 0.95,
            max_rotation_speed: 5.0,
            base_image_scale: 0.12,
            hover_scale: 1.2,
            auto_rotate: false,
            auto_rotate_speed: 0.3,
            aspect_ratio: 1.0,
            collision_padding: 25.0,
            min_image_scale: 0.25,
            collision_mode: CollisionMode::Sequential,
            initial_rotation: [15.0, 15.0],
            perspective: 1000.0,
        }
    }
}

impl SphereConfig {
    /// "Reach" section sphere from the agency landing page.
    pub fn reach(mobile: bool) -> Self {
        Self {
            container_size: if mobile { 320.0 } else { 500.0 },
            sphere_radius: Some(if mobile { 120.0 } else { 180.0 }),
            drag_sensitivity: 0.6,
            momentum_decay: 0.96,
            max_rotation_speed: 6.0,
            base_image_scale: if mobile { 0.16 } else { 0.14 },
            hover_scale: 1.3,
            auto_rotate: true,
            auto_rotate_speed: 0.25,
            ..Self::default()
        }
    }

    /// Wide logo tiles of the "all works" creators sphere.
    pub fn creators() -> Self {
        Self {
            container_size: 800.0,
            sphere_radius: Some(220.0),
            base_image_scale: 0.18,
            aspect_ratio: 3.0,
            auto_rotate: true,
            auto_rotate_speed: 1.0,
            drag_sensitivity: 0.8,
            collision_padding: 10.0,
            ..Self::default()
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "reach" => Some(Self::reach(false)),
            "reach-mobile" => Some(Self::reach(true)),
            "creators" => Some(Self::creators()),
            _ => None,
        }
    }

    pub fn from_json_str(text: &str, origin: &Path) -> Result<Self> {
        let cfg: Self = serde_json::from_str(text).map_err(|source| SphereError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| SphereError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text, path)
    }

    pub fn radius(&self) -> f32 {
        match self.sphere_radius {
            Some(r) => r,
            None => self.container_size * 0.5,
        }
    }

    /// Edge length in pixels of an image at scale 1.
    pub fn base_image_size(&self) -> f32 {
        self.container_size * self.base_image_scale
    }

    /// Reject geometry that would produce NaN or runaway layouts.
    pub fn validate(&self) -> Result<()> {
        if !(self.container_size.is_finite() && self.container_size > 0.0) {
            return Err(SphereError::InvalidContainerSize(self.container_size));
        }
        if let Some(r) = self.sphere_radius {
            if !(r.is_finite() && r > 0.0) {
                return Err(SphereError::InvalidRadius(r));
            }
        }

        check("dragSensitivity", self.drag_sensitivity, |v| v >= 0.0, "must be >= 0")?;
        check(
            "momentumDecay",
            self.momentum_decay,
            |v| (0.0..=1.0).contains(&v),
            "must be within 0..=1",
        )?;
        check("maxRotationSpeed", self.max_rotation_speed, |v| v > 0.0, "must be > 0")?;
        check("baseImageScale", self.base_image_scale, |v| v > 0.0, "must be > 0")?;
        check("hoverScale", self.hover_scale, |v| v > 0.0, "must be > 0")?;
        check("autoRotateSpeed", self.auto_rotate_speed, |_| true, "")?;
        check("aspectRatio", self.aspect_ratio, |v| v > 0.0, "must be > 0")?;
        check("collisionPadding", self.collision_padding, |v| v >= 0.0, "must be >= 0")?;
        check("minImageScale", self.min_image_scale, |v| v > 0.0, "must be > 0")?;
        check("initialRotation[0]", self.initial_rotation[0], |_| true, "")?;
        check("initialRotation[1]", self.initial_rotation[1], |_| true, "")?;
        Ok(())
    }
}

fn check(
    name: &'static str,
    value: f32,
    ok: impl Fn(f32) -> bool,
    reason: &'static str,
) -> Result<()> {
    if !value.is_finite() {
        return Err(SphereError::InvalidParameter {
            name,
            value,
            reason: "must be finite",
        });
    }
    if !ok(value) {
        return Err(SphereError::InvalidParameter { name, value, reason });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_defaults_to_half_container() {
        let cfg = SphereConfig {
            container_size: 640.0,
            ..SphereConfig::default()
        };
        assert_eq!(cfg.radius(), 320.0);

        let cfg = SphereConfig {
            sphere_radius: Some(90.0),
            ..cfg
        };
        assert_eq!(cfg.radius(), 90.0);
    }

    #[test]
    fn degenerate_geometry_fails_fast() {
        let cfg = SphereConfig {
            container_size: 0.0,
            ..SphereConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(SphereError::InvalidContainerSize(_))));

        let cfg = SphereConfig {
            sphere_radius: Some(-4.0),
            ..SphereConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(SphereError::InvalidRadius(_))));

        let cfg = SphereConfig {
            container_size: f32::NAN,
            ..SphereConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn decay_out_of_range_is_rejected() {
        let cfg = SphereConfig {
            momentum_decay: 1.5,
            ..SphereConfig::default()
        };
        match cfg.validate() {
            Err(SphereError::InvalidParameter { name, .. }) => assert_eq!(name, "momentumDecay"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn json_uses_camel_case_and_defaults() {
        let json = r#"{ "containerSize": 500, "autoRotate": true, "collisionMode": "simultaneous" }"#;
        let cfg = SphereConfig::from_json_str(json, Path::new("inline.json")).unwrap();
        assert_eq!(cfg.container_size, 500.0);
        assert!(cfg.auto_rotate);
        assert_eq!(cfg.collision_mode, CollisionMode::Simultaneous);
        assert_eq!(cfg.drag_sensitivity, 0.5);
        assert_eq!(cfg.radius(), 250.0);
    }

    #[test]
    fn invalid_json_reports_origin() {
        let err = SphereConfig::from_json_str("{ nope", Path::new("bad.json")).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn presets_are_valid() {
        for name in ["default", "reach", "reach-mobile", "creators"] {
            let cfg = SphereConfig::preset(name).unwrap();
            cfg.validate().unwrap();
        }
        assert!(SphereConfig::preset("missing").is_none());
        assert_eq!(SphereConfig::creators().aspect_ratio, 3.0);
    }
}
