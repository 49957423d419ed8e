// placement.rs — 渲染层契约：每帧每张可见图片的 2D 矩形

use crate::config::SphereConfig;
use crate::projection::WorldPosition;
use glam::Vec2;

/// Stacking bonus that lifts the hovered tile above every other.
pub const HOVER_Z_BOOST: i32 = 1000;

/// Where and how to draw one visible image, in container-local pixels
/// (origin at the top-left of the square viewport).
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Index into the image list.
    pub index: usize,
    pub id: String,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    /// Layout scale after depth and collision adjustment.
    pub scale: f32,
    pub opacity: f32,
    pub z_index: i32,
    pub hovered: bool,
    /// Extra transform for the hovered tile around its center; 1.0 otherwise.
    pub hover_scale: f32,
}

impl Placement {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.left + self.width * 0.5, self.top + self.height * 0.5)
    }

    /// Rectangle after the hover transform, as (min, max).
    pub fn drawn_rect(&self) -> (Vec2, Vec2) {
        let half = Vec2::new(self.width, self.height) * 0.5 * self.hover_scale;
        let c = self.center();
        (c - half, c + half)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let (min, max) = self.drawn_rect();
        point.cmpge(min).all() && point.cmple(max).all()
    }
}

/// Anything that can draw a frame of placements.
pub trait RenderTarget {
    /// `placements` holds visible images only, sorted back to front.
    fn render(&mut self, placements: &[Placement]);
}

pub(crate) fn place(
    world: &WorldPosition,
    id: &str,
    hovered: bool,
    cfg: &SphereConfig,
) -> Placement {
    let height = cfg.base_image_size() * world.scale;
    let width = height * cfg.aspect_ratio;
    let half = cfg.container_size * 0.5;

    // 悬停时放大，但不超过 hover_scale 倍的基准尺寸
    let hover_scale = if hovered {
        cfg.hover_scale.min(cfg.hover_scale / world.scale)
    } else {
        1.0
    };

    Placement {
        index: world.original_index,
        id: id.to_string(),
        left: half + world.x - width * 0.5,
        top: half + world.y - height * 0.5,
        width,
        height,
        scale: world.scale,
        opacity: world.fade_opacity,
        z_index: world.z_index + if hovered { HOVER_Z_BOOST } else { 0 },
        hovered,
        hover_scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world(scale: f32) -> WorldPosition {
        WorldPosition {
            x: 10.0,
            y: -20.0,
            z: 40.0,
            scale,
            z_index: 1040,
            is_visible: true,
            fade_opacity: 0.8,
            original_index: 3,
        }
    }

    #[test]
    fn placement_is_centered_on_projection() {
        let cfg = SphereConfig::default(); // 400px, 0.12 -> 48px
        let p = place(&world(0.5), "img", false, &cfg);
        let close = |a: f32, b: f32| (a - b).abs() < 1e-3;
        assert!(close(p.width, 24.0) && close(p.height, 24.0));
        assert!((p.center() - Vec2::new(210.0, 180.0)).length() < 1e-3);
        assert!(close(p.left, 198.0));
        assert!(close(p.top, 168.0));
        assert_eq!(p.z_index, 1040);
        assert_eq!(p.opacity, 0.8);
        assert_eq!(p.hover_scale, 1.0);
        assert_eq!(p.index, 3);
    }

    #[test]
    fn aspect_ratio_widens_tiles() {
        let cfg = SphereConfig::creators();
        let p = place(&world(1.0), "logo", false, &cfg);
        assert!((p.width - p.height * 3.0).abs() < 1e-3);
    }

    #[test]
    fn hover_boosts_scale_and_stacking() {
        let cfg = SphereConfig::default();
        let small = place(&world(0.5), "a", true, &cfg);
        assert_eq!(small.hover_scale, 1.2);
        assert_eq!(small.z_index, 1040 + HOVER_Z_BOOST);

        // 已经很大的图片只放大到 hover_scale 倍基准尺寸
        let big = place(&world(1.1), "b", true, &cfg);
        assert!((big.hover_scale - 1.2 / 1.1).abs() < 1e-6);
    }

    #[test]
    fn contains_uses_hovered_rect() {
        let cfg = SphereConfig::default();
        let p = place(&world(1.0), "a", false, &cfg);
        assert!(p.contains(p.center()));
        assert!(!p.contains(Vec2::new(p.left - 1.0, p.top)));
        let hovered = place(&world(1.0), "a", true, &cfg);
        assert!(hovered.contains(Vec2::new(p.left - 1.0, p.top)));
    }
}
