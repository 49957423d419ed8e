// collision.rs — 屏幕空间两两重叠检测，重叠则缩小

use crate::config::CollisionMode;
use crate::projection::WorldPosition;

/// No single overlap shrinks an image below this fraction.
const MAX_REDUCTION: f32 = 0.4;
const OVERLAP_WEIGHT: f32 = 0.6;

#[derive(Debug, Clone, Copy)]
pub struct CollisionParams {
    /// Edge length in pixels at scale 1.
    pub base_image_size: f32,
    pub aspect_ratio: f32,
    pub padding: f32,
    pub min_scale: f32,
    pub mode: CollisionMode,
}

impl CollisionParams {
    /// Wide tiles collide on a radius halfway between height and width.
    fn collision_size(&self, scale: f32) -> f32 {
        self.base_image_size * scale * (1.0 + (self.aspect_ratio - 1.0) * 0.5)
    }

    /// Factor for `a` when it sits next to `b`; `None` if they do not overlap
    /// or share the exact same screen point.
    fn reduction(&self, a: &WorldPosition, a_scale: f32, b: &WorldPosition, b_scale: f32) -> Option<f32> {
        let distance = (a.x - b.x).hypot(a.y - b.y);
        let min_distance =
            (self.collision_size(a_scale) + self.collision_size(b_scale)) / 2.0 + self.padding;

        if distance > 0.0 && distance < min_distance {
            let overlap = min_distance - distance;
            Some((1.0 - (overlap / min_distance) * OVERLAP_WEIGHT).max(MAX_REDUCTION))
        } else {
            None
        }
    }
}

/// Shrink visible points that crowd each other. Hidden points are skipped
/// both as subjects and as neighbours.
pub fn resolve(positions: &mut [WorldPosition], params: &CollisionParams) {
    match params.mode {
        CollisionMode::Sequential => resolve_sequential(positions, params),
        CollisionMode::Simultaneous => resolve_simultaneous(positions, params),
    }
}

fn resolve_sequential(positions: &mut [WorldPosition], params: &CollisionParams) {
    for i in 0..positions.len() {
        if !positions[i].is_visible {
            continue;
        }

        let pos = positions[i];
        let mut adjusted = pos.scale;
        for (j, other) in positions.iter().enumerate() {
            if i == j || !other.is_visible {
                continue;
            }
            // 尺寸取进入内层循环前的值，与逐对累乘的缩减相互独立
            if let Some(r) = params.reduction(&pos, pos.scale, other, other.scale) {
                adjusted = adjusted.min(adjusted * r);
            }
        }
        positions[i].scale = adjusted.max(params.min_scale);
    }
}

fn resolve_simultaneous(positions: &mut [WorldPosition], params: &CollisionParams) {
    let scales: Vec<f32> = positions.iter().map(|p| p.scale).collect();
    let factors: Vec<f32> = positions
        .iter()
        .enumerate()
        .map(|(i, pos)| {
            if !pos.is_visible {
                return 1.0;
            }
            positions
                .iter()
                .enumerate()
                .filter(|(j, other)| *j != i && other.is_visible)
                .filter_map(|(j, other)| params.reduction(pos, scales[i], other, scales[j]))
                .fold(1.0, f32::min)
        })
        .collect();

    for (pos, factor) in positions.iter_mut().zip(factors) {
        if pos.is_visible {
            pos.scale = (pos.scale * factor).max(params.min_scale);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(i: usize, x: f32, y: f32, visible: bool) -> WorldPosition {
        WorldPosition {
            x,
            y,
            z: if visible { 50.0 } else { -80.0 },
            scale: 1.0,
            z_index: 1000,
            is_visible: visible,
            fade_opacity: if visible { 1.0 } else { 0.0 },
            original_index: i,
        }
    }

    fn params(mode: CollisionMode) -> CollisionParams {
        CollisionParams {
            base_image_size: 48.0,
            aspect_ratio: 1.0,
            padding: 25.0,
            min_scale: 0.25,
            mode,
        }
    }

    #[test]
    fn close_pair_shrinks() {
        for mode in [CollisionMode::Sequential, CollisionMode::Simultaneous] {
            let mut pts = vec![point(0, 0.0, 0.0, true), point(1, 30.0, 0.0, true)];
            resolve(&mut pts, &params(mode));
            assert!(pts[0].scale < 1.0 || pts[1].scale < 1.0, "{mode:?}");
            assert!(pts.iter().all(|p| p.scale >= 0.25));
        }
    }

    #[test]
    fn distant_pair_untouched() {
        let mut pts = vec![point(0, 0.0, 0.0, true), point(1, 500.0, 0.0, true)];
        resolve(&mut pts, &params(CollisionMode::Sequential));
        assert_eq!(pts[0].scale, 1.0);
        assert_eq!(pts[1].scale, 1.0);
    }

    #[test]
    fn sequential_compounds_left_to_right() {
        let mut seq = vec![point(0, 0.0, 0.0, true), point(1, 30.0, 0.0, true)];
        let mut sim = seq.clone();
        resolve(&mut seq, &params(CollisionMode::Sequential));
        resolve(&mut sim, &params(CollisionMode::Simultaneous));

        // min_distance = 48 + 25 = 73, overlap = 43 -> r = 1 - 43/73*0.6
        let r = 1.0 - (43.0 / 73.0) * 0.6;
        assert!((seq[0].scale - r).abs() < 1e-4);
        assert!((sim[0].scale - r).abs() < 1e-4);
        assert!((sim[1].scale - r).abs() < 1e-4);
        // 第二个点看到的是已缩小的第一个点，重叠更少
        assert!(seq[1].scale > sim[1].scale);
    }

    #[test]
    fn hidden_points_ignored() {
        let mut pts = vec![point(0, 0.0, 0.0, true), point(1, 1.0, 0.0, false)];
        pts[1].scale = 0.1;
        resolve(&mut pts, &params(CollisionMode::Sequential));
        assert_eq!(pts[0].scale, 1.0);
        assert_eq!(pts[1].scale, 0.1);
    }

    #[test]
    fn coincident_points_stay_finite() {
        for mode in [CollisionMode::Sequential, CollisionMode::Simultaneous] {
            let mut pts = vec![point(0, 12.0, 7.0, true), point(1, 12.0, 7.0, true)];
            resolve(&mut pts, &params(mode));
            for p in &pts {
                assert!(p.scale.is_finite());
                assert_eq!(p.scale, 1.0);
            }
        }
    }

    #[test]
    fn crowd_never_drops_below_floor() {
        let mut pts: Vec<_> = (0..20)
            .map(|i| point(i, i as f32 * 0.5, 0.0, true))
            .collect();
        resolve(&mut pts, &params(CollisionMode::Sequential));
        assert!(pts.iter().all(|p| p.scale >= 0.25 && p.scale.is_finite()));
    }
}
