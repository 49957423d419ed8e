use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sphere_grid::collision::{self, CollisionParams};
use sphere_grid::projection::{self, FADE_ZONE_END};
use sphere_grid::{
    CollisionMode, ImageRecord, MotionPhase, PointerEvent, RotationState, SphereConfig,
    SphereGrid, SphericalPosition,
};

fn images(n: usize) -> Vec<ImageRecord> {
    (0..n)
        .map(|i| ImageRecord::new(format!("creator-{i}"), format!("creators/{i}.png"), ""))
        .collect()
}

fn angle_diff(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

#[test]
fn single_image_drag_yaw_is_clamped() {
    let cfg = SphereConfig {
        initial_rotation: [0.0, 0.0],
        ..SphereConfig::default()
    };
    let (sensitivity, max_speed) = (cfg.drag_sensitivity, cfg.max_rotation_speed);
    let mut grid = SphereGrid::new(images(1), cfg).unwrap();

    // 每像素 0.5°：180px 想转 90°，但单步被限制在 5°
    grid.handle_pointer(PointerEvent::Down(Vec2::new(0.0, 0.0)));
    grid.handle_pointer(PointerEvent::Move(Vec2::new(180.0, 0.0)));
    let expected = (180.0 * sensitivity).min(max_speed);
    assert!((grid.rotation().y - expected).abs() < 1e-5);
    assert_eq!(grid.rotation().x, 0.0);

    // 小步拖动则按比例转动
    grid.handle_pointer(PointerEvent::Move(Vec2::new(186.0, 0.0)));
    assert!((grid.rotation().y - (expected + 6.0 * sensitivity)).abs() < 1e-5);

    grid.handle_pointer(PointerEvent::Up);
    assert_eq!(grid.phase(), MotionPhase::Coasting);
}

#[test]
fn creators_sphere_auto_rotates_full_turn() {
    let cfg = SphereConfig {
        auto_rotate: true,
        auto_rotate_speed: 1.0,
        ..SphereConfig::creators()
    };
    let mut grid = SphereGrid::new(images(14), cfg).unwrap();
    let start = grid.rotation();

    for _ in 0..360 {
        grid.tick(1.0);
        let r = grid.rotation();
        assert!(r.y > -180.0 && r.y <= 180.0);
    }

    assert!(angle_diff(grid.rotation().y, start.y) < 1e-2);
    assert_eq!(grid.rotation().x, start.x);
    assert_eq!(grid.phase(), MotionPhase::AutoRotating);
}

#[test]
fn drag_overrides_auto_rotate() {
    let cfg = SphereConfig {
        auto_rotate: true,
        ..SphereConfig::default()
    };
    let mut grid = SphereGrid::new(images(14), cfg).unwrap();
    grid.handle_pointer(PointerEvent::TouchStart(Some(Vec2::new(50.0, 50.0))));
    let held = grid.rotation();
    for _ in 0..30 {
        grid.tick(1.0);
    }
    assert_eq!(grid.rotation(), held);
    grid.handle_pointer(PointerEvent::TouchEnd);
    grid.tick(1.0);
    assert_ne!(grid.rotation(), held);
}

#[test]
fn coasting_velocity_never_grows() {
    let mut grid = SphereGrid::new(images(8), SphereConfig::default()).unwrap();
    grid.handle_pointer(PointerEvent::Down(Vec2::ZERO));
    grid.handle_pointer(PointerEvent::Move(Vec2::new(9.0, 13.0)));
    grid.handle_pointer(PointerEvent::Up);

    let mut prev = grid.velocity().magnitude();
    for _ in 0..300 {
        grid.tick(1.0);
        let v = grid.velocity().magnitude();
        assert!(v <= prev);
        prev = v;
    }
    assert_eq!(prev, 0.0);
}

#[test]
fn points_behind_fade_zone_are_hidden() {
    let mut grid = SphereGrid::with_rng(
        images(60),
        SphereConfig::default(),
        &mut StdRng::seed_from_u64(1),
    )
    .unwrap();

    for step in 0..12 {
        grid.set_rotation(step as f32 * 30.0 - 180.0, step as f32 * 17.0);
        let world = grid.world_positions();
        assert!(world.iter().any(|w| !w.is_visible));
        for w in &world {
            if w.z < FADE_ZONE_END {
                assert!(!w.is_visible);
                assert_eq!(w.fade_opacity, 0.0);
            }
            assert!(w.scale >= grid.config().min_image_scale);
        }
        let hidden: Vec<usize> = world
            .iter()
            .filter(|w| !w.is_visible)
            .map(|w| w.original_index)
            .collect();
        assert!(grid.placements().iter().all(|p| !hidden.contains(&p.index)));
    }
}

fn collision_params(mode: CollisionMode) -> CollisionParams {
    let cfg = SphereConfig::default();
    CollisionParams {
        base_image_size: cfg.base_image_size(),
        aspect_ratio: cfg.aspect_ratio,
        padding: cfg.collision_padding,
        min_scale: cfg.min_image_scale,
        mode,
    }
}

#[test]
fn near_neighbours_shrink_but_respect_floor() {
    let positions = [
        SphericalPosition { theta: 90.0, phi: 90.0, radius: 200.0 },
        SphericalPosition { theta: 93.0, phi: 88.0, radius: 200.0 },
    ];
    let rotation = RotationState::default();

    for mode in [CollisionMode::Sequential, CollisionMode::Simultaneous] {
        let before = projection::project_all(&positions, &rotation, 200.0);
        let mut after = before.clone();
        collision::resolve(&mut after, &collision_params(mode));

        assert!(after[0].scale < before[0].scale || after[1].scale < before[1].scale);
        assert!(after.iter().all(|w| w.scale >= 0.25));
    }
}

#[test]
fn identical_positions_stay_finite() {
    let same = SphericalPosition { theta: 45.0, phi: 80.0, radius: 200.0 };
    let before = projection::project_all(&[same, same], &RotationState::default(), 200.0);
    assert!(before.iter().all(|w| w.is_visible));

    for mode in [CollisionMode::Sequential, CollisionMode::Simultaneous] {
        let mut after = before.clone();
        collision::resolve(&mut after, &collision_params(mode));
        for (a, b) in after.iter().zip(&before) {
            assert!(a.scale.is_finite());
            assert!(a.scale >= 0.25);
            assert_eq!(a.scale, b.scale.max(0.25));
        }
    }
}

#[test]
fn placements_stay_inside_a_padded_container() {
    let cfg = SphereConfig::reach(false);
    let size = cfg.container_size;
    let mut grid = SphereGrid::new(images(20), cfg).unwrap();
    for _ in 0..120 {
        grid.tick(1.0);
        for p in grid.placements() {
            let c = p.center();
            assert!(c.x >= 0.0 && c.x <= size);
            assert!(c.y >= 0.0 && c.y <= size);
            assert!(p.opacity > 0.0 && p.opacity <= 1.0);
        }
    }
}
