// motion.rs — 旋转状态、拖拽输入与惯性衰减

use crate::angle;
use crate::config::SphereConfig;
use glam::Vec2;

/// Below this (per axis) a coasting sphere is considered stopped.
pub const VELOCITY_EPSILON: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    /// Pitch, degrees.
    pub x: f32,
    /// Yaw, degrees.
    pub y: f32,
    /// Roll. Never driven; kept at 0.
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocityState {
    pub x: f32,
    pub y: f32,
}

impl VelocityState {
    pub fn magnitude(&self) -> f32 {
        Vec2::new(self.x, self.y).length()
    }

    fn is_settled(&self) -> bool {
        self.x.abs() < VELOCITY_EPSILON && self.y.abs() < VELOCITY_EPSILON
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionPhase {
    Idle,
    Dragging,
    Coasting,
    AutoRotating,
}

/// Physics parameters copied out of [`SphereConfig`].
#[derive(Debug, Clone, Copy)]
struct MotionParams {
    drag_sensitivity: f32,
    momentum_decay: f32,
    max_rotation_speed: f32,
    auto_rotate: bool,
    auto_rotate_speed: f32,
}

impl From<&SphereConfig> for MotionParams {
    fn from(cfg: &SphereConfig) -> Self {
        Self {
            drag_sensitivity: cfg.drag_sensitivity,
            momentum_decay: cfg.momentum_decay,
            max_rotation_speed: cfg.max_rotation_speed,
            auto_rotate: cfg.auto_rotate,
            auto_rotate_speed: cfg.auto_rotate_speed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MotionController {
    params: MotionParams,
    rotation: RotationState,
    velocity: VelocityState,
    dragging: bool,
    last_pointer: Vec2,
}

impl MotionController {
    pub fn new(cfg: &SphereConfig) -> Self {
        let [pitch, yaw] = cfg.initial_rotation;
        Self {
            params: MotionParams::from(cfg),
            rotation: RotationState {
                x: angle::normalize(pitch),
                y: angle::normalize(yaw),
                z: 0.0,
            },
            velocity: VelocityState::default(),
            dragging: false,
            last_pointer: Vec2::ZERO,
        }
    }

    pub fn rotation(&self) -> RotationState {
        self.rotation
    }

    pub fn velocity(&self) -> VelocityState {
        self.velocity
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn phase(&self) -> MotionPhase {
        if self.dragging {
            MotionPhase::Dragging
        } else if !self.velocity.is_settled() {
            MotionPhase::Coasting
        } else if self.params.auto_rotate {
            MotionPhase::AutoRotating
        } else {
            MotionPhase::Idle
        }
    }

    /// Pick up new physics parameters; rotation and velocity carry over.
    pub fn reconfigure(&mut self, cfg: &SphereConfig) {
        self.params = MotionParams::from(cfg);
    }

    pub fn set_rotation(&mut self, pitch: f32, yaw: f32) {
        self.rotation.x = angle::normalize(pitch);
        self.rotation.y = angle::normalize(yaw);
    }

    fn clamp_speed(&self, speed: f32) -> f32 {
        let max = self.params.max_rotation_speed;
        speed.clamp(-max, max)
    }

    pub fn begin_drag(&mut self, pointer: Vec2) {
        self.dragging = true;
        self.velocity = VelocityState::default();
        self.last_pointer = pointer;
    }

    pub fn update_drag(&mut self, pointer: Vec2) {
        if !self.dragging {
            return;
        }

        let delta = pointer - self.last_pointer;
        // 指针没动：保留上一次的速度，松手后才能继续惯性滑动
        if delta == Vec2::ZERO {
            return;
        }
        let s = self.params.drag_sensitivity;
        // 屏幕向下拖 -> 俯仰角减小
        let dx = self.clamp_speed(-delta.y * s);
        let dy = self.clamp_speed(delta.x * s);

        self.rotation.x = angle::normalize(self.rotation.x + dx);
        self.rotation.y = angle::normalize(self.rotation.y + dy);
        self.velocity = VelocityState { x: dx, y: dy };
        self.last_pointer = pointer;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Advance one animation step. `dt` is in display frames (1.0 at 60 Hz).
    pub fn tick(&mut self, dt: f32) {
        if self.dragging || !(dt.is_finite() && dt > 0.0) {
            return;
        }

        // 先用本帧开始时的速度积分，再衰减
        let applied = self.velocity;
        let mut yaw = self.rotation.y + self.clamp_speed(applied.y) * dt;
        if self.params.auto_rotate {
            yaw += self.params.auto_rotate_speed * dt;
        }
        self.rotation.x = angle::normalize(self.rotation.x + self.clamp_speed(applied.x) * dt);
        self.rotation.y = angle::normalize(yaw);

        let decay = self.params.momentum_decay.powf(dt);
        self.velocity.x *= decay;
        self.velocity.y *= decay;
        if !self.params.auto_rotate && self.velocity.is_settled() {
            self.velocity = VelocityState::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> SphereConfig {
        SphereConfig {
            initial_rotation: [0.0, 0.0],
            ..SphereConfig::default()
        }
    }

    fn in_range(r: RotationState) -> bool {
        r.x > -180.0 && r.x <= 180.0 && r.y > -180.0 && r.y <= 180.0
    }

    #[test]
    fn starts_at_configured_rotation() {
        let m = MotionController::new(&SphereConfig::default());
        assert_eq!(m.rotation(), RotationState { x: 15.0, y: 15.0, z: 0.0 });
        assert_eq!(m.phase(), MotionPhase::Idle);
    }

    #[test]
    fn drag_maps_axes_and_clamps() {
        let mut m = MotionController::new(&cfg());
        m.begin_drag(Vec2::new(100.0, 100.0));
        // dx=4 -> yaw +2; dy=2 -> pitch -1
        m.update_drag(Vec2::new(104.0, 102.0));
        assert!((m.rotation().y - 2.0).abs() < 1e-5);
        assert!((m.rotation().x + 1.0).abs() < 1e-5);
        assert_eq!(m.velocity(), VelocityState { x: -1.0, y: 2.0 });

        // 大幅甩动被限制在 max_rotation_speed
        m.update_drag(Vec2::new(1104.0, 102.0));
        assert!((m.rotation().y - 7.0).abs() < 1e-5);
        assert_eq!(m.velocity().y, 5.0);
    }

    #[test]
    fn move_without_drag_is_ignored() {
        let mut m = MotionController::new(&cfg());
        m.update_drag(Vec2::new(500.0, 500.0));
        assert_eq!(m.rotation(), RotationState::default());
        m.end_drag();
        assert_eq!(m.phase(), MotionPhase::Idle);
    }

    #[test]
    fn stationary_move_keeps_flick_velocity() {
        let mut m = MotionController::new(&cfg());
        m.begin_drag(Vec2::ZERO);
        m.update_drag(Vec2::new(8.0, 0.0));
        m.update_drag(Vec2::new(8.0, 0.0));
        assert_eq!(m.velocity(), VelocityState { x: 0.0, y: 4.0 });
        assert!((m.rotation().y - 4.0).abs() < 1e-5);
        m.end_drag();
        assert_eq!(m.phase(), MotionPhase::Coasting);
    }

    #[test]
    fn tick_is_frozen_while_dragging() {
        let mut c = cfg();
        c.auto_rotate = true;
        let mut m = MotionController::new(&c);
        m.begin_drag(Vec2::ZERO);
        for _ in 0..10 {
            m.tick(1.0);
        }
        assert_eq!(m.rotation(), RotationState::default());
        assert_eq!(m.phase(), MotionPhase::Dragging);
    }

    #[test]
    fn coasting_decays_monotonically_to_rest() {
        let mut m = MotionController::new(&cfg());
        m.begin_drag(Vec2::ZERO);
        m.update_drag(Vec2::new(8.0, -6.0));
        m.end_drag();
        assert_eq!(m.phase(), MotionPhase::Coasting);

        let mut prev = m.velocity().magnitude();
        for _ in 0..500 {
            m.tick(1.0);
            let now = m.velocity().magnitude();
            assert!(now <= prev);
            assert!(in_range(m.rotation()));
            prev = now;
        }
        assert_eq!(m.velocity(), VelocityState::default());
        assert_eq!(m.phase(), MotionPhase::Idle);
    }

    #[test]
    fn rotation_stays_normalized_under_long_spins() {
        let mut c = cfg();
        c.auto_rotate = true;
        c.auto_rotate_speed = 7.3;
        let mut m = MotionController::new(&c);
        for i in 0..2000 {
            if i % 100 == 0 {
                m.begin_drag(Vec2::ZERO);
                m.update_drag(Vec2::new(i as f32, -(i as f32)));
                m.end_drag();
            }
            m.tick(1.0);
            assert!(in_range(m.rotation()), "{:?}", m.rotation());
        }
    }

    #[test]
    fn reconfigure_keeps_orientation() {
        let mut m = MotionController::new(&cfg());
        m.set_rotation(30.0, -45.0);
        let mut c = cfg();
        c.auto_rotate = true;
        m.reconfigure(&c);
        assert_eq!(m.rotation(), RotationState { x: 30.0, y: -45.0, z: 0.0 });
        assert_eq!(m.phase(), MotionPhase::AutoRotating);
    }

    #[test]
    fn fractional_frames_scale_motion() {
        let mut c = cfg();
        c.auto_rotate = true;
        c.auto_rotate_speed = 1.0;
        let mut m = MotionController::new(&c);
        m.tick(0.5);
        assert!((m.rotation().y - 0.5).abs() < 1e-5);
        m.tick(f32::NAN);
        m.tick(-1.0);
        assert!((m.rotation().y - 0.5).abs() < 1e-5);
    }
}
