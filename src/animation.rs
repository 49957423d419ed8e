// animation.rs — 帧时钟与取消标志

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Reference cadence: one frame unit per 1/60 s.
pub const FRAME_RATE: f32 = 60.0;
/// Longest step taken after a stall (e.g. window dragged or minimized).
pub const MAX_FRAME_STEP: f32 = 4.0;

/// Cancels a running animation. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct AnimationHandle {
    cancelled: Arc<AtomicBool>,
}

impl AnimationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Converts wall-clock time between redraws into frame units.
#[derive(Debug)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Frames elapsed since the previous call; the first call yields 1.0.
    pub fn step(&mut self, now: Instant) -> f32 {
        let dt = match self.last {
            Some(prev) => frames_between(now.saturating_duration_since(prev)),
            None => 1.0,
        };
        self.last = Some(now);
        dt
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

pub fn frames_between(elapsed: Duration) -> f32 {
    (elapsed.as_secs_f32() * FRAME_RATE).min(MAX_FRAME_STEP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_shared() {
        let h = AnimationHandle::new();
        let other = h.clone();
        assert!(!other.is_cancelled());
        h.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn clock_measures_frames() {
        let mut c = FrameClock::new();
        let t0 = Instant::now();
        assert_eq!(c.step(t0), 1.0);
        let dt = c.step(t0 + Duration::from_millis(50));
        assert!((dt - 3.0).abs() < 1e-3);
        // 卡顿后的步长有上限
        assert_eq!(c.step(t0 + Duration::from_secs(10)), MAX_FRAME_STEP);
    }
}
