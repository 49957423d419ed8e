// interaction.rs — 鼠标 / 触摸输入抽象

use glam::Vec2;

/// Pointer travel under which a press-release counts as a click.
pub const CLICK_SLOP: f32 = 4.0;

/// Input fed to [`crate::SphereGrid::handle_pointer`]. Positions are in any
/// consistent screen space; only deltas drive rotation. Touch events carry
/// the first touch point, which may be missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up,
    TouchStart(Option<Vec2>),
    TouchMove(Option<Vec2>),
    TouchEnd,
}

/// What a pointer event amounted to once the press is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    None,
    DragStarted,
    Dragged,
    Released,
    Clicked,
}

/// Tracks one press from down to up, to tell clicks from drags.
#[derive(Debug, Clone, Default)]
pub struct PressTracker {
    origin: Option<Vec2>,
    travel: f32,
    last: Vec2,
}

impl PressTracker {
    pub fn press(&mut self, at: Vec2) {
        self.origin = Some(at);
        self.travel = 0.0;
        self.last = at;
    }

    pub fn is_pressed(&self) -> bool {
        self.origin.is_some()
    }

    pub fn moved(&mut self, to: Vec2) {
        if self.origin.is_some() {
            self.travel += to.distance(self.last);
            self.last = to;
        }
    }

    /// Ends the press. `None` when there was no matching press.
    pub fn release(&mut self) -> Option<bool> {
        self.origin.take()?;
        Some(self.travel < CLICK_SLOP)
    }
}
