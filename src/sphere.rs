// sphere.rs — 球形图片网格：布局、运动、投影、碰撞与交互的组合

use crate::animation::AnimationHandle;
use crate::collision::{self, CollisionParams};
use crate::config::SphereConfig;
use crate::error::{Result, SphereError};
use crate::image::{ensure_unique_ids, ImageRecord};
use crate::interaction::{PointerEvent, PointerOutcome, PressTracker};
use crate::layout::{generate_positions, SphericalPosition};
use crate::motion::{MotionController, MotionPhase, RotationState, VelocityState};
use crate::placement::{self, Placement, RenderTarget};
use crate::projection::{self, WorldPosition};
use glam::Vec2;
use rand::Rng;

/// A draggable sphere of images. Owns all per-instance state; the host
/// calls [`SphereGrid::tick`] once per display frame and reads
/// [`SphereGrid::placements`] to draw.
#[derive(Debug, Clone)]
pub struct SphereGrid {
    config: SphereConfig,
    images: Vec<ImageRecord>,
    positions: Vec<SphericalPosition>,
    motion: MotionController,
    press: PressTracker,
    hovered: Option<usize>,
    selected: Option<usize>,
}

impl SphereGrid {
    pub fn new(images: Vec<ImageRecord>, config: SphereConfig) -> Result<Self> {
        Self::with_rng(images, config, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng>(
        images: Vec<ImageRecord>,
        config: SphereConfig,
        rng: &mut R,
    ) -> Result<Self> {
        config.validate()?;
        ensure_unique_ids(&images)?;

        let positions = generate_positions(images.len(), config.radius(), rng);
        let motion = MotionController::new(&config);
        log::debug!(
            "sphere grid ready: {} images, container {}px, radius {}px",
            images.len(),
            config.container_size,
            config.radius()
        );

        Ok(Self {
            config,
            images,
            positions,
            motion,
            press: PressTracker::default(),
            hovered: None,
            selected: None,
        })
    }

    pub fn config(&self) -> &SphereConfig {
        &self.config
    }

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn positions(&self) -> &[SphericalPosition] {
        &self.positions
    }

    pub fn rotation(&self) -> RotationState {
        self.motion.rotation()
    }

    pub fn velocity(&self) -> VelocityState {
        self.motion.velocity()
    }

    pub fn phase(&self) -> MotionPhase {
        self.motion.phase()
    }

    pub fn set_rotation(&mut self, pitch: f32, yaw: f32) {
        self.motion.set_rotation(pitch, yaw);
    }

    /// Replace the image set. Positions are regenerated from scratch and
    /// hover/selection are cleared; rotation is kept.
    pub fn set_images(&mut self, images: Vec<ImageRecord>) -> Result<()> {
        self.set_images_with_rng(images, &mut rand::thread_rng())
    }

    pub fn set_images_with_rng<R: Rng>(&mut self, images: Vec<ImageRecord>, rng: &mut R) -> Result<()> {
        ensure_unique_ids(&images)?;
        self.positions = generate_positions(images.len(), self.config.radius(), rng);
        self.images = images;
        self.hovered = None;
        self.selected = None;
        Ok(())
    }

    /// Swap in a new configuration. Positions are regenerated only when the
    /// effective radius changes.
    pub fn set_config(&mut self, config: SphereConfig) -> Result<()> {
        config.validate()?;
        let regenerate = config.radius() != self.config.radius();
        self.motion.reconfigure(&config);
        self.config = config;
        if regenerate {
            self.positions =
                generate_positions(self.images.len(), self.config.radius(), &mut rand::thread_rng());
        }
        Ok(())
    }

    pub fn set_sphere_radius(&mut self, radius: f32) -> Result<()> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(SphereError::InvalidRadius(radius));
        }
        if self.config.radius() == radius {
            self.config.sphere_radius = Some(radius);
            return Ok(());
        }
        self.config.sphere_radius = Some(radius);
        self.positions = generate_positions(self.images.len(), radius, &mut rand::thread_rng());
        Ok(())
    }

    pub fn begin_drag(&mut self, pointer: Vec2) {
        self.motion.begin_drag(pointer);
    }

    pub fn update_drag(&mut self, pointer: Vec2) {
        self.motion.update_drag(pointer);
    }

    pub fn end_drag(&mut self) {
        self.motion.end_drag();
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> PointerOutcome {
        match event {
            PointerEvent::Down(p) | PointerEvent::TouchStart(Some(p)) => {
                self.motion.begin_drag(p);
                self.press.press(p);
                PointerOutcome::DragStarted
            }
            PointerEvent::Move(p) | PointerEvent::TouchMove(Some(p)) => {
                if !self.motion.is_dragging() {
                    return PointerOutcome::None;
                }
                self.motion.update_drag(p);
                self.press.moved(p);
                PointerOutcome::Dragged
            }
            PointerEvent::Up | PointerEvent::TouchEnd => {
                self.motion.end_drag();
                match self.press.release() {
                    None => PointerOutcome::None,
                    Some(true) => match self.hovered {
                        Some(i) => {
                            self.select(i);
                            PointerOutcome::Clicked
                        }
                        None => PointerOutcome::Released,
                    },
                    Some(false) => PointerOutcome::Released,
                }
            }
            PointerEvent::TouchStart(None) | PointerEvent::TouchMove(None) => {
                log::warn!("touch event without a touch point ignored");
                PointerOutcome::None
            }
        }
    }

    /// Advance rotation by `dt` frames.
    pub fn tick(&mut self, dt: f32) {
        self.motion.tick(dt);
    }

    /// Projected, collision-adjusted positions for every image, in list order.
    pub fn world_positions(&self) -> Vec<WorldPosition> {
        let radius = self.config.radius();
        let mut world = projection::project_all(&self.positions, &self.motion.rotation(), radius);

        let params = CollisionParams {
            base_image_size: self.config.base_image_size(),
            aspect_ratio: self.config.aspect_ratio,
            padding: self.config.collision_padding,
            min_scale: self.config.min_image_scale,
            mode: self.config.collision_mode,
        };
        collision::resolve(&mut world, &params);

        for w in &mut world {
            w.scale = w.scale.max(self.config.min_image_scale);
        }
        world
    }

    /// Visible images as draw rectangles, back to front.
    pub fn placements(&self) -> Vec<Placement> {
        let mut out: Vec<Placement> = self
            .world_positions()
            .iter()
            .filter(|w| w.is_visible)
            .map(|w| {
                let id = &self.images[w.original_index].id;
                placement::place(w, id, self.hovered == Some(w.original_index), &self.config)
            })
            .collect();
        out.sort_by_key(|p| p.z_index);
        log::trace!("frame: {}/{} images visible", out.len(), self.images.len());
        out
    }

    /// One animation step: tick, then hand the frame to `target`.
    pub fn render_frame<T: RenderTarget + ?Sized>(&mut self, dt: f32, target: &mut T) {
        self.tick(dt);
        target.render(&self.placements());
    }

    /// Like [`Self::render_frame`], unless `handle` has been cancelled.
    /// Returns whether the host should schedule another frame.
    pub fn run_frame<T: RenderTarget + ?Sized>(
        &mut self,
        handle: &AnimationHandle,
        dt: f32,
        target: &mut T,
    ) -> bool {
        if handle.is_cancelled() {
            return false;
        }
        self.render_frame(dt, target);
        !handle.is_cancelled()
    }

    /// Topmost visible image under a container-local point.
    pub fn hit_test(&self, point: Vec2) -> Option<usize> {
        self.placements()
            .iter()
            .rev()
            .find(|p| p.contains(point))
            .map(|p| p.index)
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn set_hovered(&mut self, index: Option<usize>) {
        self.hovered = index.filter(|&i| i < self.images.len());
    }

    /// Hover whatever lies under `point` (container-local); clears on miss.
    pub fn hover_at(&mut self, point: Vec2) -> Option<usize> {
        let hit = self.hit_test(point);
        self.hovered = hit;
        hit
    }

    /// Open the detail view for an image.
    pub fn select(&mut self, index: usize) -> Option<&ImageRecord> {
        let img = self.images.get(index)?;
        log::debug!("selected image {} ({})", index, img.id);
        self.selected = Some(index);
        Some(img)
    }

    pub fn selected(&self) -> Option<&ImageRecord> {
        self.selected.and_then(|i| self.images.get(i))
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }
}
