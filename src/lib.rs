//! Layout engine for a draggable sphere of images.
//!
//! Images are spread over a sphere with a jittered Fibonacci distribution,
//! rotated by pointer drags with inertia (and optional auto-rotation),
//! projected to the screen with depth fade and scaling, then shrunk where
//! neighbours overlap. Each frame yields a list of [`Placement`]s for any
//! rendering layer to draw.

pub mod angle;
pub mod animation;
pub mod collision;
pub mod config;
pub mod error;
pub mod image;
pub mod interaction;
pub mod layout;
pub mod motion;
pub mod placement;
pub mod projection;
pub mod sphere;

pub use animation::{AnimationHandle, FrameClock};
pub use config::{CollisionMode, SphereConfig};
pub use error::{Result, SphereError};
pub use image::ImageRecord;
pub use interaction::{PointerEvent, PointerOutcome};
pub use layout::SphericalPosition;
pub use motion::{MotionPhase, RotationState, VelocityState};
pub use placement::{Placement, RenderTarget};
pub use projection::WorldPosition;
pub use sphere::SphereGrid;
