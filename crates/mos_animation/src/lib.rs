//! MOS Animation Layer
//!
//! Everything the scroll-trigger engine needs from an animation engine, and
//! nothing more.
//!
//! # Features
//!
//! - **Engine Contract**: [`AnimationEngine`] builds an [`AnimationHandle`]
//!   per element; handles play, pause, reverse (negative speed), complete and
//!   report when they finish
//! - **Easing**: CSS keywords, the back/sine/quad/cubic/quart families and
//!   `cubic-bezier(...)`, sampled or rendered back to CSS
//! - **Keyframes**: Two-point, multi-property keyframe sets
//! - **Presets**: The `fade`/`slide`/`zoom`/`flip` entrance catalog
//! - **Scheduler**: An in-process engine for hosts without a native one

pub mod easing;
pub mod error;
pub mod handle;
pub mod keyframe;
pub mod presets;
pub mod scheduler;
pub mod values;

pub use easing::Easing;
pub use error::{AnimationError, Result};
pub use handle::{AnimateOptions, AnimationEngine, AnimationHandle, FillMode, FinishCallback};
pub use keyframe::{AnimatedProperty, CssKeyframe, KeyframeSpec, PropertyTrack};
pub use presets::AnimationPreset;
pub use scheduler::{
    AnimationScheduler, PlaybackId, ScheduledAnimation, SchedulerEngine, SchedulerHandle,
};
pub use values::{FrameValues, Interpolate};
