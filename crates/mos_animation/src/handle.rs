//! Animation engine contract
//!
//! The trigger engine never interpolates anything itself. It asks an
//! [`AnimationEngine`] to build an [`AnimationHandle`] for an element and then
//! drives that handle: play, pause, reverse via a negative speed, jump to the
//! end, and wait for the finished notification.
//!
//! Handle methods take `&self`; implementations use interior mutability the
//! way browser animation objects do.

use crate::easing::Easing;
use crate::error::Result;
use crate::keyframe::KeyframeSpec;

/// Callback invoked once when a playback finishes or is interrupted
///
/// Implementations must never invoke it synchronously from inside a handle
/// method; delivery happens on a later turn (promise semantics).
pub type FinishCallback = Box<dyn FnOnce(Result<()>)>;

/// How keyframe values apply outside the active interval
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillMode {
    None,
    Forwards,
    Backwards,
    #[default]
    Both,
}

impl FillMode {
    /// CSS / Web Animations keyword
    pub fn as_css(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Forwards => "forwards",
            Self::Backwards => "backwards",
            Self::Both => "both",
        }
    }
}

/// Timing options passed to [`AnimationEngine::animate`]
#[derive(Clone, Debug, PartialEq)]
pub struct AnimateOptions {
    /// Duration in seconds
    pub duration: f64,
    /// Start delay in seconds
    pub delay: f64,
    pub easing: Easing,
    pub fill: FillMode,
}

impl Default for AnimateOptions {
    fn default() -> Self {
        Self {
            duration: 0.4,
            delay: 0.0,
            easing: Easing::default(),
            fill: FillMode::Both,
        }
    }
}

/// Playback controller for one element's animation
pub trait AnimationHandle {
    /// Start or resume playback in the current speed direction
    fn play(&self) -> Result<()>;

    /// Pause without moving the clock
    fn pause(&self) -> Result<()>;

    /// Halt permanently; later `play` calls are ignored
    fn stop(&self) -> Result<()>;

    /// Jump to the end state of the current direction
    fn complete(&self) -> Result<()>;

    /// Playback rate, negative when running backwards
    fn speed(&self) -> f64;

    fn set_speed(&self, speed: f64) -> Result<()>;

    /// Clock position in seconds, delay included
    fn time(&self) -> f64;

    fn set_time(&self, seconds: f64) -> Result<()>;

    /// Register a callback for the next time playback finishes
    fn on_finished(&self, callback: FinishCallback);
}

/// Factory building animation handles for a target type
pub trait AnimationEngine<T> {
    fn animate(
        &self,
        target: &T,
        keyframes: &KeyframeSpec,
        options: &AnimateOptions,
    ) -> Result<Box<dyn AnimationHandle>>;
}

impl<T, F> AnimationEngine<T> for F
where
    F: Fn(&T, &KeyframeSpec, &AnimateOptions) -> Result<Box<dyn AnimationHandle>>,
{
    fn animate(
        &self,
        target: &T,
        keyframes: &KeyframeSpec,
        options: &AnimateOptions,
    ) -> Result<Box<dyn AnimationHandle>> {
        self(target, keyframes, options)
    }
}
