//! Animation error types

use thiserror::Error;

/// Errors produced by the animation layer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// An easing string could not be parsed
    #[error("invalid easing `{0}`")]
    InvalidEasing(String),

    /// A keyframe set has no tracks or non-finite values
    #[error("invalid keyframes: {0}")]
    InvalidKeyframes(String),

    /// The playback was stopped or removed before it finished
    #[error("animation interrupted before finishing")]
    Interrupted,

    /// The owning scheduler no longer exists
    #[error("animation scheduler was dropped")]
    SchedulerDropped,

    /// Failure reported by an external engine
    #[error("animation engine error: {0}")]
    Engine(String),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
