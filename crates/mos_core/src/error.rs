//! Error types for mos_core

use mos_animation::AnimationError;
use thiserror::Error;

/// Errors surfaced by session setup and configuration
///
/// The scroll path never returns these to the host; per-element failures are
/// logged and isolated by the trigger engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MosError {
    /// A configuration value is out of range or unparseable
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// `register_animation_factory` was called with a blank name
    #[error("animation factory name must not be empty")]
    EmptyFactoryName,

    /// Animation layer failure
    #[error(transparent)]
    Animation(#[from] AnimationError),

    /// The session was re-entered while already handling a call
    #[error("session is busy handling another call")]
    SessionBusy,
}

impl From<serde_json::Error> for MosError {
    fn from(err: serde_json::Error) -> Self {
        MosError::InvalidConfig(err.to_string())
    }
}

/// Result type for mos_core operations
pub type Result<T> = std::result::Result<T, MosError>;
