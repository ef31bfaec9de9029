//! MOS Core
//!
//! The scroll-driven trigger engine. Tracks every element carrying the
//! `data-mos` attribute, computes the scroll positions at which each one
//! should animate in and out, and drives an injected animation engine as the
//! page scrolls.
//!
//! # Modules
//!
//! - [`position`]: document offsets and trigger thresholds
//! - [`tracker`]: scroll direction plus the throttle/debounce state machines
//! - [`registry`]: the tracked-element list and per-element state
//! - [`controller`]: handle creation and the play/reverse lifecycle
//! - [`engine`]: the per-tick trigger policy
//! - [`watcher`]: DOM mutation filtering
//! - [`session`]: [`ScrollAnimationSession`], tying it all together
//!
//! Hosts provide the DOM through the [`Document`]/[`DomElement`] traits and an
//! [`AnimationEngine`](mos_animation::AnimationEngine) for the visuals.

pub mod config;
pub mod controller;
pub mod dom;
pub mod engine;
pub mod error;
pub mod position;
pub mod registry;
pub mod session;
pub mod tracker;
pub mod watcher;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{resolve_element_config, ElementConfig, GlobalConfig, TimeUnit};
pub use controller::{AnimationController, AnimationFactory, Completion, CompletionRouter};
pub use dom::{Document, DomElement, TRIGGER_ATTRIBUTE};
pub use engine::{decide, ScrollTriggerEngine, TickReport, TriggerAction};
pub use error::{MosError, Result};
pub use position::{AnchorPlacement, Offset, TriggerPoints};
pub use registry::{AnimationState, ElementRegistry, TrackedElement, TrackedSnapshot};
pub use session::{ListenerChanges, ScrollAnimationSession, ScrollSchedule};
pub use tracker::{Debounce, ScrollDirection, ScrollTracker, Throttle, ThrottleDecision};
pub use watcher::DomChangeWatcher;
