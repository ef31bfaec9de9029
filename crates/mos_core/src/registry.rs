//! Element registry
//!
//! A flat list of tracked elements. The scroll tick walks all of it, so a
//! `Vec` beats a keyed map; lookups by node (completion callbacks, resize)
//! are the cold path and scan linearly.

use std::fmt;

use mos_animation::AnimationHandle;

use crate::config::{resolve_element_config, ElementConfig, GlobalConfig};
use crate::dom::{Document, DomElement};
use crate::position::TriggerPoints;

/// Lifecycle state derived from an entry's flags
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationState {
    /// No handle created yet
    Unarmed,
    /// Handle paused at its start state
    Armed,
    PlayingForward,
    /// Forward playback reached its end
    CompletedForward,
    Reversing,
}

/// One tracked DOM node and everything known about it
pub struct TrackedElement<E> {
    pub element: E,
    pub config: ElementConfig,
    pub trigger_in: f64,
    /// `None` when mirroring is off or the animation is once-only
    pub trigger_out: Option<f64>,
    /// Forward animation started and not yet reversed to completion
    pub animated: bool,
    /// A reverse playback is in flight
    pub reversing: bool,
    pub(crate) forward_finished: bool,
    pub(crate) animation_handle: Option<Box<dyn AnimationHandle>>,
}

impl<E: DomElement> TrackedElement<E> {
    fn new(element: E, config: ElementConfig, points: TriggerPoints) -> Self {
        Self {
            element,
            config,
            trigger_in: points.trigger_in,
            trigger_out: points.trigger_out,
            animated: false,
            reversing: false,
            forward_finished: false,
            animation_handle: None,
        }
    }

    pub fn state(&self) -> AnimationState {
        if self.animation_handle.is_none() {
            AnimationState::Unarmed
        } else if self.reversing {
            AnimationState::Reversing
        } else if self.animated && self.forward_finished {
            AnimationState::CompletedForward
        } else if self.animated {
            AnimationState::PlayingForward
        } else {
            AnimationState::Armed
        }
    }

    pub fn has_handle(&self) -> bool {
        self.animation_handle.is_some()
    }

    pub fn handle(&self) -> Option<&dyn AnimationHandle> {
        self.animation_handle.as_deref()
    }

    /// Recompute thresholds against the current layout
    pub fn refresh_triggers<D: Document<Element = E>>(&mut self, document: &D) {
        let points = TriggerPoints::compute(document, &self.element, &self.config);
        self.trigger_in = points.trigger_in;
        self.trigger_out = points.trigger_out;
    }

    /// Detached copy for callers outside the session
    pub fn snapshot(&self) -> TrackedSnapshot<E> {
        TrackedSnapshot {
            element: self.element.clone(),
            config: self.config.clone(),
            trigger_in: self.trigger_in,
            trigger_out: self.trigger_out,
            animated: self.animated,
            reversing: self.reversing,
            state: self.state(),
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for TrackedElement<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedElement")
            .field("element", &self.element)
            .field("preset", &self.config.preset)
            .field("trigger_in", &self.trigger_in)
            .field("trigger_out", &self.trigger_out)
            .field("animated", &self.animated)
            .field("reversing", &self.reversing)
            .field("has_handle", &self.animation_handle.is_some())
            .finish()
    }
}

/// Point-in-time copy of a [`TrackedElement`]
#[derive(Clone, Debug)]
pub struct TrackedSnapshot<E> {
    pub element: E,
    pub config: ElementConfig,
    pub trigger_in: f64,
    pub trigger_out: Option<f64>,
    pub animated: bool,
    pub reversing: bool,
    pub state: AnimationState,
}

// ============================================================================
// Registry
// ============================================================================

/// Every tracked element of a session
pub struct ElementRegistry<E> {
    entries: Vec<TrackedElement<E>>,
}

impl<E: DomElement> ElementRegistry<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Replace the registry contents with entries built from `elements`
    ///
    /// Nodes without the trigger attribute and repeated nodes are skipped.
    /// Dropping the previous entries releases their animation handles.
    pub fn prepare<D: Document<Element = E>>(
        &mut self,
        document: &D,
        elements: Vec<E>,
        global: &GlobalConfig,
    ) -> &[TrackedElement<E>] {
        self.entries.clear();

        for element in elements {
            if self.find_by_element(&element).is_some() {
                tracing::debug!("skipping duplicate node {:?}", element);
                continue;
            }
            let Some(config) = resolve_element_config(&element, global) else {
                continue;
            };
            let points = TriggerPoints::compute(document, &element, &config);
            tracing::trace!(
                "prepared {:?} ({}): in={} out={:?}",
                element,
                config.id.as_deref().unwrap_or(&config.preset),
                points.trigger_in,
                points.trigger_out
            );
            self.entries.push(TrackedElement::new(element, config, points));
        }

        tracing::debug!("ElementRegistry: prepared {} elements", self.entries.len());
        &self.entries
    }

    pub fn find_by_element(&self, element: &E) -> Option<&TrackedElement<E>> {
        self.entries.iter().find(|e| e.element.is_same_node(element))
    }

    pub fn find_by_element_mut(&mut self, element: &E) -> Option<&mut TrackedElement<E>> {
        self.entries
            .iter_mut()
            .find(|e| e.element.is_same_node(element))
    }

    /// Live view of every entry
    pub fn get_all(&self) -> &[TrackedElement<E>] {
        &self.entries
    }

    /// Entries are mutable, the list itself is not
    pub fn get_all_mut(&mut self) -> &mut [TrackedElement<E>] {
        &mut self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E: DomElement> Default for ElementRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: fmt::Debug> fmt::Debug for ElementRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}
