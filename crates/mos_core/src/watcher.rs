//! DOM change watcher
//!
//! Decides whether a batch of DOM mutations touched tracked elements. The
//! browser host feeds it `MutationObserver` records; a positive answer
//! triggers a hard refresh.

use crate::dom::{DomElement, TRIGGER_ATTRIBUTE};

#[derive(Clone, Debug)]
pub struct DomChangeWatcher {
    enabled: bool,
}

impl DomChangeWatcher {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether any added or removed node is, or contains, a tracked element
    pub fn requires_refresh<E: DomElement>(&self, added: &[E], removed: &[E]) -> bool {
        if !self.enabled {
            return false;
        }
        added
            .iter()
            .chain(removed)
            .any(|node| {
                node.has_attribute(TRIGGER_ATTRIBUTE)
                    || node.has_descendant_with_attribute(TRIGGER_ATTRIBUTE)
            })
    }
}
