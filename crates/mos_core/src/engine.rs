//! Scroll-trigger engine
//!
//! Maps the current scroll position onto play/reverse calls for every tracked
//! element. The decision itself is the pure [`decide`] function; the engine
//! applies it and keeps one failing element from affecting the rest.

use crate::config::ElementConfig;
use crate::controller::{AnimationController, CompletionRouter};
use crate::dom::Document;
use crate::error::Result;
use crate::position::is_above_document_viewport;
use crate::registry::{ElementRegistry, TrackedElement};

/// What a tick should do with one element
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerAction {
    Reverse,
    PlayForward,
    Keep,
}

/// Trigger policy, first matching rule wins:
///
/// 1. past an enabled trigger-out of a mirrored, repeatable element: reverse
/// 2. past trigger-in: play forward
/// 3. animated, repeatable and back above trigger-in: reverse
/// 4. otherwise leave it
///
/// Rule 1 precedes rule 2 because a short element can be past both
/// thresholds at once.
pub fn decide(
    config: &ElementConfig,
    trigger_in: f64,
    trigger_out: Option<f64>,
    animated: bool,
    scroll_y: f64,
) -> TriggerAction {
    if let Some(out) = trigger_out {
        if config.mirror && !config.once && scroll_y >= out {
            return TriggerAction::Reverse;
        }
    }
    if scroll_y >= trigger_in {
        TriggerAction::PlayForward
    } else if animated && !config.once {
        TriggerAction::Reverse
    } else {
        TriggerAction::Keep
    }
}

/// Elements already scrolled past on load show their end state, unless they
/// mirror, in which case they are armed like any other element. Once-only
/// elements never mirror.
fn place_initial<D: Document>(
    document: &D,
    controller: &AnimationController<D::Element>,
    entry: &mut TrackedElement<D::Element>,
) -> Result<()> {
    if !entry.config.mirror_enabled() && is_above_document_viewport(document, &entry.element) {
        controller.complete_instantly(entry)
    } else {
        controller.arm_initial(entry)
    }
}

/// Counters from one tick, for logging and tests
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub evaluated: usize,
    pub played: usize,
    pub reversed: usize,
    pub failed: usize,
}

/// Borrowed view over a session's parts for the duration of one pass
pub struct ScrollTriggerEngine<'a, D: Document> {
    pub document: &'a D,
    pub registry: &'a mut ElementRegistry<D::Element>,
    pub controller: &'a AnimationController<D::Element>,
    pub router: &'a CompletionRouter<D::Element>,
}

impl<'a, D: Document> ScrollTriggerEngine<'a, D> {
    /// Evaluate every element against the current scroll position
    pub fn on_scroll_tick(&mut self) -> TickReport {
        let scroll_y = self.document.scroll_y();
        let mut report = TickReport::default();

        for entry in self.registry.get_all_mut() {
            report.evaluated += 1;
            let action = decide(
                &entry.config,
                entry.trigger_in,
                entry.trigger_out,
                entry.animated,
                scroll_y,
            );

            let result = match action {
                TriggerAction::Reverse => {
                    let was_reversing = entry.reversing;
                    let result = self.controller.reverse(entry, self.router);
                    if entry.reversing && !was_reversing {
                        report.reversed += 1;
                    }
                    result
                }
                TriggerAction::PlayForward => {
                    let was_animated = entry.animated && !entry.reversing;
                    let result = self.controller.play_forward(entry, self.router);
                    if entry.animated && !was_animated {
                        report.played += 1;
                    }
                    result
                }
                TriggerAction::Keep => Ok(()),
            };

            if let Err(err) = result {
                report.failed += 1;
                tracing::warn!("scroll tick failed for {:?}: {}", entry.element, err);
            }
        }

        if report.played + report.reversed + report.failed > 0 {
            tracing::trace!("tick at {}: {:?}", scroll_y, report);
        }
        report
    }

    /// Recompute thresholds, arm or complete every element, then tick
    pub fn prepare_and_evaluate(&mut self) -> TickReport {
        for entry in self.registry.get_all_mut() {
            entry.refresh_triggers(self.document);
            if let Err(err) = place_initial(self.document, self.controller, entry) {
                tracing::warn!("initial placement failed for {:?}: {}", entry.element, err);
            }
        }
        self.on_scroll_tick()
    }

    /// Recompute thresholds only, then tick
    pub fn recalculate_positions(&mut self) -> TickReport {
        for entry in self.registry.get_all_mut() {
            entry.refresh_triggers(self.document);
        }
        self.on_scroll_tick()
    }
}
