//! Scroll animation session
//!
//! Owns everything one page needs: document access, configuration, the
//! element registry, the animation controller and the scroll/resize rate
//! limiters. Hosts forward events to it and drive its timers.
//!
//! The session is a cheap `Rc` handle. Completion callbacks hold a weak
//! reference, so dropping the last session handle turns late notifications
//! into no-ops.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

use mos_animation::AnimationEngine;

use crate::config::GlobalConfig;
use crate::controller::{AnimationController, AnimationFactory, Completion, CompletionRouter};
use crate::dom::{Document, DomElement, TRIGGER_ATTRIBUTE};
use crate::engine::{ScrollTriggerEngine, TickReport};
use crate::error::{MosError, Result};
use crate::registry::{ElementRegistry, TrackedSnapshot};
use crate::tracker::{Debounce, ScrollDirection, ScrollTracker, Throttle, ThrottleDecision};
use crate::watcher::DomChangeWatcher;

/// What the host should do after forwarding a scroll event
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScrollSchedule {
    /// The tick ran immediately
    Ran(TickReport),
    /// Held back by the throttle; when `needs_timer` is set, call
    /// [`ScrollAnimationSession::flush_scroll`] at `fire_at_ms`
    Deferred { fire_at_ms: f64, needs_timer: bool },
    /// The session is disabled or not initialized
    Idle,
}

/// Which host listeners must be rebuilt after a config change
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListenerChanges {
    pub scroll: bool,
    pub resize: bool,
    pub mutations: bool,
}

impl ListenerChanges {
    pub fn any(&self) -> bool {
        self.scroll || self.resize || self.mutations
    }
}

struct SessionInner<D: Document> {
    document: D,
    config: GlobalConfig,
    registry: ElementRegistry<D::Element>,
    controller: AnimationController<D::Element>,
    tracker: ScrollTracker,
    scroll_throttle: Throttle<()>,
    resize_debounce: Debounce,
    watcher: DomChangeWatcher,
    initialized: bool,
}

impl<D: Document> SessionInner<D> {
    fn engine<'a>(&'a mut self, router: &'a CompletionRouter<D::Element>) -> ScrollTriggerEngine<'a, D> {
        ScrollTriggerEngine {
            document: &self.document,
            registry: &mut self.registry,
            controller: &self.controller,
            router,
        }
    }

    /// Rebuild the registry from a fresh document scan
    fn rescan(&mut self) -> usize {
        let elements = self.document.elements_with_attribute(TRIGGER_ATTRIBUTE);
        let entries = self.registry.prepare(&self.document, elements, &self.config);
        for entry in entries {
            entry.element.add_class(&self.config.init_class_name);
        }
        entries.len()
    }

    fn tick(&mut self, router: &CompletionRouter<D::Element>) -> TickReport {
        let scroll_y = self.document.scroll_y();
        self.tracker.record(scroll_y);
        self.engine(router).on_scroll_tick()
    }

    fn is_active(&self) -> bool {
        self.initialized && !self.config.disable
    }
}

/// One page's scroll animation state
pub struct ScrollAnimationSession<D: Document> {
    inner: Rc<RefCell<SessionInner<D>>>,
}

impl<D: Document> Clone for ScrollAnimationSession<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<D: Document> ScrollAnimationSession<D> {
    /// Create a session; nothing touches the page until [`init`](Self::init)
    pub fn new<A>(document: D, engine: A, config: GlobalConfig) -> Result<Self>
    where
        A: AnimationEngine<D::Element> + 'static,
    {
        config.validate()?;
        let controller = AnimationController::new(Box::new(engine), &config);

        Ok(Self {
            inner: Rc::new(RefCell::new(SessionInner {
                document,
                registry: ElementRegistry::new(),
                controller,
                tracker: ScrollTracker::new(),
                scroll_throttle: Throttle::new(config.throttle_delay),
                resize_debounce: Debounce::new(config.debounce_delay),
                watcher: DomChangeWatcher::new(!config.disable_mutation_observer),
                initialized: false,
                config,
            })),
        })
    }

    fn borrow(&self) -> Result<Ref<'_, SessionInner<D>>> {
        self.inner.try_borrow().map_err(|_| MosError::SessionBusy)
    }

    fn borrow_mut(&self) -> Result<RefMut<'_, SessionInner<D>>> {
        self.inner.try_borrow_mut().map_err(|_| MosError::SessionBusy)
    }

    fn completion_router(&self) -> CompletionRouter<D::Element> {
        let weak: Weak<RefCell<SessionInner<D>>> = Rc::downgrade(&self.inner);
        Rc::new(
            move |element: D::Element, completion: Completion, result: mos_animation::Result<()>| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let Ok(mut inner) = inner.try_borrow_mut() else {
                    tracing::warn!("dropping completion for {:?}: session busy", element);
                    return;
                };
                let SessionInner {
                    registry,
                    controller,
                    ..
                } = &mut *inner;
                controller.handle_completion(registry, &element, completion, result);
            },
        )
    }

    /// Scan the document, arm every element and run the first tick
    ///
    /// Returns the number of tracked elements. A disabled session stays
    /// untouched and reports zero.
    pub fn init(&self) -> Result<usize> {
        let router = self.completion_router();
        let mut inner = self.borrow_mut()?;
        if inner.config.disable {
            tracing::debug!("ScrollAnimationSession: disabled; init skipped");
            return Ok(0);
        }

        let count = inner.rescan();
        inner.initialized = true;
        let report = inner.engine(&router).prepare_and_evaluate();
        tracing::debug!(
            "ScrollAnimationSession: initialized with {} elements ({} playing)",
            count,
            report.played
        );
        Ok(count)
    }

    /// Re-evaluate existing entries against the current layout
    ///
    /// Initializes the session on first use.
    pub fn refresh(&self) -> Result<TickReport> {
        let router = self.completion_router();
        let mut inner = self.borrow_mut()?;
        if inner.config.disable {
            return Ok(TickReport::default());
        }
        if !inner.initialized {
            inner.rescan();
            inner.initialized = true;
        }
        Ok(inner.engine(&router).prepare_and_evaluate())
    }

    /// Discard every entry and rebuild from a fresh scan
    pub fn refresh_hard(&self) -> Result<TickReport> {
        let router = self.completion_router();
        let mut inner = self.borrow_mut()?;
        if inner.config.disable {
            return Ok(TickReport::default());
        }
        inner.registry.clear();
        let count = inner.rescan();
        inner.initialized = true;
        tracing::debug!("ScrollAnimationSession: hard refresh, {} elements", count);
        Ok(inner.engine(&router).prepare_and_evaluate())
    }

    /// Run one scroll tick immediately, bypassing the throttle
    pub fn on_scroll_tick(&self) -> Result<TickReport> {
        let router = self.completion_router();
        let mut inner = self.borrow_mut()?;
        if !inner.is_active() {
            return Ok(TickReport::default());
        }
        Ok(inner.tick(&router))
    }

    /// Forward a scroll event through the throttle
    pub fn handle_scroll(&self, now_ms: f64) -> Result<ScrollSchedule> {
        let router = self.completion_router();
        let mut inner = self.borrow_mut()?;
        if !inner.is_active() {
            return Ok(ScrollSchedule::Idle);
        }
        match inner.scroll_throttle.call(now_ms, ()) {
            ThrottleDecision::Fire(()) => Ok(ScrollSchedule::Ran(inner.tick(&router))),
            ThrottleDecision::Deferred {
                fire_at_ms,
                schedule_timer,
            } => Ok(ScrollSchedule::Deferred {
                fire_at_ms,
                needs_timer: schedule_timer,
            }),
        }
    }

    /// Run the deferred scroll tick, if one is waiting
    pub fn flush_scroll(&self, now_ms: f64) -> Result<Option<TickReport>> {
        let router = self.completion_router();
        let mut inner = self.borrow_mut()?;
        if inner.scroll_throttle.flush(now_ms).is_none() || !inner.is_active() {
            return Ok(None);
        }
        Ok(Some(inner.tick(&router)))
    }

    /// Forward a resize or orientation change; returns when to flush
    pub fn handle_resize(&self, now_ms: f64) -> Result<f64> {
        let mut inner = self.borrow_mut()?;
        Ok(inner.resize_debounce.call(now_ms))
    }

    /// Recompute positions once the resize debounce has settled
    pub fn flush_resize(&self, now_ms: f64) -> Result<Option<TickReport>> {
        let router = self.completion_router();
        let mut inner = self.borrow_mut()?;
        if !inner.resize_debounce.flush(now_ms) || !inner.is_active() {
            return Ok(None);
        }
        Ok(Some(inner.engine(&router).recalculate_positions()))
    }

    /// Recompute thresholds now and tick
    pub fn recalculate_positions(&self) -> Result<TickReport> {
        let router = self.completion_router();
        let mut inner = self.borrow_mut()?;
        if !inner.is_active() {
            return Ok(TickReport::default());
        }
        Ok(inner.engine(&router).recalculate_positions())
    }

    /// Hard refresh when a mutation batch touched tracked elements
    ///
    /// Returns whether a refresh ran.
    pub fn handle_mutations(&self, added: &[D::Element], removed: &[D::Element]) -> Result<bool> {
        let needed = {
            let inner = self.borrow_mut()?;
            inner.is_active() && inner.watcher.requires_refresh(added, removed)
        };
        if needed {
            tracing::debug!("ScrollAnimationSession: tracked nodes changed");
            self.refresh_hard()?;
        }
        Ok(needed)
    }

    /// Register a custom animation for a preset name
    pub fn register_animation_factory(
        &self,
        name: &str,
        factory: AnimationFactory<D::Element>,
    ) -> Result<()> {
        self.borrow_mut()?.controller.register_factory(name, factory)
    }

    /// Replace the configuration
    ///
    /// Per-element options apply on the next hard refresh. Marker classes
    /// move to their new names right away. The result lists the host
    /// listeners that must be torn down and reinstalled.
    pub fn update_config(&self, config: GlobalConfig) -> Result<ListenerChanges> {
        config.validate()?;
        let mut inner = self.borrow_mut()?;
        let old = &inner.config;

        let changes = ListenerChanges {
            scroll: old.throttle_delay != config.throttle_delay || old.disable != config.disable,
            resize: old.debounce_delay != config.debounce_delay || old.disable != config.disable,
            mutations: old.disable_mutation_observer != config.disable_mutation_observer
                || old.disable != config.disable,
        };

        if changes.scroll {
            inner.scroll_throttle = Throttle::new(config.throttle_delay);
            inner.tracker = ScrollTracker::new();
        }
        if changes.resize {
            inner.resize_debounce = Debounce::new(config.debounce_delay);
        }
        inner.watcher.set_enabled(!config.disable_mutation_observer);
        if inner.config.init_class_name != config.init_class_name {
            for entry in inner.registry.get_all() {
                entry.element.remove_class(&inner.config.init_class_name);
                entry.element.add_class(&config.init_class_name);
            }
        }
        let SessionInner {
            registry,
            controller,
            ..
        } = &mut *inner;
        controller.set_classes(&config, registry.get_all());
        inner.config = config;

        Ok(changes)
    }

    /// Drop every entry and its handle; the session can be initialized again
    pub fn destroy(&self) -> Result<()> {
        let mut inner = self.borrow_mut()?;
        inner.registry.clear();
        inner.scroll_throttle.reset();
        inner.resize_debounce.reset();
        inner.initialized = false;
        tracing::debug!("ScrollAnimationSession: destroyed");
        Ok(())
    }

    /// Copies of every tracked entry
    pub fn prepared_elements(&self) -> Result<Vec<TrackedSnapshot<D::Element>>> {
        Ok(self
            .borrow()?
            .registry
            .get_all()
            .iter()
            .map(|entry| entry.snapshot())
            .collect())
    }

    pub fn find_prepared_element(
        &self,
        element: &D::Element,
    ) -> Result<Option<TrackedSnapshot<D::Element>>> {
        Ok(self
            .borrow()?
            .registry
            .find_by_element(element)
            .map(|entry| entry.snapshot()))
    }

    pub fn prepared_count(&self) -> Result<usize> {
        Ok(self.borrow()?.registry.len())
    }

    pub fn scroll_direction(&self) -> Result<ScrollDirection> {
        Ok(self.borrow()?.tracker.direction())
    }

    pub fn config(&self) -> Result<GlobalConfig> {
        Ok(self.borrow()?.config.clone())
    }

    pub fn is_initialized(&self) -> Result<bool> {
        Ok(self.borrow()?.initialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::AnimationState;
    use crate::testing::{init_tracing, Harness, MockDocument, MockElement};
    use mos_animation::{presets, AnimationHandle};

    fn mirrored() -> GlobalConfig {
        GlobalConfig {
            mirror: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_end_to_end_mirror_scenario() {
        init_tracing();
        let h = Harness::new(mirrored());
        let el = h.add_tracked("fade-up", 1000.0, 200.0);

        assert_eq!(h.session.init().unwrap(), 1);
        let entry = h.session.find_prepared_element(&el).unwrap().unwrap();
        assert_eq!(entry.trigger_in, 320.0);
        assert_eq!(entry.trigger_out, Some(1080.0));
        assert_eq!(entry.state, AnimationState::Armed);
        assert!(el.has_class("mos-init"));

        h.scroll_to(320.0);
        assert_eq!(h.recorder.forward_plays(), 1);
        h.settle();

        h.scroll_to(1080.0);
        assert_eq!(h.recorder.reverse_plays(), 1);
        h.settle();
        assert!(!h.session.find_prepared_element(&el).unwrap().unwrap().animated);

        let calls_before = h.recorder.calls().len();
        h.scroll_to(0.0);
        h.settle();
        assert_eq!(h.recorder.calls().len(), calls_before);
        assert_eq!(h.recorder.forward_plays(), 1);
        assert_eq!(h.recorder.reverse_plays(), 1);
    }

    #[test]
    fn test_mirror_round_trip_restores_state() {
        let h = Harness::new(mirrored());
        let el = h.add_tracked("fade", 1000.0, 200.0);
        h.session.init().unwrap();
        let before = h.session.find_prepared_element(&el).unwrap().unwrap();

        for y in [0.0, 400.0, 1200.0, 300.0] {
            h.scroll_to(y);
            h.settle();
        }

        let after = h.session.find_prepared_element(&el).unwrap().unwrap();
        assert_eq!(after.animated, before.animated);
        assert!(!after.animated);
        assert!(!after.reversing);
        assert_eq!(h.recorder.created(), 1);
    }

    #[test]
    fn test_once_only_never_reverses() {
        let h = Harness::new(GlobalConfig {
            once: true,
            mirror: true,
            ..Default::default()
        });
        let el = h.add_tracked("zoom-in", 1000.0, 200.0);
        h.session.init().unwrap();

        for y in [400.0, 2000.0, 0.0, 1100.0, 0.0, 5000.0] {
            h.scroll_to(y);
            h.settle();
        }

        assert_eq!(h.recorder.reverse_plays(), 0);
        assert_eq!(h.recorder.forward_plays(), 1);
        let entry = h.session.find_prepared_element(&el).unwrap().unwrap();
        assert_eq!(entry.state, AnimationState::CompletedForward);
    }

    #[test]
    fn test_repeated_ticks_do_not_restart() {
        let h = Harness::new(GlobalConfig::default());
        h.add_tracked("fade", 1000.0, 200.0);
        h.session.init().unwrap();

        h.scroll_to(500.0);
        h.scroll_to(520.0);
        h.scroll_to(600.0);

        assert_eq!(h.recorder.created(), 1);
        assert_eq!(h.recorder.forward_plays(), 1);
    }

    #[test]
    fn test_elements_in_range_animate_on_init() {
        let h = Harness::new(GlobalConfig::default());
        let el = h.add_tracked("fade", 300.0, 100.0);
        h.session.init().unwrap();

        assert_eq!(h.recorder.forward_plays(), 1);
        assert!(el.has_class("mos-animate"));
    }

    #[test]
    fn test_scrolled_past_on_load_completes_instantly() {
        let h = Harness::new(GlobalConfig::default());
        let el = h.add_tracked("fade-up", 100.0, 100.0);
        h.document.set_scroll_y(3000.0);
        h.session.init().unwrap();

        let entry = h.session.find_prepared_element(&el).unwrap().unwrap();
        assert_eq!(entry.state, AnimationState::CompletedForward);
        assert_eq!(h.recorder.forward_plays(), 0);
        assert_eq!(h.recorder.completes(), 1);
    }

    #[test]
    fn test_scrolled_past_with_mirror_is_armed() {
        let h = Harness::new(mirrored());
        let el = h.add_tracked("fade-up", 100.0, 100.0);
        h.document.set_scroll_y(3000.0);
        h.session.init().unwrap();

        // Armed, then the first tick sees it past trigger-out and leaves it
        let entry = h.session.find_prepared_element(&el).unwrap().unwrap();
        assert_eq!(entry.state, AnimationState::Armed);
        assert_eq!(h.recorder.completes(), 0);
        assert_eq!(h.recorder.forward_plays(), 0);
    }

    #[test]
    fn test_scrolled_past_once_only_completes_despite_mirror() {
        let h = Harness::new(GlobalConfig {
            mirror: true,
            once: true,
            ..Default::default()
        });
        let el = h.add_tracked("fade-up", 100.0, 100.0);
        h.document.set_scroll_y(3000.0);
        h.session.init().unwrap();

        let entry = h.session.find_prepared_element(&el).unwrap().unwrap();
        assert_eq!(entry.state, AnimationState::CompletedForward);
        assert_eq!(h.recorder.completes(), 1);
        assert_eq!(h.recorder.forward_plays(), 0);
    }

    #[test]
    fn test_throttled_scroll() {
        let h = Harness::new(GlobalConfig::default());
        h.add_tracked("fade", 1000.0, 200.0);
        h.session.init().unwrap();

        h.document.set_scroll_y(100.0);
        assert!(matches!(h.session.handle_scroll(0.0).unwrap(), ScrollSchedule::Ran(_)));
        assert_eq!(h.session.scroll_direction().unwrap(), ScrollDirection::Down);

        h.document.set_scroll_y(400.0);
        assert_eq!(
            h.session.handle_scroll(10.0).unwrap(),
            ScrollSchedule::Deferred {
                fire_at_ms: 99.0,
                needs_timer: true
            }
        );
        assert_eq!(h.recorder.forward_plays(), 0);

        let report = h.session.flush_scroll(99.0).unwrap().unwrap();
        assert_eq!(report.played, 1);
        assert!(h.session.flush_scroll(120.0).unwrap().is_none());
    }

    #[test]
    fn test_resize_recalculates_positions() {
        let h = Harness::new(GlobalConfig::default());
        let el = h.add_tracked("fade", 1000.0, 200.0);
        h.session.init().unwrap();

        el.set_top(2000.0);
        let due = h.session.handle_resize(0.0).unwrap();
        assert_eq!(due, 50.0);
        assert!(h.session.flush_resize(10.0).unwrap().is_none());
        assert!(h.session.flush_resize(due).unwrap().is_some());

        let entry = h.session.find_prepared_element(&el).unwrap().unwrap();
        assert_eq!(entry.trigger_in, 1320.0);
    }

    #[test]
    fn test_mutations_trigger_hard_refresh() {
        let h = Harness::new(GlobalConfig::default());
        h.add_tracked("fade", 1000.0, 200.0);
        h.session.init().unwrap();

        let added = h.add_tracked("zoom-out", 1500.0, 100.0);
        let unrelated = MockElement::new();
        assert!(!h.session.handle_mutations(&[unrelated], &[]).unwrap());
        assert_eq!(h.session.prepared_count().unwrap(), 1);

        assert!(h.session.handle_mutations(&[added.clone()], &[]).unwrap());
        assert_eq!(h.session.prepared_count().unwrap(), 2);
        assert!(h.session.find_prepared_element(&added).unwrap().is_some());
    }

    #[test]
    fn test_hard_refresh_mid_flight_ignores_stale_completion() {
        let h = Harness::new(GlobalConfig::default());
        let el = h.add_tracked("fade", 300.0, 100.0);
        h.session.init().unwrap();
        assert_eq!(h.recorder.forward_plays(), 1);

        h.session.refresh_hard().unwrap();
        h.settle();

        let entry = h.session.find_prepared_element(&el).unwrap().unwrap();
        assert_eq!(entry.state, AnimationState::CompletedForward);
        assert_eq!(h.recorder.created(), 2);
    }

    #[test]
    fn test_soft_refresh_keeps_completed_elements() {
        let h = Harness::new(GlobalConfig::default());
        let el = h.add_tracked("fade", 300.0, 100.0);
        h.session.init().unwrap();
        h.settle();

        h.session.refresh().unwrap();
        h.settle();
        assert_eq!(h.recorder.created(), 1);
        assert_eq!(h.recorder.forward_plays(), 1);
        assert!(el.has_class("mos-animate"));
    }

    #[test]
    fn test_disabled_session_leaves_page_alone() {
        let h = Harness::new(GlobalConfig {
            disable: true,
            ..Default::default()
        });
        let el = h.add_tracked("fade", 300.0, 100.0);

        assert_eq!(h.session.init().unwrap(), 0);
        assert_eq!(h.session.handle_scroll(0.0).unwrap(), ScrollSchedule::Idle);
        assert!(!el.has_class("mos-init"));
        assert_eq!(h.recorder.created(), 0);
    }

    #[test]
    fn test_update_config_reports_listener_changes() {
        let h = Harness::new(GlobalConfig::default());
        let changes = h
            .session
            .update_config(GlobalConfig {
                throttle_delay: 50.0,
                ..Default::default()
            })
            .unwrap();
        assert!(changes.scroll);
        assert!(!changes.resize);
        assert!(!changes.mutations);

        let unchanged = h.session.update_config(h.session.config().unwrap()).unwrap();
        assert!(!unchanged.any());

        assert!(matches!(
            h.session.update_config(GlobalConfig {
                duration: -1.0,
                ..Default::default()
            }),
            Err(MosError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_update_config_moves_marker_classes() {
        let h = Harness::new(mirrored());
        let el = h.add_tracked("fade", 1000.0, 200.0);
        h.session.init().unwrap();
        h.scroll_to(400.0);
        h.settle();
        assert!(el.has_class("mos-animate"));

        h.session
            .update_config(GlobalConfig {
                animated_class_name: "shown".into(),
                init_class_name: "ready".into(),
                ..mirrored()
            })
            .unwrap();
        assert!(el.has_class("shown"));
        assert!(!el.has_class("mos-animate"));
        assert!(el.has_class("ready"));
        assert!(!el.has_class("mos-init"));

        h.scroll_to(0.0);
        h.settle();
        assert!(!h.session.find_prepared_element(&el).unwrap().unwrap().animated);
        assert!(!el.has_class("shown"));
        assert!(!el.has_class("mos-animate"));
    }

    #[test]
    fn test_factory_calling_back_gets_session_busy() {
        let h = Harness::new(GlobalConfig::default());
        h.add_tracked("reentrant", 300.0, 100.0);

        let slot: Rc<RefCell<Option<ScrollAnimationSession<MockDocument>>>> =
            Rc::new(RefCell::new(None));
        let seen: Rc<RefCell<Vec<(Result<usize>, Result<usize>)>>> =
            Rc::new(RefCell::new(Vec::new()));
        {
            let slot = Rc::clone(&slot);
            let seen = Rc::clone(&seen);
            let engine = h.scheduler.engine();
            h.session
                .register_animation_factory(
                    "reentrant",
                    Box::new(move |_: &MockElement, _: &crate::config::ElementConfig| {
                        if let Some(session) = slot.borrow().as_ref() {
                            seen.borrow_mut().push((session.prepared_count(), session.init()));
                        }
                        let keyframes = presets::resolve("fade", 0.0);
                        Ok(Box::new(engine.create(&keyframes, &Default::default())?)
                            as Box<dyn AnimationHandle>)
                    }),
                )
                .unwrap();
        }

        *slot.borrow_mut() = Some(h.session.clone());
        assert_eq!(h.session.init().unwrap(), 1);
        *slot.borrow_mut() = None;

        assert_eq!(
            *seen.borrow(),
            vec![(Err(MosError::SessionBusy), Err(MosError::SessionBusy))]
        );
        assert_eq!(h.session.prepared_count().unwrap(), 1);
    }

    #[test]
    fn test_destroy_releases_handles() {
        let h = Harness::new(GlobalConfig::default());
        h.add_tracked("fade", 300.0, 100.0);
        h.session.init().unwrap();
        assert_eq!(h.scheduler.playback_count(), 1);

        h.session.destroy().unwrap();
        assert_eq!(h.session.prepared_count().unwrap(), 0);
        assert_eq!(h.scheduler.playback_count(), 0);
        assert!(!h.session.is_initialized().unwrap());
        h.settle();
    }

    #[test]
    fn test_failing_element_does_not_block_others() {
        let h = Harness::new(GlobalConfig::default());
        let broken = h.add_tracked("broken", 300.0, 100.0);
        let healthy = h.add_tracked("fade", 320.0, 100.0);
        h.session
            .register_animation_factory(
                "broken",
                Box::new(|_: &MockElement, _: &crate::config::ElementConfig| {
                    Err(mos_animation::AnimationError::Engine("no engine".into()))
                }),
            )
            .unwrap();
        h.session.init().unwrap();

        assert!(!h.session.find_prepared_element(&broken).unwrap().unwrap().animated);
        assert!(h.session.find_prepared_element(&healthy).unwrap().unwrap().animated);
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = GlobalConfig {
            init_class_name: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            Harness::try_new(config),
            Err(MosError::InvalidConfig(_))
        ));
    }
}
