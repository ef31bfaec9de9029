//! Animation scheduler
//!
//! An in-process animation engine. The scheduler owns every playback and
//! advances them when the host calls [`AnimationScheduler::tick`], typically
//! once per animation frame. Handles created through [`SchedulerEngine`] hold
//! a weak reference back to the scheduler, so a dropped scheduler turns every
//! handle operation into a no-op.
//!
//! Finished notifications are queued and delivered from `tick`/`flush`, never
//! from inside a handle call. This mirrors promise resolution in a browser and
//! lets callers hold their own state borrowed while driving handles.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};

use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::handle::{AnimateOptions, AnimationEngine, AnimationHandle, FinishCallback};
use crate::keyframe::KeyframeSpec;
use crate::values::FrameValues;

new_key_type! {
    /// Handle to a registered playback
    pub struct PlaybackId;
}

// ============================================================================
// Playback
// ============================================================================

/// Clock and keyframes for one animation
struct Playback {
    keyframes: KeyframeSpec,
    easing: Easing,
    duration_ms: f64,
    delay_ms: f64,
    /// Clock position in milliseconds, delay included
    time_ms: f64,
    speed: f64,
    playing: bool,
    /// Set by `stop()`; the playback never runs again
    stopped: bool,
    waiting: Vec<FinishCallback>,
}

impl Playback {
    fn new(keyframes: KeyframeSpec, options: &AnimateOptions) -> Self {
        Self {
            keyframes,
            easing: options.easing,
            // Zero-length animations still take one millisecond so the end
            // state stays distinguishable from the start
            duration_ms: (options.duration * 1000.0).max(1.0),
            delay_ms: (options.delay * 1000.0).max(0.0),
            time_ms: 0.0,
            speed: 1.0,
            playing: false,
            stopped: false,
            waiting: Vec::new(),
        }
    }

    fn end_ms(&self) -> f64 {
        self.delay_ms + self.duration_ms
    }

    /// Linear progress through the active interval (0.0 to 1.0)
    fn progress(&self) -> f64 {
        ((self.time_ms - self.delay_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    fn frame(&self) -> FrameValues {
        self.keyframes.sample(self.easing.apply(self.progress()))
    }

    /// Advance the clock, returning true when playback just finished
    fn advance(&mut self, dt_ms: f64) -> bool {
        if !self.playing || self.speed == 0.0 {
            return false;
        }

        self.time_ms += dt_ms * self.speed;
        let end = self.end_ms();

        if self.speed > 0.0 && self.time_ms >= end {
            self.time_ms = end;
            self.playing = false;
            true
        } else if self.speed < 0.0 && self.time_ms <= 0.0 {
            self.time_ms = 0.0;
            self.playing = false;
            true
        } else {
            false
        }
    }
}

/// Internal state of the animation scheduler
struct SchedulerInner {
    playbacks: SlotMap<PlaybackId, Playback>,
    /// Notifications waiting for the next `tick`/`flush`
    ready: Vec<(FinishCallback, Result<()>)>,
}

impl SchedulerInner {
    fn settle(&mut self, id: PlaybackId, result: Result<()>) {
        if let Some(playback) = self.playbacks.get_mut(id) {
            let waiting = std::mem::take(&mut playback.waiting);
            self.ready
                .extend(waiting.into_iter().map(|cb| (cb, result.clone())));
        }
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// The animation scheduler that ticks all playbacks
///
/// # Example
///
/// ```
/// use mos_animation::{presets, AnimateOptions, AnimationEngine, AnimationHandle, AnimationScheduler};
///
/// let scheduler = AnimationScheduler::new();
/// let engine = scheduler.engine();
/// let spec = presets::resolve("fade-up", 100.0);
/// let handle = engine.animate(&(), &spec, &AnimateOptions::default()).unwrap();
///
/// handle.play().unwrap();
/// scheduler.tick(200.0);
/// assert!(scheduler.has_active_animations());
/// ```
pub struct AnimationScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                playbacks: SlotMap::with_key(),
                ready: Vec::new(),
            })),
        }
    }

    /// Get a weak handle to this scheduler
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Get an [`AnimationEngine`] that registers playbacks here
    pub fn engine(&self) -> SchedulerEngine {
        SchedulerEngine {
            handle: self.handle(),
        }
    }

    /// Advance every playing animation by `dt_ms` and deliver notifications
    ///
    /// Returns true if any animation is still playing.
    pub fn tick(&self, dt_ms: f64) -> bool {
        let ready = {
            let mut inner = self.inner.borrow_mut();
            let mut finished = Vec::new();
            for (id, playback) in inner.playbacks.iter_mut() {
                if playback.advance(dt_ms) {
                    finished.push(id);
                }
            }
            for id in finished {
                inner.settle(id, Ok(()));
            }
            std::mem::take(&mut inner.ready)
        };

        Self::deliver(ready);
        self.has_active_animations()
    }

    /// Deliver queued notifications without advancing time
    ///
    /// Returns the number of callbacks invoked.
    pub fn flush(&self) -> usize {
        let ready = std::mem::take(&mut self.inner.borrow_mut().ready);
        let count = ready.len();
        Self::deliver(ready);
        count
    }

    fn deliver(ready: Vec<(FinishCallback, Result<()>)>) {
        if !ready.is_empty() {
            tracing::trace!("AnimationScheduler: delivering {} notifications", ready.len());
        }
        for (callback, result) in ready {
            callback(result);
        }
    }

    /// Check if any animations are still playing
    pub fn has_active_animations(&self) -> bool {
        self.inner
            .borrow()
            .playbacks
            .iter()
            .any(|(_, p)| p.playing)
    }

    /// Get the number of registered playbacks
    pub fn playback_count(&self) -> usize {
        self.inner.borrow().playbacks.len()
    }

    /// Get the number of notifications waiting for delivery
    pub fn pending_notifications(&self) -> usize {
        self.inner.borrow().ready.len()
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnimationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("AnimationScheduler")
            .field("playbacks", &inner.playbacks.len())
            .field("ready", &inner.ready.len())
            .finish()
    }
}

/// A weak handle to the animation scheduler
///
/// It won't prevent the scheduler from being dropped.
#[derive(Clone, Debug)]
pub struct SchedulerHandle {
    inner: Weak<RefCell<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Register a playback and return its ID
    fn register(&self, playback: Playback) -> Option<PlaybackId> {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow_mut().playbacks.insert(playback))
    }

    /// Run `f` against a playback if both it and the scheduler still exist
    fn with_playback<F, R>(&self, id: PlaybackId, f: F) -> Option<R>
    where
        F: FnOnce(&mut Playback) -> R,
    {
        self.inner
            .upgrade()
            .and_then(|inner| inner.borrow_mut().playbacks.get_mut(id).map(f))
    }

    /// Remove a playback, rejecting anyone still waiting on it
    fn remove(&self, id: PlaybackId) {
        if let Some(inner) = self.inner.upgrade() {
            let mut inner = inner.borrow_mut();
            inner.settle(id, Err(AnimationError::Interrupted));
            inner.playbacks.remove(id);
        }
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

// ============================================================================
// Engine + Handle
// ============================================================================

/// [`AnimationEngine`] backed by an [`AnimationScheduler`]
///
/// Works for any target type; the scheduler only tracks values, applying
/// them to a target is up to the host.
#[derive(Clone, Debug)]
pub struct SchedulerEngine {
    handle: SchedulerHandle,
}

impl SchedulerEngine {
    /// Create a playback directly, without going through the trait object
    pub fn create(
        &self,
        keyframes: &KeyframeSpec,
        options: &AnimateOptions,
    ) -> Result<ScheduledAnimation> {
        keyframes.validate()?;
        let id = self
            .handle
            .register(Playback::new(keyframes.clone(), options))
            .ok_or(AnimationError::SchedulerDropped)?;
        Ok(ScheduledAnimation {
            handle: self.handle.clone(),
            id,
        })
    }
}

impl<T> AnimationEngine<T> for SchedulerEngine {
    fn animate(
        &self,
        _target: &T,
        keyframes: &KeyframeSpec,
        options: &AnimateOptions,
    ) -> Result<Box<dyn AnimationHandle>> {
        Ok(Box::new(self.create(keyframes, options)?))
    }
}

/// A playback registered with the scheduler
///
/// Dropping it removes the playback; callbacks still waiting are rejected
/// with [`AnimationError::Interrupted`].
#[derive(Debug)]
pub struct ScheduledAnimation {
    handle: SchedulerHandle,
    id: PlaybackId,
}

impl ScheduledAnimation {
    pub fn id(&self) -> PlaybackId {
        self.id
    }

    /// Current visual state
    pub fn frame(&self) -> Option<FrameValues> {
        self.handle.with_playback(self.id, |p| p.frame())
    }

    /// Whether the clock is running
    pub fn is_playing(&self) -> bool {
        self.handle
            .with_playback(self.id, |p| p.playing)
            .unwrap_or(false)
    }

    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Playback),
    {
        self.handle
            .with_playback(self.id, f)
            .ok_or(AnimationError::SchedulerDropped)
    }
}

impl AnimationHandle for ScheduledAnimation {
    fn play(&self) -> Result<()> {
        self.update(|p| {
            if p.stopped {
                tracing::trace!("ignoring play() on a stopped playback");
                return;
            }
            // Rewind only a finished playback, never one already running
            if !p.playing {
                let end = p.end_ms();
                if p.speed > 0.0 && p.time_ms >= end {
                    p.time_ms = 0.0;
                } else if p.speed < 0.0 && p.time_ms <= 0.0 {
                    p.time_ms = end;
                }
            }
            p.playing = true;
        })
    }

    fn pause(&self) -> Result<()> {
        self.update(|p| p.playing = false)
    }

    fn stop(&self) -> Result<()> {
        self.update(|p| {
            p.playing = false;
            p.stopped = true;
        })?;
        if let Some(inner) = self.handle.inner.upgrade() {
            inner
                .borrow_mut()
                .settle(self.id, Err(AnimationError::Interrupted));
        }
        Ok(())
    }

    fn complete(&self) -> Result<()> {
        self.update(|p| {
            p.time_ms = if p.speed >= 0.0 { p.end_ms() } else { 0.0 };
            p.playing = false;
        })?;
        if let Some(inner) = self.handle.inner.upgrade() {
            inner.borrow_mut().settle(self.id, Ok(()));
        }
        Ok(())
    }

    fn speed(&self) -> f64 {
        self.handle.with_playback(self.id, |p| p.speed).unwrap_or(1.0)
    }

    fn set_speed(&self, speed: f64) -> Result<()> {
        self.update(|p| p.speed = speed)
    }

    fn time(&self) -> f64 {
        self.handle
            .with_playback(self.id, |p| p.time_ms / 1000.0)
            .unwrap_or(0.0)
    }

    fn set_time(&self, seconds: f64) -> Result<()> {
        self.update(|p| p.time_ms = (seconds * 1000.0).clamp(0.0, p.end_ms()))
    }

    fn on_finished(&self, callback: FinishCallback) {
        let Some(inner) = self.handle.inner.upgrade() else {
            tracing::debug!("scheduler dropped; discarding finished callback");
            return;
        };
        let mut inner = inner.borrow_mut();
        match inner.playbacks.get_mut(self.id) {
            Some(playback) => playback.waiting.push(callback),
            None => inner.ready.push((callback, Err(AnimationError::Interrupted))),
        }
    }
}

impl Drop for ScheduledAnimation {
    fn drop(&mut self) {
        self.handle.remove(self.id);
    }
}
