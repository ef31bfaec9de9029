//! Scroll tracker, throttle and debounce
//!
//! The rate limiters are plain state machines fed with timestamps. Hosts own
//! the timers: when a call is deferred, the host schedules a timer for the
//! returned deadline and calls `flush` when it fires.

/// Direction of the last observed scroll movement
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    #[default]
    None,
}

/// Last scroll position and the direction it moved in
#[derive(Clone, Debug, Default)]
pub struct ScrollTracker {
    last_scroll_y: f64,
    direction: ScrollDirection,
}

impl ScrollTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new position and return the direction of travel
    pub fn record(&mut self, scroll_y: f64) -> ScrollDirection {
        self.direction = if scroll_y > self.last_scroll_y && scroll_y > 0.0 {
            ScrollDirection::Down
        } else if scroll_y < self.last_scroll_y {
            ScrollDirection::Up
        } else {
            ScrollDirection::None
        };
        self.last_scroll_y = scroll_y;
        self.direction
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    pub fn last_scroll_y(&self) -> f64 {
        self.last_scroll_y
    }
}

// ============================================================================
// Throttle
// ============================================================================

/// Outcome of [`Throttle::call`]
#[derive(Clone, Debug, PartialEq)]
pub enum ThrottleDecision<T> {
    /// Run now with these arguments
    Fire(T),
    /// Held until `fire_at_ms`; `schedule_timer` is true only for the first
    /// deferred call of a window
    Deferred { fire_at_ms: f64, schedule_timer: bool },
}

/// Leading-edge throttle with a single trailing catch-up call
///
/// The first call in a window fires immediately. Calls inside the window are
/// collapsed into one deferred call carrying the most recent arguments.
#[derive(Clone, Debug)]
pub struct Throttle<T> {
    delay_ms: f64,
    last_fired_ms: Option<f64>,
    deadline_ms: Option<f64>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms: delay_ms.max(0.0),
            last_fired_ms: None,
            deadline_ms: None,
            pending: None,
        }
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    pub fn call(&mut self, now_ms: f64, args: T) -> ThrottleDecision<T> {
        match self.last_fired_ms {
            Some(last) if now_ms - last < self.delay_ms => {
                self.pending = Some(args);
                let fire_at_ms = last + self.delay_ms;
                let schedule_timer = self.deadline_ms.is_none();
                self.deadline_ms = Some(fire_at_ms);
                ThrottleDecision::Deferred {
                    fire_at_ms,
                    schedule_timer,
                }
            }
            _ => {
                // A late timer must not replay a call this one supersedes
                self.pending = None;
                self.deadline_ms = None;
                self.last_fired_ms = Some(now_ms);
                ThrottleDecision::Fire(args)
            }
        }
    }

    /// Take the deferred call once its deadline has passed
    ///
    /// Timers left over from an earlier window find a later deadline and
    /// return `None`.
    pub fn flush(&mut self, now_ms: f64) -> Option<T> {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => self.deadline_ms = None,
            _ => return None,
        }
        let args = self.pending.take()?;
        self.last_fired_ms = Some(now_ms);
        Some(args)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any deferred call and forget the current window
    pub fn reset(&mut self) {
        self.last_fired_ms = None;
        self.deadline_ms = None;
        self.pending = None;
    }
}

// ============================================================================
// Debounce
// ============================================================================

/// Trailing-edge debounce
///
/// Every call pushes the deadline back. Hosts may schedule one timer per call
/// without cancelling earlier ones; only the timer reaching the latest
/// deadline makes `flush` return true.
#[derive(Clone, Debug)]
pub struct Debounce {
    delay_ms: f64,
    deadline_ms: Option<f64>,
}

impl Debounce {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms: delay_ms.max(0.0),
            deadline_ms: None,
        }
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    /// Record a call and return when the debounced action is due
    pub fn call(&mut self, now_ms: f64) -> f64 {
        let deadline = now_ms + self.delay_ms;
        self.deadline_ms = Some(deadline);
        deadline
    }

    /// Whether the quiet period has elapsed; consumes the pending call
    pub fn flush(&mut self, now_ms: f64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    pub fn reset(&mut self) {
        self.deadline_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction() {
        let mut tracker = ScrollTracker::new();
        assert_eq!(tracker.direction(), ScrollDirection::None);

        assert_eq!(tracker.record(100.0), ScrollDirection::Down);
        assert_eq!(tracker.record(100.0), ScrollDirection::None);
        assert_eq!(tracker.record(40.0), ScrollDirection::Up);
        assert_eq!(tracker.record(0.0), ScrollDirection::Up);
        assert_eq!(tracker.record(0.0), ScrollDirection::None);
        assert_eq!(tracker.last_scroll_y(), 0.0);
    }

    #[test]
    fn test_negative_overscroll_is_not_down() {
        let mut tracker = ScrollTracker::new();
        tracker.record(-30.0);
        assert_eq!(tracker.record(-10.0), ScrollDirection::None);
        assert_eq!(tracker.last_scroll_y(), -10.0);
    }

    #[test]
    fn test_throttle_leading_then_trailing_latest() {
        let mut throttle = Throttle::new(100.0);

        assert_eq!(throttle.call(0.0, 1), ThrottleDecision::Fire(1));
        assert_eq!(
            throttle.call(10.0, 2),
            ThrottleDecision::Deferred {
                fire_at_ms: 100.0,
                schedule_timer: true
            }
        );
        assert_eq!(
            throttle.call(50.0, 3),
            ThrottleDecision::Deferred {
                fire_at_ms: 100.0,
                schedule_timer: false
            }
        );

        // One trailing call, with the latest arguments
        assert_eq!(throttle.flush(100.0), Some(3));
        assert_eq!(throttle.flush(100.0), None);
    }

    #[test]
    fn test_throttle_window_restarts_after_trailing_call() {
        let mut throttle = Throttle::new(100.0);
        throttle.call(0.0, ());
        throttle.call(20.0, ());
        assert_eq!(throttle.flush(100.0), Some(()));

        assert!(matches!(
            throttle.call(150.0, ()),
            ThrottleDecision::Deferred { fire_at_ms, .. } if fire_at_ms == 200.0
        ));
        assert!(matches!(throttle.call(200.0, ()), ThrottleDecision::Fire(())));
    }

    #[test]
    fn test_throttle_late_timer_is_superseded() {
        let mut throttle = Throttle::new(100.0);
        throttle.call(0.0, 1);
        throttle.call(10.0, 2);

        // The window elapsed before the timer ran
        assert_eq!(throttle.call(130.0, 3), ThrottleDecision::Fire(3));
        assert_eq!(throttle.flush(135.0), None);
        assert!(!throttle.has_pending());
    }

    #[test]
    fn test_throttle_stale_timer_waits_for_current_window() {
        let mut throttle = Throttle::new(99.0);
        throttle.call(0.0, 1);
        assert!(matches!(
            throttle.call(10.0, 2),
            ThrottleDecision::Deferred { schedule_timer: true, .. }
        ));

        // The first timer is late; a new window opens before it runs
        assert_eq!(throttle.call(120.0, 3), ThrottleDecision::Fire(3));
        assert_eq!(
            throttle.call(125.0, 4),
            ThrottleDecision::Deferred {
                fire_at_ms: 219.0,
                schedule_timer: true
            }
        );

        assert_eq!(throttle.flush(130.0), None);
        assert!(throttle.has_pending());
        assert_eq!(throttle.flush(219.0), Some(4));
    }

    #[test]
    fn test_debounce_fires_once_after_quiet_period() {
        let mut debounce = Debounce::new(50.0);

        assert_eq!(debounce.call(0.0), 50.0);
        assert_eq!(debounce.call(30.0), 80.0);

        // Timer from the first call
        assert!(!debounce.flush(50.0));
        assert!(debounce.flush(80.0));
        assert!(!debounce.flush(90.0));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn test_reset_clears_pending() {
        let mut throttle = Throttle::new(100.0);
        throttle.call(0.0, ());
        throttle.call(1.0, ());
        throttle.reset();
        assert_eq!(throttle.flush(100.0), None);

        let mut debounce = Debounce::new(10.0);
        debounce.call(0.0);
        debounce.reset();
        assert!(!debounce.flush(100.0));
    }
}
