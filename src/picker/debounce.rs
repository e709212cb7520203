use std::time::{Duration, Instant};

/// A trailing-edge debouncer driven by an injected clock.
///
/// Scheduling a value supersedes any value still pending and restarts the
/// delay. The value is released by [`Debouncer::poll`] once the delay has
/// elapsed since the most recent schedule.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

impl<T> Debouncer<T> {
    /// Creates a debouncer with the given delay.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// The delay between the last schedule and release.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `value` for release at `now + delay`.
    ///
    /// Returns the value this one superseded, if any.
    pub fn schedule(&mut self, value: T, now: Instant) -> Option<T> {
        let deadline = now + self.delay;
        self.pending
            .replace(Pending { value, deadline })
            .map(|superseded| superseded.value)
    }

    /// Releases the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.as_ref()?.deadline > now {
            return None;
        }
        self.pending.take().map(|pending| pending.value)
    }

    /// Drops the pending value without releasing it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|pending| pending.value)
    }

    /// Whether a value is waiting to be released.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value will be released, if there is one.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn releases_after_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);

        assert_eq!(debouncer.schedule("a", start), None);

        assert_eq!(debouncer.poll(start + Duration::from_millis(299)), None);
        assert!(debouncer.is_pending());
        assert_eq!(debouncer.poll(start + DELAY), Some("a"));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(start + DELAY * 2), None);
    }

    #[test]
    fn new_input_supersedes_pending_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);

        debouncer.schedule("f", start);
        let later = start + Duration::from_millis(200);
        assert_eq!(debouncer.schedule("fo", later), Some("f"));

        // The first deadline has passed, but the delay restarted.
        assert_eq!(debouncer.poll(start + DELAY), None);
        assert_eq!(debouncer.deadline(), Some(later + DELAY));
        assert_eq!(debouncer.poll(later + DELAY), Some("fo"));
    }

    #[test]
    fn cancel_drops_pending_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);

        debouncer.schedule(1, start);
        assert_eq!(debouncer.cancel(), Some(1));
        assert_eq!(debouncer.poll(start + DELAY), None);
        assert_eq!(debouncer.cancel(), None);
    }
}
