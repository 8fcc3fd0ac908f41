//! Periodic persistence of the buffer.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Default period between automatic saves.
pub const DEFAULT_SAVE_INTERVAL: Duration = Duration::from_millis(300_000);

/// Monotonic time source, measured from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock advanced by hand. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Schedule for automatic saves. Owned by the editor and polled through
/// `Editor::tick`.
#[derive(Clone, Debug)]
pub struct AutoSave {
    interval: Duration,
    next_due: Option<Duration>,
}

impl AutoSave {
    /// Starts a schedule whose first save is due one `interval` after `now`.
    pub fn start(interval: Duration, now: Duration) -> Self {
        Self {
            interval,
            next_due: Some(now + interval),
        }
    }

    /// A schedule that never fires.
    pub fn disabled(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn is_due(&self, now: Duration) -> bool {
        self.next_due.is_some_and(|due| now >= due)
    }

    /// Records a save at `now`; the next one is due a full interval later.
    pub fn mark_fired(&mut self, now: Duration) {
        if self.next_due.is_some() {
            self.next_due = Some(now + self.interval);
        }
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }
}
