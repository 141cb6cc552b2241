//! Time source for creation timestamps.

use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

/// Supplies Unix epoch milliseconds for new items.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Wall clock that never steps backwards within one instance.
///
/// If the system clock is adjusted into the past, the last returned value is
/// repeated until real time catches up.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: Cell<i64>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0);
        let stamped = now.max(self.last.get());
        self.last.set(stamped);
        stamped
    }
}
