//! Wall-clock access and the poll-driven sync timer.
//!
//! RULE: Stores never read the system time directly. Every timestamp
//! flows through a `Clock` so tests can pin and advance time.

use crate::types::{Day, Millis};
use chrono::TimeZone;
use std::sync::atomic::{AtomicI64, Ordering};

pub trait Clock: Send + Sync {
    fn now_millis(&self) -> Millis;

    /// The UTC calendar day containing `now_millis()`.
    fn today(&self) -> Day {
        day_of(self.now_millis())
    }
}

pub fn day_of(millis: Millis) -> Day {
    chrono::Utc
        .timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.date_naive())
        .unwrap_or(chrono::NaiveDate::MIN)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> Millis {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self { millis: AtomicI64::new(start) }
    }

    pub fn advance(&self, by: Millis) {
        self.millis.fetch_add(by, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> Millis {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Hands out strictly increasing millisecond stamps for ids.
/// Two creations inside the same millisecond get consecutive stamps.
#[derive(Debug, Default, Clone)]
pub struct IdStamper {
    last: Option<Millis>,
}

impl IdStamper {
    pub fn next(&mut self, now: Millis) -> Millis {
        let stamp = match self.last {
            Some(last) if now <= last => last + 1,
            _ => now,
        };
        self.last = Some(stamp);
        stamp
    }
}

/// A repeating timer driven by `fire_if_due` polls rather than a thread.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    interval_ms: Millis,
    next_due: Option<Millis>,
}

impl IntervalTimer {
    pub fn new(interval_ms: Millis) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            next_due: None,
        }
    }

    pub fn interval_ms(&self) -> Millis {
        self.interval_ms
    }

    pub fn arm(&mut self, now: Millis) {
        self.next_due = Some(now + self.interval_ms);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns true when the timer is armed and due; re-arms from `now`.
    pub fn fire_if_due(&mut self, now: Millis) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval_ms);
                true
            }
            _ => false,
        }
    }
}
