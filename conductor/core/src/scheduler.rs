//! Deferred Work Scheduling
//!
//! Every wait in the engine is a timer entry, never a blocking call: effect
//! expiry, the section reveal delay, voice indication clears, transmission
//! latency, ambient ticks and the boot loader all go through a [`Scheduler`].
//!
//! # Time
//!
//! The queue keeps its own notion of "now" as a [`Duration`] since the engine
//! was created. Whoever drives the engine moves that clock forward: tests
//! advance it by hand, the headless daemon follows a tokio `Instant`. Due
//! entries fire in `(due time, insertion order)`, so two timers with the same
//! delay fire in the order they were scheduled.
//!
//! Entries cannot be cancelled. A stale entry still fires; its handler decides
//! what a late arrival means.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::effects::EffectId;
use crate::navigation::SectionId;
use crate::transmission::TransmissionId;

/// Handle returned for a scheduled entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(pub u64);

impl std::fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer_{}", self.0)
    }
}

/// Work to run once a timer fires
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deferred {
    /// Boot loader starts fading
    LoaderFade,
    /// Boot loader gone; initialize the interactive UI
    LoaderHidden,
    /// Make a section visible after its exit delay
    RevealSection(SectionId),
    /// Notification slides in
    NotificationEnter(EffectId),
    /// Notification slides out
    NotificationExit(EffectId),
    /// Remove an effect instance
    ExpireEffect(EffectId),
    /// Hide the voice feedback line
    ClearVoiceIndication,
    /// Simulated network latency elapsed
    CompleteTransmission(TransmissionId),
    /// Ambient glitch roll
    AmbientGlitchTick,
    /// Ambient orb pulse refresh
    AmbientPulseTick,
    /// Orb pulse animation restored after a refresh
    AmbientPulseRestore,
}

/// Something that can run work later
pub trait Scheduler {
    /// Current time on this scheduler's clock
    fn now(&self) -> Duration;

    /// Run `task` once `delay` has elapsed
    fn schedule(&mut self, delay: Duration, task: Deferred) -> TimerHandle;
}

struct Entry {
    due: Duration,
    handle: TimerHandle,
    task: Deferred,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.handle == other.handle
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed: BinaryHeap is a max-heap and we want the earliest entry on top
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.handle.cmp(&self.handle))
    }
}

/// Virtual-clock timer queue
#[derive(Default)]
pub struct TimerQueue {
    now: Duration,
    next_handle: u64,
    entries: BinaryHeap<Entry>,
}

impl TimerQueue {
    /// Create an empty queue at time zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries waiting to fire
    #[must_use]
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is waiting
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Due time of the earliest entry
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.entries.peek().map(|e| e.due)
    }

    /// Pop the earliest entry if it is due at or before `until`
    ///
    /// The clock moves to the entry's due time, so work scheduled by its
    /// handler is relative to when the timer actually fired.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerHandle, Deferred)> {
        if self.entries.peek()?.due > until {
            return None;
        }
        let entry = self.entries.pop()?;
        if entry.due > self.now {
            self.now = entry.due;
        }
        Some((entry.handle, entry.task))
    }

    /// Move the clock forward without firing anything
    ///
    /// Callers pop everything due first; the clock never runs backwards.
    pub fn advance_clock(&mut self, to: Duration) {
        if to > self.now {
            self.now = to;
        }
    }
}

impl Scheduler for TimerQueue {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule(&mut self, delay: Duration, task: Deferred) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(Entry {
            due: self.now + delay,
            handle,
            task,
        });
        tracing::trace!(%handle, ?task, delay_ms = delay.as_millis() as u64, "Scheduled");
        handle
    }
}

impl std::fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerQueue")
            .field("now", &self.now)
            .field("pending", &self.entries.len())
            .finish()
    }
}
