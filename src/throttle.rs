//! Debounce for the ambient cue.
//!
//! A record is created the first time a key fires. After that the cue fires
//! again when it differs from the last one played under that key, or once
//! `delay` has elapsed since the last play. A changed cue always bypasses the
//! delay.
//!
//! `is_due` and `record` split the decision from the bookkeeping, so a caller
//! can commit a play only once the host has actually delivered it.

use crate::config::{CueKind, ThrottleScope};
use crate::constants::DEFAULT_AMBIENT_DELAY_MS;
use crate::host::ObserverId;
use fnv::{FnvHashMap, FnvHashSet};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThrottleKey {
    Global,
    Observer(ObserverId),
}

impl ThrottleKey {
    #[inline]
    pub fn for_observer(scope: ThrottleScope, id: ObserverId) -> Self {
        match scope {
            ThrottleScope::Global => ThrottleKey::Global,
            ThrottleScope::PerObserver => ThrottleKey::Observer(id),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThrottleEntry {
    pub last_cue: CueKind,
    pub last_played: Duration,
}

#[derive(Clone, Debug)]
pub struct AmbientThrottle {
    delay: Duration,
    entries: FnvHashMap<ThrottleKey, ThrottleEntry>,
}

impl Default for AmbientThrottle {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_AMBIENT_DELAY_MS))
    }
}

impl AmbientThrottle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            entries: FnvHashMap::default(),
        }
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Whether `cue` may play for `key` at `now`. Leaves the records unchanged.
    pub fn is_due(&self, key: ThrottleKey, cue: CueKind, now: Duration) -> bool {
        match self.entries.get(&key) {
            None => true,
            // saturating: a clock that steps backwards never counts as elapsed
            Some(entry) => {
                entry.last_cue != cue || now.saturating_sub(entry.last_played) >= self.delay
            }
        }
    }

    /// Note that `cue` played for `key` at `now`.
    pub fn record(&mut self, key: ThrottleKey, cue: CueKind, now: Duration) {
        self.entries.insert(
            key,
            ThrottleEntry {
                last_cue: cue,
                last_played: now,
            },
        );
    }

    /// [`is_due`](Self::is_due) followed by [`record`](Self::record) when it is.
    pub fn should_play(&mut self, key: ThrottleKey, cue: CueKind, now: Duration) -> bool {
        let due = self.is_due(key, cue, now);
        if due {
            self.record(key, cue, now);
        }
        due
    }

    pub fn entry(&self, key: ThrottleKey) -> Option<&ThrottleEntry> {
        self.entries.get(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop records of observers that are no longer active. The global record is kept.
    pub fn retain_active(&mut self, active: &FnvHashSet<ObserverId>) {
        self.entries.retain(|key, _| match key {
            ThrottleKey::Global => true,
            ThrottleKey::Observer(id) => active.contains(id),
        });
    }
}
