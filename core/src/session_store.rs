//! Generic per-key dialogue session holder with inactivity expiry.
//!
//! RULES:
//!   - At most one session per (phone, kind); create() replaces.
//!   - One logical operation on a key runs entirely under that key's
//!     lock; operations on different keys take different locks.
//!   - Expiry is lazy: checked on read against the injected clock.
//!     sweep() exists for memory hygiene only.
//!   - Nothing here survives a process restart, by design.

use crate::clock::Clock;
use crate::types::Phone;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Quiz,
    Capacity,
}

impl SessionKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::Capacity => "capacity",
        }
    }
}

/// Whether the closure passed to with_session keeps the session alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum After {
    Keep,
    Delete,
}

#[derive(Debug)]
pub struct SessionEntry<S> {
    pub session_id: Uuid,
    pub phone: Phone,
    pub kind: SessionKind,
    pub started_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub state: S,
    /// Set once the session ends; a tombstoned entry is gone even if a
    /// racing caller still holds its Arc.
    finished: bool,
}

pub struct SessionStore<S> {
    kind: SessionKind,
    timeout: Duration,
    clock: Arc<dyn Clock>,
    slots: Mutex<HashMap<Phone, Arc<Mutex<SessionEntry<S>>>>>,
}

impl<S> SessionStore<S> {
    pub fn new(kind: SessionKind, timeout_minutes: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            kind,
            timeout: Duration::minutes(timeout_minutes),
            clock,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Start a session for this key, replacing any existing one.
    pub fn create(&self, phone: &str, state: S) {
        let now = self.clock.now();
        let entry = SessionEntry {
            session_id: Uuid::new_v4(),
            phone: phone.to_string(),
            kind: self.kind,
            started_at: now,
            last_activity: now,
            state,
            finished: false,
        };
        log::debug!(
            "{} session {} started for {phone}",
            self.kind.name(),
            entry.session_id
        );
        let mut slots = self.slots.lock().unwrap();
        if slots
            .insert(phone.to_string(), Arc::new(Mutex::new(entry)))
            .is_some()
        {
            log::debug!("{} session for {phone} replaced", self.kind.name());
        }
    }

    /// Run one logical operation against the session for this key.
    ///
    /// Returns None when there is no live session (absent, expired, or
    /// tombstoned). The entry lock is held for the whole closure and
    /// last_activity is refreshed, so two messages for the same key
    /// cannot interleave mid-operation. The closure decides whether the
    /// session survives it (After::Keep) or ends with it
    /// (After::Delete) — the delete happens under the same entry lock.
    pub fn with_session<R>(
        &self,
        phone: &str,
        f: impl FnOnce(&mut SessionEntry<S>) -> (R, After),
    ) -> Option<R> {
        let slot = {
            let slots = self.slots.lock().unwrap();
            slots.get(phone).cloned()
        }?;

        let mut entry = slot.lock().unwrap();
        if entry.finished {
            return None;
        }

        let now = self.clock.now();
        if now - entry.last_activity > self.timeout {
            entry.finished = true;
            drop(entry);
            self.remove_slot(phone, &slot);
            log::debug!("{} session for {phone} expired lazily", self.kind.name());
            return None;
        }
        entry.last_activity = now;

        let (result, after) = f(&mut entry);
        if after == After::Delete {
            entry.finished = true;
            drop(entry);
            self.remove_slot(phone, &slot);
        }
        Some(result)
    }

    /// Non-refreshing liveness probe for dispatcher routing.
    pub fn is_active(&self, phone: &str) -> bool {
        let slot = {
            let slots = self.slots.lock().unwrap();
            slots.get(phone).cloned()
        };
        match slot {
            Some(slot) => {
                let entry = slot.lock().unwrap();
                !entry.finished && self.clock.now() - entry.last_activity <= self.timeout
            }
            None => false,
        }
    }

    pub fn delete(&self, phone: &str) {
        let slot = {
            let mut slots = self.slots.lock().unwrap();
            slots.remove(phone)
        };
        if let Some(slot) = slot {
            slot.lock().unwrap().finished = true;
        }
    }

    /// Drop every expired entry. Lazy expiry already guarantees
    /// correctness; this only bounds memory on long-lived processes.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut slots = self.slots.lock().unwrap();
        let before = slots.len();
        slots.retain(|_, slot| match slot.try_lock() {
            Ok(mut entry) => {
                let live = !entry.finished && now - entry.last_activity <= self.timeout;
                if !live {
                    entry.finished = true;
                }
                live
            }
            // A locked entry is mid-operation, hence live.
            Err(_) => true,
        });
        before - slots.len()
    }

    /// Remove the map slot only if it still holds this exact entry —
    /// a replacement created meanwhile must survive.
    fn remove_slot(&self, phone: &str, slot: &Arc<Mutex<SessionEntry<S>>>) {
        let mut slots = self.slots.lock().unwrap();
        let is_same = slots
            .get(phone)
            .map(|current| Arc::ptr_eq(current, slot))
            .unwrap_or(false);
        if is_same {
            slots.remove(phone);
        }
    }
}
