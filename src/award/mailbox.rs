use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// How long an award stays visible after it arrives.
pub const AWARD_DISPLAY_WINDOW: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq)]
pub struct AwardNotice {
    pub message: String,
    pub received_at: Instant,
    pub received_utc: DateTime<Utc>,
}

/// Single-slot holder for the latest award. The listener writes, the render loop
/// reads; each call takes the lock once and never holds it across I/O.
#[derive(Clone, Default)]
pub struct AwardMailbox {
    slot: Arc<Mutex<Option<AwardNotice>>>,
}

impl AwardMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever notice is stored. Earlier notices are not queued.
    pub fn publish(&self, message: impl Into<String>, now: Instant) {
        let notice = AwardNotice {
            message: message.into(),
            received_at: now,
            received_utc: Utc::now(),
        };
        *self.lock() = Some(notice);
    }

    /// The stored notice if it is younger than the display window. A stale notice
    /// stays in the slot but is never returned again.
    pub fn peek(&self, now: Instant) -> Option<AwardNotice> {
        let guard = self.lock();
        guard
            .as_ref()
            .filter(|notice| now.saturating_duration_since(notice.received_at) < AWARD_DISPLAY_WINDOW)
            .cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Option<AwardNotice>> {
        match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
