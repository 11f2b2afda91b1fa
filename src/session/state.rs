use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::catalog::Identity;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    #[default]
    AwaitingIdentity,
    AwaitingItem,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::AwaitingIdentity => "AwaitingIdentity",
            SessionPhase::AwaitingItem => "AwaitingItem",
        }
    }
}

/// Mutable session state. `current_identity` is `Some` exactly when the phase is
/// `AwaitingItem`; there is no logout, so once set it stays until the process exits.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    phase: SessionPhase,
    current_identity: Option<Identity>,
    visit_id: Option<String>,
    last_scanned_digits: Option<String>,
    last_scanned_item_name: Option<String>,
    last_scanned_at: Option<Instant>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn current_identity(&self) -> Option<&Identity> {
        self.current_identity.as_ref()
    }

    pub fn visit_id(&self) -> Option<&str> {
        self.visit_id.as_deref()
    }

    pub fn last_scanned_digits(&self) -> Option<&str> {
        self.last_scanned_digits.as_deref()
    }

    /// Most recent scan as (display name, scanned at).
    pub fn last_scan(&self) -> Option<(&str, Instant)> {
        match (&self.last_scanned_item_name, self.last_scanned_at) {
            (Some(name), Some(at)) => Some((name.as_str(), at)),
            _ => None,
        }
    }

    pub fn begin_visit(&mut self, identity: Identity, visit_id: String) {
        self.phase = SessionPhase::AwaitingItem;
        self.current_identity = Some(identity);
        self.visit_id = Some(visit_id);
        self.last_scanned_digits = None;
    }

    /// True when `digits` repeats the previous scan and must be ignored.
    pub fn is_repeat_scan(&self, digits: &str) -> bool {
        self.last_scanned_digits.as_deref() == Some(digits)
    }

    pub fn record_scan(&mut self, digits: String, item_name: String, now: Instant) {
        self.last_scanned_digits = Some(digits);
        self.last_scanned_item_name = Some(item_name);
        self.last_scanned_at = Some(now);
    }
}
