use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::catalog::{normalize_digits, Catalog};
use crate::symbols::{Annotation, DecodedSymbol, SymbolKind};

use super::state::{SessionPhase, SessionState};
use super::view::ViewModel;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SessionEvent {
    #[serde(rename_all = "camelCase")]
    Login {
        at: DateTime<Utc>,
        visit_id: String,
        identity: String,
    },
    #[serde(rename_all = "camelCase")]
    Scan {
        at: DateTime<Utc>,
        visit_id: String,
        identity: String,
        item_name: String,
        raw: String,
        digits: String,
    },
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::Login { at, identity, .. } => {
                write!(f, "[{}] User logged in: {}", at.format("%Y-%m-%d %H:%M:%S"), identity)
            }
            SessionEvent::Scan {
                at,
                identity,
                item_name,
                raw,
                digits,
                ..
            } => write!(
                f,
                "[{}] {} scanned: {} raw={:?} digits={}",
                at.format("%Y-%m-%d %H:%M:%S"),
                identity,
                item_name,
                raw,
                digits
            ),
        }
    }
}

/// Everything one frame produced: state-machine events plus one annotation per symbol.
#[derive(Debug, Clone, Default)]
pub struct FrameOutcome {
    pub events: Vec<SessionEvent>,
    pub annotations: Vec<Annotation>,
}

pub struct SessionMachine {
    catalog: Catalog,
    state: SessionState,
}

impl SessionMachine {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            state: SessionState::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    /// Apply one frame of decoded symbols in decoder order. Each symbol is judged
    /// against the phase left by the previous one, so a QR login followed by a
    /// barcode in the same frame both take effect.
    pub fn process_frame(
        &mut self,
        symbols: &[DecodedSymbol],
        now: Instant,
        at: DateTime<Utc>,
    ) -> FrameOutcome {
        let mut outcome = FrameOutcome {
            events: Vec::new(),
            annotations: Vec::with_capacity(symbols.len()),
        };

        for symbol in symbols {
            let event = match (symbol.kind, self.state.phase()) {
                (SymbolKind::Qr, SessionPhase::AwaitingIdentity) => self.try_login(symbol, at),
                (SymbolKind::OtherBarcode, SessionPhase::AwaitingItem) => {
                    self.try_scan(symbol, now, at)
                }
                _ => None,
            };
            outcome.events.extend(event);
            outcome.annotations.push(symbol.annotation());
        }

        outcome
    }

    pub fn view(&self, now: Instant) -> ViewModel {
        ViewModel::derive(&self.state, now)
    }

    fn try_login(&mut self, symbol: &DecodedSymbol, at: DateTime<Utc>) -> Option<SessionEvent> {
        let identity = self.catalog.resolve_identity(&symbol.payload)?.clone();
        let visit_id = Uuid::new_v4().to_string();
        let name = identity.display_name.clone();
        self.state.begin_visit(identity, visit_id.clone());

        Some(SessionEvent::Login {
            at,
            visit_id,
            identity: name,
        })
    }

    fn try_scan(
        &mut self,
        symbol: &DecodedSymbol,
        now: Instant,
        at: DateTime<Utc>,
    ) -> Option<SessionEvent> {
        let digits = normalize_digits(symbol.payload.trim());
        if self.state.is_repeat_scan(&digits) {
            return None;
        }

        let item_name = self
            .catalog
            .resolve_item(&symbol.payload)
            .display_name()
            .to_string();
        self.state.record_scan(digits.clone(), item_name.clone(), now);

        let identity = self
            .state
            .current_identity()
            .map(|identity| identity.display_name.clone())
            .unwrap_or_default();
        let visit_id = self.state.visit_id().unwrap_or_default().to_string();

        Some(SessionEvent::Scan {
            at,
            visit_id,
            identity,
            item_name,
            raw: symbol.payload.clone(),
            digits,
        })
    }
}
