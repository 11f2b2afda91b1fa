use std::time::{Duration, Instant};

use serde::Serialize;

use super::state::{SessionPhase, SessionState};

/// How long a scanned item's name stays on screen, fading out linearly.
pub const ITEM_DISPLAY_WINDOW: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "line", rename_all = "camelCase")]
pub enum ItemLine {
    ScanPrompt,
    Recent { name: String, intensity: f64 },
}

/// Render-ready summary of the session. The renderer decides pixels and colours.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", rename_all = "camelCase")]
pub enum ViewModel {
    ScanIdentity,
    Greeting { name: String, item: ItemLine },
}

impl ViewModel {
    pub fn derive(state: &SessionState, now: Instant) -> Self {
        let identity = match (state.phase(), state.current_identity()) {
            (SessionPhase::AwaitingItem, Some(identity)) => identity,
            _ => return ViewModel::ScanIdentity,
        };

        let item = state
            .last_scan()
            .and_then(|(name, scanned_at)| {
                let elapsed = now.saturating_duration_since(scanned_at);
                (elapsed < ITEM_DISPLAY_WINDOW).then(|| ItemLine::Recent {
                    name: name.to_string(),
                    intensity: 1.0 - elapsed.as_secs_f64() / ITEM_DISPLAY_WINDOW.as_secs_f64(),
                })
            })
            .unwrap_or(ItemLine::ScanPrompt);

        ViewModel::Greeting {
            name: identity.display_name.clone(),
            item,
        }
    }

    /// Text lines top to bottom.
    pub fn lines(&self) -> Vec<String> {
        match self {
            ViewModel::ScanIdentity => vec!["Scan QR Code".to_string()],
            ViewModel::Greeting { name, item } => {
                let item_text = match item {
                    ItemLine::ScanPrompt => "Scan Barcode of item".to_string(),
                    ItemLine::Recent { name, .. } => format!("✓ {name}"),
                };
                vec!["✓ Scan QR Code".to_string(), format!("Hello, {name}!"), item_text]
            }
        }
    }
}
