//! One-way text protocol between the monitor and the station.
//!
//! A datagram is an award when its trimmed UTF-8 text starts with `AWARD`, so
//! `AWARD25` and `AWARDED 5` count too. The optional second whitespace-separated
//! token is the score; a missing or non-numeric score falls back to
//! [`DEFAULT_AWARD_POINTS`]. Anything else is ignored.

pub const AWARD_TOKEN: &str = "AWARD";
pub const DEFAULT_AWARD_POINTS: u32 = 25;

pub fn encode_award(points: u32) -> String {
    format!("{AWARD_TOKEN} {points}")
}

/// Score carried by an award datagram, or `None` for anything that is not one.
pub fn parse_award(datagram: &[u8]) -> Option<u32> {
    let text = std::str::from_utf8(datagram).ok()?.trim();
    if !text.starts_with(AWARD_TOKEN) {
        return None;
    }

    let points = text
        .split_whitespace()
        .nth(1)
        .and_then(|token| token.parse::<u32>().ok())
        .unwrap_or(DEFAULT_AWARD_POINTS);
    Some(points)
}

pub fn award_message(points: u32) -> String {
    format!("{points} points awarded")
}
