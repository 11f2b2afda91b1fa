//! Scripted capture backend.
//!
//! A replay script is a JSON-lines file: each line is the array of decoded
//! symbols for one frame (`[]` or a blank line for a frame with none). Lines
//! starting with `#` are comments. End of file is end of stream.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use image::DynamicImage;

use crate::symbols::DecodedSymbol;

use super::capture::{Frame, FrameSource, SymbolDecoder};

const FRAME_WIDTH: u32 = 640;
const FRAME_HEIGHT: u32 = 480;

pub fn parse_script(contents: &str) -> Result<Vec<Vec<DecodedSymbol>>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim_start().starts_with('#'))
        .map(|(index, line)| {
            if line.trim().is_empty() {
                return Ok(Vec::new());
            }
            serde_json::from_str::<Vec<DecodedSymbol>>(line)
                .map_err(|err| anyhow!("replay line {}: {err}", index + 1))
        })
        .collect()
}

pub fn load_script(path: &Path) -> Result<Vec<Vec<DecodedSymbol>>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read replay script {}", path.display()))?;
    parse_script(&contents)
}

/// Blank frames paced at a fixed interval, one per script line.
pub struct ReplayCapture {
    total: u64,
    next: u64,
    interval: Duration,
}

impl ReplayCapture {
    pub fn new(total: usize, interval: Duration) -> Self {
        Self {
            total: total as u64,
            next: 0,
            interval,
        }
    }
}

impl FrameSource for ReplayCapture {
    fn read_frame(&mut self) -> Option<Frame> {
        if self.next >= self.total {
            return None;
        }
        if self.next > 0 && !self.interval.is_zero() {
            thread::sleep(self.interval);
        }

        let frame = Frame {
            sequence: self.next,
            image: DynamicImage::new_rgb8(FRAME_WIDTH, FRAME_HEIGHT),
        };
        self.next += 1;
        Some(frame)
    }
}

/// Hands back the scripted symbols for each frame's sequence number.
pub struct ReplayDecoder {
    frames: Vec<Vec<DecodedSymbol>>,
}

impl ReplayDecoder {
    pub fn new(frames: Vec<Vec<DecodedSymbol>>) -> Self {
        Self { frames }
    }
}

impl SymbolDecoder for ReplayDecoder {
    fn decode(&mut self, frame: &Frame) -> Result<Vec<DecodedSymbol>> {
        usize::try_from(frame.sequence)
            .ok()
            .and_then(|index| self.frames.get(index))
            .cloned()
            .ok_or_else(|| anyhow!("no scripted symbols for frame {}", frame.sequence))
    }
}

/// Capture pair for a script already parsed into frames.
pub fn replay_pair(
    frames: Vec<Vec<DecodedSymbol>>,
    interval: Duration,
) -> (ReplayCapture, ReplayDecoder) {
    (ReplayCapture::new(frames.len(), interval), ReplayDecoder::new(frames))
}
