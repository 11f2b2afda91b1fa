use anyhow::Result;
use image::DynamicImage;

use crate::symbols::DecodedSymbol;

pub struct Frame {
    pub sequence: u64,
    pub image: DynamicImage,
}

/// In-order frame producer. `None` means the stream ended or a read failed.
pub trait FrameSource: Send {
    fn read_frame(&mut self) -> Option<Frame>;
}

/// Turns one frame into zero or more symbol records, in decoder order.
pub trait SymbolDecoder: Send {
    fn decode(&mut self, frame: &Frame) -> Result<Vec<DecodedSymbol>>;
}
