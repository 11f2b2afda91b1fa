use serde::{Deserialize, Serialize};

/// Which decoder family produced a symbol.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SymbolKind {
    Qr,
    OtherBarcode,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Qr => "QRCODE",
            SymbolKind::OtherBarcode => "BARCODE",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// One decoder result for a single frame. Never kept past the frame that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DecodedSymbol {
    pub payload: String,
    pub kind: SymbolKind,
    /// Symbology reported by the decoder (`EAN13`, `CODE128`, ...); informational only.
    #[serde(default)]
    pub symbology: Option<String>,
    #[serde(default)]
    pub bounding_box: BoundingBox,
}

impl DecodedSymbol {
    pub fn new(payload: impl Into<String>, kind: SymbolKind, bounding_box: BoundingBox) -> Self {
        Self {
            payload: payload.into(),
            kind,
            symbology: None,
            bounding_box,
        }
    }

    /// Build a record from raw decoder bytes; invalid UTF-8 becomes U+FFFD.
    pub fn from_bytes(bytes: &[u8], kind: SymbolKind, bounding_box: BoundingBox) -> Self {
        Self::new(String::from_utf8_lossy(bytes), kind, bounding_box)
    }

    pub fn with_symbology(mut self, symbology: impl Into<String>) -> Self {
        self.symbology = Some(symbology.into());
        self
    }

    pub fn is_qr(&self) -> bool {
        self.kind == SymbolKind::Qr
    }

    fn kind_label(&self) -> &str {
        match (self.kind, self.symbology.as_deref()) {
            (SymbolKind::Qr, _) => SymbolKind::Qr.as_str(),
            (SymbolKind::OtherBarcode, Some(symbology)) => symbology,
            (SymbolKind::OtherBarcode, None) => SymbolKind::OtherBarcode.as_str(),
        }
    }

    pub fn annotation(&self) -> Annotation {
        let bbox = self.bounding_box;
        let label_y = if bbox.y - 10 > 10 { bbox.y - 10 } else { bbox.y + 10 };
        Annotation {
            bounding_box: bbox,
            kind: self.kind,
            label: format!("{}: {}", self.kind_label(), self.payload),
            label_origin: (bbox.x, label_y),
        }
    }
}

/// Box + caption drawn for every decoded symbol, whatever the session did with it.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub bounding_box: BoundingBox,
    pub kind: SymbolKind,
    pub label: String,
    pub label_origin: (i32, i32),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x: i32, y: i32) -> BoundingBox {
        BoundingBox {
            x,
            y,
            width: 40,
            height: 20,
        }
    }

    #[test]
    fn lossy_payload_uses_replacement_char() {
        let symbol = DecodedSymbol::from_bytes(b"08387\xff661", SymbolKind::OtherBarcode, bbox(0, 0));
        assert_eq!(symbol.payload, "08387\u{fffd}661");
    }

    #[test]
    fn annotation_label_sits_above_box() {
        let symbol = DecodedSymbol::new("1234", SymbolKind::Qr, bbox(30, 100));
        let annotation = symbol.annotation();
        assert_eq!(annotation.label, "QRCODE: 1234");
        assert_eq!(annotation.label_origin, (30, 90));
    }

    #[test]
    fn annotation_label_drops_below_near_top_edge() {
        let symbol = DecodedSymbol::new("0838766101903", SymbolKind::OtherBarcode, bbox(5, 15))
            .with_symbology("EAN13");
        let annotation = symbol.annotation();
        assert_eq!(annotation.label, "EAN13: 0838766101903");
        assert_eq!(annotation.label_origin, (5, 25));
    }

    #[test]
    fn deserializes_replay_shape() {
        let json = r#"{"payload":"1234","kind":"QR","boundingBox":{"x":1,"y":2,"width":3,"height":4}}"#;
        let symbol: DecodedSymbol = serde_json::from_str(json).unwrap();
        assert!(symbol.is_qr());
        assert_eq!(symbol.bounding_box.height, 4);

        let json = r#"{"payload":"0017082873590","kind":"OTHER_BARCODE"}"#;
        let symbol: DecodedSymbol = serde_json::from_str(json).unwrap();
        assert_eq!(symbol.kind, SymbolKind::OtherBarcode);
        assert_eq!(symbol.symbology, None);
    }
}
