use std::collections::HashMap;

use serde::Serialize;

use super::normalize::normalize_digits;

pub const UNKNOWN_ITEM: &str = "Unknown Item";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub barcode: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemMatch<'a> {
    Known(&'a ItemRecord),
    Unknown,
}

impl ItemMatch<'_> {
    pub fn display_name(&self) -> &str {
        match self {
            ItemMatch::Known(record) => &record.display_name,
            ItemMatch::Unknown => UNKNOWN_ITEM,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, ItemMatch::Known(_))
    }
}

/// Immutable identity and item reference tables, built once at startup.
#[derive(Debug, Clone)]
pub struct Catalog {
    identities: HashMap<String, Identity>,
    /// Insertion order matters: the first digit-equal key wins.
    items: Vec<ItemRecord>,
    /// Precomputed digit form of each item key, parallel to `items`.
    item_digits: Vec<String>,
}

impl Catalog {
    pub fn new<I, J, K, V>(identities: I, items: J) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        J: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let identities = identities
            .into_iter()
            .map(|(payload, name)| {
                (
                    payload.into(),
                    Identity {
                        display_name: name.into(),
                    },
                )
            })
            .collect();

        let items: Vec<ItemRecord> = items
            .into_iter()
            .map(|(barcode, name)| ItemRecord {
                barcode: barcode.into(),
                display_name: name.into(),
            })
            .collect();
        let item_digits = items
            .iter()
            .map(|record| normalize_digits(&record.barcode))
            .collect();

        Self {
            identities,
            items,
            item_digits,
        }
    }

    /// Tables the station ships with.
    pub fn builtin() -> Self {
        Self::new(
            [("1234", "Ryan")],
            [
                ("0838766101903", "VEGA Plant-based Protein Shake"),
                ("0017082873590", "Jack Links Turkey Jerky (NON-RECYCLABLE)"),
            ],
        )
    }

    /// QR payloads are opaque tokens: exact match only.
    pub fn resolve_identity(&self, raw: &str) -> Option<&Identity> {
        self.identities.get(raw)
    }

    pub fn resolve_item(&self, raw: &str) -> ItemMatch<'_> {
        let trimmed = raw.trim();
        if let Some(record) = self.items.iter().find(|record| record.barcode == trimmed) {
            return ItemMatch::Known(record);
        }

        let digits = normalize_digits(trimmed);
        if digits.is_empty() {
            return ItemMatch::Unknown;
        }

        self.items
            .iter()
            .zip(&self.item_digits)
            .find(|(_, key_digits)| **key_digits == digits)
            .map(|(record, _)| ItemMatch::Known(record))
            .unwrap_or(ItemMatch::Unknown)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_item_match() {
        let catalog = Catalog::builtin();
        assert_eq!(
            catalog.resolve_item("0838766101903").display_name(),
            "VEGA Plant-based Protein Shake"
        );
        assert_eq!(
            catalog.resolve_item("  0017082873590 \r\n").display_name(),
            "Jack Links Turkey Jerky (NON-RECYCLABLE)"
        );
    }

    #[test]
    fn digit_match_ignores_noise() {
        let catalog = Catalog::builtin();
        for raw in ["]E0838766101903x", "0838-766-101-903", "*0838766101903*", "EAN:0838766101903"] {
            let found = catalog.resolve_item(raw);
            assert!(found.is_known(), "{raw} should resolve");
            assert_eq!(found.display_name(), "VEGA Plant-based Protein Shake");
        }
    }

    #[test]
    fn digit_match_requires_equal_sequences() {
        let catalog = Catalog::builtin();
        // a dropped leading zero is a different digit sequence
        assert_eq!(catalog.resolve_item("838766101903"), ItemMatch::Unknown);
        assert_eq!(catalog.resolve_item("08387661019031"), ItemMatch::Unknown);
    }

    #[test]
    fn formatted_keys_match_by_digits() {
        let catalog = Catalog::new(
            Vec::<(&str, &str)>::new(),
            [("0-12345-67890-5", "Oat Milk")],
        );
        assert_eq!(catalog.resolve_item("012345678905").display_name(), "Oat Milk");
        assert_eq!(catalog.resolve_item("0-12345-67890-5").display_name(), "Oat Milk");
    }

    #[test]
    fn first_inserted_key_wins_on_digit_tie() {
        let catalog = Catalog::new(
            Vec::<(&str, &str)>::new(),
            [("A-111", "First"), ("B-111", "Second")],
        );
        assert_eq!(catalog.resolve_item("111").display_name(), "First");
        assert_eq!(catalog.resolve_item("B-111").display_name(), "Second");
    }

    #[test]
    fn no_digits_is_unknown() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.resolve_item("").display_name(), UNKNOWN_ITEM);
        assert_eq!(catalog.resolve_item("hello").display_name(), UNKNOWN_ITEM);
        assert_eq!(catalog.resolve_item("\u{fffd}\u{fffd}").display_name(), UNKNOWN_ITEM);
    }

    #[test]
    fn identity_is_exact_only() {
        let catalog = Catalog::builtin();
        assert_eq!(
            catalog.resolve_identity("1234").map(|id| id.display_name.as_str()),
            Some("Ryan")
        );
        assert!(catalog.resolve_identity(" 1234").is_none());
        assert!(catalog.resolve_identity("01234").is_none());
        assert!(catalog.resolve_identity("").is_none());
    }
}
