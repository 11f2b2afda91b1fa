pub mod normalize;
pub mod tables;

pub use normalize::normalize_digits;
pub use tables::{Catalog, Identity, ItemMatch, ItemRecord, UNKNOWN_ITEM};
