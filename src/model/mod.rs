// Canonical document/folder records and normalization of backend shapes

pub mod item;
pub mod raw;

pub use item::{Item, ItemId, ItemKind};
pub use raw::{normalize_items, NormalizeError, RawItem, RawPage};
