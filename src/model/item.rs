use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of a document or folder
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Kind of item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Folder,
    Document,
}

/// Canonical document/folder metadata record
///
/// Every backend shape is normalized into this type before it reaches the
/// tree builder or the list renderer (see [`super::raw`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    /// File type as reported by the backend (e.g. "pdf", "docx")
    pub file_type: Option<String>,
    pub size: Option<u64>,
    pub modified: Option<DateTime<Utc>>,
    pub owner: Option<String>,
    pub parent_id: Option<ItemId>,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            file_type: None,
            size: None,
            modified: None,
            owner: None,
            parent_id: None,
        }
    }

    pub fn folder(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        Self::new(id, name, ItemKind::Folder)
    }

    pub fn document(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        Self::new(id, name, ItemKind::Document)
    }

    pub fn with_parent(mut self, parent_id: impl Into<ItemId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_file_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = Some(file_type.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }

    pub fn is_document(&self) -> bool {
        self.kind == ItemKind::Document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_item_creation() {
        let item = Item::document("d1", "report.pdf");

        assert_eq!(item.id, ItemId::from("d1"));
        assert_eq!(item.name, "report.pdf");
        assert!(item.is_document());
        assert!(!item.is_folder());
        assert!(item.parent_id.is_none());
    }

    #[test]
    fn test_item_builder() {
        let modified = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let item = Item::document("d1", "report.pdf")
            .with_parent("f1")
            .with_file_type("pdf")
            .with_size(2048)
            .with_owner("alice")
            .with_modified(modified);

        assert_eq!(item.parent_id, Some(ItemId::from("f1")));
        assert_eq!(item.file_type.as_deref(), Some("pdf"));
        assert_eq!(item.size, Some(2048));
        assert_eq!(item.owner.as_deref(), Some("alice"));
        assert_eq!(item.modified, Some(modified));
    }

    #[test]
    fn test_item_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&ItemId::from("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }
}
