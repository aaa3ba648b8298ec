//! Permissive wire shapes of the listing endpoint
//!
//! The backend is inconsistent about field names and value types (numeric vs
//! string ids, `parentId` vs `parent_id`, owner as a string or an object, ...).
//! Everything is accepted here and normalized into [`Item`] so the tree and
//! list code only ever sees one shape.

use super::item::{Item, ItemId, ItemKind};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// A JSON scalar that may arrive as a string or a number
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawScalar {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl RawScalar {
    /// String form, `None` for empty strings
    fn into_text(self) -> Option<String> {
        let text = match self {
            RawScalar::Text(s) => s.trim().to_string(),
            RawScalar::Integer(i) => i.to_string(),
            RawScalar::Float(f) => f.to_string(),
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn into_u64(self) -> Option<u64> {
        match self {
            RawScalar::Text(s) => s.trim().parse().ok(),
            RawScalar::Integer(i) => u64::try_from(i).ok(),
            RawScalar::Float(f) if f >= 0.0 && f.is_finite() => Some(f as u64),
            RawScalar::Float(_) => None,
        }
    }

    fn into_timestamp(self) -> Option<DateTime<Utc>> {
        match self {
            RawScalar::Text(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            // Numeric timestamps are milliseconds since the epoch
            RawScalar::Integer(ms) => DateTime::from_timestamp_millis(ms),
            RawScalar::Float(ms) => DateTime::from_timestamp_millis(ms as i64),
        }
    }
}

/// Owner as either a plain name or a user object
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawOwner {
    Name(String),
    User(RawUser),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    #[serde(default, alias = "displayName", alias = "fullName")]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl RawOwner {
    fn into_name(self) -> Option<String> {
        match self {
            RawOwner::Name(name) => Some(name).filter(|n| !n.trim().is_empty()),
            RawOwner::User(user) => user
                .name
                .filter(|n| !n.trim().is_empty())
                .or(user.email),
        }
    }
}

/// One record as returned by the listing endpoint
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    #[serde(default, alias = "_id", alias = "uuid")]
    pub id: Option<RawScalar>,
    #[serde(default, alias = "title", alias = "fileName", alias = "filename")]
    pub name: Option<String>,
    #[serde(default, rename = "type", alias = "fileType", alias = "mimeType")]
    pub file_type: Option<String>,
    #[serde(default, alias = "is_folder", alias = "isDirectory")]
    pub is_folder: Option<bool>,
    #[serde(default)]
    pub size: Option<RawScalar>,
    #[serde(
        default,
        alias = "updatedAt",
        alias = "updated_at",
        alias = "lastModified",
        alias = "modifiedAt"
    )]
    pub modified: Option<RawScalar>,
    #[serde(default, alias = "createdBy", alias = "created_by")]
    pub owner: Option<RawOwner>,
    #[serde(
        default,
        alias = "parent_id",
        alias = "parent",
        alias = "folderId",
        alias = "folder_id"
    )]
    pub parent_id: Option<RawScalar>,
}

/// One page of the listing endpoint
///
/// Records stay untyped until [`Self::into_parts`], so one malformed record
/// is skipped instead of failing the whole page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPage {
    #[serde(default, alias = "data", alias = "results")]
    pub items: Vec<Value>,
    #[serde(default, alias = "next_cursor", alias = "next")]
    pub next_cursor: Option<RawScalar>,
    #[serde(default, alias = "total_count", alias = "total")]
    pub total_count: Option<RawScalar>,
}

/// Error produced when a raw record cannot become an [`Item`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// The record does not have the shape of a listing record
    Malformed(String),
    MissingId,
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeError::Malformed(msg) => write!(f, "malformed record: {msg}"),
            NormalizeError::MissingId => write!(f, "record has no id"),
        }
    }
}

impl std::error::Error for NormalizeError {}

fn is_folder_type(file_type: &str) -> bool {
    matches!(
        file_type.to_ascii_lowercase().as_str(),
        "folder" | "directory" | "dir"
    )
}

impl RawItem {
    pub fn from_value(value: Value) -> Result<Self, NormalizeError> {
        serde_json::from_value(value).map_err(|e| NormalizeError::Malformed(e.to_string()))
    }

    /// Normalize into the canonical item type
    pub fn normalize(self) -> Result<Item, NormalizeError> {
        let id = self
            .id
            .and_then(RawScalar::into_text)
            .ok_or(NormalizeError::MissingId)?;

        let type_says_folder = self.file_type.as_deref().is_some_and(is_folder_type);
        let kind = match self.is_folder {
            Some(true) => ItemKind::Folder,
            Some(false) => ItemKind::Document,
            None if type_says_folder => ItemKind::Folder,
            None => ItemKind::Document,
        };
        let file_type = self
            .file_type
            .filter(|t| !t.trim().is_empty() && !is_folder_type(t));

        let parent_id = self
            .parent_id
            .and_then(RawScalar::into_text)
            .filter(|p| *p != id)
            .map(ItemId);

        Ok(Item {
            name: self.name.unwrap_or_else(|| id.clone()),
            id: ItemId(id),
            kind,
            file_type,
            size: self.size.and_then(RawScalar::into_u64),
            modified: self.modified.and_then(RawScalar::into_timestamp),
            owner: self.owner.and_then(RawOwner::into_name),
            parent_id,
        })
    }
}

/// Normalize a batch of untyped records, skipping (and logging) unusable ones
pub fn normalize_items(raw: Vec<Value>) -> Vec<Item> {
    let total = raw.len();
    let items: Vec<Item> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match RawItem::from_value(value).and_then(RawItem::normalize) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("Skipping listing record {}: {}", index, e);
                None
            }
        })
        .collect();

    if items.len() != total {
        tracing::debug!("Normalized {} of {} listing records", items.len(), total);
    }
    items
}

impl RawPage {
    /// Split into normalized items, next cursor and total count
    pub fn into_parts(self) -> (Vec<Item>, Option<String>, Option<usize>) {
        let items = normalize_items(self.items);
        let next_cursor = self.next_cursor.and_then(RawScalar::into_text);
        let total_count = self
            .total_count
            .and_then(RawScalar::into_u64)
            .map(|n| n as usize);
        (items, next_cursor, total_count)
    }
}
