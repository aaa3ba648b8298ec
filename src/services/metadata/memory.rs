//! In-memory metadata backend
//!
//! Serves a fixed collection with the same filtering and cursor pagination
//! as the HTTP endpoint. Used by the CLI for JSON fixtures and by tests.

use super::backend::{FetchError, ListPage, ListRequest, MetadataBackend};
use crate::model::Item;
use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

pub struct InMemoryBackend {
    items: RwLock<Vec<Item>>,
    /// Error returned by the next `list` call instead of data
    next_failure: Mutex<Option<FetchError>>,
}

impl InMemoryBackend {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: RwLock::new(items),
            next_failure: Mutex::new(None),
        }
    }

    /// Replace the whole collection
    pub async fn replace_items(&self, items: Vec<Item>) {
        *self.items.write().await = items;
    }

    /// Append records to the collection
    pub async fn push_items(&self, items: impl IntoIterator<Item = Item>) {
        self.items.write().await.extend(items);
    }

    /// Make the next `list` call fail with `error`
    pub async fn fail_next(&self, error: FetchError) {
        *self.next_failure.lock().await = Some(error);
    }

    /// Number of records held
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl MetadataBackend for InMemoryBackend {
    async fn list(&self, request: &ListRequest) -> Result<ListPage, FetchError> {
        if let Some(error) = self.next_failure.lock().await.take() {
            return Err(error);
        }

        let start = match &request.cursor {
            Some(cursor) => cursor.parse::<usize>().map_err(|_| FetchError::Status {
                code: 400,
                message: format!("invalid cursor {cursor:?}"),
            })?,
            None => 0,
        };

        let items = self.items.read().await;
        let matching: Vec<&Item> = items
            .iter()
            .filter(|item| item.parent_id == request.parent_id)
            .filter(|item| !request.only_folders || item.is_folder())
            .collect();

        let end = start.saturating_add(request.limit).min(matching.len());
        let page: Vec<Item> = matching
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|item| (*item).clone())
            .collect();
        let next_cursor = (end < matching.len()).then(|| end.to_string());

        Ok(ListPage::new(page)
            .with_next_cursor(next_cursor)
            .with_total_count(Some(matching.len())))
    }
}
