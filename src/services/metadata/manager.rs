use super::backend::{FetchError, ListPage, ListRequest, MetadataBackend};
use crate::model::{Item, ItemId};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;

/// Type alias for pending listing requests map
type PendingListRequests =
    Arc<Mutex<HashMap<ListRequest, Vec<oneshot::Sender<Result<ListPage, FetchError>>>>>>;

fn lock_pending(
    pending: &PendingListRequests,
) -> MutexGuard<'_, HashMap<ListRequest, Vec<oneshot::Sender<Result<ListPage, FetchError>>>>> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Removes an in-flight entry if its executing call is dropped before it
/// finishes, so waiters retry instead of hanging
struct PendingGuard<'a> {
    pending: &'a PendingListRequests,
    request: Option<ListRequest>,
}

impl PendingGuard<'_> {
    fn complete(mut self, result: &Result<ListPage, FetchError>) {
        if let Some(request) = self.request.take() {
            if let Some(senders) = lock_pending(self.pending).remove(&request) {
                for sender in senders {
                    let _ = sender.send(result.clone());
                }
            }
        }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if let Some(request) = self.request.take() {
            lock_pending(self.pending).remove(&request);
        }
    }
}

/// Manages metadata listing with request deduplication and pagination
///
/// The MetadataManager sits between the folder layer and the backend:
/// - Identical concurrent requests share one backend call
/// - Cursors are followed until the last page or the record limit
/// - Recursive loads walk folders breadth-first
pub struct MetadataManager {
    backend: Arc<dyn MetadataBackend>,
    /// Map of request -> channels waiting for its result
    pending_list_requests: PendingListRequests,
}

impl fmt::Debug for MetadataManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataManager")
            .field("backend", &"<dyn MetadataBackend>")
            .field("pending_list_requests", &"<mutex>")
            .finish()
    }
}

impl MetadataManager {
    pub fn new(backend: Arc<dyn MetadataBackend>) -> Self {
        Self {
            backend,
            pending_list_requests: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Fetch one page with request deduplication
    ///
    /// If the same request is already in flight, wait for it instead of
    /// calling the backend again. A waiter whose executing call was dropped
    /// (its task aborted) takes over the request rather than failing.
    pub async fn list(&self, request: ListRequest) -> Result<ListPage, FetchError> {
        loop {
            let (rx, should_execute) = {
                let mut pending = lock_pending(&self.pending_list_requests);

                let (tx, rx) = oneshot::channel();
                if let Some(senders) = pending.get_mut(&request) {
                    senders.push(tx);
                    (rx, false)
                } else {
                    pending.insert(request.clone(), vec![tx]);
                    (rx, true)
                }
            };

            if !should_execute {
                match rx.await {
                    Ok(result) => return result,
                    Err(_) => {
                        tracing::debug!("Shared listing call was dropped, retrying {:?}", request);
                        continue;
                    }
                }
            }

            let guard = PendingGuard {
                pending: &self.pending_list_requests,
                request: Some(request.clone()),
            };
            let result = self.backend.list(&request).await;
            guard.complete(&result);

            return result;
        }
    }

    /// Fetch up to `limit` children of `parent_id`, following cursors
    pub async fn list_all(
        &self,
        parent_id: Option<ItemId>,
        only_folders: bool,
        limit: usize,
    ) -> Result<Vec<Item>, FetchError> {
        let mut items = Vec::new();
        let mut seen_cursors = HashSet::new();
        let mut cursor = None;

        while items.len() < limit {
            let request = ListRequest::new(limit - items.len())
                .with_parent(parent_id.clone())
                .with_cursor(cursor.take())
                .folders_only(only_folders);
            let page = self.list(request).await?;
            let more = page.has_more();
            let empty = page.items.is_empty();
            items.extend(page.items);

            if more && empty {
                tracing::warn!("Backend returned an empty page with a cursor, stopping pagination");
                break;
            }

            match page.next_cursor {
                Some(next) if more => {
                    if !seen_cursors.insert(next.clone()) {
                        tracing::warn!("Backend repeated cursor {:?}, stopping pagination", next);
                        break;
                    }
                    cursor = Some(next);
                }
                _ => break,
            }
        }

        items.truncate(limit);
        Ok(items)
    }

    /// Fetch up to `limit` records below `root_id`, descending into folders
    /// breadth-first
    ///
    /// Each folder is listed at most once, so a parent cycle reported by the
    /// backend cannot make the walk loop.
    pub async fn list_recursive(
        &self,
        root_id: Option<ItemId>,
        only_folders: bool,
        limit: usize,
    ) -> Result<Vec<Item>, FetchError> {
        let mut items: Vec<Item> = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([root_id]);

        while let Some(parent_id) = queue.pop_front() {
            if items.len() >= limit {
                break;
            }
            if !visited.insert(parent_id.clone()) {
                continue;
            }

            let children = self
                .list_all(parent_id, only_folders, limit - items.len())
                .await?;
            queue.extend(
                children
                    .iter()
                    .filter(|item| item.is_folder())
                    .map(|item| Some(item.id.clone())),
            );
            items.extend(children);
        }

        tracing::debug!("Recursive listing returned {} records", items.len());
        Ok(items)
    }

    /// Get the underlying backend
    pub fn backend(&self) -> &Arc<dyn MetadataBackend> {
        &self.backend
    }
}

impl Clone for MetadataManager {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            pending_list_requests: Arc::clone(&self.pending_list_requests),
        }
    }
}
