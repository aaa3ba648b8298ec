//! Incremental folder loading
//!
//! [`FolderFetcher`] loads folder records for a [`FolderQuery`] in a spawned
//! task and publishes [`FolderSnapshot`]s on a watch channel. Every fetch
//! carries a generation number; a result is applied only while its
//! generation is still the current one, so a slow response for an old query
//! can never overwrite a newer one.

use crate::config::FolderConfig;
use crate::model::{Item, ItemId};
use crate::services::metadata::{FetchError, MetadataManager};
use crate::view::folder_tree::{TreeCache, TreeNode};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// What to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderQuery {
    /// Folder whose subfolders are listed (None for the top level)
    pub root_id: Option<ItemId>,
    /// Also load subfolders of subfolders
    pub recursive: bool,
    /// Maximum number of records to load
    pub limit: usize,
}

impl FolderQuery {
    pub fn new(limit: usize) -> Self {
        Self {
            root_id: None,
            recursive: false,
            limit,
        }
    }

    pub fn with_root(mut self, root_id: Option<ItemId>) -> Self {
        self.root_id = root_id;
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn from_config(config: &FolderConfig) -> Self {
        Self::new(config.page_limit)
            .with_root(config.root_id.clone().map(ItemId))
            .recursive(config.recursive)
    }
}

/// State published after every change
#[derive(Debug, Clone, Default)]
pub struct FolderSnapshot {
    /// Latest applied collection; replaced wholesale on every fetch
    pub items: Arc<Vec<Item>>,
    pub is_loading: bool,
    /// Error of the latest fetch (the collection is empty when set)
    pub error: Option<FetchError>,
    /// Generation this snapshot belongs to
    pub generation: u64,
}

pub struct FolderFetcher {
    manager: MetadataManager,
    query: FolderQuery,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<FolderSnapshot>>,
    tasks: Vec<JoinHandle<()>>,
    tree_cache: TreeCache,
}

impl std::fmt::Debug for FolderFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderFetcher")
            .field("query", &self.query)
            .field("generation", &self.generation())
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

impl FolderFetcher {
    /// Create an idle fetcher; nothing is loaded until [`Self::refetch`]
    pub fn new(manager: MetadataManager, query: FolderQuery) -> Self {
        let (state, _) = watch::channel(FolderSnapshot::default());
        Self {
            manager,
            query,
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
            tasks: Vec::new(),
            tree_cache: TreeCache::new(),
        }
    }

    pub fn query(&self) -> &FolderQuery {
        &self.query
    }

    /// Current generation number
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start a new fetch for the current query and return its generation
    ///
    /// The previous collection stays visible while loading. Any fetch still
    /// in flight becomes stale and its result is dropped.
    ///
    /// Must be called from within a tokio runtime.
    pub fn refetch(&mut self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|snapshot| {
            snapshot.is_loading = true;
            snapshot.error = None;
            snapshot.generation = generation;
        });
        tracing::debug!(
            "Fetching folders (generation {}, root {:?}, recursive {}, limit {})",
            generation,
            self.query.root_id,
            self.query.recursive,
            self.query.limit
        );

        let manager = self.manager.clone();
        let query = self.query.clone();
        let current = Arc::clone(&self.generation);
        let state = Arc::clone(&self.state);

        self.tasks.retain(|task| !task.is_finished());
        self.tasks.push(tokio::spawn(async move {
            let result = load(&manager, &query).await;
            apply(&state, &current, generation, result);
        }));

        generation
    }

    /// Refetch and wait until this fetch has been applied
    pub async fn fetch_now(&mut self) -> FolderSnapshot {
        let mut rx = self.subscribe();
        let generation = self.refetch();
        // The watch guard borrows `rx`, so clone it out before returning
        let snapshot = match rx
            .wait_for(|s| s.generation == generation && !s.is_loading)
            .await
        {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        };
        snapshot
    }

    /// Replace the query and refetch
    pub fn set_query(&mut self, query: FolderQuery) -> u64 {
        self.query = query;
        self.refetch()
    }

    /// Stop applying in-flight results (e.g. when navigating away)
    ///
    /// The current collection is kept; loading ends without an error.
    pub fn cancel(&mut self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.state.send_modify(|snapshot| {
            snapshot.is_loading = false;
            snapshot.generation = generation;
        });
        tracing::debug!("Cancelled folder fetches (generation {})", generation);
    }

    pub fn snapshot(&self) -> FolderSnapshot {
        self.state.borrow().clone()
    }

    /// Receive every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<FolderSnapshot> {
        self.state.subscribe()
    }

    pub fn items(&self) -> Arc<Vec<Item>> {
        Arc::clone(&self.state.borrow().items)
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn error(&self) -> Option<FetchError> {
        self.state.borrow().error.clone()
    }

    /// Folder tree of the current collection, rebuilt only when the
    /// collection changed
    pub fn tree(&mut self) -> Arc<Vec<TreeNode>> {
        let items = self.items();
        self.tree_cache.get(&items)
    }
}

impl Drop for FolderFetcher {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

async fn load(manager: &MetadataManager, query: &FolderQuery) -> Result<Vec<Item>, FetchError> {
    if query.recursive {
        manager
            .list_recursive(query.root_id.clone(), true, query.limit)
            .await
    } else {
        manager
            .list_all(query.root_id.clone(), true, query.limit)
            .await
    }
}

fn apply(
    state: &watch::Sender<FolderSnapshot>,
    current: &AtomicU64,
    generation: u64,
    result: Result<Vec<Item>, FetchError>,
) {
    state.send_if_modified(|snapshot| {
        let latest = current.load(Ordering::SeqCst);
        if latest != generation {
            tracing::warn!(
                "Discarding stale folder response (generation {}, current {})",
                generation,
                latest
            );
            return false;
        }

        match result {
            Ok(items) => {
                tracing::debug!("Applied {} folders (generation {})", items.len(), generation);
                snapshot.items = Arc::new(items);
                snapshot.error = None;
            }
            Err(e) => {
                tracing::debug!("Folder fetch failed (generation {}): {}", generation, e);
                snapshot.items = Arc::new(Vec::new());
                snapshot.error = Some(e);
            }
        }
        snapshot.is_loading = false;
        true
    });
}
