use crate::model::{Item, ItemId};
use async_trait::async_trait;
use std::fmt;

/// Parameters of one listing call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListRequest {
    /// Folder to list (None for the top level)
    pub parent_id: Option<ItemId>,
    /// Maximum number of records in the page
    pub limit: usize,
    /// Cursor returned by the previous page
    pub cursor: Option<String>,
    /// Only return folders
    pub only_folders: bool,
}

impl ListRequest {
    pub fn new(limit: usize) -> Self {
        Self {
            parent_id: None,
            limit,
            cursor: None,
            only_folders: false,
        }
    }

    pub fn with_parent(mut self, parent_id: Option<ItemId>) -> Self {
        self.parent_id = parent_id;
        self
    }

    pub fn with_cursor(mut self, cursor: Option<String>) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn folders_only(mut self, only_folders: bool) -> Self {
        self.only_folders = only_folders;
        self
    }
}

/// One page of listing results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    pub items: Vec<Item>,
    /// Cursor of the next page, None on the last page
    pub next_cursor: Option<String>,
    /// Total number of matching records, when the backend reports it
    pub total_count: Option<usize>,
}

impl ListPage {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            next_cursor: None,
            total_count: None,
        }
    }

    pub fn with_next_cursor(mut self, cursor: Option<String>) -> Self {
        self.next_cursor = cursor;
        self
    }

    pub fn with_total_count(mut self, total: Option<usize>) -> Self {
        self.total_count = total;
        self
    }

    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}

/// Errors surfaced by metadata backends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection failed, timed out, ...
    Network(String),
    /// The server answered with an error status
    Status { code: u16, message: String },
    /// The bearer token was missing or rejected
    Unauthorized,
    /// The response body could not be decoded
    Decode(String),
    /// The request was abandoned before it finished
    Cancelled,
}

impl FetchError {
    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network(_) | FetchError::Cancelled => true,
            FetchError::Status { code, .. } => *code >= 500 || *code == 429,
            FetchError::Unauthorized | FetchError::Decode(_) => false,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(msg) => write!(f, "Network error: {msg}"),
            FetchError::Status { code, message } => write!(f, "Server error {code}: {message}"),
            FetchError::Unauthorized => write!(f, "Not authorized"),
            FetchError::Decode(msg) => write!(f, "Invalid response: {msg}"),
            FetchError::Cancelled => write!(f, "Request cancelled"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Async metadata backend trait
///
/// Abstracts the paginated listing endpoint so the folder layer works the
/// same against an HTTP server, an in-memory fixture, or a test double.
#[async_trait]
pub trait MetadataBackend: Send + Sync {
    /// Fetch one page of records
    ///
    /// # Errors
    ///
    /// Returns an error if the listing cannot be retrieved or decoded.
    async fn list(&self, request: &ListRequest) -> Result<ListPage, FetchError>;
}
