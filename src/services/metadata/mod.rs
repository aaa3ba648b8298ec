// Metadata listing layer for paginated document/folder endpoints
//
// Backends are pluggable so the folder layer runs the same against an HTTP
// server, an in-memory fixture, or a delayed test double.

pub mod backend;
#[cfg(feature = "runtime")]
pub mod http;
pub mod manager;
pub mod memory;
pub mod slow;

pub use backend::{FetchError, ListPage, ListRequest, MetadataBackend};
#[cfg(feature = "runtime")]
pub use http::HttpBackend;
pub use manager::MetadataManager;
pub use memory::InMemoryBackend;
pub use slow::{BackendMetrics, SlowBackend, SlowBackendConfig};
