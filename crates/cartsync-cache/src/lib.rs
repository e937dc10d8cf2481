//! Persistent key-value storage for cartsync.
//!
//! Provides a small async [`KeyValueStore`] abstraction over device storage
//! and a [`Cache`] wrapper with automatic JSON serialization.
//!
//! # Example
//!
//! ```rust,ignore
//! use cartsync_cache::{Cache, FileStore};
//!
//! let store = FileStore::open(".cartsync/local-storage.json").await?;
//! let cache = Cache::new(store);
//!
//! // Store a value
//! cache.set("cartItemsCount", &2).await?;
//!
//! // Retrieve a value
//! let count: Option<i32> = cache.get("cartItemsCount").await?;
//!
//! // Delete a value
//! cache.delete("cartItemsCount").await?;
//! ```

mod error;
mod kv;
mod store;

pub use error::CacheError;
pub use kv::Cache;
pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileStore, KeyValueStore, MemoryStore};
}
