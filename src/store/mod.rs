//! Remote object store seam.
//!
//! The catalog only needs four calls from a backend: list the top-level
//! prefixes, list the objects directly under one prefix, read an object and
//! delete an object. Everything else about the backend (auth, caching,
//! retries) is its own business.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, StorageBackend};
use crate::models::RemoteObject;
use crate::Result;

mod firebase;
mod local;
mod memory;

pub use firebase::{FirebaseStore, DEFAULT_API_URL as FIREBASE_API_URL};
pub use local::LocalStore;
pub use memory::MemoryStore;

// ---

#[async_trait]
pub trait ObjectStore: Send + Sync {
    // ---
    /// Names of the top-level prefixes, without trailing separator.
    async fn list_prefixes(&self) -> Result<Vec<String>>;

    /// Objects stored directly under `prefix`, in backend listing order.
    async fn list_items(&self, prefix: &str) -> Result<Vec<RemoteObject>>;

    async fn read(&self, object: &RemoteObject) -> Result<Vec<u8>>;

    async fn delete(&self, object: &RemoteObject) -> Result<()>;
}

/// Build the backend selected by `config`.
pub fn from_config(config: &Config) -> Result<Arc<dyn ObjectStore>> {
    // ---
    let store: Arc<dyn ObjectStore> = match &config.storage {
        StorageBackend::Local { root } => Arc::new(LocalStore::new(root.clone())),
        StorageBackend::Firebase { api_url, bucket } => {
            Arc::new(FirebaseStore::new(api_url, bucket)?)
        }
    };

    Ok(store)
}
