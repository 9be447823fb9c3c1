//! Key-value storage backends
//!
//! The booking store only needs three primitives from its backend: point
//! reads, point writes, and prefix-scoped key enumeration with an opaque
//! continuation cursor. Anything offering those can sit behind [`KvStore`].

pub mod memory;
pub mod spanner;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Config, StorageBackend};

pub use memory::MemoryKv;
pub use spanner::SpannerKv;

/// One page of a prefix-scoped key listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPage {
    pub keys: Vec<String>,
    /// Continuation cursor, `None` once the listing is exhausted
    pub cursor: Option<String>,
}

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn put(&self, key: &str, value: String) -> Result<()>;

    /// List keys starting with `prefix`, resuming after `cursor` when given
    async fn list(&self, prefix: &str, cursor: Option<&str>) -> Result<KeyPage>;
}

/// Build the backend selected by configuration, or `None` when storage is not bound
pub async fn from_config(config: &Config) -> Result<Option<Arc<dyn KvStore>>> {
    let store: Arc<dyn KvStore> = match &config.storage_backend {
        None => return Ok(None),
        Some(StorageBackend::Memory) => Arc::new(MemoryKv::new(config.list_page_size)),
        Some(StorageBackend::Spanner(settings)) => {
            Arc::new(SpannerKv::from_settings(settings, config.list_page_size).await?)
        }
    };
    Ok(Some(store))
}
