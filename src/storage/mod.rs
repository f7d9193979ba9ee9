pub mod fs;
pub mod http;

use crate::config::Config;
use crate::errors::{DataHubError, Result};
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

pub use fs::FsBlobStore;
pub use http::HttpBlobStore;

/// Path-addressed durable object store
///
/// `put` replaces any existing object under the same key; readers never see a
/// partially written object.
#[async_trait]
pub trait BlobStore {
    /// Full location of `key`, for logs
    fn describe(&self, key: &str) -> String;

    async fn put(&self, key: &str, blob: Vec<u8>) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Vec<u8>>;
}

/// 拒绝空路径、绝对路径和包含 `..` 的路径
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.starts_with('/') || key.ends_with('/') {
        return Err(DataHubError::StorageError(format!("Invalid object key {:?}", key)));
    }
    if key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..") {
        return Err(DataHubError::StorageError(format!("Invalid object key {:?}", key)));
    }
    Ok(())
}

/// 根据配置选择存储后端
pub fn blob_store_from_config(config: &Config) -> Result<Arc<dyn BlobStore + Send + Sync>> {
    match &config.storage_endpoint {
        Some(endpoint) => {
            info!("Using HTTP object store at {} (bucket {})", endpoint, config.storage_bucket);
            Ok(Arc::new(HttpBlobStore::new(endpoint, &config.storage_bucket, config.request_timeout)?))
        }
        None => {
            let store = FsBlobStore::new(&config.data_dir, &config.storage_bucket);
            info!("Using local object store at {}", store.root().display());
            Ok(Arc::new(store))
        }
    }
}
