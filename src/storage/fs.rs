use crate::errors::{DataHubError, Result};
use crate::storage::{validate_key, BlobStore};
use async_trait::async_trait;
use log::debug;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// 本地目录实现的对象存储，`{data_dir}/{bucket}/{key}`
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(data_dir: &str, bucket: &str) -> Self {
        Self {
            root: PathBuf::from(data_dir).join(bucket),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    fn temp_path(path: &Path) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or_default();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{}.{}-{}.tmp", file_name, std::process::id(), nanos))
    }
}

fn storage_error(action: &str, path: &Path, e: std::io::Error) -> DataHubError {
    DataHubError::StorageError(format!("{} {} failed: {}", action, path.display(), e))
}

#[async_trait]
impl BlobStore for FsBlobStore {
    fn describe(&self, key: &str) -> String {
        self.root.join(key).display().to_string()
    }

    async fn put(&self, key: &str, blob: Vec<u8>) -> Result<()> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("Creating", parent, e))?;
        }

        // 先写临时文件再重命名，覆盖时不会出现半截文件
        let temp = Self::temp_path(&path);
        if let Err(e) = tokio::fs::write(&temp, &blob).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(storage_error("Writing", &temp, e));
        }
        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(storage_error("Renaming into", &path, e));
        }

        debug!("Wrote {} bytes to {}", blob.len(), path.display());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(key)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| storage_error("Reading", &path, e))
    }
}
