use crate::errors::{DataHubError, Result};
use crate::storage::{validate_key, BlobStore};
use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use std::time::Duration;

/// Path-style HTTP object store: `PUT/GET {endpoint}/{bucket}/{key}`.
pub struct HttpBlobStore {
    client: Client,
    endpoint: String,
    bucket: String,
}

impl HttpBlobStore {
    pub fn new(endpoint: &str, bucket: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DataHubError::RequestError)?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }

    async fn check(url: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(DataHubError::StorageError(format!(
            "{} returned {}: {}",
            url,
            status,
            body.chars().take(200).collect::<String>()
        )))
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    fn describe(&self, key: &str) -> String {
        self.object_url(key)
    }

    async fn put(&self, key: &str, blob: Vec<u8>) -> Result<()> {
        validate_key(key)?;
        let url = self.object_url(key);
        let size = blob.len();

        let response = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(blob)
            .send()
            .await
            .map_err(|e| DataHubError::StorageError(format!("PUT {} failed: {}", url, e)))?;
        Self::check(&url, response).await?;

        debug!("Uploaded {} bytes to {}", size, url);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        validate_key(key)?;
        let url = self.object_url(key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DataHubError::StorageError(format!("GET {} failed: {}", url, e)))?;
        let response = Self::check(&url, response).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DataHubError::StorageError(format!("Reading {} failed: {}", url, e)))?;
        Ok(bytes.to_vec())
    }
}
