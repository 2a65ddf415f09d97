use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs;
use tracing::info;

use crate::constants::PUBLIC_UPLOADS_ROUTE;
use crate::fs_utils::{ensure_dir, ensure_unique_file_name};

/// Destination for generated images. Returns the URL the client should use
/// to fetch the stored bytes.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn put(&self, file_name: &str, bytes: Vec<u8>, mime_type: &str) -> Result<String>;
}

const BLOB_API_VERSION: &str = "7";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlobPutResponse {
    url: String,
    pathname: Option<String>,
}

/// Public Vercel Blob store.
#[derive(Clone)]
pub struct BlobImageStore {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl BlobImageStore {
    pub fn new(http: reqwest::Client, api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl ImageStore for BlobImageStore {
    async fn put(&self, file_name: &str, bytes: Vec<u8>, mime_type: &str) -> Result<String> {
        let url = format!("{}/{}", self.api_url.trim_end_matches('/'), file_name);

        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.token)
            .header("x-api-version", BLOB_API_VERSION)
            .header("x-content-type", mime_type)
            .header("x-vercel-blob-access", "public")
            .body(bytes)
            .send()
            .await
            .context("Blob upload request failed")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Reading blob upload response failed")?;
        if !status.is_success() {
            return Err(anyhow!("Blob upload failed: status {} body {}", status, body));
        }

        let stored: BlobPutResponse = serde_json::from_str(&body)
            .with_context(|| format!("Failed to decode blob upload response: {}", body))?;
        info!(url = %stored.url, pathname = ?stored.pathname, "image uploaded to blob storage");
        Ok(stored.url)
    }
}

/// Writes images under a directory served at `/uploads`.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    dir: PathBuf,
}

impl LocalImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn put(&self, file_name: &str, bytes: Vec<u8>, _mime_type: &str) -> Result<String> {
        let dir = ensure_dir(&self.dir).await.map_err(|err| anyhow!(err))?;
        let unique_name = ensure_unique_file_name(&dir, file_name)
            .await
            .map_err(|err| anyhow!(err))?;
        let target_path = dir.join(&unique_name);

        fs::write(&target_path, &bytes)
            .await
            .with_context(|| format!("Unable to persist generated image '{}'", target_path.display()))?;

        info!(path = %target_path.display(), "image saved locally");
        Ok(format!("{PUBLIC_UPLOADS_ROUTE}/{unique_name}"))
    }
}
