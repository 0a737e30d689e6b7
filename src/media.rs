use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::storage::StorageClient;

/// Moves staged image files into object storage.
///
/// `upload` consumes the staged file: whatever the outcome of the transfer,
/// the local temp file is deleted exactly once before the call returns.
pub struct Uploader {
    storage: Arc<dyn StorageClient>,
    public_base_url: String,
    tmp_dir: PathBuf,
}

impl Uploader {
    pub fn new(storage: Arc<dyn StorageClient>, public_base_url: &str, tmp_dir: &Path) -> Self {
        Self {
            storage,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            tmp_dir: tmp_dir.to_path_buf(),
        }
    }

    /// Write one multipart file field to local temp storage and return its path.
    pub async fn stage(&self, body: Bytes, content_type: &str) -> anyhow::Result<PathBuf> {
        let ext = ext_from_mime(content_type).unwrap_or("bin");
        let path = self.tmp_dir.join(format!("{}.{}", Uuid::new_v4(), ext));
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("stage upload to {}", path.display()))?;
        debug!(path = %path.display(), size = body.len(), "staged upload");
        Ok(path)
    }

    /// Upload a staged file and return its public URL.
    pub async fn upload(&self, local_path: &Path) -> anyhow::Result<String> {
        let result = self.transfer(local_path).await;
        // The staged file is gone after this point, success or not.
        if let Err(e) = tokio::fs::remove_file(local_path).await {
            warn!(path = %local_path.display(), error = %e, "failed to remove staged file");
        }
        result
    }

    async fn transfer(&self, local_path: &Path) -> anyhow::Result<String> {
        let file_name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .context("staged file has no usable name")?;
        let body = tokio::fs::read(local_path)
            .await
            .with_context(|| format!("read staged file {}", local_path.display()))?;

        let key = format!("media/{}", file_name);
        let content_type = local_path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(mime_from_ext)
            .unwrap_or("application/octet-stream");
        self.storage
            .put_object(&key, Bytes::from(body), content_type)
            .await
            .with_context(|| format!("put_object {}", key))?;

        Ok(format!("{}/{}", self.public_base_url, key))
    }
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

fn mime_from_ext(ext: &str) -> Option<&'static str> {
    match ext {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Clone)]
    struct OkStorage;
    #[async_trait]
    impl StorageClient for OkStorage {
        async fn put_object(&self, _k: &str, _b: Bytes, _ct: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[derive(Clone)]
    struct BrokenStorage;
    #[async_trait]
    impl StorageClient for BrokenStorage {
        async fn put_object(&self, _k: &str, _b: Bytes, _ct: &str) -> anyhow::Result<()> {
            anyhow::bail!("bucket unreachable")
        }
    }

    fn uploader(storage: Arc<dyn StorageClient>) -> Uploader {
        Uploader::new(storage, "https://cdn.test/streamhub", &std::env::temp_dir())
    }

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[tokio::test]
    async fn upload_returns_url_and_removes_staged_file() {
        let up = uploader(Arc::new(OkStorage));
        let path = up
            .stage(Bytes::from_static(b"\x89PNG fake"), "image/png")
            .await
            .unwrap();
        assert!(path.exists());

        let url = up.upload(&path).await.unwrap();
        assert!(url.starts_with("https://cdn.test/streamhub/media/"));
        assert!(url.ends_with(".png"));
        assert!(!path.exists(), "staged file must be removed on success");
    }

    #[tokio::test]
    async fn failed_upload_still_removes_staged_file() {
        let up = uploader(Arc::new(BrokenStorage));
        let path = up
            .stage(Bytes::from_static(b"fake jpeg"), "image/jpeg")
            .await
            .unwrap();

        let err = up.upload(&path).await.unwrap_err();
        assert!(err.to_string().contains("put_object"));
        assert!(!path.exists(), "staged file must be removed on failure");
    }

    #[tokio::test]
    async fn upload_of_missing_file_fails() {
        let up = uploader(Arc::new(OkStorage));
        let path = std::env::temp_dir().join(format!("{}.png", Uuid::new_v4()));
        assert!(up.upload(&path).await.is_err());
    }
}
