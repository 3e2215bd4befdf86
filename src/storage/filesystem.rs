//! Filesystem storage backend.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;

use super::StorageBackend;
use crate::error::Result;

/// Stores objects as files under a base directory. Intended for development
/// and single-node deployments.
pub struct FilesystemBackend {
    base_path: PathBuf,
    public_base: String,
}

impl FilesystemBackend {
    pub fn new(base_path: &str, public_base: &str) -> Self {
        Self {
            base_path: PathBuf::from(base_path),
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn put(&self, key: &str, content: Bytes) -> Result<()> {
        let path = self.object_path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &content).await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.object_path(key)).await?)
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/uploads/{}", self.public_base, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_exists() {
        let dir = std::env::temp_dir().join(format!("console-fs-test-{}", std::process::id()));
        let backend = FilesystemBackend::new(dir.to_str().unwrap(), "http://localhost:8080");

        assert!(!backend.exists("logos/abc_logo.png").await.unwrap());
        backend
            .put("logos/abc_logo.png", Bytes::from_static(b"png-bytes"))
            .await
            .unwrap();
        assert!(backend.exists("logos/abc_logo.png").await.unwrap());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[test]
    fn test_public_url_strips_trailing_slash() {
        let backend = FilesystemBackend::new("/tmp/x", "http://localhost:8080/");
        assert_eq!(
            backend.public_url("logos/k.png"),
            "http://localhost:8080/uploads/logos/k.png"
        );
    }
}
