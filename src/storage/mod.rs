//! Object storage backends for uploaded files.

pub mod filesystem;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{AppError, Result};

pub use filesystem::FilesystemBackend;
pub use s3::S3Backend;

/// Storage backend trait
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store content under the given key
    async fn put(&self, key: &str, content: Bytes) -> Result<()>;

    /// Check if a key exists
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Public URL for a stored key
    fn public_url(&self, key: &str) -> String;
}

/// Content-addressed key for an uploaded logo: identical bytes always map to
/// the same object regardless of who uploads them.
pub fn logo_key(filename: &str, content: &[u8]) -> String {
    let digest = hex::encode(Sha256::digest(content));
    let safe_name: String = filename
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    format!("logos/{}_{}", digest, safe_name)
}

/// Store an uploaded logo, deduplicating on content hash. An upload whose
/// content is already present resolves to the existing object's URL without
/// rewriting it.
pub async fn store_logo(
    backend: &dyn StorageBackend,
    filename: &str,
    content: Bytes,
) -> Result<String> {
    let key = logo_key(filename, &content);

    if !backend.exists(&key).await? {
        backend.put(&key, content).await?;
    }

    Ok(backend.public_url(&key))
}

/// Build the configured storage backend.
pub fn from_config(config: &Config) -> Result<Arc<dyn StorageBackend>> {
    match config.storage_backend.as_str() {
        "filesystem" => Ok(Arc::new(FilesystemBackend::new(
            &config.storage_path,
            &config.app_url,
        ))),
        "s3" => {
            let bucket = config
                .s3_bucket
                .as_deref()
                .ok_or_else(|| AppError::Config("S3_BUCKET not set".into()))?;
            Ok(Arc::new(S3Backend::new(
                bucket,
                config.s3_region.as_deref().unwrap_or("us-east-1"),
                config.s3_endpoint.as_deref(),
            )?))
        }
        other => Err(AppError::Config(format!(
            "unknown storage backend '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logo_key_is_deterministic() {
        let a = logo_key("logo.png", b"content");
        let b = logo_key("logo.png", b"content");
        assert_eq!(a, b);
    }

    #[test]
    fn test_logo_key_depends_on_content() {
        let a = logo_key("logo.png", b"content-a");
        let b = logo_key("logo.png", b"content-b");
        assert_ne!(a, b);
    }

    #[test]
    fn test_logo_key_depends_on_filename() {
        let a = logo_key("one.png", b"content");
        let b = logo_key("two.png", b"content");
        assert_ne!(a, b);
    }

    #[test]
    fn test_logo_key_sanitizes_filename() {
        let key = logo_key("weird name/..\\x.png", b"content");
        assert!(key.starts_with("logos/"));
        assert!(!key.contains(' '));
        assert!(!key.contains('/') || key.matches('/').count() == 1);
        assert!(!key.contains('\\'));
    }
}
