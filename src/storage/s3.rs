//! S3 storage backend using the rust-s3 crate.
//!
//! Supports AWS S3 and S3-compatible services (MinIO, etc.).
//! Credentials come from the standard AWS environment variables or instance
//! roles; bucket, region, and endpoint from application configuration.

use async_trait::async_trait;
use bytes::Bytes;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::region::Region;

use super::StorageBackend;
use crate::error::{AppError, Result};

pub struct S3Backend {
    bucket: Box<Bucket>,
    bucket_name: String,
    region: String,
    endpoint: Option<String>,
}

impl S3Backend {
    pub fn new(bucket_name: &str, region: &str, endpoint: Option<&str>) -> Result<Self> {
        let s3_region = match endpoint {
            Some(endpoint) => Region::Custom {
                region: region.to_string(),
                endpoint: endpoint.trim_end_matches('/').to_string(),
            },
            None => region
                .parse()
                .map_err(|e| AppError::Config(format!("invalid S3 region: {}", e)))?,
        };

        let credentials = Credentials::default()
            .map_err(|e| AppError::Config(format!("S3 credentials: {}", e)))?;

        let mut bucket = Bucket::new(bucket_name, s3_region, credentials)
            .map_err(|e| AppError::Storage(e.to_string()))?;

        // S3-compatible services generally require path-style addressing.
        if endpoint.is_some() {
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            bucket: Box::new(bucket),
            bucket_name: bucket_name.to_string(),
            region: region.to_string(),
            endpoint: endpoint.map(|e| e.trim_end_matches('/').to_string()),
        })
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    async fn put(&self, key: &str, content: Bytes) -> Result<()> {
        let response = self
            .bucket
            .put_object(key, &content)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        if response.status_code() != 200 {
            return Err(AppError::Storage(format!(
                "S3 put returned status {}",
                response.status_code()
            )));
        }

        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        match self.bucket.head_object(key).await {
            Ok((_, 200)) => Ok(true),
            Ok((_, 404)) => Ok(false),
            Ok((_, code)) => Err(AppError::Storage(format!(
                "S3 head returned status {}",
                code
            ))),
            Err(e) => {
                // rust-s3 surfaces some non-2xx responses as errors
                let message = e.to_string();
                if message.contains("404") {
                    Ok(false)
                } else {
                    Err(AppError::Storage(message))
                }
            }
        }
    }

    fn public_url(&self, key: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}/{}", endpoint, self.bucket_name, key),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket_name, self.region, key
            ),
        }
    }
}
