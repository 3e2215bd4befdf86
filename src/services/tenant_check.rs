//! External tenant verification.
//!
//! Before a project is created, an external endpoint confirms that this
//! deployment's database is registered. An unconfigured endpoint skips the
//! check, which is the development default.

use serde_json::{json, Value};
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, Result};

pub struct TenantCheckClient {
    http: reqwest::Client,
    url: Option<String>,
    db_name: String,
}

impl TenantCheckClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: config.tenant_check_url.clone(),
            db_name: config.tenant_db_name.clone(),
        })
    }

    /// Confirm the deployment with the external endpoint. A `resultKey` of
    /// zero or `false` fails the check.
    pub async fn verify(&self) -> Result<()> {
        let Some(url) = &self.url else {
            return Ok(());
        };

        let response: Value = self
            .http
            .post(url)
            .json(&json!({ "dbname": self.db_name }))
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("tenant verification request: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("tenant verification response: {}", e)))?;

        let passed = match response.get("resultKey") {
            Some(Value::Bool(value)) => *value,
            Some(Value::Number(value)) => value.as_i64() != Some(0),
            _ => false,
        };

        if !passed {
            return Err(AppError::Validation(
                "External API verification failed".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_without_endpoint() -> TenantCheckClient {
        TenantCheckClient {
            http: reqwest::Client::new(),
            url: None,
            db_name: "test".into(),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_endpoint_skips_check() {
        assert!(client_without_endpoint().verify().await.is_ok());
    }
}
