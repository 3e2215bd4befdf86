//! Application configuration loaded from environment variables.

use crate::audit::AuditMode;
use crate::error::{AppError, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Server bind address (host:port)
    pub bind_address: String,

    /// Public base URL of this service (used for filesystem upload URLs)
    pub app_url: String,

    /// Allowed CORS origins (comma separated)
    pub cors_origins: Vec<String>,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// Access token expiry in hours
    pub jwt_access_expiry_hours: i64,

    /// Refresh token expiry in days
    pub jwt_refresh_expiry_days: i64,

    /// Password-reset token expiry in minutes
    pub jwt_reset_expiry_minutes: i64,

    /// Verification code lifetime in seconds
    pub verification_code_ttl_secs: u64,

    /// Route entity writes through the named database routines
    pub use_stored_procedures: bool,

    /// Audit arrangement: same-transaction or secondary
    pub audit_mode: AuditMode,

    /// Storage backend: "filesystem" or "s3"
    pub storage_backend: String,

    /// Filesystem storage path (when storage_backend = "filesystem")
    pub storage_path: String,

    /// S3 bucket name (when storage_backend = "s3")
    pub s3_bucket: Option<String>,

    /// S3 region
    pub s3_region: Option<String>,

    /// S3 endpoint URL (for MinIO or other S3-compatible services)
    pub s3_endpoint: Option<String>,

    /// SMTP relay host
    pub smtp_host: Option<String>,

    /// SMTP credentials
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,

    /// From address for outbound mail
    pub email_from: String,

    /// External tenant-verification endpoint called before project creation
    pub tenant_check_url: Option<String>,

    /// Database name reported to the tenant-verification endpoint
    pub tenant_db_name: String,

    /// Force new projects into demo mode
    pub demo_mode: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::Config("JWT_SECRET not set".into()))?;
        if jwt_secret.len() < 32 {
            return Err(AppError::Config(
                "JWT_SECRET must be at least 32 characters".into(),
            ));
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| AppError::Config("DATABASE_URL not set".into()))?,
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            app_url: env::var("APP_URL").unwrap_or_else(|_| "http://localhost:8080".into()),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            jwt_secret,
            jwt_access_expiry_hours: env::var("JWT_ACCESS_EXPIRY_HOURS")
                .unwrap_or_else(|_| "1".into())
                .parse()
                .unwrap_or(1),
            jwt_refresh_expiry_days: env::var("JWT_REFRESH_EXPIRY_DAYS")
                .unwrap_or_else(|_| "7".into())
                .parse()
                .unwrap_or(7),
            jwt_reset_expiry_minutes: env::var("JWT_RESET_EXPIRY_MINUTES")
                .unwrap_or_else(|_| "15".into())
                .parse()
                .unwrap_or(15),
            verification_code_ttl_secs: env::var("VERIFICATION_CODE_TTL_SECS")
                .unwrap_or_else(|_| "3600".into())
                .parse()
                .unwrap_or(3600),
            use_stored_procedures: env::var("USE_STORED_PROCEDURES")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
            audit_mode: env::var("AUDIT_MODE")
                .ok()
                .as_deref()
                .map(AuditMode::parse)
                .transpose()?
                .unwrap_or(AuditMode::SameTransaction),
            storage_backend: env::var("STORAGE_BACKEND").unwrap_or_else(|_| "filesystem".into()),
            storage_path: env::var("STORAGE_PATH")
                .unwrap_or_else(|_| "/var/lib/tenant-console/uploads".into()),
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            smtp_host: env::var("SMTP_HOST").ok(),
            smtp_username: env::var("SMTP_USERNAME").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "Tenant Console <no-reply@localhost>".into()),
            tenant_check_url: env::var("TENANT_CHECK_URL").ok(),
            tenant_db_name: env::var("TENANT_DB_NAME").unwrap_or_else(|_| "tenant_console".into()),
            demo_mode: env::var("DEMO_MODE")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_mode_parse() {
        assert!(matches!(
            AuditMode::parse("same-transaction").unwrap(),
            AuditMode::SameTransaction
        ));
        assert!(matches!(
            AuditMode::parse("secondary").unwrap(),
            AuditMode::Secondary
        ));
        assert!(AuditMode::parse("bogus").is_err());
    }
}
