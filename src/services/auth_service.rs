//! Authentication service.
//!
//! Password hashing and JWT issuing/validation. The service is stateless:
//! credential lookups happen in the handlers, which own the database
//! transaction.

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::User;

const BCRYPT_COST: u32 = 10;

/// JWT claims carried by both access and refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id
    pub id: i32,
    /// Username
    pub username: String,
    /// Role id
    pub role_id: i32,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Claims for the short-lived password-reset token. The verification code is
/// embedded in the signed payload, so no server-side state is needed.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetClaims {
    pub id: i32,
    pub code: String,
    pub iat: i64,
    pub exp: i64,
}

/// Token pair response
#[derive(Debug, Serialize)]
pub struct TokenPair {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

/// Authentication service
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_expiry_hours: i64,
    refresh_expiry_days: i64,
    reset_expiry_minutes: i64,
}

impl AuthService {
    pub fn new(config: &Config) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_expiry_hours: config.jwt_access_expiry_hours,
            refresh_expiry_days: config.jwt_refresh_expiry_days,
            reset_expiry_minutes: config.jwt_reset_expiry_minutes,
        }
    }

    /// Generate an access/refresh token pair for a user
    pub fn generate_tokens(&self, user: &User) -> Result<TokenPair> {
        let now = Utc::now();

        let access_claims = Claims {
            id: user.id,
            username: user.username.clone(),
            role_id: user.role_id,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.access_expiry_hours)).timestamp(),
        };

        let refresh_claims = Claims {
            exp: (now + Duration::days(self.refresh_expiry_days)).timestamp(),
            ..access_claims.clone()
        };

        Ok(TokenPair {
            access_token: self.encode(&access_claims)?,
            refresh_token: self.encode(&refresh_claims)?,
        })
    }

    /// Validate a token and return its claims. Expiry and signature failures
    /// map to the legacy middleware messages.
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::Unauthorized("Token expired.".into()),
                _ => AppError::Forbidden("Invalid token.".into()),
            })
    }

    /// Exchange a valid refresh token for a fresh pair.
    pub fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = decode::<Claims>(refresh_token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::Forbidden("Invalid refresh token.".into()))?;

        let now = Utc::now();
        let access_claims = Claims {
            id: claims.id,
            username: claims.username,
            role_id: claims.role_id,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.access_expiry_hours)).timestamp(),
        };
        let refresh_claims = Claims {
            exp: (now + Duration::days(self.refresh_expiry_days)).timestamp(),
            ..access_claims.clone()
        };

        Ok(TokenPair {
            access_token: self.encode(&access_claims)?,
            refresh_token: self.encode(&refresh_claims)?,
        })
    }

    /// Issue a password-reset token embedding the verification code.
    pub fn issue_reset_token(&self, user_id: i32, code: &str) -> Result<String> {
        let now = Utc::now();
        let claims = ResetClaims {
            id: user_id,
            code: code.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.reset_expiry_minutes)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))
    }

    /// Validate a password-reset token.
    pub fn validate_reset_token(&self, token: &str) -> Result<ResetClaims> {
        decode::<ResetClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::Validation("Invalid or expired token".into()))
    }

    fn encode(&self, claims: &Claims) -> Result<String> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))
    }

    /// Hash a password
    pub fn hash_password(password: &str) -> Result<String> {
        hash(password, BCRYPT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against a hash
    pub fn verify_password(password: &str, hashed: &str) -> Result<bool> {
        verify(password, hashed)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://unused".into(),
            bind_address: "127.0.0.1:0".into(),
            app_url: "http://localhost:8080".into(),
            cors_origins: vec![],
            jwt_secret: "test_secret_key_minimum_32_characters_long".into(),
            jwt_access_expiry_hours: 1,
            jwt_refresh_expiry_days: 7,
            jwt_reset_expiry_minutes: 15,
            verification_code_ttl_secs: 3600,
            use_stored_procedures: false,
            audit_mode: crate::audit::AuditMode::SameTransaction,
            storage_backend: "filesystem".into(),
            storage_path: "/tmp".into(),
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            smtp_host: None,
            smtp_username: None,
            smtp_password: None,
            email_from: "Test <no-reply@localhost>".into(),
            tenant_check_url: None,
            tenant_db_name: "test".into(),
            demo_mode: false,
        }
    }

    fn test_user() -> User {
        let now = Utc::now();
        User {
            id: 42,
            username: "jdoe".into(),
            name: "J. Doe".into(),
            password: "hash".into(),
            birthday: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            city: "Lagos".into(),
            email: "jdoe@example.com".into(),
            prof_img: None,
            role_id: 2,
            company_id: None,
            is_active: true,
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            last_login: None,
        }
    }

    #[test]
    fn test_password_hashing_round_trip() {
        let hashed = AuthService::hash_password("secret123").unwrap();
        assert!(AuthService::verify_password("secret123", &hashed).unwrap());
        assert!(!AuthService::verify_password("wrong", &hashed).unwrap());
    }

    #[test]
    fn test_token_round_trip_preserves_claims() {
        let svc = AuthService::new(&test_config());
        let pair = svc.generate_tokens(&test_user()).unwrap();

        let claims = svc.validate_token(&pair.access_token).unwrap();
        assert_eq!(claims.id, 42);
        assert_eq!(claims.username, "jdoe");
        assert_eq!(claims.role_id, 2);
    }

    #[test]
    fn test_refresh_exchange_produces_valid_pair() {
        let svc = AuthService::new(&test_config());
        let pair = svc.generate_tokens(&test_user()).unwrap();

        let refreshed = svc.refresh_tokens(&pair.refresh_token).unwrap();
        let claims = svc.validate_token(&refreshed.access_token).unwrap();
        assert_eq!(claims.id, 42);
    }

    #[test]
    fn test_garbage_token_is_forbidden() {
        let svc = AuthService::new(&test_config());
        let err = svc.validate_token("not-a-jwt").unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let svc = AuthService::new(&test_config());
        let pair = svc.generate_tokens(&test_user()).unwrap();
        let mut tampered = pair.access_token.clone();
        tampered.push('x');
        assert!(svc.validate_token(&tampered).is_err());
    }

    #[test]
    fn test_reset_token_carries_code() {
        let svc = AuthService::new(&test_config());
        let token = svc.issue_reset_token(7, "493021").unwrap();
        let claims = svc.validate_reset_token(&token).unwrap();
        assert_eq!(claims.id, 7);
        assert_eq!(claims.code, "493021");
    }

    #[test]
    fn test_token_pair_serializes_camel_case() {
        let svc = AuthService::new(&test_config());
        let pair = svc.generate_tokens(&test_user()).unwrap();
        let json = serde_json::to_value(&pair).unwrap();
        assert!(json.get("accessToken").is_some());
        assert!(json.get("refreshToken").is_some());
        assert!(json.get("access_token").is_none());
    }
}
