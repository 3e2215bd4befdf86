//! Application error types and result alias.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::envelope::Envelope;

/// Application result type alias
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Validation error (missing or malformed request field)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate unique field, reported with the legacy 400 status
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Conflict on a unique field, reported as 409
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Row absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid credentials / token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Object storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Outbound email failure
    #[error("Mail error: {0}")]
    Mail(String),

    /// Address parse error
    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl AppError {
    /// HTTP status plus the message exposed to the caller.
    ///
    /// Internal failures collapse to the fixed "Server error" string; client
    /// errors keep their specific message. The split mirrors the legacy API
    /// contract (see DESIGN.md).
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Validation(msg) | AppError::Duplicate(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Config(_)
            | AppError::Database(_)
            | AppError::Migration(_)
            | AppError::Storage(_)
            | AppError::Mail(_)
            | AppError::AddrParse(_)
            | AppError::Io(_)
            | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request error");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        let body = Json(Envelope::error(status.as_u16(), &message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_keep_their_message() {
        let (status, msg) =
            AppError::Validation("Missing required field: name".into()).status_and_message();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "Missing required field: name");

        let (status, msg) = AppError::NotFound("Role not found".into()).status_and_message();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(msg, "Role not found");

        let (status, msg) =
            AppError::Unauthorized("Invalid email or password".into()).status_and_message();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(msg, "Invalid email or password");
    }

    #[test]
    fn test_duplicate_maps_to_legacy_400() {
        let (status, msg) =
            AppError::Duplicate("Role name already exists".into()).status_and_message();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "Role name already exists");
    }

    #[test]
    fn test_conflict_maps_to_409() {
        let (status, _) = AppError::Conflict("Event with the same name already exists".into())
            .status_and_message();
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_internal_errors_are_masked() {
        let (status, msg) =
            AppError::Database("connection reset by peer".into()).status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(msg, "Server error");

        let (_, msg) = AppError::Storage("bucket gone".into()).status_and_message();
        assert_eq!(msg, "Server error");

        let (_, msg) = AppError::Mail("smtp timeout".into()).status_and_message();
        assert_eq!(msg, "Server error");
    }

    #[test]
    fn test_forbidden_maps_to_403() {
        let (status, msg) = AppError::Forbidden("Invalid token.".into()).status_and_message();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(msg, "Invalid token.");
    }
}
