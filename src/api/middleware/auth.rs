//! Authentication middleware.
//!
//! Validates the `Authorization: Bearer <JWT>` header and injects the
//! decoded claims as a request extension. Token refresh is an explicit
//! endpoint (`/api/auth/refreshToken`); an expired access token gets a 401
//! pointing the client there.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::SharedState;
use crate::error::AppError;

/// Pull the bearer token out of the Authorization header.
fn extract_bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication middleware - requires a valid access token
pub async fn auth_middleware(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer_token(&request) else {
        return AppError::Unauthorized("Access denied. No token provided.".into()).into_response();
    };

    match state.auth.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
