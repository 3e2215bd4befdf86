//! User management handlers.
//!
//! Signup is gated behind email verification: `createUser` parks the
//! candidate in the pending-signup store and emails a one-time code;
//! `verifyEmail` consumes the code and persists the row.

use axum::{
    extract::{Extension, Path, State},
    routing::{post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::envelope::{require, Envelope};
use crate::api::SharedState;
use crate::audit::{self, AuditEntry};
use crate::error::{AppError, Result};
use crate::models::User;
use crate::services::{AuthService, Claims};
use crate::store::{NewUser, UserChanges};

/// Routes reachable without a token (signup + verification)
pub fn public_router() -> Router<SharedState> {
    Router::new()
        .route("/createUser", post(create_user))
        .route("/verifyEmail", post(verify_email))
}

/// Routes requiring authentication
pub fn protected_router() -> Router<SharedState> {
    Router::new()
        .route("/updateUser/:id", put(update_user))
        .route("/deleteUser/:id", put(delete_user))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role_id: Option<i32>,
    pub email: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub city: Option<String>,
    pub prof_img: Option<String>,
    pub name: Option<String>,
    pub company_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyEmailRequest {
    pub email: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role_id: Option<i32>,
    pub email: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
    pub company_id: Option<i32>,
}

async fn fetch_user(conn: &mut sqlx::PgConnection, id: i32) -> Result<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Begin signup: park the candidate user and send a verification code
#[utoipa::path(
    post,
    path = "/createUser",
    context_path = "/api/crud/user",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "Verification code sent"),
        (status = 400, description = "Missing field or duplicate username/email"),
    )
)]
pub async fn create_user(
    State(state): State<SharedState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<Envelope>> {
    let username = require(payload.username, "username")?;
    let password = require(payload.password, "password")?;
    let role_id = require(payload.role_id, "role_id")?;
    let email = require(payload.email, "email")?;
    let birthday = require(payload.birthday, "birthday")?;
    let city = require(payload.city, "city")?;
    let prof_img = require(payload.prof_img, "prof_img")?;
    let name = require(payload.name, "name")?;
    let company_id = payload.company_id;

    let mut conn = state.db.acquire().await?;

    let username_taken: Option<i32> = sqlx::query_scalar(
        "SELECT id FROM users WHERE username = $1 AND company_id IS NOT DISTINCT FROM $2",
    )
    .bind(&username)
    .bind(company_id)
    .fetch_optional(&mut *conn)
    .await?;
    if username_taken.is_some() {
        return Err(AppError::Duplicate(
            "Username already exists in this company".into(),
        ));
    }

    let email_taken: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&mut *conn)
        .await?;
    if email_taken.is_some() {
        return Err(AppError::Duplicate("Email already exists".into()));
    }

    let candidate = NewUser {
        username,
        name,
        password_hash: AuthService::hash_password(&password)?,
        birthday,
        city,
        email: email.clone(),
        prof_img: Some(prof_img),
        role_id,
        company_id,
    };

    state.pending_signups.put(&email, candidate).await;

    let code = state.verification.issue(&email).await;
    state.mailer.send_verification_code(&email, &code).await?;

    tracing::info!(%email, "signup verification code sent");

    Ok(Json(Envelope::ok("Verification code sent to your email")))
}

/// Complete signup: consume the code and persist the user
#[utoipa::path(
    post,
    path = "/verifyEmail",
    context_path = "/api/crud/user",
    tag = "users",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "User created"),
        (status = 400, description = "Invalid or expired verification code"),
    )
)]
pub async fn verify_email(
    State(state): State<SharedState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<Json<Envelope>> {
    let email = require(payload.email, "email")?;
    let code = require(payload.code, "code")?;

    state
        .verification
        .verify(&email, &code)
        .await
        .map_err(|_| AppError::Validation("Invalid or expired verification code".into()))?;

    let candidate = state
        .pending_signups
        .get(&email)
        .await
        .ok_or_else(|| AppError::Validation("No temporary user found".into()))?;
    state.pending_signups.remove(&email).await;

    let mut tx = state.db.begin().await?;

    let user = state.store.create_user(&mut tx, &candidate).await?;

    let entry = AuditEntry::created("users", &user, None)?;
    let audited = audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, user).await?;

    Ok(Json(Envelope::success().with("user", audited.value)))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/updateUser/{id}",
    context_path = "/api/crud/user",
    tag = "users",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<Envelope>> {
    let username = require(payload.username, "username")?;
    let role_id = require(payload.role_id, "role_id")?;
    let email = require(payload.email, "email")?;
    let is_active = require(payload.is_active, "isActive")?;
    let company_id = payload.company_id;

    let mut tx = state.db.begin().await?;

    let original = fetch_user(&mut tx, id).await?;

    let duplicate: Option<i32> = sqlx::query_scalar(
        "SELECT id FROM users WHERE username = $1 AND company_id IS NOT DISTINCT FROM $2 AND id <> $3",
    )
    .bind(&username)
    .bind(company_id)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;
    if duplicate.is_some() {
        return Err(AppError::Duplicate(
            "Username already exists in the same company".into(),
        ));
    }

    let password_hash = payload
        .password
        .as_deref()
        .map(AuthService::hash_password)
        .transpose()?;

    let changes = UserChanges {
        username,
        password_hash,
        role_id,
        email,
        is_active,
        company_id,
    };

    let updated = state
        .store
        .update_user(&mut tx, id, &changes, claims.id)
        .await?;

    let entry = AuditEntry::updated("users", &original, &updated, Some(claims.id))?;
    let audited =
        audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, updated).await?;

    Ok(Json(Envelope::success().with("user", audited.value)))
}

/// Deactivate a user
#[utoipa::path(
    put,
    path = "/deleteUser/{id}",
    context_path = "/api/crud/user",
    tag = "users",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deactivated"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<Json<Envelope>> {
    let mut tx = state.db.begin().await?;

    let original = fetch_user(&mut tx, id).await?;
    let updated = state.store.deactivate_user(&mut tx, id, claims.id).await?;

    let entry = AuditEntry::updated("users", &original, &updated, Some(claims.id))?;
    audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, ()).await?;

    Ok(Json(
        Envelope::success().with("resultValue", "User deactivated successfully"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_request_full() {
        let json = r#"{
            "username": "jdoe", "password": "secret", "role_id": 2,
            "email": "jdoe@example.com", "birthday": "1990-04-12",
            "city": "Osaka", "prof_img": "data:image/png;base64,xyz",
            "name": "J. Doe", "company_id": 1
        }"#;
        let req: CreateUserRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.username.as_deref(), Some("jdoe"));
        assert_eq!(
            req.birthday,
            Some(NaiveDate::from_ymd_opt(1990, 4, 12).unwrap())
        );
        assert_eq!(req.company_id, Some(1));
    }

    #[test]
    fn test_create_user_request_missing_fields_deserialize() {
        let req: CreateUserRequest = serde_json::from_str("{}").unwrap();
        assert!(req.username.is_none());
        assert!(req.birthday.is_none());
    }

    #[test]
    fn test_update_user_request_password_optional() {
        let json = r#"{"username":"jdoe","role_id":2,"email":"j@x.com","isActive":true}"#;
        let req: UpdateUserRequest = serde_json::from_str(json).unwrap();
        assert!(req.password.is_none());
        assert_eq!(req.is_active, Some(true));
    }
}
