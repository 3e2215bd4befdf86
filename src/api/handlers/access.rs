//! Access rule management handlers.

use axum::{
    extract::{Extension, Path, State},
    routing::{post, put},
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::envelope::{require, Envelope};
use crate::api::SharedState;
use crate::audit::{self, AuditEntry};
use crate::error::{AppError, Result};
use crate::models::Access;
use crate::services::Claims;
use crate::store::{AccessChanges, NewAccess};

/// Create access routes
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/createAccess", post(create_access))
        .route("/updateAccess/:id", put(update_access))
        .route("/deleteAccess/:id", put(delete_access))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAccessRequest {
    pub web_access: Option<bool>,
    pub app_access: Option<bool>,
    pub role_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAccessRequest {
    pub web_access: Option<bool>,
    pub app_access: Option<bool>,
    pub role_id: Option<i32>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

async fn fetch_access(conn: &mut sqlx::PgConnection, id: i32) -> Result<Access> {
    sqlx::query_as::<_, Access>("SELECT * FROM access WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Access not found".into()))
}

/// Create an access rule
#[utoipa::path(
    post,
    path = "/createAccess",
    context_path = "/api/crud/access",
    tag = "access",
    request_body = CreateAccessRequest,
    responses(
        (status = 200, description = "Access created successfully"),
        (status = 400, description = "Missing required field"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_access(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateAccessRequest>,
) -> Result<Json<Envelope>> {
    let access = NewAccess {
        web_access: require(payload.web_access, "web_access")?,
        app_access: require(payload.app_access, "app_access")?,
        role_id: require(payload.role_id, "role_id")?,
    };

    let mut tx = state.db.begin().await?;

    let created = state.store.create_access(&mut tx, &access, claims.id).await?;

    let entry = AuditEntry::created("access", &created, Some(claims.id))?;
    let audited =
        audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, created).await?;

    Ok(Json(
        Envelope::ok("Access created successfully").with("access", audited.value),
    ))
}

/// Update an access rule
#[utoipa::path(
    put,
    path = "/updateAccess/{id}",
    context_path = "/api/crud/access",
    tag = "access",
    params(("id" = i32, Path, description = "Access ID")),
    request_body = UpdateAccessRequest,
    responses(
        (status = 200, description = "Access updated successfully"),
        (status = 404, description = "Access not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_access(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateAccessRequest>,
) -> Result<Json<Envelope>> {
    let changes = AccessChanges {
        web_access: require(payload.web_access, "web_access")?,
        app_access: require(payload.app_access, "app_access")?,
        role_id: require(payload.role_id, "role_id")?,
        is_active: require(payload.is_active, "isActive")?,
    };

    let mut tx = state.db.begin().await?;

    let original = fetch_access(&mut tx, id).await?;
    let updated = state
        .store
        .update_access(&mut tx, id, &changes, claims.id)
        .await?;

    let entry = AuditEntry::updated("access", &original, &updated, Some(claims.id))?;
    audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, ()).await?;

    Ok(Json(Envelope::ok("Access updated and saved successfully")))
}

/// Deactivate an access rule
#[utoipa::path(
    put,
    path = "/deleteAccess/{id}",
    context_path = "/api/crud/access",
    tag = "access",
    params(("id" = i32, Path, description = "Access ID")),
    responses(
        (status = 200, description = "Access deactivated successfully"),
        (status = 404, description = "Access not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_access(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<Json<Envelope>> {
    let mut tx = state.db.begin().await?;

    let original = fetch_access(&mut tx, id).await?;
    let updated = state.store.deactivate_access(&mut tx, id, claims.id).await?;

    let entry = AuditEntry::updated("access", &original, &updated, Some(claims.id))?;
    audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, ()).await?;

    Ok(Json(Envelope::ok("Access deactivated successfully")))
}
