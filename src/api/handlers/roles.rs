//! Role management handlers.

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
use crate::models::Role;
use crate::services::Claims;

/// Create role routes
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/createRole", post(create_role))
        .route("/updateRole/:id", put(update_role))
        .route("/deleteRole/:id", put(delete_role))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoleRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

async fn fetch_role(conn: &mut sqlx::PgConnection, id: i32) -> Result<Role> {
    sqlx::query_as::<_, Role>("SELECT * FROM role WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Role not found".into()))
}

/// Create a role
#[utoipa::path(
    post,
    path = "/createRole",
    context_path = "/api/crud/role",
    tag = "roles",
    request_body = CreateRoleRequest,
    responses(
        (status = 200, description = "Role created successfully"),
        (status = 400, description = "Missing field or duplicate name"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_role(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateRoleRequest>,
) -> Result<Json<Envelope>> {
    let name = require(payload.name, "name")?;

    let mut tx = state.db.begin().await?;

    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM role WHERE name = $1")
        .bind(&name)
        .fetch_optional(&mut *tx)
        .await?;
    if existing.is_some() {
        return Err(AppError::Duplicate("Role name already exists".into()));
    }

    let role = state.store.create_role(&mut tx, &name, claims.id).await?;

    let entry = AuditEntry::created("role", &role, Some(claims.id))?;
    let audited =
        audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, role).await?;

    tracing::info!(role = %name, by = claims.id, "role created");

    Ok(Json(
        Envelope::ok("Role created successfully").with("role", audited.value),
    ))
}

/// Update a role
#[utoipa::path(
    put,
    path = "/updateRole/{id}",
    context_path = "/api/crud/role",
    tag = "roles",
    params(("id" = i32, Path, description = "Role ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated successfully"),
        (status = 404, description = "Role not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_role(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<Envelope>> {
    let name = require(payload.name, "name")?;
    let is_active = require(payload.is_active, "isActive")?;

    let mut tx = state.db.begin().await?;

    let original = fetch_role(&mut tx, id).await?;
    let updated = state
        .store
        .update_role(&mut tx, id, &name, is_active, claims.id)
        .await?;

    let entry = AuditEntry::updated("role", &original, &updated, Some(claims.id))?;
    audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, ()).await?;

    Ok(Json(Envelope::ok("Role updated and saved successfully")))
}

/// Deactivate a role
#[utoipa::path(
    put,
    path = "/deleteRole/{id}",
    context_path = "/api/crud/role",
    tag = "roles",
    params(("id" = i32, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role deactivated successfully"),
        (status = 404, description = "Role not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_role(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<Json<Envelope>> {
    let mut tx = state.db.begin().await?;

    let original = fetch_role(&mut tx, id).await?;
    let updated = state.store.deactivate_role(&mut tx, id, claims.id).await?;

    let entry = AuditEntry::updated("role", &original, &updated, Some(claims.id))?;
    audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, ()).await?;

    Ok(Json(Envelope::ok("Role deactivated successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_deserialize() {
        let req: CreateRoleRequest = serde_json::from_str(r#"{"name":"Admin"}"#).unwrap();
        assert_eq!(req.name.as_deref(), Some("Admin"));
    }

    #[test]
    fn test_create_request_tolerates_missing_name() {
        let req: CreateRoleRequest = serde_json::from_str("{}").unwrap();
        assert!(req.name.is_none());
    }

    #[test]
    fn test_update_request_uses_legacy_flag_name() {
        let req: UpdateRoleRequest =
            serde_json::from_str(r#"{"name":"Ops","isActive":false}"#).unwrap();
        assert_eq!(req.name.as_deref(), Some("Ops"));
        assert_eq!(req.is_active, Some(false));
    }
}
