//! Project type management handlers.

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
use crate::models::ProjectType;
use crate::services::Claims;
use crate::store::{NewProjectType, ProjectTypeChanges};

/// Create project type routes
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/createProjType", post(create_project_type))
        .route("/updateProjType/:id", put(update_project_type))
        .route("/deleteProjType/:id", put(delete_project_type))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProjectTypeRequest {
    pub type_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProjectTypeRequest {
    pub type_name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

async fn fetch_project_type(conn: &mut sqlx::PgConnection, id: i32) -> Result<ProjectType> {
    sqlx::query_as::<_, ProjectType>("SELECT * FROM project_type WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Project type not found".into()))
}

/// Create a project type
#[utoipa::path(
    post,
    path = "/createProjType",
    context_path = "/api/crud/projtype",
    tag = "project-types",
    request_body = CreateProjectTypeRequest,
    responses(
        (status = 200, description = "Project type created successfully"),
        (status = 400, description = "Missing field or duplicate name"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_project_type(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateProjectTypeRequest>,
) -> Result<Json<Envelope>> {
    let project_type = NewProjectType {
        type_name: require(payload.type_name, "type_name")?,
        description: require(payload.description, "description")?,
    };

    let mut tx = state.db.begin().await?;

    let existing: Option<i32> =
        sqlx::query_scalar("SELECT id FROM project_type WHERE type_name = $1")
            .bind(&project_type.type_name)
            .fetch_optional(&mut *tx)
            .await?;
    if existing.is_some() {
        return Err(AppError::Duplicate(
            "Project type name already exists".into(),
        ));
    }

    let created = state
        .store
        .create_project_type(&mut tx, &project_type, claims.id)
        .await?;

    let entry = AuditEntry::created("project_type", &created, Some(claims.id))?;
    let audited =
        audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, created).await?;

    Ok(Json(
        Envelope::success()
            .with("resultMessage", "Project type created successfully")
            .with("accountType", audited.value),
    ))
}

/// Update a project type
#[utoipa::path(
    put,
    path = "/updateProjType/{id}",
    context_path = "/api/crud/projtype",
    tag = "project-types",
    params(("id" = i32, Path, description = "Project type ID")),
    request_body = UpdateProjectTypeRequest,
    responses(
        (status = 200, description = "Project type updated successfully"),
        (status = 404, description = "Project type not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_project_type(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProjectTypeRequest>,
) -> Result<Json<Envelope>> {
    let changes = ProjectTypeChanges {
        type_name: require(payload.type_name, "type_name")?,
        description: require(payload.description, "description")?,
        is_active: require(payload.is_active, "isActive")?,
    };

    let mut tx = state.db.begin().await?;

    let original = fetch_project_type(&mut tx, id).await?;

    let duplicate: Option<i32> = sqlx::query_scalar(
        "SELECT id FROM project_type WHERE type_name = $1 AND id <> $2",
    )
    .bind(&changes.type_name)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;
    if duplicate.is_some() {
        return Err(AppError::Duplicate("Type name already exists".into()));
    }

    let updated = state
        .store
        .update_project_type(&mut tx, id, &changes, claims.id)
        .await?;

    let entry = AuditEntry::updated("project_type", &original, &updated, Some(claims.id))?;
    audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, ()).await?;

    Ok(Json(Envelope::success().with(
        "resultMessage",
        "Project type updated and saved successfully",
    )))
}

/// Deactivate a project type
#[utoipa::path(
    put,
    path = "/deleteProjType/{id}",
    context_path = "/api/crud/projtype",
    tag = "project-types",
    params(("id" = i32, Path, description = "Project type ID")),
    responses(
        (status = 200, description = "Project type deactivated successfully"),
        (status = 404, description = "Project type not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_project_type(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<Json<Envelope>> {
    let mut tx = state.db.begin().await?;

    let original = fetch_project_type(&mut tx, id).await?;
    let updated = state
        .store
        .deactivate_project_type(&mut tx, id, claims.id)
        .await?;

    let entry = AuditEntry::updated("project_type", &original, &updated, Some(claims.id))?;
    audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, ()).await?;

    Ok(Json(Envelope::ok("Project type deactivated successfully")))
}
