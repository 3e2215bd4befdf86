//! Read-only console handlers: entity listings and the audit trail.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::envelope::Envelope;
use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::models::{Access, ChangeLog, Company, Project, ProjectType, Role, Site};

/// Create console routes
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/projects", get(all_projects))
        .route("/projects/:id", get(project_by_id))
        .route("/projectTypes", get(all_project_types))
        .route("/projectTypes/:id", get(project_type_by_id))
        .route("/sites", get(all_sites))
        .route("/sites/:id", get(site_by_id))
        .route("/company", get(all_companies))
        .route("/roles", get(all_roles))
        .route("/access", get(all_access))
        .route("/logs", get(all_logs))
}

/// List all projects
#[utoipa::path(
    get,
    path = "/projects",
    context_path = "/api/superadmin",
    tag = "console",
    responses((status = 200, description = "All projects")),
    security(("bearer_auth" = []))
)]
pub async fn all_projects(State(state): State<SharedState>) -> Result<Json<Envelope>> {
    let rows = sqlx::query_as::<_, Project>("SELECT * FROM project ORDER BY id")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(Envelope::success().with("resultMessage", rows)))
}

/// Get a project by id
#[utoipa::path(
    get,
    path = "/projects/{id}",
    context_path = "/api/superadmin",
    tag = "console",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project"),
        (status = 404, description = "Account not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn project_by_id(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<Json<Envelope>> {
    let row = sqlx::query_as::<_, Project>("SELECT * FROM project WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".into()))?;
    Ok(Json(Envelope::success().with("resultMessage", row)))
}

/// List all project types
#[utoipa::path(
    get,
    path = "/projectTypes",
    context_path = "/api/superadmin",
    tag = "console",
    responses((status = 200, description = "All project types")),
    security(("bearer_auth" = []))
)]
pub async fn all_project_types(State(state): State<SharedState>) -> Result<Json<Envelope>> {
    let rows = sqlx::query_as::<_, ProjectType>("SELECT * FROM project_type ORDER BY id")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(Envelope::success().with("resultMessage", rows)))
}

/// Get a project type by id
#[utoipa::path(
    get,
    path = "/projectTypes/{id}",
    context_path = "/api/superadmin",
    tag = "console",
    params(("id" = i32, Path, description = "Project type ID")),
    responses(
        (status = 200, description = "Project type"),
        (status = 404, description = "Account type not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn project_type_by_id(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<Json<Envelope>> {
    let row = sqlx::query_as::<_, ProjectType>("SELECT * FROM project_type WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Account type not found".into()))?;
    Ok(Json(Envelope::success().with("resultMessage", row)))
}

/// List all sites
#[utoipa::path(
    get,
    path = "/sites",
    context_path = "/api/superadmin",
    tag = "console",
    responses((status = 200, description = "All sites")),
    security(("bearer_auth" = []))
)]
pub async fn all_sites(State(state): State<SharedState>) -> Result<Json<Envelope>> {
    let rows = sqlx::query_as::<_, Site>("SELECT * FROM site ORDER BY id")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(Envelope::success().with("resultMessage", rows)))
}

/// Get a site by id
#[utoipa::path(
    get,
    path = "/sites/{id}",
    context_path = "/api/superadmin",
    tag = "console",
    params(("id" = i32, Path, description = "Site ID")),
    responses(
        (status = 200, description = "Site"),
        (status = 404, description = "Site not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn site_by_id(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<Json<Envelope>> {
    let row = sqlx::query_as::<_, Site>("SELECT * FROM site WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Site not found".into()))?;
    Ok(Json(Envelope::success().with("resultMessage", row)))
}

/// List all companies
#[utoipa::path(
    get,
    path = "/company",
    context_path = "/api/superadmin",
    tag = "console",
    responses((status = 200, description = "All companies")),
    security(("bearer_auth" = []))
)]
pub async fn all_companies(State(state): State<SharedState>) -> Result<Json<Envelope>> {
    let rows = sqlx::query_as::<_, Company>("SELECT * FROM company ORDER BY id")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(Envelope::success().with("resultMessage", rows)))
}

/// List all roles
#[utoipa::path(
    get,
    path = "/roles",
    context_path = "/api/superadmin",
    tag = "console",
    responses((status = 200, description = "All roles")),
    security(("bearer_auth" = []))
)]
pub async fn all_roles(State(state): State<SharedState>) -> Result<Json<Envelope>> {
    let rows = sqlx::query_as::<_, Role>("SELECT * FROM role ORDER BY id")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(Envelope::success().with("resultMessage", rows)))
}

/// List all access rules
#[utoipa::path(
    get,
    path = "/access",
    context_path = "/api/superadmin",
    tag = "console",
    responses((status = 200, description = "All access rules")),
    security(("bearer_auth" = []))
)]
pub async fn all_access(State(state): State<SharedState>) -> Result<Json<Envelope>> {
    let rows = sqlx::query_as::<_, Access>("SELECT * FROM access ORDER BY id")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(Envelope::success().with("resultMessage", rows)))
}

/// List the audit trail
#[utoipa::path(
    get,
    path = "/logs",
    context_path = "/api/superadmin",
    tag = "console",
    responses((status = 200, description = "All audit log entries")),
    security(("bearer_auth" = []))
)]
pub async fn all_logs(State(state): State<SharedState>) -> Result<Json<Envelope>> {
    let rows = sqlx::query_as::<_, ChangeLog>("SELECT * FROM change_log ORDER BY id")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(Envelope::success().with("resultMessage", rows)))
}
