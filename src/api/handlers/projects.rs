//! Project management handlers.
//!
//! Create and update accept multipart form data: the entity fields plus an
//! optional `logo` file that lands in object storage keyed by content hash.

use axum::{
    extract::{Extension, Multipart, Path, State},
    routing::{post, put},
    Json, Router,
};
use bytes::Bytes;
use std::collections::HashMap;

use crate::api::envelope::Envelope;
use crate::api::SharedState;
use crate::audit::{self, AuditEntry};
use crate::error::{AppError, Result};
use crate::models::Project;
use crate::services::Claims;
use crate::storage;
use crate::store::{NewProject, ProjectChanges};

/// Create project routes
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/createProjInfo", post(create_project))
        .route("/updateProjInfo/:id", post(update_project))
        .route("/deleteProjInfo/:id", put(delete_project))
}

/// Parsed multipart body: text fields plus the optional logo file.
struct ProjectForm {
    fields: HashMap<String, String>,
    logo: Option<(String, Bytes)>,
}

impl ProjectForm {
    async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut fields = HashMap::new();
        let mut logo = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid form data: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "logo" {
                let filename = field.file_name().unwrap_or("logo").to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid form data: {}", e)))?;
                logo = Some((filename, content));
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid form data: {}", e)))?;
                fields.insert(name, value);
            }
        }

        Ok(Self { fields, logo })
    }

    fn text(&self, name: &str) -> Result<String> {
        self.fields
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::Validation(format!("Missing required field: {}", name)))
    }

    fn int(&self, name: &str) -> Result<i32> {
        self.text(name)?
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid value for field: {}", name)))
    }

    fn boolean(&self, name: &str) -> Result<bool> {
        let value = self.text(name)?;
        Ok(value == "true" || value == "1")
    }
}

async fn fetch_project(conn: &mut sqlx::PgConnection, id: i32) -> Result<Project> {
    sqlx::query_as::<_, Project>("SELECT * FROM project WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))
}

/// Create a project
#[utoipa::path(
    post,
    path = "/createProjInfo",
    context_path = "/api/crud/projinfo",
    tag = "projects",
    responses(
        (status = 200, description = "Project created successfully"),
        (status = 400, description = "Missing field, duplicate project, or failed external verification"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_project(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<Json<Envelope>> {
    let form = ProjectForm::read(multipart).await?;

    let name = form.text("name")?;
    let description = form.text("description")?;
    let project_type_id = form.int("project_type_id")?;
    let company_id = form.int("company_id")?;
    let site_id = form.int("site_id")?;
    let device_id = form.text("device_id")?;
    let app_version = form.text("app_version")?;
    // The field is required, but demo mode is a deployment-wide setting.
    form.boolean("isDemo")?;

    let Some((filename, content)) = form.logo else {
        return Err(AppError::Validation("Logo file is required".into()));
    };

    let logo_url = storage::store_logo(state.storage.as_ref(), &filename, content).await?;

    state.tenant_check.verify().await?;

    let mut tx = state.db.begin().await?;

    let existing: Option<i32> = sqlx::query_scalar(
        "SELECT id FROM project WHERE name = $1 AND project_type_id = $2 AND company_id = $3",
    )
    .bind(&name)
    .bind(project_type_id)
    .bind(company_id)
    .fetch_optional(&mut *tx)
    .await?;
    if existing.is_some() {
        return Err(AppError::Duplicate(
            "Project already exists for this company and project type".into(),
        ));
    }

    let project = NewProject {
        name,
        description,
        project_type_id,
        company_id,
        site_id,
        is_demo: state.config.demo_mode,
        logo: Some(logo_url),
        device_id,
        app_version,
    };

    let created = state
        .store
        .create_project(&mut tx, &project, claims.id)
        .await?;

    let entry = AuditEntry::created("project", &created, Some(claims.id))?;
    let audited =
        audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, created).await?;

    Ok(Json(
        Envelope::ok("Project created successfully").with("projectInfo", audited.value),
    ))
}

/// Update a project
#[utoipa::path(
    post,
    path = "/updateProjInfo/{id}",
    context_path = "/api/crud/projinfo",
    tag = "projects",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project updated successfully"),
        (status = 404, description = "Project not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_project(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<Envelope>> {
    let form = ProjectForm::read(multipart).await?;

    let name = form.text("name")?;
    let description = form.text("description")?;
    let project_type_id = form.int("project_type_id")?;
    let company_id = form.int("company_id")?;
    let site_id = form.int("site_id")?;
    let device_id = form.text("device_id")?;
    let app_version = form.text("app_version")?;
    let is_demo = form.boolean("isDemo")?;
    let is_active = form.boolean("isActive")?;

    let mut tx = state.db.begin().await?;

    let original = fetch_project(&mut tx, id).await?;

    let duplicate: Option<i32> = sqlx::query_scalar(
        "SELECT id FROM project WHERE name = $1 AND project_type_id = $2 AND company_id = $3 AND id <> $4",
    )
    .bind(&name)
    .bind(project_type_id)
    .bind(company_id)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;
    if duplicate.is_some() {
        return Err(AppError::Duplicate(
            "Project with the same name and project type already exists for this company".into(),
        ));
    }

    let logo = match form.logo {
        Some((filename, content)) => {
            Some(storage::store_logo(state.storage.as_ref(), &filename, content).await?)
        }
        None => original.logo.clone(),
    };

    let changes = ProjectChanges {
        name,
        description,
        project_type_id,
        company_id,
        site_id,
        is_demo,
        logo,
        device_id,
        app_version,
        is_active,
    };

    let updated = state
        .store
        .update_project(&mut tx, id, &changes, claims.id)
        .await?;

    let entry = AuditEntry::updated("project", &original, &updated, Some(claims.id))?;
    let audited =
        audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, updated).await?;

    Ok(Json(
        Envelope::ok("Project updated successfully").with("projectInfo", audited.value),
    ))
}

/// Deactivate a project
#[utoipa::path(
    put,
    path = "/deleteProjInfo/{id}",
    context_path = "/api/crud/projinfo",
    tag = "projects",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project deactivated successfully"),
        (status = 404, description = "Project not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_project(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<Json<Envelope>> {
    let mut tx = state.db.begin().await?;

    let original = fetch_project(&mut tx, id).await?;
    let updated = state
        .store
        .deactivate_project(&mut tx, id, claims.id)
        .await?;

    let entry = AuditEntry::updated("project", &original, &updated, Some(claims.id))?;
    audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, ()).await?;

    Ok(Json(
        Envelope::success().with("resultValue", "Project deactivated successfully"),
    ))
}
