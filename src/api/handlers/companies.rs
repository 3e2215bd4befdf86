//! Company management handlers.

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
use crate::models::Company;
use crate::services::Claims;

/// Create company routes
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/createCompany", post(create_company))
        .route("/updateCompany/:id", put(update_company))
        .route("/deleteCompany/:id", put(delete_company))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCompanyRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

async fn fetch_company(conn: &mut sqlx::PgConnection, id: i32) -> Result<Company> {
    sqlx::query_as::<_, Company>("SELECT * FROM company WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found".into()))
}

/// Create a company
#[utoipa::path(
    post,
    path = "/createCompany",
    context_path = "/api/crud/company",
    tag = "companies",
    request_body = CreateCompanyRequest,
    responses(
        (status = 200, description = "Company created successfully"),
        (status = 400, description = "Missing field or duplicate name"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_company(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCompanyRequest>,
) -> Result<Json<Envelope>> {
    let name = require(payload.name, "name")?;

    let mut tx = state.db.begin().await?;

    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM company WHERE name = $1")
        .bind(&name)
        .fetch_optional(&mut *tx)
        .await?;
    if existing.is_some() {
        return Err(AppError::Duplicate("Company name already exists".into()));
    }

    let company = state.store.create_company(&mut tx, &name, claims.id).await?;

    let entry = AuditEntry::created("company", &company, Some(claims.id))?;
    let audited =
        audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, company).await?;

    Ok(Json(
        Envelope::success()
            .with("resultMessage", "Company created successfully")
            .with("company", audited.value),
    ))
}

/// Update a company
#[utoipa::path(
    put,
    path = "/updateCompany/{id}",
    context_path = "/api/crud/company",
    tag = "companies",
    params(("id" = i32, Path, description = "Company ID")),
    request_body = UpdateCompanyRequest,
    responses(
        (status = 200, description = "Company updated successfully"),
        (status = 404, description = "Company not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_company(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCompanyRequest>,
) -> Result<Json<Envelope>> {
    let name = require(payload.name, "name")?;
    let is_active = require(payload.is_active, "isActive")?;

    let mut tx = state.db.begin().await?;

    let original = fetch_company(&mut tx, id).await?;
    let updated = state
        .store
        .update_company(&mut tx, id, &name, is_active, claims.id)
        .await?;

    let entry = AuditEntry::updated("company", &original, &updated, Some(claims.id))?;
    audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, ()).await?;

    Ok(Json(Envelope::ok("Company updated and saved successfully")))
}

/// Deactivate a company
#[utoipa::path(
    put,
    path = "/deleteCompany/{id}",
    context_path = "/api/crud/company",
    tag = "companies",
    params(("id" = i32, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company deactivated successfully"),
        (status = 404, description = "Company not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_company(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<Json<Envelope>> {
    let mut tx = state.db.begin().await?;

    let original = fetch_company(&mut tx, id).await?;
    let updated = state
        .store
        .deactivate_company(&mut tx, id, claims.id)
        .await?;

    let entry = AuditEntry::updated("company", &original, &updated, Some(claims.id))?;
    audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, ()).await?;

    Ok(Json(Envelope::ok("Company deactivated successfully")))
}
