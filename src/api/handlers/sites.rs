//! Site management handlers.

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
use crate::models::Site;
use crate::services::Claims;
use crate::store::{NewSite, SiteChanges};

/// Create site routes
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/createSite", post(create_site))
        .route("/updateSite/:id", put(update_site))
        .route("/deleteSite/:id", put(delete_site))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSiteRequest {
    pub name: Option<String>,
    pub url: Option<String>,
    pub domain: Option<String>,
    pub ip: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSiteRequest {
    pub name: Option<String>,
    pub url: Option<String>,
    pub domain: Option<String>,
    pub ip: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

async fn fetch_site(conn: &mut sqlx::PgConnection, id: i32) -> Result<Site> {
    sqlx::query_as::<_, Site>("SELECT * FROM site WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Site not found".into()))
}

/// Create a site
#[utoipa::path(
    post,
    path = "/createSite",
    context_path = "/api/crud/site",
    tag = "sites",
    request_body = CreateSiteRequest,
    responses(
        (status = 200, description = "Site created successfully"),
        (status = 400, description = "Missing field or duplicate name"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_site(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateSiteRequest>,
) -> Result<Json<Envelope>> {
    let site = NewSite {
        name: require(payload.name, "name")?,
        url: require(payload.url, "url")?,
        domain: require(payload.domain, "domain")?,
        ip: require(payload.ip, "ip")?,
    };

    let mut tx = state.db.begin().await?;

    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM site WHERE name = $1")
        .bind(&site.name)
        .fetch_optional(&mut *tx)
        .await?;
    if existing.is_some() {
        return Err(AppError::Duplicate("Site name already exists".into()));
    }

    let created = state.store.create_site(&mut tx, &site, claims.id).await?;

    let entry = AuditEntry::created("site", &created, Some(claims.id))?;
    let audited =
        audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, created).await?;

    Ok(Json(
        Envelope::success()
            .with("resultMessage", "Site created successfully")
            .with("site", audited.value),
    ))
}

/// Update a site
#[utoipa::path(
    put,
    path = "/updateSite/{id}",
    context_path = "/api/crud/site",
    tag = "sites",
    params(("id" = i32, Path, description = "Site ID")),
    request_body = UpdateSiteRequest,
    responses(
        (status = 200, description = "Site updated successfully"),
        (status = 404, description = "Site not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_site(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateSiteRequest>,
) -> Result<Json<Envelope>> {
    let changes = SiteChanges {
        name: require(payload.name, "name")?,
        url: require(payload.url, "url")?,
        domain: require(payload.domain, "domain")?,
        ip: require(payload.ip, "ip")?,
        is_active: require(payload.is_active, "isActive")?,
    };

    let mut tx = state.db.begin().await?;

    let original = fetch_site(&mut tx, id).await?;
    let updated = state
        .store
        .update_site(&mut tx, id, &changes, claims.id)
        .await?;

    let entry = AuditEntry::updated("site", &original, &updated, Some(claims.id))?;
    audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, ()).await?;

    Ok(Json(Envelope::ok("Site updated and saved successfully")))
}

/// Deactivate a site
#[utoipa::path(
    put,
    path = "/deleteSite/{id}",
    context_path = "/api/crud/site",
    tag = "sites",
    params(("id" = i32, Path, description = "Site ID")),
    responses(
        (status = 200, description = "Site deactivated successfully"),
        (status = 404, description = "Site not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_site(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<Json<Envelope>> {
    let mut tx = state.db.begin().await?;

    let original = fetch_site(&mut tx, id).await?;
    let updated = state.store.deactivate_site(&mut tx, id, claims.id).await?;

    let entry = AuditEntry::updated("site", &original, &updated, Some(claims.id))?;
    audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, ()).await?;

    Ok(Json(Envelope::ok("Site deactivated successfully")))
}
