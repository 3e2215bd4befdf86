//! Event handlers.
//!
//! Events are the one unauthenticated entity: create and list only.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::envelope::Envelope;
use crate::api::SharedState;
use crate::audit::{self, AuditEntry};
use crate::error::{AppError, Result};
use crate::models::Event;

/// Create event routes
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/createEvent", post(create_event))
        .route("/getEvent", get(get_events))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    pub name: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

/// Create an event
#[utoipa::path(
    post,
    path = "/createEvent",
    context_path = "/api/crud/event",
    tag = "events",
    request_body = CreateEventRequest,
    responses(
        (status = 200, description = "Event created successfully"),
        (status = 409, description = "Event name already exists"),
    )
)]
pub async fn create_event(
    State(state): State<SharedState>,
    Json(payload): Json<CreateEventRequest>,
) -> Result<Json<Envelope>> {
    let (Some(name), Some(date), Some(location)) = (payload.name, payload.date, payload.location)
    else {
        return Err(AppError::Validation(
            "Event name, date, and location are required".into(),
        ));
    };

    let mut tx = state.db.begin().await?;

    let event = sqlx::query_as::<_, Event>(
        r#"
        INSERT INTO event (name, date, location, is_active)
        VALUES ($1, $2, $3, TRUE)
        RETURNING *
        "#,
    )
    .bind(&name)
    .bind(date)
    .bind(&location)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.code().as_deref() == Some("23505") {
                return AppError::Conflict("Event with the same name already exists".into());
            }
        }
        e.into()
    })?;

    let entry = AuditEntry::created("event", &event, None)?;
    let audited =
        audit::commit_with_audit(tx, &state.audit, state.audit_mode, entry, event).await?;

    tracing::info!(event = %name, "event created");

    Ok(Json(
        Envelope::ok("Event created successfully").with("event", audited.value),
    ))
}

/// List all events
#[utoipa::path(
    get,
    path = "/getEvent",
    context_path = "/api/crud/event",
    tag = "events",
    responses(
        (status = 200, description = "Events fetched successfully"),
        (status = 404, description = "No events found"),
    )
)]
pub async fn get_events(State(state): State<SharedState>) -> Result<Json<Envelope>> {
    let events = sqlx::query_as::<_, Event>("SELECT * FROM event ORDER BY date")
        .fetch_all(&state.db)
        .await?;

    if events.is_empty() {
        return Err(AppError::NotFound("No events found".into()));
    }

    Ok(Json(
        Envelope::ok("Event fetched successfully").with("events", events),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_event_request_deserialize() {
        let req: CreateEventRequest = serde_json::from_str(
            r#"{"name":"Launch","date":"2026-09-01T10:00:00Z","location":"HQ"}"#,
        )
        .unwrap();
        assert_eq!(req.name.as_deref(), Some("Launch"));
        assert!(req.date.is_some());
    }

    #[test]
    fn test_create_event_request_missing_date() {
        let req: CreateEventRequest =
            serde_json::from_str(r#"{"name":"Launch","location":"HQ"}"#).unwrap();
        assert!(req.date.is_none());
    }
}
