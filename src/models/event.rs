//! Event model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Event entity
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: i32,
    pub name: String,
    pub date: DateTime<Utc>,
    pub location: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
