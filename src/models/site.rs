//! Site model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Site entity
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Site {
    pub id: i32,
    pub name: String,
    pub url: String,
    pub domain: String,
    pub ip: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub created_by: Option<i32>,
    pub updated_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}
