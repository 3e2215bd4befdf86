//! Company model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Company entity
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Company {
    pub id: i32,
    pub name: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub created_by: Option<i32>,
    pub updated_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}
