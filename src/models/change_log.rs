//! Audit trail model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// One recorded state-changing operation. Rows are append-only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChangeLog {
    pub id: i32,
    pub tablename: String,
    /// JSON snapshot of the pre-change state (`"{}"` for creations)
    pub requested_data: String,
    /// JSON mapping of only the fields that changed
    pub change_data: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub is_status_change: bool,
    pub created_by: Option<i32>,
    pub updated_by: Option<i32>,
    pub created_at: DateTime<Utc>,
}
