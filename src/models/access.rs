//! Access rule model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Access rule entity: per-role web/app entitlements.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Access {
    pub id: i32,
    pub web_access: bool,
    pub app_access: bool,
    pub role_id: i32,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub created_by: Option<i32>,
    pub updated_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}
