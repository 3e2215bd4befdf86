//! Role model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Role entity
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_legacy_field_names() {
        let now = Utc::now();
        let role = Role {
            id: 1,
            name: "Admin".to_string(),
            is_active: true,
            created_by: Some(1),
            updated_by: Some(1),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let json = serde_json::to_value(&role).unwrap();
        assert_eq!(json["isActive"], true);
        assert!(json.get("is_active").is_none());
        assert!(json["deleted_at"].is_null());
    }
}
