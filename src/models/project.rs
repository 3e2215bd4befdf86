//! Project and project type models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Project type entity
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectType {
    pub id: i32,
    pub type_name: String,
    pub description: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub created_by: Option<i32>,
    pub updated_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Project entity
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub project_type_id: i32,
    pub company_id: i32,
    pub site_id: i32,
    #[serde(rename = "isDemo")]
    pub is_demo: bool,
    pub logo: Option<String>,
    pub device_id: String,
    pub app_version: String,
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
    fn test_project_serializes_legacy_flags() {
        let now = Utc::now();
        let project = Project {
            id: 3,
            name: "Kiosk".to_string(),
            description: "Front desk kiosk".to_string(),
            project_type_id: 1,
            company_id: 2,
            site_id: 4,
            is_demo: true,
            logo: None,
            device_id: "dev-01".to_string(),
            app_version: "2.4.0".to_string(),
            is_active: true,
            created_by: Some(1),
            updated_by: Some(1),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["isDemo"], true);
        assert_eq!(json["isActive"], true);
        assert!(json.get("is_demo").is_none());
    }
}
