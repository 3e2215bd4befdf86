//! User model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// User entity
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub birthday: NaiveDate,
    pub city: String,
    pub email: String,
    pub prof_img: Option<String>,
    pub role_id: i32,
    pub company_id: Option<i32>,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub created_by: Option<i32>,
    pub updated_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: 9,
            username: "jdoe".to_string(),
            name: "J. Doe".to_string(),
            password: "$2b$10$secret".to_string(),
            birthday: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            city: "Osaka".to_string(),
            email: "jdoe@example.com".to_string(),
            prof_img: None,
            role_id: 2,
            company_id: Some(1),
            is_active: true,
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            last_login: None,
        }
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "jdoe@example.com");
    }

    #[test]
    fn test_user_serializes_legacy_active_flag() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert_eq!(json["isActive"], true);
        assert!(json.get("is_active").is_none());
    }
}
