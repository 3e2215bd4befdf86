//! Legacy response envelope.
//!
//! Every response uses the `{ resultKey, message | errorMessage, resultCode |
//! errorCode, <payload>? }` shape the existing clients depend on. A handful
//! of endpoints use `resultMessage` or `resultValue` instead of `message`;
//! the flattened extra map carries those and the entity payloads.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AppError, Result};

/// Response envelope
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    #[serde(rename = "resultKey")]
    pub result_key: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(rename = "errorMessage", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(rename = "resultCode", skip_serializing_if = "Option::is_none")]
    pub result_code: Option<u16>,

    #[serde(rename = "errorCode", skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u16>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    /// Bare success envelope: `resultKey: true, resultCode: 200`.
    pub fn success() -> Self {
        Self {
            result_key: true,
            message: None,
            error_message: None,
            result_code: Some(200),
            error_code: None,
            extra: Map::new(),
        }
    }

    /// Success with the standard `message` field.
    pub fn ok(message: &str) -> Self {
        let mut envelope = Self::success();
        envelope.message = Some(message.to_string());
        envelope
    }

    /// Failure envelope: `resultKey: false, errorMessage, errorCode`.
    pub fn error(code: u16, message: &str) -> Self {
        Self {
            result_key: false,
            message: None,
            error_message: Some(message.to_string()),
            result_code: None,
            error_code: Some(code),
            extra: Map::new(),
        }
    }

    /// Attach an extra top-level field (entity payload, `resultMessage`,
    /// `resultValue`, tokens).
    pub fn with<T: Serialize>(mut self, key: &str, value: T) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.extra.insert(key.to_string(), value);
        self
    }
}

/// Pull a required field out of an optional request value, failing with the
/// legacy validation message.
pub fn require<T>(field: Option<T>, name: &str) -> Result<T> {
    field.ok_or_else(|| AppError::Validation(format!("Missing required field: {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        let json = serde_json::to_value(Envelope::ok("Role created successfully")).unwrap();
        assert_eq!(json["resultKey"], true);
        assert_eq!(json["message"], "Role created successfully");
        assert_eq!(json["resultCode"], 200);
        assert!(json.get("errorMessage").is_none());
        assert!(json.get("errorCode").is_none());
    }

    #[test]
    fn test_error_envelope_shape() {
        let json = serde_json::to_value(Envelope::error(404, "Role not found")).unwrap();
        assert_eq!(json["resultKey"], false);
        assert_eq!(json["errorMessage"], "Role not found");
        assert_eq!(json["errorCode"], 404);
        assert!(json.get("message").is_none());
        assert!(json.get("resultCode").is_none());
    }

    #[test]
    fn test_entity_payload_is_flattened() {
        let envelope = Envelope::ok("Role created successfully")
            .with("role", json!({"id": 1, "name": "Admin"}));
        let json = serde_json::to_value(envelope).unwrap();
        assert_eq!(json["role"]["name"], "Admin");
    }

    #[test]
    fn test_result_message_variant() {
        let envelope = Envelope::success().with("resultMessage", "Company created successfully");
        let json = serde_json::to_value(envelope).unwrap();
        assert_eq!(json["resultMessage"], "Company created successfully");
        assert!(json.get("message").is_none());
        assert_eq!(json["resultCode"], 200);
    }

    #[test]
    fn test_result_value_variant() {
        let envelope = Envelope::success().with("resultValue", "User deactivated successfully");
        let json = serde_json::to_value(envelope).unwrap();
        assert_eq!(json["resultValue"], "User deactivated successfully");
    }

    #[test]
    fn test_require_present_and_missing() {
        assert_eq!(require(Some(5), "role_id").unwrap(), 5);
        let err = require::<i32>(None, "role_id").unwrap_err();
        let (status, msg) = err.status_and_message();
        assert_eq!(status.as_u16(), 400);
        assert_eq!(msg, "Missing required field: role_id");
    }
}
