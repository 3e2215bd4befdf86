//! Change auditing.
//!
//! Every mutating operation records a row in `change_log`: the pre-change
//! snapshot, the mapping of fields that actually changed, and whether the
//! active flag flipped. Two recording arrangements are supported and chosen
//! at startup: the audit row commits atomically with the entity write, or it
//! is written best-effort in its own transaction after the primary commit.

use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use crate::error::{AppError, Result};

/// Fields ignored by the diff engine. These change on every write and would
/// otherwise drown out the meaningful delta.
pub const BOOKKEEPING_FIELDS: [&str; 5] = [
    "created_at",
    "updated_at",
    "created_by",
    "updated_by",
    "deleted_at",
];

/// Compute the mapping of fields whose values differ between two snapshots.
///
/// Comparison is strict: a number and its string rendering are different
/// values. Keys present on only one side are reported as changed, with the
/// updated side's value (`null` when the key was removed).
pub fn change_set(original: &Map<String, Value>, updated: &Map<String, Value>) -> Map<String, Value> {
    let mut changes = Map::new();

    for (key, after) in updated {
        if BOOKKEEPING_FIELDS.contains(&key.as_str()) {
            continue;
        }
        if original.get(key) != Some(after) {
            changes.insert(key.clone(), after.clone());
        }
    }

    // Keys that disappeared between the snapshots.
    for key in original.keys() {
        if BOOKKEEPING_FIELDS.contains(&key.as_str()) {
            continue;
        }
        if !updated.contains_key(key) {
            changes.insert(key.clone(), Value::Null);
        }
    }

    changes
}

/// Serialize a row into the flat JSON object the diff engine works on.
pub fn snapshot<T: Serialize>(row: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(row) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::Internal(
            "audit snapshot must serialize to an object".into(),
        )),
        Err(e) => Err(AppError::Internal(format!("audit snapshot failed: {}", e))),
    }
}

/// One pending audit record.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub tablename: String,
    pub requested_data: String,
    pub change_data: String,
    pub is_active: bool,
    pub is_status_change: bool,
    pub actor: Option<i32>,
}

impl AuditEntry {
    /// Entry for a freshly created row: no prior state, the full row as the
    /// change set.
    pub fn created<T: Serialize>(tablename: &str, row: &T, actor: Option<i32>) -> Result<Self> {
        let full = snapshot(row)?;
        Ok(Self {
            tablename: tablename.to_string(),
            requested_data: "{}".to_string(),
            change_data: Value::Object(full).to_string(),
            is_active: true,
            is_status_change: false,
            actor,
        })
    }

    /// Entry for an update: prior snapshot plus the diff against the
    /// post-write row.
    pub fn updated<T: Serialize, U: Serialize>(
        tablename: &str,
        before: &T,
        after: &U,
        actor: Option<i32>,
    ) -> Result<Self> {
        let original = snapshot(before)?;
        let updated = snapshot(after)?;
        let changes = change_set(&original, &updated);
        let is_status_change = original.get("isActive") != updated.get("isActive");

        Ok(Self {
            tablename: tablename.to_string(),
            requested_data: Value::Object(original).to_string(),
            change_data: Value::Object(changes).to_string(),
            is_active: true,
            is_status_change,
            actor,
        })
    }
}

/// Audit arrangement, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditMode {
    /// Audit row commits with the entity write; all-or-nothing.
    SameTransaction,
    /// Audit row is written after the primary commit; loss is possible and
    /// non-fatal.
    Secondary,
}

impl AuditMode {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "same-transaction" | "same_transaction" => Ok(AuditMode::SameTransaction),
            "secondary" => Ok(AuditMode::Secondary),
            other => Err(AppError::Config(format!(
                "AUDIT_MODE must be 'same-transaction' or 'secondary', got '{}'",
                other
            ))),
        }
    }
}

/// What happened to the audit side of a committed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    /// The audit row is durably recorded.
    Recorded,
    /// The primary write committed but the audit write failed (secondary
    /// arrangement only). Already logged.
    Lost,
}

/// A committed entity write together with its audit outcome.
#[derive(Debug)]
pub struct Audited<T> {
    pub value: T,
    pub audit: AuditOutcome,
}

/// Writes audit rows.
#[derive(Clone)]
pub struct AuditRecorder {
    db: PgPool,
}

impl AuditRecorder {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Insert the audit row on the given connection (typically an open
    /// transaction).
    pub async fn record(&self, conn: &mut PgConnection, entry: &AuditEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO change_log
                (tablename, requested_data, change_data, is_active, is_status_change, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            "#,
        )
        .bind(&entry.tablename)
        .bind(&entry.requested_data)
        .bind(&entry.change_data)
        .bind(entry.is_active)
        .bind(entry.is_status_change)
        .bind(entry.actor)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Best-effort audit write in its own transaction. Failure is logged and
    /// reported as `Lost`, never propagated.
    pub async fn record_detached(&self, entry: &AuditEntry) -> AuditOutcome {
        let result = async {
            let mut tx = self.db.begin().await?;
            self.record(&mut tx, entry).await?;
            tx.commit().await?;
            Ok::<_, AppError>(())
        }
        .await;

        match result {
            Ok(()) => AuditOutcome::Recorded,
            Err(e) => {
                tracing::error!(
                    table = %entry.tablename,
                    error = %e,
                    "audit write failed after primary commit"
                );
                AuditOutcome::Lost
            }
        }
    }
}

/// Commit an entity write together with its audit record, honoring the
/// configured arrangement.
///
/// Same-transaction: the audit row is inserted before commit, so the entity
/// write and its audit entry are visible together or not at all.
/// Secondary: the primary transaction commits first; the audit row is then
/// written best-effort and a failure surfaces only in the returned outcome.
pub async fn commit_with_audit<T>(
    mut tx: Transaction<'_, Postgres>,
    recorder: &AuditRecorder,
    mode: AuditMode,
    entry: AuditEntry,
    value: T,
) -> Result<Audited<T>> {
    match mode {
        AuditMode::SameTransaction => {
            recorder.record(&mut tx, &entry).await?;
            tx.commit().await?;
            Ok(Audited {
                value,
                audit: AuditOutcome::Recorded,
            })
        }
        AuditMode::Secondary => {
            tx.commit().await?;
            let audit = recorder.record_detached(&entry).await;
            Ok(Audited { value, audit })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_identical_snapshots_yield_empty_diff() {
        let a = obj(json!({"id": 1, "name": "Admin", "isActive": true}));
        assert!(change_set(&a, &a).is_empty());
    }

    #[test]
    fn test_bookkeeping_only_difference_yields_empty_diff() {
        let a = obj(json!({
            "id": 1, "name": "Admin",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "created_by": 1, "updated_by": 1, "deleted_at": null
        }));
        let b = obj(json!({
            "id": 1, "name": "Admin",
            "created_at": "2024-06-01T00:00:00Z",
            "updated_at": "2024-06-02T00:00:00Z",
            "created_by": 2, "updated_by": 9, "deleted_at": "2024-06-02T00:00:00Z"
        }));
        assert!(change_set(&a, &b).is_empty());
    }

    #[test]
    fn test_single_field_difference() {
        let a = obj(json!({"id": 1, "name": "Admin", "isActive": true}));
        let b = obj(json!({"id": 1, "name": "Operator", "isActive": true}));
        let changes = change_set(&a, &b);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes["name"], json!("Operator"));
    }

    #[test]
    fn test_comparison_is_type_sensitive() {
        let a = obj(json!({"id": 1, "city": 1}));
        let b = obj(json!({"id": 1, "city": "1"}));
        let changes = change_set(&a, &b);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes["city"], json!("1"));
    }

    #[test]
    fn test_key_only_in_updated_is_reported() {
        let a = obj(json!({"id": 1}));
        let b = obj(json!({"id": 1, "logo": "https://cdn/x.png"}));
        let changes = change_set(&a, &b);
        assert_eq!(changes["logo"], json!("https://cdn/x.png"));
    }

    #[test]
    fn test_key_only_in_original_is_reported_as_null() {
        let a = obj(json!({"id": 1, "logo": "https://cdn/x.png"}));
        let b = obj(json!({"id": 1}));
        let changes = change_set(&a, &b);
        assert_eq!(changes["logo"], Value::Null);
    }

    #[test]
    fn test_null_to_value_is_a_change() {
        let a = obj(json!({"id": 1, "prof_img": null}));
        let b = obj(json!({"id": 1, "prof_img": "data:image/png"}));
        let changes = change_set(&a, &b);
        assert_eq!(changes["prof_img"], json!("data:image/png"));
    }

    #[test]
    fn test_created_entry_shape() {
        #[derive(Serialize)]
        struct Row {
            id: i32,
            name: &'static str,
            #[serde(rename = "isActive")]
            is_active: bool,
        }
        let entry = AuditEntry::created("role", &Row { id: 7, name: "Admin", is_active: true }, Some(3))
            .unwrap();
        assert_eq!(entry.tablename, "role");
        assert_eq!(entry.requested_data, "{}");
        assert!(!entry.is_status_change);
        assert_eq!(entry.actor, Some(3));

        let change: Value = serde_json::from_str(&entry.change_data).unwrap();
        assert_eq!(change["id"], 7);
        assert_eq!(change["name"], "Admin");
        assert_eq!(change["isActive"], true);
    }

    #[test]
    fn test_updated_entry_detects_status_change() {
        let before = json!({"id": 1, "name": "Admin", "isActive": true});
        let after = json!({"id": 1, "name": "Admin", "isActive": false});
        let entry = AuditEntry::updated("role", &before, &after, Some(2)).unwrap();
        assert!(entry.is_status_change);

        let change: Value = serde_json::from_str(&entry.change_data).unwrap();
        assert_eq!(change, json!({"isActive": false}));
        let requested: Value = serde_json::from_str(&entry.requested_data).unwrap();
        assert_eq!(requested["name"], "Admin");
    }

    #[test]
    fn test_updated_entry_without_status_change() {
        let before = json!({"id": 1, "name": "Admin", "isActive": true});
        let after = json!({"id": 1, "name": "Ops", "isActive": true});
        let entry = AuditEntry::updated("role", &before, &after, None).unwrap();
        assert!(!entry.is_status_change);
    }

    #[test]
    fn test_snapshot_rejects_non_objects() {
        assert!(snapshot(&"just a string").is_err());
        assert!(snapshot(&vec![1, 2, 3]).is_err());
    }

    #[test]
    fn test_audit_mode_parse_accepts_both_spellings() {
        assert_eq!(
            AuditMode::parse("same_transaction").unwrap(),
            AuditMode::SameTransaction
        );
        assert_eq!(AuditMode::parse("secondary").unwrap(), AuditMode::Secondary);
    }
}
