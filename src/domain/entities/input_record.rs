use crate::domain::value_objects::{
    document_from_queued, DocumentFields, FieldValue, RecordPayload, UserId,
};
use crate::shared::error::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Map, Value};

/// Growth stage and task type combination that carries a harvest prediction.
const GERMINATION: &str = "Germination";
const PLANTING_TASKS: [&str; 2] = ["Planting Operation", "Replanting / Gap Filling"];

/// Typed view of a queued payload, decoded at sync time.
///
/// The main document fields are already revived (placeholder markers turned
/// back into remote-store value objects) and stripped of the nested
/// sub-collections, which are uploaded separately.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRecord {
    pub field_id: String,
    pub growth_status: String,
    pub operation: String,
    pub task_type: String,
    pub data: Map<String, Value>,
    pub bought_items: Vec<Value>,
    pub vehicle_updates: Option<Value>,
    pub main_fields: DocumentFields,
}

impl InputRecord {
    /// Decodes a payload, backfilling `userId` from the session and applying
    /// the offline-capture fixups the online save path would have done.
    pub fn from_payload(
        payload: &RecordPayload,
        session_user: &UserId,
    ) -> Result<Self, AppError> {
        let mut map = payload.fields().clone();

        let bought_items = match map.remove("boughtItems") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        let vehicle_updates = map.remove("vehicleUpdates").filter(|v| !v.is_null());

        // userId must match the session uid or the record never shows up in
        // the per-user Records query.
        let has_user = matches!(map.get("userId"), Some(Value::String(s)) if !s.is_empty());
        if !has_user {
            map.insert(
                "userId".to_string(),
                Value::String(session_user.to_string()),
            );
        }

        for key in ["fieldId", "status", "operation", "taskType", "data"] {
            if map.get(key).map(Value::is_null).unwrap_or(true) {
                return Err(AppError::Validation(format!(
                    "queued record is missing required field `{key}`"
                )));
            }
        }

        // Growth Tracker reads recordDate; fall back to the capture time.
        if map.get("recordDate").map(Value::is_null).unwrap_or(true) {
            let fallback = map
                .get("createdAt")
                .filter(|v| !v.is_null())
                .cloned()
                .unwrap_or_else(|| json!({"_methodName": "serverTimestamp"}));
            map.insert("recordDate".to_string(), fallback);
        }

        // Records captured offline while in progress are stored with a
        // placeholder status; restore the stashed one on upload.
        if map.get("recordStatus").and_then(Value::as_str) == Some("Pending Sync") {
            let original = map
                .remove("_originalStatus")
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| "In Progress".to_string());
            map.insert("recordStatus".to_string(), Value::String(original));
        }

        let field_id = required_string(&map, "fieldId")?;
        let growth_status = required_string(&map, "status")?;
        let operation = required_string(&map, "operation")?;
        let task_type = required_string(&map, "taskType")?;
        let data = match map.get("data") {
            Some(Value::Object(data)) => data.clone(),
            _ => {
                return Err(AppError::Validation(
                    "queued record field `data` must be an object".to_string(),
                ))
            }
        };

        let main_fields = document_from_queued(&map);

        Ok(Self {
            field_id,
            growth_status,
            operation,
            task_type,
            data,
            bought_items,
            vehicle_updates,
            main_fields,
        })
    }

    /// True for records that imply a harvest prediction on the parent field.
    pub fn is_planting_record(&self) -> bool {
        self.growth_status == GERMINATION
            && PLANTING_TASKS.contains(&self.task_type.as_str())
    }

    pub fn variety(&self) -> Option<&str> {
        self.data.get("variety").and_then(Value::as_str)
    }

    /// Planting date, checked across the field names the capture forms use.
    pub fn planting_date(&self) -> Option<DateTime<Utc>> {
        ["startDate", "plantingDate", "replantingDate", "date"]
            .iter()
            .find_map(|key| self.data.get(*key).and_then(parse_date))
    }
}

fn required_string(map: &Map<String, Value>, key: &str) -> Result<String, AppError> {
    match map.get(key).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(AppError::Validation(format!(
            "queued record field `{key}` must be a non-empty string"
        ))),
    }
}

fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Object(_) => FieldValue::from_queued(value).as_datetime(),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|d| d.with_timezone(&Utc))
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|ndt| ndt.and_utc())
            }),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}
