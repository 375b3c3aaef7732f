use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A value in a remote-store document field map.
///
/// Queued payloads carry remote-store value objects in a serialized local
/// form: timestamps as `{"_type": "Timestamp", "seconds": …, "nanoseconds":
/// …}` and server-assigned timestamps as `{"_methodName":
/// "serverTimestamp"}`. [`FieldValue::from_queued`] revives those markers
/// when an entry is dequeued for upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    Text(String),
    Timestamp { seconds: i64, nanoseconds: u32 },
    ServerTimestamp,
    Array(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

pub type DocumentFields = BTreeMap<String, FieldValue>;

impl FieldValue {
    pub fn from_queued(value: &Value) -> FieldValue {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => FieldValue::Double(n.as_f64().unwrap_or(0.0)),
            },
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Array(items) => {
                FieldValue::Array(items.iter().map(FieldValue::from_queued).collect())
            }
            Value::Object(map) => {
                if let Some(revived) = Self::revive_marker(map) {
                    return revived;
                }
                FieldValue::Map(
                    map.iter()
                        .map(|(k, v)| (k.clone(), FieldValue::from_queued(v)))
                        .collect(),
                )
            }
        }
    }

    pub fn from_datetime(value: DateTime<Utc>) -> FieldValue {
        FieldValue::Timestamp {
            seconds: value.timestamp(),
            nanoseconds: value.timestamp_subsec_nanos(),
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(*seconds, *nanoseconds),
            _ => None,
        }
    }

    fn revive_marker(map: &Map<String, Value>) -> Option<FieldValue> {
        if map.get("_type").and_then(Value::as_str) == Some("Timestamp") {
            let seconds = map.get("seconds").and_then(Value::as_i64)?;
            let nanoseconds = map.get("nanoseconds").and_then(Value::as_u64)? as u32;
            return Some(FieldValue::Timestamp {
                seconds,
                nanoseconds,
            });
        }
        if map.get("_methodName").and_then(Value::as_str) == Some("serverTimestamp") {
            return Some(FieldValue::ServerTimestamp);
        }
        None
    }
}

/// Revives a whole queued payload object into a remote field map.
pub fn document_from_queued(map: &Map<String, Value>) -> DocumentFields {
    map.iter()
        .map(|(k, v)| (k.clone(), FieldValue::from_queued(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_revives_timestamp_marker() {
        let value = json!({"_type": "Timestamp", "seconds": 1_755_000_000, "nanoseconds": 500});
        assert_eq!(
            FieldValue::from_queued(&value),
            FieldValue::Timestamp {
                seconds: 1_755_000_000,
                nanoseconds: 500
            }
        );
    }

    #[test]
    fn test_revives_server_timestamp_marker() {
        let value = json!({"_methodName": "serverTimestamp"});
        assert_eq!(FieldValue::from_queued(&value), FieldValue::ServerTimestamp);
    }

    #[test]
    fn test_revives_nested_structures() {
        let value = json!({
            "name": "F1",
            "area": 2.5,
            "plots": [1, 2],
            "dates": {
                "planted": {"_type": "Timestamp", "seconds": 10, "nanoseconds": 0},
                "created": {"_methodName": "serverTimestamp"}
            }
        });

        let revived = FieldValue::from_queued(&value);
        let FieldValue::Map(map) = revived else {
            panic!("expected a map");
        };
        assert_eq!(map["name"], FieldValue::Text("F1".into()));
        assert_eq!(map["area"], FieldValue::Double(2.5));
        assert_eq!(
            map["plots"],
            FieldValue::Array(vec![FieldValue::Integer(1), FieldValue::Integer(2)])
        );
        let FieldValue::Map(dates) = &map["dates"] else {
            panic!("expected nested map");
        };
        assert_eq!(
            dates["planted"],
            FieldValue::Timestamp {
                seconds: 10,
                nanoseconds: 0
            }
        );
        assert_eq!(dates["created"], FieldValue::ServerTimestamp);
    }

    #[test]
    fn test_datetime_round_trip() {
        let now = DateTime::from_timestamp(1_755_000_000, 0).unwrap();
        assert_eq!(FieldValue::from_datetime(now).as_datetime(), Some(now));
    }
}
