// JSON collection format:
// { "meta": { "generated_at": "...", "column_ids": [...] }, "papers": [...] }
// Legacy shapes tolerated on read: bare array, or a single bare object.

use std::path::Path;

use paperstack_config::{FieldKind, SchemaConfig};
use paperstack_record::{FieldValue, Record};
use serde_json::{json, Map, Value};

use crate::error::StoreError;

pub fn read_json(path: &Path, schema: &SchemaConfig) -> Result<Vec<Record>, StoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| StoreError::Io(e.to_string()))?;
    let data: Value = serde_json::from_str(&content).map_err(|e| StoreError::Parse {
        path: path.display().to_string(),
        msg: e.to_string(),
    })?;

    let raw_list: Vec<Value> = match data {
        Value::Object(ref obj) if obj.contains_key("papers") => match &obj["papers"] {
            Value::Array(items) => items.clone(),
            other => {
                return Err(StoreError::Parse {
                    path: path.display().to_string(),
                    msg: format!("\"papers\" is not an array (got {})", kind_name(other)),
                })
            }
        },
        Value::Object(ref obj) if obj.contains_key("title") => vec![data.clone()],
        Value::Array(items) => items,
        other => {
            return Err(StoreError::Parse {
                path: path.display().to_string(),
                msg: format!("expected object or array, got {}", kind_name(&other)),
            })
        }
    };

    let mut records = Vec::new();
    for item in raw_list {
        if let Value::Object(obj) = item {
            records.push(object_to_record(&obj, schema));
        }
    }
    Ok(records)
}

pub fn write_json(
    path: &Path,
    records: &[Record],
    schema: &SchemaConfig,
) -> Result<(), StoreError> {
    let column_ids: Vec<String> =
        schema.active_fields().iter().map(|f| f.key.clone()).collect();

    // Preserve any meta keys a previous writer left behind.
    let mut meta = existing_meta(path);
    meta.insert("generated_at".into(), json!(chrono::Utc::now().to_rfc3339()));
    meta.insert("column_ids".into(), json!(column_ids));

    let papers: Vec<Value> = records
        .iter()
        .map(|record| {
            let mut obj = Map::new();
            for key in &column_ids {
                let value = match record.get(key) {
                    Some(v) => field_to_json(v),
                    None => json!(""),
                };
                obj.insert(key.clone(), value);
            }
            Value::Object(obj)
        })
        .collect();

    let output = json!({ "meta": meta, "papers": papers });
    let content = serde_json::to_string_pretty(&output)
        .map_err(|e| StoreError::Io(e.to_string()))?;
    std::fs::write(path, content).map_err(|e| StoreError::Io(e.to_string()))
}

fn existing_meta(path: &Path) -> Map<String, Value> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Map::new();
    };
    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(mut obj)) => match obj.remove("meta") {
            Some(Value::Object(meta)) => meta,
            _ => Map::new(),
        },
        _ => Map::new(),
    }
}

fn object_to_record(obj: &Map<String, Value>, schema: &SchemaConfig) -> Record {
    let mut record = Record::new();
    for (key, value) in obj {
        let field = match schema.field(key) {
            Some(field) => field,
            None => continue,
        };
        if let Some(field_value) = json_to_field(value, field.kind) {
            record.set(key.clone(), field_value);
        }
    }
    record
}

fn json_to_field(value: &Value, kind: FieldKind) -> Option<FieldValue> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(FieldValue::coerce(s, kind)),
        Value::Bool(b) => Some(match kind {
            FieldKind::Bool => FieldValue::Bool(*b),
            _ => FieldValue::coerce(&b.to_string(), kind),
        }),
        Value::Number(n) => Some(match kind {
            FieldKind::Int => FieldValue::Int(n.as_i64().unwrap_or(0)),
            FieldKind::Float => FieldValue::Float(n.as_f64().unwrap_or(0.0)),
            _ => FieldValue::coerce(&n.to_string(), kind),
        }),
        Value::Array(items) => {
            let list: Vec<String> = items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if list.is_empty() {
                None
            } else {
                Some(FieldValue::List(list))
            }
        }
        Value::Object(_) => None,
    }
}

fn field_to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Str(s) => json!(s.trim()),
        FieldValue::Bool(b) => json!(b),
        FieldValue::Int(i) => json!(i),
        FieldValue::Float(f) => json!(f),
        FieldValue::List(items) => json!(items),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperstack_config::Config;

    fn schema() -> SchemaConfig {
        Config::default().schema()
    }

    #[test]
    fn write_then_read_preserves_fields() {
        let s = schema();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("papers.json");

        let mut record = Record::new();
        record.set("title", FieldValue::Str("Foo".into()));
        record.set("category", FieldValue::List(vec!["a".into(), "b".into()]));
        record.set("show_in_readme", FieldValue::Bool(false));

        write_json(&path, &[record.clone()], &s).unwrap();
        let reloaded = read_json(&path, &s).unwrap();

        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].title(), "Foo");
        assert_eq!(reloaded[0].categories(), vec!["a".to_string(), "b".to_string()]);
        assert!(!reloaded[0].show_in_readme());
    }

    #[test]
    fn meta_carries_column_ids() {
        let s = schema();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("papers.json");
        write_json(&path, &[], &s).unwrap();

        let data: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let ids = data["meta"]["column_ids"].as_array().unwrap();
        assert_eq!(ids[0], "title");
        assert!(data["meta"]["generated_at"].is_string());
    }

    #[test]
    fn legacy_bare_array_accepted() {
        let s = schema();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.json");
        std::fs::write(&path, r#"[{"title": "Old Shape", "authors": "A"}]"#).unwrap();

        let records = read_json(&path, &s).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title(), "Old Shape");
    }

    #[test]
    fn legacy_single_object_accepted() {
        let s = schema();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("single.json");
        std::fs::write(&path, r#"{"title": "Solo"}"#).unwrap();

        let records = read_json(&path, &s).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title(), "Solo");
    }

    #[test]
    fn unknown_shape_rejected() {
        let s = schema();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "42").unwrap();
        assert!(read_json(&path, &s).is_err());
    }

    #[test]
    fn foreign_meta_keys_survive_rewrite() {
        let s = schema();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("papers.json");
        std::fs::write(
            &path,
            r#"{"meta": {"curator": "someone"}, "papers": []}"#,
        )
        .unwrap();

        write_json(&path, &[], &s).unwrap();
        let data: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(data["meta"]["curator"], "someone");
    }
}
