// ============================================================================
// FIRESTORE CODEC - Plain JSON <-> Firestore typed values
// ============================================================================
// Firestore REST wraps every value in a type tag ({"stringValue": "x"},
// {"integerValue": "42"}, ...). Integers travel as strings.
// ============================================================================

use serde::Deserialize;
use serde_json::{json, Map, Number, Value};

use crate::error::TrackerError;
use crate::services::document_store::{Document, DocumentPath, Fields, WriteMode};

/// Document as returned by the REST API
#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreDocument {
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// Page of `documents.list`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<FirestoreDocument>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or_default() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            if items.is_empty() {
                json!({ "arrayValue": {} })
            } else {
                let values: Vec<Value> = items.iter().map(encode_value).collect();
                json!({ "arrayValue": { "values": values } })
            }
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn encode_fields(fields: &Fields) -> Value {
    let encoded: Map<String, Value> = fields
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect();
    Value::Object(encoded)
}

pub fn decode_value(value: &Value) -> Result<Value, TrackerError> {
    let tagged = value
        .as_object()
        .ok_or_else(|| malformed("value is not an object", value))?;
    let (tag, inner) = tagged
        .iter()
        .next()
        .ok_or_else(|| malformed("value has no type tag", value))?;

    match tag.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| malformed("booleanValue", inner)),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed.map(Value::from).ok_or_else(|| malformed("integerValue", inner))
        }
        "doubleValue" => {
            let parsed = match inner {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.parse::<f64>().ok(),
                _ => None,
            };
            parsed
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| malformed("doubleValue", inner))
        }
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| malformed(tag, inner)),
        "geoPointValue" => {
            let lat = inner.get("latitude").and_then(Value::as_f64).unwrap_or_default();
            let lng = inner.get("longitude").and_then(Value::as_f64).unwrap_or_default();
            Ok(json!({ "lat": lat, "lng": lng }))
        }
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Value::Array(items)) => items.iter().map(decode_value).collect::<Result<Vec<_>, _>>()?,
                Some(other) => return Err(malformed("arrayValue.values", other)),
                None => Vec::new(),
            };
            Ok(Value::Array(values))
        }
        "mapValue" => {
            let fields = match inner.get("fields") {
                Some(Value::Object(map)) => decode_fields(map)?,
                Some(other) => return Err(malformed("mapValue.fields", other)),
                None => Fields::new(),
            };
            Ok(Value::Object(fields))
        }
        other => Err(TrackerError::Serialization(format!("Unsupported Firestore value type '{}'", other))),
    }
}

pub fn decode_fields(fields: &Map<String, Value>) -> Result<Fields, TrackerError> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), decode_value(value)?)))
        .collect()
}

/// Turn a REST document into a `Document`; `name` must sit under `documents_prefix`
pub fn decode_document(raw: &FirestoreDocument, documents_prefix: &str) -> Result<Document, TrackerError> {
    let relative = raw
        .name
        .strip_prefix(documents_prefix)
        .map(|rest| rest.trim_start_matches('/'))
        .ok_or_else(|| {
            TrackerError::Serialization(format!("Document '{}' is outside '{}'", raw.name, documents_prefix))
        })?;

    Ok(Document {
        path: DocumentPath::new(relative.split('/')),
        fields: decode_fields(&raw.fields)?,
    })
}

/// Field path usable in `updateMask.fieldPaths` (backtick-quoted unless a plain identifier)
pub fn field_mask_path(field: &str) -> String {
    let mut chars = field.chars();
    let simple = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        field.to_string()
    } else {
        format!("`{}`", field.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

/// `updateMask` a PATCH needs for a write
#[derive(Debug, Clone, PartialEq)]
pub enum PatchMask {
    /// No mask: the body replaces the whole document
    Replace,
    /// Only these field paths are touched
    Fields(Vec<String>),
    /// Merge of nothing; must not be sent, a maskless PATCH would replace
    Nothing,
}

pub fn patch_mask(fields: &Fields, mode: WriteMode) -> PatchMask {
    match mode {
        WriteMode::Replace => PatchMask::Replace,
        WriteMode::Merge if fields.is_empty() => PatchMask::Nothing,
        WriteMode::Merge => PatchMask::Fields(fields.keys().map(|key| field_mask_path(key)).collect()),
    }
}

fn malformed(what: &str, value: &Value) -> TrackerError {
    TrackerError::Serialization(format!("Malformed Firestore {}: {}", what, value))
}
