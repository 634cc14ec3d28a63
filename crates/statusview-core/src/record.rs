use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single project as delivered by the upstream data source.
///
/// Field names and shapes vary between source systems, so the record keeps
/// the raw JSON object and exposes lookups instead of a fixed struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectRecord(Map<String, Value>);

impl ProjectRecord {
    /// Wraps a JSON value. Anything other than an object becomes an empty record.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Field value or `Value::Null` when absent.
    pub fn value(&self, field: &str) -> &Value {
        self.0.get(field).unwrap_or(&Value::Null)
    }

    /// Non-empty text for string or numeric fields.
    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field).and_then(value_text)
    }

    /// First truthy value among `fields`, probed in order.
    pub fn first_truthy(&self, fields: &[&str]) -> Option<&Value> {
        fields
            .iter()
            .filter_map(|f| self.get(f))
            .find(|v| is_truthy(v))
    }

    /// Child collection at `field`; non-arrays read as empty.
    pub fn children(&self, field: &str) -> &[Value] {
        self.get(field)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn project_number(&self) -> Option<String> {
        self.text("project_number")
    }

    pub fn project_sys_id(&self) -> Option<String> {
        self.text("projectSysID")
    }

    /// A row can be expanded only when it carries a status report id.
    pub fn has_status_report(&self) -> bool {
        self.get("statusReportSysID")
            .and_then(Value::as_str)
            .is_some_and(|id| !id.trim().is_empty())
    }
}

impl From<Value> for ProjectRecord {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

/// Truthiness as the upstream payloads use it: null, false, 0, NaN and the
/// empty string are falsy; every object and array is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Non-empty string form of a string or number value.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(_) => Some(primitive_string(value)),
        _ => None,
    }
}

/// Plain string conversion used by fallbacks.
pub fn primitive_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(u)) => u.to_string(),
            _ => number_string(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::Null => String::new(),
                other => primitive_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Integral floats print without a fractional part (`45.0` -> `45`).
pub fn number_string(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 {
        format!("{f:.0}")
    } else {
        f.to_string()
    }
}

/// Normalizes the `projectsData` property: a bare array of records or a
/// wrapper object with a `data` array. Every other shape yields no rows.
pub fn projects_from_property(value: &Value) -> Vec<ProjectRecord> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    items.iter().cloned().map(ProjectRecord::from_value).collect()
}
