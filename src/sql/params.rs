//! Convert serde_json::Value into a text bind; the SQL side casts it to the column type.

use serde_json::Value;

/// A bound parameter in PostgreSQL text form. `None` binds NULL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SqlParam(pub Option<String>);

impl SqlParam {
    pub fn from_json(v: &Value) -> Self {
        SqlParam(match v {
            Value::Null => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::Array(_) | Value::Object(_) => Some(v.to_string()),
        })
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Render a key value for URLs and logs ("7", "a1b2-..."); empty for null.
pub fn key_to_string(v: &Value) -> String {
    SqlParam::from_json(v).0.unwrap_or_default()
}
