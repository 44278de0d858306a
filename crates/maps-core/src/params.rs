//! Caller-supplied parameters and their typed coercion

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Declared type of an operation field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// Non-empty text
    String,
    /// Any finite decimal number
    Number,
    /// Whole number (i64)
    Integer,
}

impl ParamType {
    /// Phrase used in "must be ..." validation messages
    pub fn expectation(&self) -> &'static str {
        match self {
            ParamType::String => "a string",
            ParamType::Number => "a number",
            ParamType::Integer => "an integer",
        }
    }

    /// Coerce a raw caller value into this type.
    ///
    /// Returns `Ok(None)` when the value is blank (`null`, or a string that is
    /// empty after trimming), which callers treat as "absent". Returns
    /// [`TypeMismatch`] when the value is present but does not convert.
    pub fn coerce(&self, raw: &Value) -> Result<Option<FieldValue>, TypeMismatch> {
        if raw.is_null() {
            return Ok(None);
        }
        if let Value::String(s) = raw {
            if s.trim().is_empty() {
                return Ok(None);
            }
        }

        match (self, raw) {
            (ParamType::String, Value::String(s)) => {
                Ok(Some(FieldValue::Text(s.trim().to_string())))
            }
            (ParamType::Number, Value::String(s)) => {
                let text = s.trim();
                match text.parse::<f64>() {
                    Ok(n) if n.is_finite() => Ok(Some(FieldValue::Number(text.to_string()))),
                    _ => Err(self.mismatch()),
                }
            }
            (ParamType::Number, Value::Number(n)) => Ok(Some(FieldValue::Number(n.to_string()))),
            (ParamType::Integer, Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(|n| Some(FieldValue::Integer(n)))
                .map_err(|_| self.mismatch()),
            (ParamType::Integer, Value::Number(n)) => {
                n.as_i64().map(|n| Some(FieldValue::Integer(n))).ok_or(self.mismatch())
            }
            _ => Err(self.mismatch()),
        }
    }

    fn mismatch(&self) -> TypeMismatch {
        TypeMismatch { expected: *self }
    }
}

/// A present value that does not convert to the declared [`ParamType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMismatch {
    pub expected: ParamType,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Integer => "integer",
        };
        f.write_str(name)
    }
}

/// A field value that passed validation.
///
/// Numbers keep the caller's textual form so the upstream receives exactly
/// what was sent (`"12.50"` stays `"12.50"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Number(String),
    Integer(i64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) | FieldValue::Number(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{}", n),
        }
    }
}

/// Raw per-request parameters, keyed by caller-facing field name.
///
/// Created per request from a JSON object or form body and dropped once the
/// invocation completes. Values are left untyped until validated against an
/// [`OperationSpec`](crate::OperationSpec).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestParams(Map<String, Value>);

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for RequestParams {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Form-style pairs; later duplicates win.
impl<K, V> FromIterator<(K, V)> for RequestParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k.into(), Value::String(v.into()));
        }
        params
    }
}
