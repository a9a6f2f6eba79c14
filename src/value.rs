//! Dynamic values accepted by the encoder and produced by the decoder.

use std::{collections::BTreeMap, fmt};

use indexmap::IndexMap;

/// A value that can be packed into or unpacked from a bitstream.
///
/// Plain integers are kept in a canonical form: non-negative values are always
/// [Value::UInt], negative ones [Value::Int]. Every decoder output and every
/// `From<integer>` conversion is canonical. [Value::BigInt] and [Value::BigUint]
/// stand for native 64-bit integers and are never folded into plain integers.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    BigInt(i64),
    BigUint(u64),
    String(String),
    Array(Vec<Value>),
    /// Keyed structure in insertion order; decoded structs and JSON objects.
    /// Equality ignores key order.
    Object(IndexMap<String, Value>),
    /// Key-value collection with arbitrary keys, in insertion order.
    Map(Vec<(Value, Value)>),
    Set(Vec<Value>),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) | Value::UInt(_) => "integer",
            Value::Float(_) => "float",
            Value::BigInt(_) | Value::BigUint(_) => "bigint",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
        }
    }

    /// Canonical plain integer for a signed value.
    pub fn integer(value: i64) -> Value {
        if value < 0 {
            Value::Int(value)
        } else {
            Value::UInt(value as u64)
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integral value of any numeric variant, an integral float, or numeric text.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Int(v) | Value::BigInt(v) => Some(*v as i128),
            Value::UInt(v) | Value::BigUint(v) => Some(*v as i128),
            Value::Float(v) => float_to_i128(*v),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i128>()
                    .ok()
                    .or_else(|| parse_float_text(s).and_then(float_to_i128))
            }
            _ => None,
        }
    }

    /// Floating-point view of any numeric variant or numeric text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) | Value::BigInt(v) => Some(*v as f64),
            Value::UInt(v) | Value::BigUint(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::String(s) => parse_float_text(s.trim()),
            _ => None,
        }
    }

    fn is_number(&self) -> bool {
        matches!(
            self,
            Value::Int(_)
                | Value::UInt(_)
                | Value::Float(_)
                | Value::BigInt(_)
                | Value::BigUint(_)
        )
    }

    /// Literal equality: numeric variants compare by numeric value, everything else structurally.
    pub fn matches(&self, other: &Value) -> bool {
        if self.is_number() && other.is_number() {
            return match (self.as_i128(), other.as_i128()) {
                (Some(a), Some(b)) => a == b,
                _ => self.as_f64() == other.as_f64(),
            };
        }

        self == other
    }

    /// Renders the value as JSON. Maps become arrays of `[key, value]` pairs, sets become arrays.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(v) | Value::BigInt(v) => Json::from(*v),
            Value::UInt(v) | Value::BigUint(v) => Json::from(*v),
            Value::Float(v) => serde_json::Number::from_f64(*v)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::String(s) => Json::String(s.clone()),
            Value::Array(items) | Value::Set(items) => {
                Json::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(fields) => Json::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Map(entries) => Json::Array(
                entries
                    .iter()
                    .map(|(k, v)| Json::Array(vec![k.to_json(), v.to_json()]))
                    .collect(),
            ),
        }
    }

    /// Builds a value from JSON, normalising numbers to the canonical integer form.
    pub fn from_json(json: &serde_json::Value) -> Value {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => {
                if let Some(v) = n.as_u64() {
                    Value::UInt(v)
                } else if let Some(v) = n.as_i64() {
                    Value::Int(v)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => Value::Array(items.iter().map(Value::from_json).collect()),
            Json::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

fn float_to_i128(v: f64) -> Option<i128> {
    // 2^127 is the first float past the i128 range.
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1.7014118346046923e38 {
        Some(v as i128)
    } else {
        None
    }
}

/// Parses numeric text; rejects words such as `inf` or `NaN` that `f64::from_str` accepts.
pub(crate) fn parse_float_text(s: &str) -> Option<f64> {
    if !s.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    s.parse::<f64>().ok()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(value: $t) -> Self {
                Value::integer(value as i64)
            }
        })*
    };
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(value: $t) -> Self {
                Value::UInt(value as u64)
            }
        })*
    };
}

from_signed!(i8, i16, i32, i64);
from_unsigned!(u8, u16, u32, u64);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::String(value.to_string())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(value: IndexMap<String, Value>) -> Self {
        Value::Object(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Value::Object(value.into_iter().collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::from_json(&value)
    }
}
