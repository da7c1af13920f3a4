//! Typed value model produced by parse and coerce.

use core::fmt::{self, Display, Formatter};

use chrono::{DateTime, FixedOffset, SecondsFormat};
use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

mod number;

pub use number::Number;

/// Ordered string-keyed map. Insertion order is preserved, matching the
/// declared property order of the schema that produced it.
pub type Map = IndexMap<String, Value>;

/// A decoded value.
///
/// This is the output side of parse/coerce and the input side of serialize.
/// Unlike `serde_json::Value`, it distinguishes every numeric width and
/// carries timestamps as parsed date-times rather than strings.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Timestamp(DateTime<FixedOffset>),
    Array(Vec<Value>),
    Object(Map),
}

impl Value {
    /// Whether this value is `Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        self.as_number().and_then(Number::as_u64)
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::as_f64)
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Self::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Object member lookup; `None` for non-objects and missing keys.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Structural conversion from a raw JSON value.
    ///
    /// Integer-representable numbers become `I64`/`U64`; everything else
    /// maps one-to-one. No schema is involved, so strings stay strings
    /// (timestamps only arise from schema-driven decoding).
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Number(Number::I64(i))
                } else if let Some(u) = n.as_u64() {
                    Self::Number(Number::U64(u))
                } else {
                    Self::Number(Number::F64(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            serde_json::Value::String(s) => Self::String(s.clone()),
            serde_json::Value::Array(items) => {
                Self::Array(items.iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => Self::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Structural conversion back to a raw JSON value.
    ///
    /// Timestamps render as RFC 3339 strings; `u64` stays exact; non-finite
    /// floats degrade to `null` the way `serde_json` does.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => number_to_json(*n),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Timestamp(ts) => {
                serde_json::Value::String(ts.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Self::Array(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
            Self::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

fn number_to_json(n: Number) -> serde_json::Value {
    let num = match n {
        Number::I8(v) => Some(serde_json::Number::from(v)),
        Number::I16(v) => Some(serde_json::Number::from(v)),
        Number::I32(v) => Some(serde_json::Number::from(v)),
        Number::I64(v) => Some(serde_json::Number::from(v)),
        Number::U8(v) => Some(serde_json::Number::from(v)),
        Number::U16(v) => Some(serde_json::Number::from(v)),
        Number::U32(v) => Some(serde_json::Number::from(v)),
        Number::U64(v) => Some(serde_json::Number::from(v)),
        Number::F32(v) => serde_json::Number::from_f64(f64::from(v)),
        Number::F64(v) => serde_json::Number::from_f64(v),
    };
    num.map_or(serde_json::Value::Null, serde_json::Value::Number)
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => match *n {
                Number::I8(v) => serializer.serialize_i8(v),
                Number::I16(v) => serializer.serialize_i16(v),
                Number::I32(v) => serializer.serialize_i32(v),
                Number::I64(v) => serializer.serialize_i64(v),
                Number::U8(v) => serializer.serialize_u8(v),
                Number::U16(v) => serializer.serialize_u16(v),
                Number::U32(v) => serializer.serialize_u32(v),
                Number::U64(v) => serializer.serialize_u64(v),
                Number::F32(v) => serializer.serialize_f32(v),
                Number::F64(v) => serializer.serialize_f64(v),
            },
            Self::String(s) => serializer.serialize_str(s),
            Self::Timestamp(ts) => {
                serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(map) => {
                let mut obj = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    obj.serialize_entry(k, v)?;
                }
                obj.end()
            }
        }
    }
}

impl Display for Value {
    /// Renders the JSON encoding of the value.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl core::ops::Index<&str> for Value {
    type Output = Value;

    /// Panics when the key is absent or the value is not an object; intended
    /// for tests and examples, use [`Value::get`] for fallible access.
    #[allow(clippy::expect_used)]
    fn index(&self, key: &str) -> &Value {
        self.get(key).expect("no such member")
    }
}

impl core::ops::Index<usize> for Value {
    type Output = Value;

    #[allow(clippy::expect_used)]
    fn index(&self, index: usize) -> &Value {
        self.as_array()
            .and_then(|items| items.get(index))
            .expect("no such element")
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Array(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Self::Object(value)
    }
}

macro_rules! value_from_number {
    ($($ty:ty),+) => {
        $(impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Self::Number(Number::from(value))
            }
        })+
    };
}

value_from_number! { i8, i16, i32, i64, u8, u16, u32, u64, f32, f64 }
