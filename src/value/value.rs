use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::mem::discriminant;

use crate::model::{GeoPoint, Timestamp};
use crate::value::{ArrayValue, BytesValue, MapValue};

/// A single document field value in its canonical client-side form.
///
/// Equality and hashing are structural and total: doubles compare by bit
/// pattern, so `NaN == NaN` and `0.0 != -0.0`. This is value identity for
/// query deduplication, not numeric comparison.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocstoreValue {
    kind: ValueKind,
}

/// Write-side markers. They carry meaning only inside write payloads and are
/// rejected wherever they would reach a query filter or cursor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SentinelValue {
    Delete,
    ServerTimestamp,
}

#[derive(Clone, Debug)]
pub enum ValueKind {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Timestamp(Timestamp),
    String(String),
    Bytes(BytesValue),
    /// A document path within the same database (e.g. `rooms/eros`).
    Reference(String),
    GeoPoint(GeoPoint),
    Array(ArrayValue),
    Map(MapValue),
    Sentinel(SentinelValue),
}

impl PartialEq for ValueKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ValueKind::Null, ValueKind::Null) => true,
            (ValueKind::Boolean(a), ValueKind::Boolean(b)) => a == b,
            (ValueKind::Integer(a), ValueKind::Integer(b)) => a == b,
            (ValueKind::Double(a), ValueKind::Double(b)) => a.to_bits() == b.to_bits(),
            (ValueKind::Timestamp(a), ValueKind::Timestamp(b)) => a == b,
            (ValueKind::String(a), ValueKind::String(b)) => a == b,
            (ValueKind::Bytes(a), ValueKind::Bytes(b)) => a == b,
            (ValueKind::Reference(a), ValueKind::Reference(b)) => a == b,
            (ValueKind::GeoPoint(a), ValueKind::GeoPoint(b)) => a == b,
            (ValueKind::Array(a), ValueKind::Array(b)) => a == b,
            (ValueKind::Map(a), ValueKind::Map(b)) => a == b,
            (ValueKind::Sentinel(a), ValueKind::Sentinel(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ValueKind {}

impl Hash for ValueKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        discriminant(self).hash(state);
        match self {
            ValueKind::Null => {}
            ValueKind::Boolean(value) => value.hash(state),
            ValueKind::Integer(value) => value.hash(state),
            ValueKind::Double(value) => value.to_bits().hash(state),
            ValueKind::Timestamp(value) => value.hash(state),
            ValueKind::String(value) => value.hash(state),
            ValueKind::Bytes(value) => value.hash(state),
            ValueKind::Reference(value) => value.hash(state),
            ValueKind::GeoPoint(value) => value.hash(state),
            ValueKind::Array(value) => value.hash(state),
            ValueKind::Map(value) => value.hash(state),
            ValueKind::Sentinel(value) => value.hash(state),
        }
    }
}

impl DocstoreValue {
    pub fn null() -> Self {
        Self {
            kind: ValueKind::Null,
        }
    }

    pub fn from_bool(value: bool) -> Self {
        Self {
            kind: ValueKind::Boolean(value),
        }
    }

    pub fn from_integer(value: i64) -> Self {
        Self {
            kind: ValueKind::Integer(value),
        }
    }

    pub fn from_double(value: f64) -> Self {
        Self {
            kind: ValueKind::Double(value),
        }
    }

    pub fn from_timestamp(value: Timestamp) -> Self {
        Self {
            kind: ValueKind::Timestamp(value),
        }
    }

    pub fn from_string(value: impl Into<String>) -> Self {
        Self {
            kind: ValueKind::String(value.into()),
        }
    }

    pub fn from_bytes(value: BytesValue) -> Self {
        Self {
            kind: ValueKind::Bytes(value),
        }
    }

    pub fn from_reference(path: impl Into<String>) -> Self {
        Self {
            kind: ValueKind::Reference(path.into()),
        }
    }

    pub fn from_geo_point(value: GeoPoint) -> Self {
        Self {
            kind: ValueKind::GeoPoint(value),
        }
    }

    pub fn from_array(values: Vec<DocstoreValue>) -> Self {
        Self {
            kind: ValueKind::Array(ArrayValue::new(values)),
        }
    }

    pub fn from_map(map: BTreeMap<String, DocstoreValue>) -> Self {
        Self {
            kind: ValueKind::Map(MapValue::new(map)),
        }
    }

    /// Marker that deletes the targeted field during a write.
    pub fn delete() -> Self {
        Self {
            kind: ValueKind::Sentinel(SentinelValue::Delete),
        }
    }

    /// Marker the backend replaces with its own commit timestamp.
    pub fn server_timestamp() -> Self {
        Self {
            kind: ValueKind::Sentinel(SentinelValue::ServerTimestamp),
        }
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, ValueKind::Null)
    }

    pub fn is_nan(&self) -> bool {
        matches!(self.kind, ValueKind::Double(value) if value.is_nan())
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self.kind, ValueKind::Sentinel(_))
    }

    pub fn is_delete_sentinel(&self) -> bool {
        matches!(self.kind, ValueKind::Sentinel(SentinelValue::Delete))
    }

    pub fn is_server_timestamp_sentinel(&self) -> bool {
        matches!(self.kind, ValueKind::Sentinel(SentinelValue::ServerTimestamp))
    }
}

impl From<bool> for DocstoreValue {
    fn from(value: bool) -> Self {
        DocstoreValue::from_bool(value)
    }
}

impl From<i32> for DocstoreValue {
    fn from(value: i32) -> Self {
        DocstoreValue::from_integer(i64::from(value))
    }
}

impl From<i64> for DocstoreValue {
    fn from(value: i64) -> Self {
        DocstoreValue::from_integer(value)
    }
}

impl From<f64> for DocstoreValue {
    fn from(value: f64) -> Self {
        DocstoreValue::from_double(value)
    }
}

impl From<&str> for DocstoreValue {
    fn from(value: &str) -> Self {
        DocstoreValue::from_string(value)
    }
}

impl From<String> for DocstoreValue {
    fn from(value: String) -> Self {
        DocstoreValue::from_string(value)
    }
}

impl From<Timestamp> for DocstoreValue {
    fn from(value: Timestamp) -> Self {
        DocstoreValue::from_timestamp(value)
    }
}

impl From<GeoPoint> for DocstoreValue {
    fn from(value: GeoPoint) -> Self {
        DocstoreValue::from_geo_point(value)
    }
}
