use crate::{
    schema::primitive_kind::PrimitiveKind,
    state::collection::Collection,
    types::RefId,
};

/// A decoded field or element value.
///
/// Fixed-width kinds keep their own width; `Number` is the dynamically sized
/// double. Nested schema instances are referenced by id, never owned.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Number(f64),
    String(String),
    Ref(RefId),
    Collection(Collection),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_ref_id(&self) -> Option<RefId> {
        match self {
            Value::Ref(ref_id) => Some(*ref_id),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Any numeric value as a double
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int8(value) => Some(f64::from(*value)),
            Value::UInt8(value) => Some(f64::from(*value)),
            Value::Int16(value) => Some(f64::from(*value)),
            Value::UInt16(value) => Some(f64::from(*value)),
            Value::Int32(value) => Some(f64::from(*value)),
            Value::UInt32(value) => Some(f64::from(*value)),
            Value::Int64(value) => Some(*value as f64),
            Value::UInt64(value) => Some(*value as f64),
            Value::Float32(value) => Some(f64::from(*value)),
            Value::Float64(value) | Value::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Value::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    pub fn as_collection_mut(&mut self) -> Option<&mut Collection> {
        match self {
            Value::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    /// The primitive kind this value was decoded as, if it is a primitive
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        let kind = match self {
            Value::Boolean(_) => PrimitiveKind::Boolean,
            Value::Int8(_) => PrimitiveKind::Int8,
            Value::UInt8(_) => PrimitiveKind::UInt8,
            Value::Int16(_) => PrimitiveKind::Int16,
            Value::UInt16(_) => PrimitiveKind::UInt16,
            Value::Int32(_) => PrimitiveKind::Int32,
            Value::UInt32(_) => PrimitiveKind::UInt32,
            Value::Int64(_) => PrimitiveKind::Int64,
            Value::UInt64(_) => PrimitiveKind::UInt64,
            Value::Float32(_) => PrimitiveKind::Float32,
            Value::Float64(_) => PrimitiveKind::Float64,
            Value::Number(_) => PrimitiveKind::Number,
            Value::String(_) => PrimitiveKind::String,
            Value::Null | Value::Ref(_) | Value::Collection(_) => return None,
        };
        Some(kind)
    }

    /// Ids of every instance this value links to, including through collections
    pub fn referenced_ids(&self, output: &mut Vec<RefId>) {
        match self {
            Value::Ref(ref_id) => output.push(*ref_id),
            Value::Collection(collection) => {
                for element in collection.values() {
                    element.referenced_ids(output);
                }
            }
            _ => {}
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int32(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
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

impl From<Collection> for Value {
    fn from(value: Collection) -> Self {
        Value::Collection(value)
    }
}
