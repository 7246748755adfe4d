use statesync_serde::{ByteReader, Serde, WireNumber};

use crate::{error::DecodeError, schema::primitive_kind::PrimitiveKind, state::value::Value};

/// Reads exactly one primitive of the given kind
pub fn read_primitive(reader: &mut ByteReader, kind: PrimitiveKind) -> Result<Value, DecodeError> {
    let value = match kind {
        PrimitiveKind::String => Value::String(String::de(reader)?),
        PrimitiveKind::Number => Value::Number(WireNumber::de(reader)?.0),
        PrimitiveKind::Boolean => Value::Boolean(bool::de(reader)?),
        PrimitiveKind::Int8 => Value::Int8(i8::de(reader)?),
        PrimitiveKind::UInt8 => Value::UInt8(u8::de(reader)?),
        PrimitiveKind::Int16 => Value::Int16(i16::de(reader)?),
        PrimitiveKind::UInt16 => Value::UInt16(u16::de(reader)?),
        PrimitiveKind::Int32 => Value::Int32(i32::de(reader)?),
        PrimitiveKind::UInt32 => Value::UInt32(u32::de(reader)?),
        PrimitiveKind::Int64 => Value::Int64(i64::de(reader)?),
        PrimitiveKind::UInt64 => Value::UInt64(u64::de(reader)?),
        PrimitiveKind::Float32 => Value::Float32(f32::de(reader)?),
        PrimitiveKind::Float64 => Value::Float64(f64::de(reader)?),
    };
    Ok(value)
}
