pub mod patch;
pub mod primitive;
pub mod snapshot;

use statesync_serde::{ByteReader, Serde, WireUint};

use crate::{
    error::DecodeError,
    types::{FieldIndex, RefId, TypeId},
};

/// Absent nested child
pub const NIL: u8 = 0xc0;
/// Closes a nested patch context
pub const END_OF_STRUCTURE: u8 = 0xc1;
/// Announces the concrete type of a polymorphic child
pub const TYPE_ID: u8 = 0xd5;
/// Retargets a top-level patch segment to another instance
pub const SWITCH_TO_STRUCTURE: u8 = 0xff;

/// Next byte without consuming it. Running out of bytes where more are
/// required is an underrun, not the end of the message.
pub(crate) fn peek(reader: &ByteReader) -> Result<u8, DecodeError> {
    reader
        .peek_byte()
        .ok_or(DecodeError::BufferUnderrun {
            needed: 1,
            remaining: 0,
            offset: reader.offset(),
        })
}

pub(crate) fn read_uint(reader: &mut ByteReader) -> Result<u64, DecodeError> {
    Ok(WireUint::de(reader)?.0)
}

pub(crate) fn read_ref_id(reader: &mut ByteReader) -> Result<RefId, DecodeError> {
    narrow(read_uint(reader)?, "reference id")
}

pub(crate) fn read_type_id(reader: &mut ByteReader) -> Result<TypeId, DecodeError> {
    narrow(read_uint(reader)?, "type id")
}

pub(crate) fn read_field_index(reader: &mut ByteReader) -> Result<FieldIndex, DecodeError> {
    narrow(read_uint(reader)?, "field index")
}

fn narrow<T: TryFrom<u64>>(value: u64, what: &str) -> Result<T, DecodeError> {
    T::try_from(value)
        .map_err(|_| DecodeError::mismatch(format!("{} {} out of range", what, value)))
}
