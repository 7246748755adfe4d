use crate::{
    error::DecodeError,
    state::{collection::CollectionKey, value::Value},
    types::{FieldIndex, RefId},
};

/// Operation codes carried by every patch entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Replace,
    Delete,
    Add,
    DeleteAndAdd,
    Clear,
}

impl Operation {
    pub fn to_byte(self) -> u8 {
        match self {
            Operation::Replace => 0,
            Operation::Delete => 64,
            Operation::Add => 128,
            Operation::DeleteAndAdd => 192,
            Operation::Clear => 10,
        }
    }

    pub fn from_byte(byte: u8) -> Result<Self, DecodeError> {
        match byte {
            0 => Ok(Operation::Replace),
            64 => Ok(Operation::Delete),
            128 => Ok(Operation::Add),
            192 => Ok(Operation::DeleteAndAdd),
            10 => Ok(Operation::Clear),
            _ => Err(DecodeError::mismatch(format!(
                "unknown operation code {}",
                byte
            ))),
        }
    }
}

/// One field or element mutation, produced while applying a snapshot or a
/// patch and handed to observers once.
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeRecord {
    pub ref_id: RefId,
    pub field_index: FieldIndex,
    pub field: String,
    /// Element address when the mutation targeted a collection element
    pub key: Option<CollectionKey>,
    pub operation: Operation,
    pub previous: Option<Value>,
    pub value: Option<Value>,
}
