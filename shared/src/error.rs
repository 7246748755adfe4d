use thiserror::Error;

use statesync_serde::SerdeErr;

use crate::types::{FieldIndex, RefId, TypeId};

/// Errors that can occur while decoding a handshake, a snapshot or a patch
///
/// Every variant is fatal for the invocation that produced it. The engine
/// never retries: the owner of the connection should treat any of these as
/// a desynchronization and request a fresh snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Fewer bytes remain than the value being read requires
    #[error("Buffer underrun at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    BufferUnderrun {
        needed: usize,
        remaining: usize,
        offset: usize,
    },

    /// A type id is referenced but was never registered
    #[error("Type id {type_id} is not registered")]
    UnknownTypeReference { type_id: TypeId },

    /// A patch addressed a field the instance's schema does not declare
    #[error("Field index {field_index} is not declared by type {type_id}")]
    UnknownFieldIndex {
        type_id: TypeId,
        field_index: FieldIndex,
    },

    /// A patch addressed an instance that does not exist in the graph
    #[error("Reference id {ref_id} not found in the state graph")]
    UnknownReference { ref_id: RefId },

    /// The decoded shape is inconsistent with the declared type
    #[error("Schema mismatch: {reason}")]
    SchemaMismatch { reason: String },

    /// Nested structures exceed the configured depth
    #[error("Nested structures exceed the maximum depth of {limit}")]
    NestingTooDeep { limit: usize },

    /// Decoding was attempted before a type registry was available
    #[error("No type registry available. A handshake must be decoded before state can be")]
    RegistryNotReady,
}

impl DecodeError {
    pub fn mismatch(reason: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            reason: reason.into(),
        }
    }
}

impl From<SerdeErr> for DecodeError {
    fn from(error: SerdeErr) -> Self {
        match error {
            SerdeErr::BufferUnderrun {
                needed,
                remaining,
                offset,
            } => Self::BufferUnderrun {
                needed,
                remaining,
                offset,
            },
            SerdeErr::InvalidPrefix { prefix, expected } => Self::mismatch(format!(
                "unexpected byte 0x{prefix:02x} where {expected} was expected"
            )),
            SerdeErr::InvalidUtf8 { offset } => {
                Self::mismatch(format!("invalid UTF-8 string at offset {offset}"))
            }
        }
    }
}
