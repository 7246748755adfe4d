//! # Statesync Client
//! Keeps a local replica of server-authoritative state: decodes the type
//! handshake and full snapshots, applies incremental patches in place and
//! notifies observers of every field that changed.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use statesync_shared::{
        decode_handshake, ByteReader, ChangeRecord, Collection, CollectionKey, DecodeConfig,
        DecodeError, FieldDescriptor, FieldIndex, Operation, PrimitiveKind, RefId,
        SchemaDefinition, SchemaInstance, StateGraph, TypeId, TypeRegistry, TypeTag, Value,
        ROOT_REF_ID,
    };
}

mod client;
mod client_config;
mod error;
mod field_path;

pub use client::StateClient;
pub use client_config::ClientConfig;
pub use error::StateError;
pub use statesync_shared::ObserverId;
