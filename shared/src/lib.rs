//! # Statesync Shared
//! Type registry, object graph, snapshot decoder and patch engine used by
//! the statesync client.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use statesync_serde::{ByteReader, ByteWrite, ByteWriter, Serde, SerdeErr, WireNumber, WireUint};

mod change;
mod config;
mod decode;
mod error;
mod observer;
mod reflection;
mod schema;
mod state;
mod types;

pub use change::{ChangeRecord, Operation};
pub use config::DecodeConfig;
pub use decode::{
    patch::{apply_patch, PatchFailure, PatchOutcome},
    primitive::read_primitive,
    snapshot::decode_snapshot,
    END_OF_STRUCTURE, NIL, SWITCH_TO_STRUCTURE, TYPE_ID,
};
pub use error::DecodeError;
pub use observer::{ObserverId, Observers};
pub use reflection::{
    decode_handshake, reflection_registry, REFLECTION_FIELD_TYPE, REFLECTION_TYPE,
    REFLECTION_TYPE_TYPE,
};
pub use schema::{
    definition::{FieldDescriptor, SchemaDefinition},
    primitive_kind::PrimitiveKind,
    registry::TypeRegistry,
    type_tag::TypeTag,
};
pub use state::{
    collection::{Collection, CollectionKey},
    graph::StateGraph,
    instance::SchemaInstance,
    value::Value,
};
pub use types::{FieldIndex, RefId, TypeId, ROOT_REF_ID};
