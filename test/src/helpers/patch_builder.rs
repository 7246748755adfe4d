use statesync_shared::{
    CollectionKey, FieldIndex, Operation, RefId, TypeId, Value, END_OF_STRUCTURE, NIL,
    SWITCH_TO_STRUCTURE, TYPE_ID,
};

use super::FixtureWriter;

/// Fluent builder for patch buffers
#[derive(Default)]
pub struct PatchBuilder {
    writer: FixtureWriter,
}

impl PatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field index and operation code
    pub fn entry(mut self, field: FieldIndex, operation: Operation) -> Self {
        self.writer
            .uint(u64::from(field))
            .byte(operation.to_byte());
        self
    }

    /// `REPLACE` of a primitive field
    pub fn replace(self, field: FieldIndex, value: impl Into<Value>) -> Self {
        self.entry(field, Operation::Replace).value(value)
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.writer.value(&value.into());
        self
    }

    pub fn key(mut self, key: CollectionKey) -> Self {
        self.writer.key(&key);
        self
    }

    pub fn index(self, index: u64) -> Self {
        self.key(CollectionKey::Index(index))
    }

    pub fn name(self, name: &str) -> Self {
        self.key(CollectionKey::Name(name.to_string()))
    }

    pub fn nil(mut self) -> Self {
        self.writer.byte(NIL);
        self
    }

    pub fn ref_id(mut self, ref_id: RefId) -> Self {
        self.writer.uint(u64::from(ref_id));
        self
    }

    /// Type override for the new instance whose reference id follows
    pub fn type_id(mut self, type_id: TypeId) -> Self {
        self.writer.byte(TYPE_ID).uint(u64::from(type_id));
        self
    }

    /// Closes the nested structure entered by the last reference
    pub fn end(mut self) -> Self {
        self.writer.byte(END_OF_STRUCTURE);
        self
    }

    /// Retargets the following top-level entries
    pub fn switch_to(mut self, ref_id: RefId) -> Self {
        self.writer.byte(SWITCH_TO_STRUCTURE).uint(u64::from(ref_id));
        self
    }

    /// Pre-encoded bytes, e.g. from [`encode_body`](super::encode_body)
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.writer.bytes(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.writer.to_bytes()
    }
}
