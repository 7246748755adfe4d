use std::collections::BTreeMap;

use crate::{
    state::value::Value,
    types::{FieldIndex, RefId, TypeId},
};

/// A node of the state graph: one instance of a schema type.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaInstance {
    type_id: TypeId,
    ref_id: RefId,
    fields: BTreeMap<FieldIndex, Value>,
}

impl SchemaInstance {
    pub fn new(ref_id: RefId, type_id: TypeId) -> Self {
        Self {
            type_id,
            ref_id,
            fields: BTreeMap::new(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn ref_id(&self) -> RefId {
        self.ref_id
    }

    pub fn get(&self, index: FieldIndex) -> Option<&Value> {
        self.fields.get(&index)
    }

    pub fn get_mut(&mut self, index: FieldIndex) -> Option<&mut Value> {
        self.fields.get_mut(&index)
    }

    /// Stores a field value, returning the previous one
    pub fn set(&mut self, index: FieldIndex, value: Value) -> Option<Value> {
        self.fields.insert(index, value)
    }

    /// Fields in index order
    pub fn fields(&self) -> impl Iterator<Item = (FieldIndex, &Value)> {
        self.fields.iter().map(|(index, value)| (*index, value))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
