use crate::{
    error::DecodeError,
    schema::type_tag::TypeTag,
    types::{FieldIndex, TypeId},
};

/// A single declared field: its name, shape and wire index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub type_tag: TypeTag,
    pub index: FieldIndex,
}

/// Ordered field layout of one schema type.
///
/// Field indices are unique within a definition and fields are kept sorted
/// by index. Inherited fields are part of `fields`; `extends` only records
/// the parent for assignability checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaDefinition {
    type_id: TypeId,
    extends: Option<TypeId>,
    fields: Vec<FieldDescriptor>,
}

impl SchemaDefinition {
    pub fn new(type_id: TypeId) -> Self {
        Self {
            type_id,
            extends: None,
            fields: Vec::new(),
        }
    }

    pub fn extending(mut self, parent: TypeId) -> Self {
        self.extends = Some(parent);
        self
    }

    /// Appends a field at the next free index
    pub fn with_field(mut self, name: &str, type_tag: TypeTag) -> Self {
        let index = self.next_index();
        self.fields.push(FieldDescriptor {
            name: name.to_string(),
            type_tag,
            index,
        });
        self
    }

    /// Adds a field at an explicit index, rejecting duplicate names or indices
    pub fn try_add_field(
        &mut self,
        name: &str,
        type_tag: TypeTag,
        index: FieldIndex,
    ) -> Result<(), DecodeError> {
        if self.field(index).is_some() {
            return Err(DecodeError::mismatch(format!(
                "type {} declares field index {} twice",
                self.type_id, index
            )));
        }
        if self.field_by_name(name).is_some() {
            return Err(DecodeError::mismatch(format!(
                "type {} declares field '{}' twice",
                self.type_id, name
            )));
        }

        let position = self
            .fields
            .iter()
            .position(|field| field.index > index)
            .unwrap_or(self.fields.len());
        self.fields.insert(
            position,
            FieldDescriptor {
                name: name.to_string(),
                type_tag,
                index,
            },
        );
        Ok(())
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn extends(&self) -> Option<TypeId> {
        self.extends
    }

    /// Fields in index order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, index: FieldIndex) -> Option<&FieldDescriptor> {
        self.fields
            .binary_search_by_key(&index, |field| field.index)
            .ok()
            .map(|position| &self.fields[position])
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    fn next_index(&self) -> FieldIndex {
        self.fields.last().map(|field| field.index + 1).unwrap_or(0)
    }
}
