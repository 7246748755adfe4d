use std::collections::{HashMap, HashSet};

use crate::{
    error::DecodeError,
    schema::definition::SchemaDefinition,
    types::TypeId,
};

/// Id → definition table for one registry epoch.
///
/// Built by the handshake (or by hand for statically known layouts) and
/// replaced wholesale on re-handshake.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeRegistry {
    types: HashMap<TypeId, SchemaDefinition>,
    root_type: Option<TypeId>,
}

impl TypeRegistry {
    pub fn builder() -> Self {
        Self::default()
    }

    /// Registry over a fixed set of definitions known to have distinct ids
    pub(crate) fn from_definitions(
        definitions: impl IntoIterator<Item = SchemaDefinition>,
        root_type: TypeId,
    ) -> Self {
        let types = definitions
            .into_iter()
            .map(|definition| (definition.type_id(), definition))
            .collect();
        Self {
            types,
            root_type: Some(root_type),
        }
    }

    /// Registers a definition. Type ids must be unique.
    pub fn add_type(&mut self, definition: SchemaDefinition) -> Result<&mut Self, DecodeError> {
        let type_id = definition.type_id();
        if self.types.contains_key(&type_id) {
            return Err(DecodeError::mismatch(format!(
                "type id {} registered twice",
                type_id
            )));
        }
        self.types.insert(type_id, definition);
        Ok(self)
    }

    pub fn set_root_type(&mut self, type_id: TypeId) -> &mut Self {
        self.root_type = Some(type_id);
        self
    }

    pub fn root_type(&self) -> Option<TypeId> {
        self.root_type
    }

    pub fn get(&self, type_id: TypeId) -> Option<&SchemaDefinition> {
        self.types.get(&type_id)
    }

    pub fn definition(&self, type_id: TypeId) -> Result<&SchemaDefinition, DecodeError> {
        self.get(type_id)
            .ok_or(DecodeError::UnknownTypeReference { type_id })
    }

    pub fn contains(&self, type_id: TypeId) -> bool {
        self.types.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered type ids, ascending
    pub fn type_ids(&self) -> Vec<TypeId> {
        let mut type_ids: Vec<TypeId> = self.types.keys().copied().collect();
        type_ids.sort_unstable();
        type_ids
    }

    /// Checks that every referenced type id resolves and that inheritance
    /// chains terminate.
    pub fn validate(&self) -> Result<(), DecodeError> {
        if let Some(root_type) = self.root_type {
            self.definition(root_type)?;
        }

        for type_id in self.type_ids() {
            let definition = self.definition(type_id)?;
            for field in definition.fields() {
                if let Some(referenced) = field.type_tag.referenced_type() {
                    self.definition(referenced)?;
                }
            }
            self.ancestors(type_id)?;
        }
        Ok(())
    }

    /// Whether an instance of `concrete` may occupy a slot declared as `declared`
    pub fn is_assignable(&self, concrete: TypeId, declared: TypeId) -> bool {
        match self.ancestors(concrete) {
            Ok(ancestors) => ancestors.contains(&declared),
            Err(_) => false,
        }
    }

    /// `type_id` followed by its parents, nearest first
    fn ancestors(&self, type_id: TypeId) -> Result<Vec<TypeId>, DecodeError> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(type_id);

        while let Some(type_id) = current {
            if !seen.insert(type_id) {
                return Err(DecodeError::mismatch(format!(
                    "inheritance cycle through type {}",
                    type_id
                )));
            }
            chain.push(type_id);
            current = self.definition(type_id)?.extends();
        }
        Ok(chain)
    }
}
