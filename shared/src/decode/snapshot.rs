use log::trace;

use statesync_serde::{ByteReader, Serde};

use crate::{
    config::DecodeConfig,
    decode::{peek, primitive::read_primitive, read_ref_id, read_type_id, read_uint, NIL, TYPE_ID},
    error::DecodeError,
    schema::{registry::TypeRegistry, type_tag::TypeTag},
    state::{
        collection::{Collection, CollectionKey},
        graph::StateGraph,
        instance::SchemaInstance,
        value::Value,
    },
    types::{RefId, TypeId, ROOT_REF_ID},
};

/// Decodes a full snapshot into a fresh graph rooted at `root_type`.
///
/// Decoding stops after the root's last field. Bytes left over after that
/// are not an error.
pub fn decode_snapshot(
    reader: &mut ByteReader,
    registry: &TypeRegistry,
    root_type: TypeId,
    config: &DecodeConfig,
) -> Result<StateGraph, DecodeError> {
    registry.definition(root_type)?;

    let mut graph = StateGraph::new(root_type);
    let mut decoder = SnapshotDecoder::new(registry, config, &mut graph);
    decoder.decode_body(reader, ROOT_REF_ID, root_type, 0)?;

    if !reader.is_empty() {
        trace!(
            "snapshot ended with {} trailing bytes at offset {}",
            reader.remaining(),
            reader.offset()
        );
    }

    Ok(graph)
}

/// Outcome of reading one nested-schema slot
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum RefSlot {
    /// `NIL`: the slot is empty
    Null,
    /// The id of an instance already in the graph; no body was read
    Known(RefId),
    /// A brand-new instance was decoded, along with every instance created
    /// beneath it, in creation order
    Created(RefId, Vec<RefId>),
}

/// Reads instance bodies into an existing graph. Instances are registered
/// before their fields are decoded, so back-references to an instance still
/// being decoded resolve.
pub(crate) struct SnapshotDecoder<'a> {
    registry: &'a TypeRegistry,
    config: &'a DecodeConfig,
    graph: &'a mut StateGraph,
    created: Vec<RefId>,
}

impl<'a> SnapshotDecoder<'a> {
    pub(crate) fn new(
        registry: &'a TypeRegistry,
        config: &'a DecodeConfig,
        graph: &'a mut StateGraph,
    ) -> Self {
        Self {
            registry,
            config,
            graph,
            created: Vec::new(),
        }
    }

    /// Ids of every instance created so far, in creation order
    pub(crate) fn into_created(self) -> Vec<RefId> {
        self.created
    }

    /// Reads `NIL`, or an optional `TYPE_ID` override followed by a reference
    /// id, decoding the body of an unknown id. `depth` is the depth of the
    /// instance holding the slot.
    pub(crate) fn read_ref_slot(
        &mut self,
        reader: &mut ByteReader,
        declared: TypeId,
        depth: usize,
    ) -> Result<RefSlot, DecodeError> {
        if peek(reader)? == NIL {
            reader.read_byte()?;
            return Ok(RefSlot::Null);
        }

        let type_override = self.read_type_override(reader, declared)?;
        let ref_id = read_ref_id(reader)?;
        if let Some(existing) = self.graph.get(ref_id) {
            let existing_type = existing.type_id();
            let conflicting = type_override.is_some_and(|type_id| type_id != existing_type);
            if conflicting || !self.registry.is_assignable(existing_type, declared) {
                return Err(DecodeError::mismatch(format!(
                    "ref {} of type {} cannot occupy a slot of type {}",
                    ref_id, existing_type, declared
                )));
            }
            return Ok(RefSlot::Known(ref_id));
        }

        let first_created = self.created.len();
        let type_id = type_override.unwrap_or(declared);
        self.decode_new_instance(reader, ref_id, type_id, depth + 1)?;
        Ok(RefSlot::Created(ref_id, self.created[first_created..].to_vec()))
    }

    /// Reads a full collection: a count, then each element (map elements are
    /// preceded by their key)
    pub(crate) fn decode_collection(
        &mut self,
        reader: &mut ByteReader,
        type_tag: &TypeTag,
        depth: usize,
    ) -> Result<Collection, DecodeError> {
        let (Some(mut collection), Some(element)) =
            (Collection::empty_for(type_tag), type_tag.element())
        else {
            return Err(DecodeError::mismatch(format!(
                "'{}' is not a collection type",
                type_tag.wire_name()
            )));
        };

        let count = read_uint(reader)?;
        if let Collection::Set(_) = collection {
            let mut elements = Vec::new();
            for _ in 0..count {
                elements.push(self.decode_value(reader, element, depth)?);
            }
            return Collection::set_from(elements);
        }

        for position in 0..count {
            let key = match collection {
                Collection::Map(_) => CollectionKey::Name(String::de(reader)?),
                Collection::Sequence(_) | Collection::Set(_) => CollectionKey::Index(position),
            };
            let value = self.decode_value(reader, element, depth)?;
            collection.insert(key, value)?;
        }

        Ok(collection)
    }

    fn decode_body(
        &mut self,
        reader: &mut ByteReader,
        ref_id: RefId,
        type_id: TypeId,
        depth: usize,
    ) -> Result<(), DecodeError> {
        let registry = self.registry;
        let definition = registry.definition(type_id)?;

        for field in definition.fields() {
            let value = self.decode_value(reader, &field.type_tag, depth)?;
            self.graph
                .get_mut(ref_id)
                .ok_or(DecodeError::UnknownReference { ref_id })?
                .set(field.index, value);
        }

        Ok(())
    }

    fn decode_value(
        &mut self,
        reader: &mut ByteReader,
        type_tag: &TypeTag,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        match type_tag {
            TypeTag::Primitive(kind) => read_primitive(reader, *kind),
            TypeTag::NestedSchema(declared) => {
                let ref_id = match self.read_ref_slot(reader, *declared, depth)? {
                    RefSlot::Null => return Ok(Value::Null),
                    RefSlot::Known(ref_id) | RefSlot::Created(ref_id, _) => ref_id,
                };
                Ok(Value::Ref(ref_id))
            }
            TypeTag::Sequence(_) | TypeTag::KeyedMap(_) | TypeTag::UniqueSet(_) => Ok(
                Value::Collection(self.decode_collection(reader, type_tag, depth)?),
            ),
        }
    }

    fn decode_new_instance(
        &mut self,
        reader: &mut ByteReader,
        ref_id: RefId,
        type_id: TypeId,
        depth: usize,
    ) -> Result<(), DecodeError> {
        if depth > self.config.max_depth {
            return Err(DecodeError::NestingTooDeep {
                limit: self.config.max_depth,
            });
        }

        self.graph.insert(SchemaInstance::new(ref_id, type_id));
        self.created.push(ref_id);

        self.decode_body(reader, ref_id, type_id, depth)
    }

    /// The polymorphic override announced by `TYPE_ID` ahead of a reference
    /// id. Wire uints never start with the marker byte.
    fn read_type_override(
        &mut self,
        reader: &mut ByteReader,
        declared: TypeId,
    ) -> Result<Option<TypeId>, DecodeError> {
        if peek(reader)? != TYPE_ID {
            return Ok(None);
        }
        reader.read_byte()?;

        let type_id = read_type_id(reader)?;
        self.registry.definition(type_id)?;
        if !self.registry.is_assignable(type_id, declared) {
            return Err(DecodeError::mismatch(format!(
                "type {} is not assignable to declared type {}",
                type_id, declared
            )));
        }
        Ok(Some(type_id))
    }
}
