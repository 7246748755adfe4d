use log::{debug, trace, warn};

use statesync_serde::{ByteReader, Serde};

use crate::{
    change::{ChangeRecord, Operation},
    config::DecodeConfig,
    decode::{
        peek, primitive::read_primitive, read_field_index, read_ref_id, read_uint,
        snapshot::{RefSlot, SnapshotDecoder},
        END_OF_STRUCTURE, SWITCH_TO_STRUCTURE,
    },
    error::DecodeError,
    schema::{definition::FieldDescriptor, registry::TypeRegistry, type_tag::TypeTag},
    state::{
        collection::{Collection, CollectionKey},
        graph::StateGraph,
        value::Value,
    },
    types::{RefId, TypeId, ROOT_REF_ID},
};

/// Everything a patch did to the graph
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatchOutcome {
    /// Change records in application order
    pub changes: Vec<ChangeRecord>,
    /// `(previous, current)` pairs for slots whose child was replaced by a
    /// newly decoded instance
    pub replacements: Vec<(RefId, RefId)>,
    /// Instances dropped by the reachability sweep, ascending
    pub removed: Vec<RefId>,
}

/// A patch that stopped part way. Mutations applied before the failure stay
/// in the graph and are described by `applied`.
#[derive(Clone, Debug, PartialEq)]
pub struct PatchFailure {
    pub error: DecodeError,
    pub applied: PatchOutcome,
}

/// Applies an incremental patch to `graph` in place.
///
/// Not transactional: on failure the graph keeps every mutation applied
/// before the error, and no sweep runs.
pub fn apply_patch(
    reader: &mut ByteReader,
    graph: &mut StateGraph,
    registry: &TypeRegistry,
    config: &DecodeConfig,
) -> Result<PatchOutcome, PatchFailure> {
    let mut patcher = Patcher {
        graph,
        registry,
        config,
        outcome: PatchOutcome::default(),
    };

    if let Err(error) = patcher.apply_segments(reader) {
        debug!(
            "patch failed at offset {} after {} changes: {}",
            reader.offset(),
            patcher.outcome.changes.len(),
            error
        );
        return Err(PatchFailure {
            error,
            applied: patcher.outcome,
        });
    }

    let Patcher {
        graph, mut outcome, ..
    } = patcher;

    if config.collect_garbage {
        outcome.removed = graph.collect_garbage();
        if !outcome.removed.is_empty() {
            debug!("dropped unreachable instances {:?}", outcome.removed);
        }
    }

    Ok(outcome)
}

struct Patcher<'a> {
    graph: &'a mut StateGraph,
    registry: &'a TypeRegistry,
    config: &'a DecodeConfig,
    outcome: PatchOutcome,
}

impl<'a> Patcher<'a> {
    /// Top level: entries target the root until a switch marker retargets them
    fn apply_segments(&mut self, reader: &mut ByteReader) -> Result<(), DecodeError> {
        let mut target = ROOT_REF_ID;

        while let Some(byte) = reader.peek_byte() {
            match byte {
                SWITCH_TO_STRUCTURE => {
                    reader.read_byte()?;
                    let ref_id = read_ref_id(reader)?;
                    if !self.graph.contains(ref_id) {
                        return Err(DecodeError::UnknownReference { ref_id });
                    }
                    trace!("switch to ref {}", ref_id);
                    target = ref_id;
                }
                END_OF_STRUCTURE => {
                    return Err(DecodeError::mismatch(
                        "end of structure outside a nested structure",
                    ));
                }
                _ => self.apply_entry(reader, target, 0)?,
            }
        }

        Ok(())
    }

    /// Nested context: entries target `ref_id` until the end marker
    fn apply_nested(
        &mut self,
        reader: &mut ByteReader,
        ref_id: RefId,
        depth: usize,
    ) -> Result<(), DecodeError> {
        if depth > self.config.max_depth {
            return Err(DecodeError::NestingTooDeep {
                limit: self.config.max_depth,
            });
        }

        loop {
            match peek(reader)? {
                END_OF_STRUCTURE => {
                    reader.read_byte()?;
                    return Ok(());
                }
                SWITCH_TO_STRUCTURE => {
                    return Err(DecodeError::mismatch(
                        "switch to structure inside a nested structure",
                    ));
                }
                _ => self.apply_entry(reader, ref_id, depth)?,
            }
        }
    }

    fn apply_entry(
        &mut self,
        reader: &mut ByteReader,
        ref_id: RefId,
        depth: usize,
    ) -> Result<(), DecodeError> {
        let registry = self.registry;
        let type_id = self.type_of(ref_id)?;
        let field_index = read_field_index(reader)?;
        let field = registry
            .definition(type_id)?
            .field(field_index)
            .ok_or(DecodeError::UnknownFieldIndex {
                type_id,
                field_index,
            })?;
        let operation = Operation::from_byte(reader.read_byte()?)?;

        trace!(
            "ref {} field {} '{}' {:?}",
            ref_id,
            field_index,
            field.name,
            operation
        );

        match &field.type_tag {
            TypeTag::Primitive(kind) => {
                if operation != Operation::Replace {
                    return Err(unsupported(operation, field));
                }
                let value = read_primitive(reader, *kind)?;
                let previous = self.store(ref_id, field, value.clone())?;
                self.record(ref_id, field, None, operation, previous, Some(value));
                Ok(())
            }
            TypeTag::NestedSchema(declared) => {
                if !matches!(operation, Operation::Replace | Operation::Add) {
                    return Err(unsupported(operation, field));
                }
                self.apply_reference(reader, ref_id, field, operation, *declared, depth)
            }
            TypeTag::Sequence(_) | TypeTag::KeyedMap(_) | TypeTag::UniqueSet(_) => {
                self.apply_collection_op(reader, ref_id, field, operation, depth)
            }
        }
    }

    fn apply_reference(
        &mut self,
        reader: &mut ByteReader,
        ref_id: RefId,
        field: &FieldDescriptor,
        operation: Operation,
        declared: TypeId,
        depth: usize,
    ) -> Result<(), DecodeError> {
        let current = self
            .graph
            .get(ref_id)
            .and_then(|instance| instance.get(field.index))
            .and_then(Value::as_ref_id);

        match self.read_ref_slot(reader, declared, depth)? {
            RefSlot::Known(child) if Some(child) == current => {
                self.apply_nested(reader, child, depth + 1)
            }
            RefSlot::Known(child) => {
                let previous = self.store(ref_id, field, Value::Ref(child))?;
                self.record(ref_id, field, None, operation, previous, Some(Value::Ref(child)));
                self.apply_nested(reader, child, depth + 1)
            }
            RefSlot::Null => {
                let previous = self.store(ref_id, field, Value::Null)?;
                if previous.as_ref().is_some_and(|previous| !previous.is_null()) {
                    self.record(ref_id, field, None, operation, previous, Some(Value::Null));
                }
                Ok(())
            }
            RefSlot::Created(child, created) => {
                let previous = self.store(ref_id, field, Value::Ref(child))?;
                self.record(ref_id, field, None, operation, previous, Some(Value::Ref(child)));
                if let Some(previous) = current {
                    self.outcome.replacements.push((previous, child));
                }
                self.record_created(&created);
                Ok(())
            }
        }
    }

    fn apply_collection_op(
        &mut self,
        reader: &mut ByteReader,
        ref_id: RefId,
        field: &FieldDescriptor,
        operation: Operation,
        depth: usize,
    ) -> Result<(), DecodeError> {
        if operation == Operation::Clear {
            let collection = self.collection_mut(ref_id, field)?;
            let previous = collection.clear();
            let value = collection.clone();
            self.record(
                ref_id,
                field,
                None,
                operation,
                Some(Value::Collection(previous)),
                Some(Value::Collection(value)),
            );
            return Ok(());
        }

        let key = read_key(reader, &field.type_tag)?;

        if operation == Operation::Delete {
            match self.collection_mut(ref_id, field)?.remove(&key)? {
                Some(previous) => {
                    self.record(ref_id, field, Some(key), operation, Some(previous), None)
                }
                None => warn!(
                    "delete of absent key '{}' in field '{}' of ref {} ignored",
                    key, field.name, ref_id
                ),
            }
            return Ok(());
        }

        let element_tag = field
            .type_tag
            .element()
            .ok_or_else(|| unsupported(operation, field))?;

        // the occupant a nested element would be patched in place against
        let is_sequence = matches!(field.type_tag, TypeTag::Sequence(_));
        let current = match operation {
            Operation::Replace => self.collection_mut(ref_id, field)?.get(&key).cloned(),
            Operation::Add if !is_sequence => {
                self.collection_mut(ref_id, field)?.get(&key).cloned()
            }
            _ => None,
        };
        let current_ref = current.as_ref().and_then(Value::as_ref_id);

        let mut created = Vec::new();
        let mut relinked = None;
        let mut replaced = None;
        let value = match element_tag {
            TypeTag::Primitive(kind) => read_primitive(reader, *kind)?,
            TypeTag::NestedSchema(declared) => match self.read_ref_slot(reader, *declared, depth)? {
                RefSlot::Known(child) if Some(child) == current_ref => {
                    return self.apply_nested(reader, child, depth + 1);
                }
                RefSlot::Known(child) => {
                    relinked = Some(child);
                    Value::Ref(child)
                }
                RefSlot::Created(child, instances) => {
                    created = instances;
                    replaced = current_ref.map(|previous| (previous, child));
                    Value::Ref(child)
                }
                RefSlot::Null => Value::Null,
            },
            collection_tag => {
                let mut decoder =
                    SnapshotDecoder::new(self.registry, self.config, &mut *self.graph);
                let collection = decoder.decode_collection(reader, collection_tag, depth)?;
                created = decoder.into_created();
                Value::Collection(collection)
            }
        };

        let collection = self.collection_mut(ref_id, field)?;
        let previous = match operation {
            Operation::Add => collection.insert(key.clone(), value.clone())?,
            Operation::Replace => Some(collection.replace(key.clone(), value.clone())?),
            Operation::DeleteAndAdd => {
                let removed = collection.remove(&key)?;
                collection.insert(key.clone(), value.clone())?;
                removed
            }
            Operation::Delete | Operation::Clear => return Err(unsupported(operation, field)),
        };
        self.record(ref_id, field, Some(key), operation, previous, Some(value));

        if let Some(replacement) = replaced {
            self.outcome.replacements.push(replacement);
        }
        self.record_created(&created);
        match relinked {
            Some(child) => self.apply_nested(reader, child, depth + 1),
            None => Ok(()),
        }
    }

    fn read_ref_slot(
        &mut self,
        reader: &mut ByteReader,
        declared: TypeId,
        depth: usize,
    ) -> Result<RefSlot, DecodeError> {
        SnapshotDecoder::new(self.registry, self.config, &mut *self.graph)
            .read_ref_slot(reader, declared, depth)
    }

    /// `Add` records for every field of freshly decoded instances
    fn record_created(&mut self, created: &[RefId]) {
        let registry = self.registry;
        for ref_id in created {
            let Some(instance) = self.graph.get(*ref_id) else {
                continue;
            };
            let Some(definition) = registry.get(instance.type_id()) else {
                continue;
            };
            for (field_index, value) in instance.fields() {
                let Some(field) = definition.field(field_index) else {
                    continue;
                };
                self.outcome.changes.push(ChangeRecord {
                    ref_id: *ref_id,
                    field_index,
                    field: field.name.clone(),
                    key: None,
                    operation: Operation::Add,
                    previous: None,
                    value: Some(value.clone()),
                });
            }
        }
    }

    fn type_of(&self, ref_id: RefId) -> Result<TypeId, DecodeError> {
        self.graph
            .get(ref_id)
            .map(|instance| instance.type_id())
            .ok_or(DecodeError::UnknownReference { ref_id })
    }

    /// Overwrites a field, returning its previous value
    fn store(
        &mut self,
        ref_id: RefId,
        field: &FieldDescriptor,
        value: Value,
    ) -> Result<Option<Value>, DecodeError> {
        Ok(self
            .graph
            .get_mut(ref_id)
            .ok_or(DecodeError::UnknownReference { ref_id })?
            .set(field.index, value))
    }

    fn collection_mut(
        &mut self,
        ref_id: RefId,
        field: &FieldDescriptor,
    ) -> Result<&mut Collection, DecodeError> {
        self.graph
            .get_mut(ref_id)
            .ok_or(DecodeError::UnknownReference { ref_id })?
            .get_mut(field.index)
            .and_then(Value::as_collection_mut)
            .ok_or_else(|| {
                DecodeError::mismatch(format!(
                    "field '{}' of ref {} holds no collection",
                    field.name, ref_id
                ))
            })
    }

    fn record(
        &mut self,
        ref_id: RefId,
        field: &FieldDescriptor,
        key: Option<CollectionKey>,
        operation: Operation,
        previous: Option<Value>,
        value: Option<Value>,
    ) {
        self.outcome.changes.push(ChangeRecord {
            ref_id,
            field_index: field.index,
            field: field.name.clone(),
            key,
            operation,
            previous,
            value,
        });
    }
}

fn read_key(reader: &mut ByteReader, type_tag: &TypeTag) -> Result<CollectionKey, DecodeError> {
    match type_tag {
        TypeTag::KeyedMap(_) => Ok(CollectionKey::Name(String::de(reader)?)),
        _ => Ok(CollectionKey::Index(read_uint(reader)?)),
    }
}

fn unsupported(operation: Operation, field: &FieldDescriptor) -> DecodeError {
    DecodeError::mismatch(format!(
        "operation {:?} is not valid on field '{}' ({})",
        operation,
        field.name,
        field.type_tag.wire_name()
    ))
}
