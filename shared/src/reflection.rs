use std::collections::{HashMap, HashSet};

use log::debug;

use statesync_serde::ByteReader;

use crate::{
    config::DecodeConfig,
    decode::snapshot::decode_snapshot,
    error::DecodeError,
    schema::{
        definition::SchemaDefinition, primitive_kind::PrimitiveKind, registry::TypeRegistry,
        type_tag::TypeTag,
    },
    state::{graph::StateGraph, instance::SchemaInstance, value::Value},
    types::{FieldIndex, TypeId},
};

pub const REFLECTION_TYPE: TypeId = 0;
pub const REFLECTION_TYPE_TYPE: TypeId = 1;
pub const REFLECTION_FIELD_TYPE: TypeId = 2;

/// The built-in schema every handshake is encoded with
pub fn reflection_registry() -> TypeRegistry {
    let number = || TypeTag::Primitive(PrimitiveKind::Number);
    let string = || TypeTag::Primitive(PrimitiveKind::String);

    TypeRegistry::from_definitions(
        [
            SchemaDefinition::new(REFLECTION_TYPE)
                .with_field("types", TypeTag::sequence_of(TypeTag::NestedSchema(REFLECTION_TYPE_TYPE)))
                .with_field("rootType", number()),
            SchemaDefinition::new(REFLECTION_TYPE_TYPE)
                .with_field("id", number())
                .with_field("extendsId", number())
                .with_field("fields", TypeTag::sequence_of(TypeTag::NestedSchema(REFLECTION_FIELD_TYPE))),
            SchemaDefinition::new(REFLECTION_FIELD_TYPE)
                .with_field("name", string())
                .with_field("type", string())
                .with_field("referencedType", number()),
        ],
        REFLECTION_TYPE,
    )
}

/// Decodes a handshake into the registry it describes.
///
/// Either the whole registry is produced or nothing is.
pub fn decode_handshake(buffer: &[u8], config: &DecodeConfig) -> Result<TypeRegistry, DecodeError> {
    let bootstrap = reflection_registry();
    let mut reader = ByteReader::new(buffer);
    let graph = decode_snapshot(&mut reader, &bootstrap, REFLECTION_TYPE, config)?;

    let mut declared: HashMap<TypeId, DeclaredType> = HashMap::new();
    let mut order = Vec::new();
    for type_instance in elements(&graph, graph.root(), 0)? {
        let declared_type = DeclaredType::read(&graph, type_instance)?;
        let type_id = declared_type.id;
        if declared.insert(type_id, declared_type).is_some() {
            return Err(DecodeError::mismatch(format!(
                "type id {} declared twice",
                type_id
            )));
        }
        order.push(type_id);
    }

    let mut registry = TypeRegistry::builder();
    let mut flattened = HashMap::new();
    for type_id in &order {
        let definition = flatten(*type_id, &declared, &mut flattened, &mut HashSet::new())?;
        registry.add_type(definition)?;
    }

    if let Some(root_type) = optional_type_id(number(graph.root(), 1)?)? {
        registry.set_root_type(root_type);
    }
    registry.validate()?;

    debug!(
        "handshake declared {} types, root type {:?}",
        registry.len(),
        registry.root_type()
    );
    Ok(registry)
}

/// One `ReflectionType` as read off the wire, before inheritance is applied
struct DeclaredType {
    id: TypeId,
    extends: Option<TypeId>,
    fields: Vec<(String, TypeTag)>,
}

impl DeclaredType {
    fn read(graph: &StateGraph, instance: &SchemaInstance) -> Result<Self, DecodeError> {
        let id = optional_type_id(number(instance, 0)?)?
            .ok_or_else(|| DecodeError::mismatch("reflected type without an id"))?;
        let extends = optional_type_id(number(instance, 1)?)?;

        let mut fields = Vec::new();
        for field in elements(graph, instance, 2)? {
            let name = string(field, 0)?;
            let type_name = string(field, 1)?;
            let referenced = optional_type_id(number(field, 2)?)?;
            let type_tag = TypeTag::parse(type_name, referenced).ok_or_else(|| {
                DecodeError::mismatch(format!(
                    "field '{}' of type {} has unknown type '{}'",
                    name, id, type_name
                ))
            })?;
            fields.push((name.to_string(), type_tag));
        }

        Ok(Self {
            id,
            extends,
            fields,
        })
    }
}

/// Builds the definition of `type_id` with inherited fields first and its
/// own fields numbered after them
fn flatten(
    type_id: TypeId,
    declared: &HashMap<TypeId, DeclaredType>,
    flattened: &mut HashMap<TypeId, SchemaDefinition>,
    visiting: &mut HashSet<TypeId>,
) -> Result<SchemaDefinition, DecodeError> {
    if let Some(definition) = flattened.get(&type_id) {
        return Ok(definition.clone());
    }
    if !visiting.insert(type_id) {
        return Err(DecodeError::mismatch(format!(
            "inheritance cycle through type {}",
            type_id
        )));
    }

    let declared_type = declared
        .get(&type_id)
        .ok_or(DecodeError::UnknownTypeReference { type_id })?;

    let mut definition = SchemaDefinition::new(type_id);
    if let Some(parent) = declared_type.extends {
        definition = definition.extending(parent);
        for field in flatten(parent, declared, flattened, visiting)?.fields() {
            definition.try_add_field(&field.name, field.type_tag.clone(), field.index)?;
        }
    }

    let inherited = definition.fields().len();
    for (position, (name, type_tag)) in declared_type.fields.iter().enumerate() {
        let index = FieldIndex::try_from(inherited + position).map_err(|_| {
            DecodeError::mismatch(format!("type {} declares too many fields", type_id))
        })?;
        definition.try_add_field(name, type_tag.clone(), index)?;
    }

    visiting.remove(&type_id);
    flattened.insert(type_id, definition.clone());
    Ok(definition)
}

/// Instances held by a sequence-of-references field
fn elements<'g>(
    graph: &'g StateGraph,
    instance: &SchemaInstance,
    index: FieldIndex,
) -> Result<Vec<&'g SchemaInstance>, DecodeError> {
    let Some(collection) = instance.get(index).and_then(Value::as_collection) else {
        return Err(DecodeError::mismatch("reflection list missing"));
    };
    collection
        .values()
        .map(|value| {
            graph
                .resolve(value)
                .ok_or_else(|| DecodeError::mismatch("reflection list holds an empty slot"))
        })
        .collect()
}

fn number(instance: &SchemaInstance, index: FieldIndex) -> Result<f64, DecodeError> {
    instance
        .get(index)
        .and_then(Value::as_f64)
        .ok_or_else(|| DecodeError::mismatch("reflection number missing"))
}

fn string(instance: &SchemaInstance, index: FieldIndex) -> Result<&str, DecodeError> {
    instance
        .get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| DecodeError::mismatch("reflection string missing"))
}

/// `-1` stands for "no type"
fn optional_type_id(value: f64) -> Result<Option<TypeId>, DecodeError> {
    if value == -1.0 {
        return Ok(None);
    }
    if value.fract() != 0.0 || value < 0.0 || value > f64::from(TypeId::MAX) {
        return Err(DecodeError::mismatch(format!("invalid type id {}", value)));
    }
    Ok(Some(value as TypeId))
}
