use statesync_shared::{
    CollectionKey, FieldIndex, RefId, StateGraph, TypeRegistry, Value, ROOT_REF_ID,
};

use crate::error::StateError;

/// Resolves a `/`-separated path of field names and collection keys,
/// starting at the root, to the instance field it ends on.
///
/// A field holding a nested instance continues the walk into that instance.
/// A collection field consumes the next segment as an element key. The last
/// segment must name a field.
pub(crate) fn resolve_path(
    graph: &StateGraph,
    registry: &TypeRegistry,
    path: &str,
) -> Result<(RefId, FieldIndex), StateError> {
    let not_found = || StateError::PathNotFound {
        path: path.to_string(),
    };

    let mut segments = path.split('/').filter(|segment| !segment.is_empty()).peekable();
    let mut ref_id = ROOT_REF_ID;

    while let Some(segment) = segments.next() {
        let field_index = field_index(graph, registry, ref_id, segment).ok_or_else(not_found)?;
        if segments.peek().is_none() {
            return Ok((ref_id, field_index));
        }

        let mut value = graph
            .get(ref_id)
            .and_then(|instance| instance.get(field_index))
            .ok_or_else(not_found)?;

        while let Value::Collection(collection) = value {
            let segment = segments.next().ok_or_else(not_found)?;
            let key = match segment.parse::<u64>() {
                Ok(index) if collection.get(&CollectionKey::Index(index)).is_some() => {
                    CollectionKey::Index(index)
                }
                _ => CollectionKey::Name(segment.to_string()),
            };
            value = collection.get(&key).ok_or_else(not_found)?;
        }

        ref_id = value.as_ref_id().ok_or_else(not_found)?;
    }

    Err(not_found())
}

/// Index of the field called `name` on instance `ref_id`
pub(crate) fn field_index(
    graph: &StateGraph,
    registry: &TypeRegistry,
    ref_id: RefId,
    name: &str,
) -> Option<FieldIndex> {
    let instance = graph.get(ref_id)?;
    registry
        .get(instance.type_id())?
        .field_by_name(name)
        .map(|field| field.index)
}
