use std::collections::BTreeMap;

use indexmap::IndexMap;

use statesync_shared::{
    Collection, FieldIndex, RefId, SchemaInstance, StateGraph, TypeId, Value, ROOT_REF_ID,
};

/// Fluent builder for server-side state graphs
pub struct GraphBuilder {
    graph: StateGraph,
}

impl GraphBuilder {
    pub fn new(root_type: TypeId) -> Self {
        Self {
            graph: StateGraph::new(root_type),
        }
    }

    /// Start from an existing graph
    pub fn from_graph(graph: StateGraph) -> Self {
        Self { graph }
    }

    /// Add an empty instance
    pub fn instance(mut self, ref_id: RefId, type_id: TypeId) -> Self {
        self.graph.insert(SchemaInstance::new(ref_id, type_id));
        self
    }

    /// Set a field of an instance added earlier
    pub fn field(mut self, ref_id: RefId, index: FieldIndex, value: impl Into<Value>) -> Self {
        self.graph
            .get_mut(ref_id)
            .unwrap_or_else(|| panic!("ref {} was not added to the builder", ref_id))
            .set(index, value.into());
        self
    }

    /// Set a field of the root
    pub fn root_field(self, index: FieldIndex, value: impl Into<Value>) -> Self {
        self.field(ROOT_REF_ID, index, value)
    }

    pub fn build(self) -> StateGraph {
        self.graph
    }
}

pub fn sequence(values: impl IntoIterator<Item = Value>) -> Collection {
    Collection::Sequence(values.into_iter().collect())
}

pub fn map<'k>(entries: impl IntoIterator<Item = (&'k str, Value)>) -> Collection {
    Collection::Map(
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect::<IndexMap<_, _>>(),
    )
}

/// Set elements get ids `0..n`, as a snapshot assigns them
pub fn set(values: impl IntoIterator<Item = Value>) -> Collection {
    Collection::Set(
        values
            .into_iter()
            .enumerate()
            .map(|(id, value)| (id as u64, value))
            .collect::<BTreeMap<_, _>>(),
    )
}
