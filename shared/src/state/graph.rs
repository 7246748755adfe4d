use std::collections::{HashMap, HashSet};

use crate::{
    state::{instance::SchemaInstance, value::Value},
    types::{RefId, TypeId, ROOT_REF_ID},
};

/// The live object graph: owns every instance, keyed by reference id.
///
/// Parent → child links are `Value::Ref` ids into this table, so shared
/// substructures and cycles have a single owner. The root always lives at
/// [`ROOT_REF_ID`].
#[derive(Clone, Debug, PartialEq)]
pub struct StateGraph {
    instances: HashMap<RefId, SchemaInstance>,
}

impl StateGraph {
    pub fn new(root_type: TypeId) -> Self {
        let mut instances = HashMap::new();
        instances.insert(ROOT_REF_ID, SchemaInstance::new(ROOT_REF_ID, root_type));
        Self { instances }
    }

    pub fn root(&self) -> &SchemaInstance {
        // the root is inserted on construction and is never collected
        &self.instances[&ROOT_REF_ID]
    }

    pub fn root_type(&self) -> TypeId {
        self.root().type_id()
    }

    pub fn get(&self, ref_id: RefId) -> Option<&SchemaInstance> {
        self.instances.get(&ref_id)
    }

    pub fn get_mut(&mut self, ref_id: RefId) -> Option<&mut SchemaInstance> {
        self.instances.get_mut(&ref_id)
    }

    pub fn contains(&self, ref_id: RefId) -> bool {
        self.instances.contains_key(&ref_id)
    }

    /// Adds an instance, replacing any instance with the same reference id
    pub fn insert(&mut self, instance: SchemaInstance) {
        self.instances.insert(instance.ref_id(), instance);
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Reference ids of every instance, ascending
    pub fn ref_ids(&self) -> Vec<RefId> {
        let mut ref_ids: Vec<RefId> = self.instances.keys().copied().collect();
        ref_ids.sort_unstable();
        ref_ids
    }

    /// Type ids of every live instance
    pub fn live_types(&self) -> HashSet<TypeId> {
        self.instances.values().map(SchemaInstance::type_id).collect()
    }

    /// Reference ids of instances reachable from the root
    pub fn reachable(&self) -> HashSet<RefId> {
        let mut reached = HashSet::new();
        let mut pending = vec![ROOT_REF_ID];
        let mut links = Vec::new();

        while let Some(ref_id) = pending.pop() {
            if !reached.insert(ref_id) {
                continue;
            }
            let Some(instance) = self.instances.get(&ref_id) else {
                continue;
            };
            for (_, value) in instance.fields() {
                value.referenced_ids(&mut links);
            }
            pending.extend(links.drain(..).filter(|link| !reached.contains(link)));
        }
        reached
    }

    /// Drops every instance that is no longer reachable from the root and
    /// returns the removed reference ids, ascending.
    pub fn collect_garbage(&mut self) -> Vec<RefId> {
        let reached = self.reachable();
        let mut removed: Vec<RefId> = self
            .instances
            .keys()
            .filter(|ref_id| !reached.contains(ref_id))
            .copied()
            .collect();
        removed.sort_unstable();

        for ref_id in &removed {
            self.instances.remove(ref_id);
        }
        removed
    }

    /// Follows a `Value::Ref` to its instance
    pub fn resolve(&self, value: &Value) -> Option<&SchemaInstance> {
        value.as_ref_id().and_then(|ref_id| self.get(ref_id))
    }
}
