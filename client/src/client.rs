use std::collections::HashMap;

use log::{debug, warn};

use statesync_shared::{
    apply_patch, decode_handshake, decode_snapshot, ByteReader, ChangeRecord, DecodeError,
    FieldIndex, ObserverId, Observers, Operation, PatchOutcome, RefId, SchemaInstance,
    StateGraph, TypeId, TypeRegistry,
};

use crate::{
    client_config::ClientConfig,
    error::StateError,
    field_path::{field_index, resolve_path},
};

/// Client-side replica of the server's state.
///
/// Feed it the handshake, then a full snapshot, then patches, in the order
/// the server sent them. Observers run synchronously inside the call that
/// produced their change.
pub struct StateClient {
    config: ClientConfig,
    registry: Option<TypeRegistry>,
    graph: StateGraph,
    has_state: bool,
    resync_required: bool,
    observers: Observers,
}

impl StateClient {
    /// Create a new StateClient that learns its types from a handshake
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            registry: None,
            graph: StateGraph::new(0),
            has_state: false,
            resync_required: false,
            observers: Observers::new(),
        }
    }

    /// Create a new StateClient over a statically declared type layout
    pub fn with_registry(registry: TypeRegistry, config: ClientConfig) -> Result<Self, StateError> {
        registry.validate().map_err(StateError::Handshake)?;

        let mut client = Self::new(config);
        client.graph = StateGraph::new(registry.root_type().unwrap_or_default());
        client.registry = Some(registry);
        Ok(client)
    }

    /// Decodes a handshake and replaces the type registry.
    ///
    /// If state is already held and a type with live instances changed its
    /// definition, patches are refused until the next full snapshot.
    pub fn handshake(&mut self, bytes: &[u8]) -> Result<(), StateError> {
        let registry = decode_handshake(bytes, &self.config.decode).map_err(StateError::Handshake)?;

        if self.has_state && self.invalidates_live_state(&registry) {
            warn!("handshake changed live types, a full state snapshot is required");
            self.resync_required = true;
        }
        if !self.has_state {
            self.graph = StateGraph::new(registry.root_type().unwrap_or_default());
        }

        self.registry = Some(registry);
        Ok(())
    }

    /// Replaces the whole state with a full snapshot.
    ///
    /// On failure the previous state is untouched. On success observers are
    /// told about every field that differs from the previous state, and
    /// instances that disappeared are reported as removed.
    pub fn set_state(&mut self, bytes: &[u8]) -> Result<(), StateError> {
        let registry = self.registry.as_ref().ok_or(StateError::RegistryNotReady)?;
        let root_type = registry
            .root_type()
            .ok_or_else(|| StateError::Decode(DecodeError::mismatch("no root type declared")))?;

        let mut reader = ByteReader::new(bytes);
        let graph = decode_snapshot(&mut reader, registry, root_type, &self.config.decode)
            .map_err(StateError::Decode)?;

        let changes = if self.config.notify_on_set_state {
            diff_graphs(&self.graph, &graph, registry)
        } else {
            Vec::new()
        };
        let removed = if self.has_state {
            removed_instances(&self.graph, &graph)
        } else {
            Vec::new()
        };

        self.graph = graph;
        self.has_state = true;
        self.resync_required = false;
        debug!("state set: {} instances", self.graph.len());

        self.observers.dispatch(&changes);
        self.observers.dispatch_removals(&removed);
        Ok(())
    }

    /// Applies an incremental patch in place.
    ///
    /// Not transactional: when it fails part way, the mutations applied before
    /// the failure stay and their observers have been notified.
    pub fn patch(&mut self, bytes: &[u8]) -> Result<(), StateError> {
        let registry = self.registry.as_ref().ok_or(StateError::RegistryNotReady)?;
        if !self.has_state || self.resync_required {
            return Err(StateError::ResyncRequired);
        }

        let mut reader = ByteReader::new(bytes);
        match apply_patch(&mut reader, &mut self.graph, registry, &self.config.decode) {
            Ok(outcome) => {
                self.notify(&outcome);
                Ok(())
            }
            Err(failure) => {
                self.notify(&failure.applied);
                Err(StateError::Patch(failure.error))
            }
        }
    }

    /// The live state. Before the first snapshot this is an empty root.
    pub fn state(&self) -> &StateGraph {
        &self.graph
    }

    pub fn root(&self) -> &SchemaInstance {
        self.graph.root()
    }

    pub fn registry(&self) -> Option<&TypeRegistry> {
        self.registry.as_ref()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Whether a full snapshot has been applied
    pub fn has_state(&self) -> bool {
        self.has_state
    }

    /// Whether patches are refused until the next full snapshot
    pub fn is_resync_required(&self) -> bool {
        self.has_state && self.resync_required
    }

    // Observers

    /// Observe one field of one instance, by field name
    pub fn observe_field(
        &mut self,
        ref_id: RefId,
        field: &str,
        callback: impl FnMut(&ChangeRecord) + 'static,
    ) -> Result<ObserverId, StateError> {
        let registry = self.registry.as_ref().ok_or(StateError::RegistryNotReady)?;
        let field_index =
            field_index(&self.graph, registry, ref_id, field).ok_or_else(|| {
                StateError::PathNotFound {
                    path: field.to_string(),
                }
            })?;
        Ok(self.observers.observe_field(ref_id, field_index, callback))
    }

    /// Observe the field at `path` (field names and collection keys separated
    /// by `/`, starting at the root). The path is resolved once, against the
    /// current state.
    pub fn observe_path(
        &mut self,
        path: &str,
        callback: impl FnMut(&ChangeRecord) + 'static,
    ) -> Result<ObserverId, StateError> {
        let registry = self.registry.as_ref().ok_or(StateError::RegistryNotReady)?;
        let (ref_id, field_index) = resolve_path(&self.graph, registry, path)?;
        Ok(self.observers.observe_field(ref_id, field_index, callback))
    }

    /// Observe every field change on one instance
    pub fn observe_instance(
        &mut self,
        ref_id: RefId,
        callback: impl FnMut(&ChangeRecord) + 'static,
    ) -> ObserverId {
        self.observers.observe_instance(ref_id, callback)
    }

    /// Called once when the instance is dropped from the state
    pub fn observe_removal(
        &mut self,
        ref_id: RefId,
        callback: impl FnMut(RefId) + 'static,
    ) -> ObserverId {
        self.observers.observe_removal(ref_id, callback)
    }

    /// Returns whether the observer was registered
    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        self.observers.unobserve(id)
    }

    /// A replaced child hands its observers to its replacement only when the
    /// sweep dropped it. A child still reachable elsewhere keeps them.
    fn notify(&mut self, outcome: &PatchOutcome) {
        for (previous, current) in &outcome.replacements {
            if outcome.removed.contains(previous) {
                self.observers.migrate(*previous, *current);
            }
        }
        self.observers.dispatch(&outcome.changes);
        self.observers.dispatch_removals(&outcome.removed);
    }

    /// Whether swapping to `registry` would change the layout of any type
    /// that currently has instances
    fn invalidates_live_state(&self, registry: &TypeRegistry) -> bool {
        let Some(current) = self.registry.as_ref() else {
            return true;
        };
        if current.root_type() != registry.root_type() {
            return true;
        }
        self.graph
            .live_types()
            .into_iter()
            .any(|type_id| current.get(type_id) != registry.get(type_id))
    }
}

/// `Add` records for every field of `current` that differs from `previous`.
/// An instance only counts as the same when both its id and type match.
fn diff_graphs(
    previous: &StateGraph,
    current: &StateGraph,
    registry: &TypeRegistry,
) -> Vec<ChangeRecord> {
    let mut names: HashMap<TypeId, HashMap<FieldIndex, &str>> = HashMap::new();
    let mut changes = Vec::new();

    for ref_id in current.ref_ids() {
        let Some(instance) = current.get(ref_id) else {
            continue;
        };
        let type_id = instance.type_id();
        let before = previous
            .get(ref_id)
            .filter(|before| before.type_id() == type_id);
        let field_names = names.entry(type_id).or_insert_with(|| {
            registry
                .get(type_id)
                .map(|definition| {
                    definition
                        .fields()
                        .iter()
                        .map(|field| (field.index, field.name.as_str()))
                        .collect()
                })
                .unwrap_or_default()
        });

        for (field_index, value) in instance.fields() {
            let previous_value = before.and_then(|before| before.get(field_index));
            if previous_value == Some(value) {
                continue;
            }
            changes.push(ChangeRecord {
                ref_id,
                field_index,
                field: field_names
                    .get(&field_index)
                    .map(|name| name.to_string())
                    .unwrap_or_default(),
                key: None,
                operation: Operation::Add,
                previous: previous_value.cloned(),
                value: Some(value.clone()),
            });
        }
    }

    changes
}

/// Instances of `previous` with no same-typed counterpart in `current`
fn removed_instances(previous: &StateGraph, current: &StateGraph) -> Vec<RefId> {
    previous
        .ref_ids()
        .into_iter()
        .filter(|ref_id| {
            let before = previous.get(*ref_id).map(SchemaInstance::type_id);
            let after = current.get(*ref_id).map(SchemaInstance::type_id);
            before != after
        })
        .collect()
}
