use std::collections::HashMap;

use log::trace;

use crate::{
    change::ChangeRecord,
    types::{FieldIndex, RefId},
};

pub type ObserverId = u64;

type ChangeCallback = Box<dyn FnMut(&ChangeRecord)>;
type RemovalCallback = Box<dyn FnMut(RefId)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Subscription {
    Field(RefId, FieldIndex),
    Instance(RefId),
    Removal(RefId),
}

impl Subscription {
    fn ref_id(&self) -> RefId {
        match self {
            Subscription::Field(ref_id, _)
            | Subscription::Instance(ref_id)
            | Subscription::Removal(ref_id) => *ref_id,
        }
    }
}

/// Explicit observer registrations, keyed by the instance they watch.
///
/// Callbacks run synchronously, in registration order, on the thread that
/// applies the patch.
#[derive(Default)]
pub struct Observers {
    next_id: ObserverId,
    subscriptions: HashMap<ObserverId, Subscription>,
    field_callbacks: HashMap<(RefId, FieldIndex), Vec<(ObserverId, ChangeCallback)>>,
    instance_callbacks: HashMap<RefId, Vec<(ObserverId, ChangeCallback)>>,
    removal_callbacks: HashMap<RefId, Vec<(ObserverId, RemovalCallback)>>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watches one field of one instance
    pub fn observe_field(
        &mut self,
        ref_id: RefId,
        field_index: FieldIndex,
        callback: impl FnMut(&ChangeRecord) + 'static,
    ) -> ObserverId {
        let id = self.subscribe(Subscription::Field(ref_id, field_index));
        self.field_callbacks
            .entry((ref_id, field_index))
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// Watches every field of one instance
    pub fn observe_instance(
        &mut self,
        ref_id: RefId,
        callback: impl FnMut(&ChangeRecord) + 'static,
    ) -> ObserverId {
        let id = self.subscribe(Subscription::Instance(ref_id));
        self.instance_callbacks
            .entry(ref_id)
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// Fires once when the instance is dropped from the graph
    pub fn observe_removal(
        &mut self,
        ref_id: RefId,
        callback: impl FnMut(RefId) + 'static,
    ) -> ObserverId {
        let id = self.subscribe(Subscription::Removal(ref_id));
        self.removal_callbacks
            .entry(ref_id)
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// Returns whether the observer existed
    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        let Some(subscription) = self.subscriptions.remove(&id) else {
            return false;
        };
        match subscription {
            Subscription::Field(ref_id, field_index) => {
                remove_callback(&mut self.field_callbacks, &(ref_id, field_index), id)
            }
            Subscription::Instance(ref_id) => {
                remove_callback(&mut self.instance_callbacks, &ref_id, id)
            }
            Subscription::Removal(ref_id) => {
                remove_callback(&mut self.removal_callbacks, &ref_id, id)
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Delivers change records in order: field observers first, then
    /// instance observers.
    pub fn dispatch(&mut self, changes: &[ChangeRecord]) {
        for change in changes {
            if let Some(callbacks) = self
                .field_callbacks
                .get_mut(&(change.ref_id, change.field_index))
            {
                for (_, callback) in callbacks.iter_mut() {
                    callback(change);
                }
            }
            if let Some(callbacks) = self.instance_callbacks.get_mut(&change.ref_id) {
                for (_, callback) in callbacks.iter_mut() {
                    callback(change);
                }
            }
        }
    }

    /// Fires removal observers for dropped instances, then forgets every
    /// registration attached to them.
    pub fn dispatch_removals(&mut self, removed: &[RefId]) {
        for ref_id in removed {
            if let Some(mut callbacks) = self.removal_callbacks.remove(ref_id) {
                for (_, callback) in callbacks.iter_mut() {
                    callback(*ref_id);
                }
            }
            self.forget(*ref_id);
        }
    }

    /// Moves field and instance observers from an instance that was replaced
    /// in its slot to its replacement.
    pub fn migrate(&mut self, previous: RefId, current: RefId) {
        if previous == current {
            return;
        }

        let field_keys: Vec<(RefId, FieldIndex)> = self
            .field_callbacks
            .keys()
            .filter(|(ref_id, _)| *ref_id == previous)
            .copied()
            .collect();
        for (ref_id, field_index) in field_keys {
            if let Some(callbacks) = self.field_callbacks.remove(&(ref_id, field_index)) {
                for (id, _) in &callbacks {
                    self.subscriptions
                        .insert(*id, Subscription::Field(current, field_index));
                }
                self.field_callbacks
                    .entry((current, field_index))
                    .or_default()
                    .extend(callbacks);
            }
        }

        if let Some(callbacks) = self.instance_callbacks.remove(&previous) {
            for (id, _) in &callbacks {
                self.subscriptions.insert(*id, Subscription::Instance(current));
            }
            self.instance_callbacks
                .entry(current)
                .or_default()
                .extend(callbacks);
        }

        trace!("moved observers from ref {} to ref {}", previous, current);
    }

    /// Drops every registration attached to `ref_id`
    pub fn forget(&mut self, ref_id: RefId) {
        self.subscriptions
            .retain(|_, subscription| subscription.ref_id() != ref_id);
        self.field_callbacks.retain(|(owner, _), _| *owner != ref_id);
        self.instance_callbacks.remove(&ref_id);
        self.removal_callbacks.remove(&ref_id);
    }

    fn subscribe(&mut self, subscription: Subscription) -> ObserverId {
        let id = self.next_id;
        self.next_id += 1;
        self.subscriptions.insert(id, subscription);
        id
    }
}

fn remove_callback<K: std::hash::Hash + Eq, C>(
    table: &mut HashMap<K, Vec<(ObserverId, C)>>,
    key: &K,
    id: ObserverId,
) {
    if let Some(callbacks) = table.get_mut(key) {
        callbacks.retain(|(existing, _)| *existing != id);
        if callbacks.is_empty() {
            table.remove(key);
        }
    }
}
