use std::{
    collections::{BTreeMap, HashSet},
    fmt, mem,
};

use indexmap::IndexMap;

use crate::{error::DecodeError, schema::type_tag::TypeTag, state::value::Value};

/// Wire address of a collection element: a position for sequences, a wire
/// assigned id for sets, a string for maps.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CollectionKey {
    Index(u64),
    Name(String),
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKey::Index(index) => write!(f, "{}", index),
            CollectionKey::Name(name) => f.write_str(name),
        }
    }
}

/// Container held by a collection-typed field.
///
/// Maps keep insertion order. Set elements are unique and addressed by the
/// id the server assigned when they were added.
#[derive(Clone, Debug, PartialEq)]
pub enum Collection {
    Sequence(Vec<Value>),
    Map(IndexMap<String, Value>),
    Set(BTreeMap<u64, Value>),
}

impl Collection {
    /// Empty container matching a collection tag
    pub fn empty_for(type_tag: &TypeTag) -> Option<Self> {
        match type_tag {
            TypeTag::Sequence(_) => Some(Collection::Sequence(Vec::new())),
            TypeTag::KeyedMap(_) => Some(Collection::Map(IndexMap::new())),
            TypeTag::UniqueSet(_) => Some(Collection::Set(BTreeMap::new())),
            TypeTag::Primitive(_) | TypeTag::NestedSchema(_) => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Collection::Sequence(_) => "sequence",
            Collection::Map(_) => "map",
            Collection::Set(_) => "set",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Collection::Sequence(elements) => elements.len(),
            Collection::Map(elements) => elements.len(),
            Collection::Set(elements) => elements.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &CollectionKey) -> Option<&Value> {
        match (self, key) {
            (Collection::Sequence(elements), CollectionKey::Index(index)) => {
                usize::try_from(*index).ok().and_then(|index| elements.get(index))
            }
            (Collection::Map(elements), CollectionKey::Name(name)) => elements.get(name),
            (Collection::Set(elements), CollectionKey::Index(id)) => elements.get(id),
            _ => None,
        }
    }

    pub fn values(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match self {
            Collection::Sequence(elements) => Box::new(elements.iter()),
            Collection::Map(elements) => Box::new(elements.values()),
            Collection::Set(elements) => Box::new(elements.values()),
        }
    }

    /// Elements with their wire keys, in container order
    pub fn entries(&self) -> Vec<(CollectionKey, &Value)> {
        match self {
            Collection::Sequence(elements) => elements
                .iter()
                .enumerate()
                .map(|(index, value)| (CollectionKey::Index(index as u64), value))
                .collect(),
            Collection::Map(elements) => elements
                .iter()
                .map(|(name, value)| (CollectionKey::Name(name.clone()), value))
                .collect(),
            Collection::Set(elements) => elements
                .iter()
                .map(|(id, value)| (CollectionKey::Index(*id), value))
                .collect(),
        }
    }

    /// Set decoded from a snapshot, elements numbered from 0 in wire order.
    /// Fails on the first element equal to an earlier one.
    pub fn set_from(elements: Vec<Value>) -> Result<Self, DecodeError> {
        if let Some(position) = first_duplicate(&elements) {
            return Err(DecodeError::mismatch(format!(
                "set element {} duplicates an existing element",
                position
            )));
        }
        Ok(Collection::Set((0u64..).zip(elements).collect()))
    }

    /// `ADD`: inserts at `key`. Sequences shift later elements up; maps and
    /// sets overwrite an existing entry and return it.
    pub fn insert(&mut self, key: CollectionKey, value: Value) -> Result<Option<Value>, DecodeError> {
        match (self, key) {
            (Collection::Sequence(elements), CollectionKey::Index(index)) => {
                let position = sequence_position(index, elements.len() + 1)?;
                elements.insert(position, value);
                Ok(None)
            }
            (Collection::Map(elements), CollectionKey::Name(name)) => Ok(elements.insert(name, value)),
            (Collection::Set(elements), CollectionKey::Index(id)) => {
                check_unique(elements, id, &value)?;
                Ok(elements.insert(id, value))
            }
            (collection, key) => Err(key_mismatch(collection, &key)),
        }
    }

    /// `REPLACE`: overwrites an existing element and returns the old one
    pub fn replace(&mut self, key: CollectionKey, value: Value) -> Result<Value, DecodeError> {
        let slot = match (self, &key) {
            (Collection::Sequence(elements), CollectionKey::Index(index)) => {
                let position = sequence_position(*index, elements.len())?;
                &mut elements[position]
            }
            (Collection::Map(elements), CollectionKey::Name(name)) => match elements.get_mut(name) {
                Some(slot) => slot,
                None => return Err(absent_key(&key)),
            },
            (Collection::Set(elements), CollectionKey::Index(id)) => {
                check_unique(elements, *id, &value)?;
                match elements.get_mut(id) {
                    Some(slot) => slot,
                    None => return Err(absent_key(&key)),
                }
            }
            (collection, key) => return Err(key_mismatch(collection, key)),
        };
        Ok(mem::replace(slot, value))
    }

    /// `DELETE`: removes the element at `key`, if present. Sequences shift
    /// later elements down.
    pub fn remove(&mut self, key: &CollectionKey) -> Result<Option<Value>, DecodeError> {
        match (self, key) {
            (Collection::Sequence(elements), CollectionKey::Index(index)) => {
                let removed = usize::try_from(*index)
                    .ok()
                    .filter(|index| *index < elements.len())
                    .map(|index| elements.remove(index));
                Ok(removed)
            }
            (Collection::Map(elements), CollectionKey::Name(name)) => Ok(elements.shift_remove(name)),
            (Collection::Set(elements), CollectionKey::Index(id)) => Ok(elements.remove(id)),
            (collection, key) => Err(key_mismatch(collection, key)),
        }
    }

    /// `CLEAR`: empties the container, returning its previous contents
    pub fn clear(&mut self) -> Collection {
        let empty = match self {
            Collection::Sequence(_) => Collection::Sequence(Vec::new()),
            Collection::Map(_) => Collection::Map(IndexMap::new()),
            Collection::Set(_) => Collection::Set(BTreeMap::new()),
        };
        mem::replace(self, empty)
    }
}

fn sequence_position(index: u64, bound: usize) -> Result<usize, DecodeError> {
    usize::try_from(index)
        .ok()
        .filter(|position| *position < bound)
        .ok_or_else(|| {
            DecodeError::mismatch(format!(
                "sequence index {} out of range (bound {})",
                index, bound
            ))
        })
}

fn check_unique(elements: &BTreeMap<u64, Value>, id: u64, value: &Value) -> Result<(), DecodeError> {
    let duplicate = elements
        .iter()
        .any(|(other_id, other)| *other_id != id && other == value);
    if duplicate {
        return Err(DecodeError::mismatch(format!(
            "set element {} duplicates an existing element",
            id
        )));
    }
    Ok(())
}

/// Hashable stand-in for an element, equal exactly when the values are.
/// NaN floats and nested collections have none and are compared directly.
#[derive(PartialEq, Eq, Hash)]
enum ElementKey<'v> {
    Scalar(u8, u64),
    Text(&'v str),
}

impl<'v> ElementKey<'v> {
    fn of(value: &'v Value) -> Option<Self> {
        let key = match value {
            Value::Null => ElementKey::Scalar(0, 0),
            Value::Boolean(value) => ElementKey::Scalar(1, u64::from(*value)),
            Value::Int8(value) => ElementKey::Scalar(2, *value as u64),
            Value::UInt8(value) => ElementKey::Scalar(3, u64::from(*value)),
            Value::Int16(value) => ElementKey::Scalar(4, *value as u64),
            Value::UInt16(value) => ElementKey::Scalar(5, u64::from(*value)),
            Value::Int32(value) => ElementKey::Scalar(6, *value as u64),
            Value::UInt32(value) => ElementKey::Scalar(7, u64::from(*value)),
            Value::Int64(value) => ElementKey::Scalar(8, *value as u64),
            Value::UInt64(value) => ElementKey::Scalar(9, *value),
            Value::Float32(value) => return float_key(10, f64::from(*value)),
            Value::Float64(value) => return float_key(11, *value),
            Value::Number(value) => return float_key(12, *value),
            Value::Ref(ref_id) => ElementKey::Scalar(13, u64::from(*ref_id)),
            Value::String(text) => ElementKey::Text(text),
            Value::Collection(_) => return None,
        };
        Some(key)
    }
}

fn float_key(tag: u8, value: f64) -> Option<ElementKey<'static>> {
    if value.is_nan() {
        None
    } else if value == 0.0 {
        // 0.0 and -0.0 compare equal
        Some(ElementKey::Scalar(tag, 0))
    } else {
        Some(ElementKey::Scalar(tag, value.to_bits()))
    }
}

fn first_duplicate(elements: &[Value]) -> Option<usize> {
    let mut seen = HashSet::with_capacity(elements.len());
    let mut unkeyed: Vec<&Value> = Vec::new();
    for (position, value) in elements.iter().enumerate() {
        let duplicate = match ElementKey::of(value) {
            Some(key) => !seen.insert(key),
            None => {
                let duplicate = unkeyed.iter().any(|other| *other == value);
                unkeyed.push(value);
                duplicate
            }
        };
        if duplicate {
            return Some(position);
        }
    }
    None
}

fn key_mismatch(collection: &Collection, key: &CollectionKey) -> DecodeError {
    DecodeError::mismatch(format!(
        "key '{}' cannot address a {}",
        key,
        collection.kind_name()
    ))
}

fn absent_key(key: &CollectionKey) -> DecodeError {
    DecodeError::mismatch(format!("no element at key '{}' to replace", key))
}
