use crate::{schema::primitive_kind::PrimitiveKind, types::TypeId};

/// Declared shape of a field or of a collection's elements.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Primitive(PrimitiveKind),
    NestedSchema(TypeId),
    Sequence(Box<TypeTag>),
    KeyedMap(Box<TypeTag>),
    UniqueSet(Box<TypeTag>),
}

impl TypeTag {
    pub fn sequence_of(element: TypeTag) -> Self {
        TypeTag::Sequence(Box::new(element))
    }

    pub fn map_of(element: TypeTag) -> Self {
        TypeTag::KeyedMap(Box::new(element))
    }

    pub fn set_of(element: TypeTag) -> Self {
        TypeTag::UniqueSet(Box::new(element))
    }

    pub fn is_collection(&self) -> bool {
        self.element().is_some()
    }

    /// Element type of a collection tag
    pub fn element(&self) -> Option<&TypeTag> {
        match self {
            TypeTag::Sequence(element) | TypeTag::KeyedMap(element) | TypeTag::UniqueSet(element) => {
                Some(element)
            }
            TypeTag::Primitive(_) | TypeTag::NestedSchema(_) => None,
        }
    }

    /// The schema type this tag ultimately refers to, if any
    pub fn referenced_type(&self) -> Option<TypeId> {
        match self {
            TypeTag::NestedSchema(type_id) => Some(*type_id),
            TypeTag::Primitive(_) => None,
            _ => self.element().and_then(TypeTag::referenced_type),
        }
    }

    /// Parses the handshake representation of a field type.
    ///
    /// `"ref"`, `"array"`, `"map"` and `"set"` take their schema type from
    /// `referenced_type`; `"array:<element>"` style names carry their element
    /// type inline.
    pub fn parse(name: &str, referenced_type: Option<TypeId>) -> Option<Self> {
        if let Some(kind) = PrimitiveKind::from_name(name) {
            return Some(TypeTag::Primitive(kind));
        }

        let (container, element) = match name.split_once(':') {
            Some((container, element)) => (container, Some(element)),
            None => (name, None),
        };

        let element = match element {
            Some(element) => TypeTag::parse(element, referenced_type)?,
            None => TypeTag::NestedSchema(referenced_type?),
        };

        match container {
            "ref" if name == "ref" => Some(element),
            "array" => Some(TypeTag::sequence_of(element)),
            "map" => Some(TypeTag::map_of(element)),
            "set" => Some(TypeTag::set_of(element)),
            _ => None,
        }
    }

    /// Handshake representation, the inverse of [`TypeTag::parse`]
    pub fn wire_name(&self) -> String {
        let (container, element) = match self {
            TypeTag::Primitive(kind) => return kind.name().to_string(),
            TypeTag::NestedSchema(_) => return "ref".to_string(),
            TypeTag::Sequence(element) => ("array", element),
            TypeTag::KeyedMap(element) => ("map", element),
            TypeTag::UniqueSet(element) => ("set", element),
        };
        match element.as_ref() {
            TypeTag::NestedSchema(_) => container.to_string(),
            element => format!("{}:{}", container, element.wire_name()),
        }
    }
}
