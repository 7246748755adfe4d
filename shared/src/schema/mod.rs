pub mod definition;
pub mod primitive_kind;
pub mod registry;
pub mod type_tag;
