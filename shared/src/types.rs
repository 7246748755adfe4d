pub type TypeId = u16;
pub type RefId = u32;
pub type FieldIndex = u16;

/// Reference id of the root instance of every state graph
pub const ROOT_REF_ID: RefId = 0;
