use statesync_serde::{ByteWriter, Serde, WireNumber, WireUint};
use statesync_shared::{CollectionKey, Value, NIL};

/// Writes wire values the way the server encodes them
#[derive(Default)]
pub struct FixtureWriter {
    writer: ByteWriter,
}

impl FixtureWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn byte(&mut self, byte: u8) -> &mut Self {
        byte.ser(&mut self.writer);
        self
    }

    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        for byte in bytes {
            self.byte(*byte);
        }
        self
    }

    /// Counts, indices and identifiers
    pub fn uint(&mut self, value: u64) -> &mut Self {
        WireUint(value).ser(&mut self.writer);
        self
    }

    pub fn number(&mut self, value: f64) -> &mut Self {
        WireNumber(value).ser(&mut self.writer);
        self
    }

    pub fn string(&mut self, value: &str) -> &mut Self {
        value.to_string().ser(&mut self.writer);
        self
    }

    pub fn key(&mut self, key: &CollectionKey) -> &mut Self {
        match key {
            CollectionKey::Index(index) => self.uint(*index),
            CollectionKey::Name(name) => self.string(name),
        }
    }

    /// A primitive, `NIL` for `Value::Null`, or the bare id of a reference
    pub fn value(&mut self, value: &Value) -> &mut Self {
        match value {
            Value::Null => self.byte(NIL),
            Value::Boolean(value) => self.ser(value),
            Value::Int8(value) => self.ser(value),
            Value::UInt8(value) => self.ser(value),
            Value::Int16(value) => self.ser(value),
            Value::UInt16(value) => self.ser(value),
            Value::Int32(value) => self.ser(value),
            Value::UInt32(value) => self.ser(value),
            Value::Int64(value) => self.ser(value),
            Value::UInt64(value) => self.ser(value),
            Value::Float32(value) => self.ser(value),
            Value::Float64(value) => self.ser(value),
            Value::Number(value) => self.number(*value),
            Value::String(value) => self.string(value),
            Value::Ref(ref_id) => self.uint(u64::from(*ref_id)),
            Value::Collection(_) => panic!("collections are encoded by encode_snapshot"),
        }
    }

    pub fn len(&self) -> usize {
        self.writer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writer.is_empty()
    }

    pub fn to_bytes(self) -> Vec<u8> {
        self.writer.to_bytes()
    }

    fn ser<T: Serde>(&mut self, value: &T) -> &mut Self {
        value.ser(&mut self.writer);
        self
    }
}
