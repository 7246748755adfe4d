use crate::{byte_reader::ByteReader, byte_writer::ByteWrite, error::SerdeErr};

/// A type that can be written to and read from the wire.
pub trait Serde: Sized {
    /// Encodes self into the given writer
    fn ser(&self, writer: &mut dyn ByteWrite);

    /// Decodes a value at the reader's current position, advancing it
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr>;
}
