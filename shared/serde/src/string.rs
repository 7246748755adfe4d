use crate::{byte_reader::ByteReader, byte_writer::ByteWrite, error::SerdeErr, serde::Serde};

const STR8: u8 = 0xd9;
const STR16: u8 = 0xda;
const STR32: u8 = 0xdb;

impl Serde for String {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        let bytes = self.as_bytes();
        let len = bytes.len();
        if len < 32 {
            writer.write_byte(0xa0 | len as u8);
        } else if let Ok(len) = u8::try_from(len) {
            writer.write_byte(STR8);
            len.ser(writer);
        } else if let Ok(len) = u16::try_from(len) {
            writer.write_byte(STR16);
            len.ser(writer);
        } else {
            writer.write_byte(STR32);
            // lengths beyond u32 are not representable on the wire
            (len as u32).ser(writer);
        }
        writer.write_bytes(bytes);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let prefix = reader.read_byte()?;
        let len = match prefix {
            0xa0..=0xbf => usize::from(prefix & 0x1f),
            STR8 => usize::from(u8::de(reader)?),
            STR16 => usize::from(u16::de(reader)?),
            STR32 => u32::de(reader)? as usize,
            _ => {
                return Err(SerdeErr::InvalidPrefix {
                    prefix,
                    expected: "string",
                })
            }
        };

        let offset = reader.offset();
        let bytes = reader.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| SerdeErr::InvalidUtf8 { offset })
    }
}
