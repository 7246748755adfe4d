use crate::{byte_reader::ByteReader, byte_writer::ByteWrite, error::SerdeErr, serde::Serde};

// MessagePack-shaped numbers. Headers follow MessagePack, payloads following
// a header are little-endian like every other fixed-width value on the wire.

const UINT8: u8 = 0xcc;
const UINT16: u8 = 0xcd;
const UINT32: u8 = 0xce;
const UINT64: u8 = 0xcf;
const INT8: u8 = 0xd0;
const INT16: u8 = 0xd1;
const INT32: u8 = 0xd2;
const INT64: u8 = 0xd3;
const FLOAT32: u8 = 0xca;
const FLOAT64: u8 = 0xcb;

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// The dynamically sized `number` kind: an IEEE double carried in the most
/// compact encoding that reproduces it exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireNumber(pub f64);

impl Serde for WireNumber {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        let value = self.0;
        let integral = value.is_finite()
            && value.fract() == 0.0
            && value.abs() <= MAX_SAFE_INTEGER
            && !(value == 0.0 && value.is_sign_negative());

        if !integral {
            writer.write_byte(FLOAT64);
            value.ser(writer);
            return;
        }

        let int = value as i64;
        if int >= 0 {
            WireUint(int as u64).ser(writer);
        } else if int >= -32 {
            writer.write_byte(int as u8);
        } else if int >= i64::from(i8::MIN) {
            writer.write_byte(INT8);
            (int as i8).ser(writer);
        } else if int >= i64::from(i16::MIN) {
            writer.write_byte(INT16);
            (int as i16).ser(writer);
        } else if int >= i64::from(i32::MIN) {
            writer.write_byte(INT32);
            (int as i32).ser(writer);
        } else {
            writer.write_byte(INT64);
            int.ser(writer);
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let prefix = reader.read_byte()?;
        let value = match prefix {
            0x00..=0x7f => f64::from(prefix),
            0xe0..=0xff => f64::from(prefix as i8),
            FLOAT32 => f64::from(f32::de(reader)?),
            FLOAT64 => f64::de(reader)?,
            UINT8 => f64::from(u8::de(reader)?),
            UINT16 => f64::from(u16::de(reader)?),
            UINT32 => f64::from(u32::de(reader)?),
            UINT64 => u64::de(reader)? as f64,
            INT8 => f64::from(i8::de(reader)?),
            INT16 => f64::from(i16::de(reader)?),
            INT32 => f64::from(i32::de(reader)?),
            INT64 => i64::de(reader)? as f64,
            _ => {
                return Err(SerdeErr::InvalidPrefix {
                    prefix,
                    expected: "number",
                })
            }
        };
        Ok(Self(value))
    }
}

/// An unsigned integer in MessagePack form: counts, indices and identifiers.
/// Negative and floating point encodings are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireUint(pub u64);

impl Serde for WireUint {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        let value = self.0;
        if value <= 0x7f {
            writer.write_byte(value as u8);
        } else if let Ok(byte) = u8::try_from(value) {
            writer.write_byte(UINT8);
            byte.ser(writer);
        } else if let Ok(short) = u16::try_from(value) {
            writer.write_byte(UINT16);
            short.ser(writer);
        } else if let Ok(word) = u32::try_from(value) {
            writer.write_byte(UINT32);
            word.ser(writer);
        } else {
            writer.write_byte(UINT64);
            value.ser(writer);
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let prefix = reader.read_byte()?;
        let value = match prefix {
            0x00..=0x7f => u64::from(prefix),
            UINT8 => u64::from(u8::de(reader)?),
            UINT16 => u64::from(u16::de(reader)?),
            UINT32 => u64::from(u32::de(reader)?),
            UINT64 => u64::de(reader)?,
            _ => {
                return Err(SerdeErr::InvalidPrefix {
                    prefix,
                    expected: "unsigned integer",
                })
            }
        };
        Ok(Self(value))
    }
}
