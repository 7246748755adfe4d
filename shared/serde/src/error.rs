use thiserror::Error;

/// Errors that can occur while reading values off the wire
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// Fewer bytes remain than the value being read requires
    #[error("Buffer underrun at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    BufferUnderrun {
        needed: usize,
        remaining: usize,
        offset: usize,
    },

    /// A header byte that cannot start the expected value
    #[error("Invalid prefix byte 0x{prefix:02x} while reading {expected}")]
    InvalidPrefix { prefix: u8, expected: &'static str },

    /// String payload is not valid UTF-8
    #[error("String starting at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },
}
