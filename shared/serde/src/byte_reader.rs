use crate::error::SerdeErr;

/// A forward-only cursor over an immutable byte buffer.
///
/// Owned by exactly one decode or patch invocation. A failed `read_byte`,
/// `read_bytes` or `read_array` leaves the cursor where it was. Composite
/// values that read a header first may have consumed that header when their
/// payload underruns.
pub struct ByteReader<'b> {
    buffer: &'b [u8],
    offset: usize,
}

impl<'b> ByteReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    /// Returns the next byte without consuming it
    pub fn peek_byte(&self) -> Option<u8> {
        self.buffer.get(self.offset).copied()
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        let byte = self.peek_byte().ok_or_else(|| self.underrun(1))?;
        self.offset += 1;
        Ok(byte)
    }

    /// Reads `len` bytes as a slice borrowed from the underlying buffer
    pub fn read_bytes(&mut self, len: usize) -> Result<&'b [u8], SerdeErr> {
        if len > self.remaining() {
            return Err(self.underrun(len));
        }
        let start = self.offset;
        self.offset += len;
        Ok(&self.buffer[start..self.offset])
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], SerdeErr> {
        let mut output = [0u8; N];
        output.copy_from_slice(self.read_bytes(N)?);
        Ok(output)
    }

    fn underrun(&self, needed: usize) -> SerdeErr {
        SerdeErr::BufferUnderrun {
            needed,
            remaining: self.remaining(),
            offset: self.offset,
        }
    }
}
