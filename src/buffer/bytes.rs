use super::{Reader, Result, Writer, check_range};

/// A buffer backed by a contiguous `Vec<u8>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteBuffer {
    buf: Vec<u8>,
}

impl ByteBuffer {
    /// Create a buffer holding `bytes`.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self { buf: bytes.into() }
    }

    /// Create a buffer from text.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.as_bytes())
    }

    /// The full content.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// The full content as text, replacing malformed sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl Reader for ByteBuffer {
    fn len(&self) -> usize {
        self.buf.len()
    }

    fn read_at(&self, index: usize, n: usize) -> Result<Vec<u8>> {
        check_range(index, n, self.buf.len())?;
        Ok(self.buf[index..index + n].to_vec())
    }
}

impl Writer for ByteBuffer {
    fn insert(&mut self, index: usize, bytes: &[u8]) -> Result<()> {
        check_range(index, 0, self.buf.len())?;
        self.buf.splice(index..index, bytes.iter().copied());
        Ok(())
    }

    fn delete(&mut self, index: usize, len: usize) -> Result<()> {
        check_range(index, len, self.buf.len())?;
        self.buf.drain(index..index + len);
        Ok(())
    }
}
