//! Random-access byte buffers.
//!
//! The [`ReadWriter`] trait is the contract every editing layer is written
//! against: byte reads, rune-aware reads in both directions, and positional
//! insert/delete. Offsets are byte offsets with `0 <= index <= len()`.
//!
//! Insert and delete do not check rune boundaries. A caller that splits a
//! multi-byte rune gets a buffer whose rune reads fail at that offset.

mod bytes;
mod rope;

pub use bytes::ByteBuffer;
pub use rope::RopeBuffer;

use thiserror::Error;

/// Errors produced by buffer accessors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// The requested span is outside `[0, buffer_len]`.
    #[error("range {index}+{len} out of bounds (buffer length {buffer_len})")]
    OutOfRange {
        index: usize,
        len: usize,
        buffer_len: usize,
    },
    /// The bytes at `index` are not a valid UTF-8 sequence.
    #[error("invalid utf-8 encoding at index {index}")]
    InvalidEncoding { index: usize },
}

pub type Result<T> = std::result::Result<T, BufferError>;

/// Read side of a buffer accessor.
pub trait Reader {
    /// Length of the buffer in bytes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read `n` bytes starting at `index`.
    ///
    /// # Errors
    /// `OutOfRange` if `index + n` exceeds the buffer length.
    fn read_at(&self, index: usize, n: usize) -> Result<Vec<u8>>;

    /// Decode the rune starting at `index`, returning it with its byte size.
    ///
    /// # Errors
    /// `OutOfRange` at or past the end, `InvalidEncoding` on malformed bytes.
    fn read_rune_at(&self, index: usize) -> Result<(char, usize)> {
        let len = self.len();
        if index >= len {
            return Err(out_of_range(index, 1, len));
        }
        let n = (len - index).min(4);
        let bytes = self.read_at(index, n)?;
        decode_rune(&bytes).ok_or(BufferError::InvalidEncoding { index })
    }

    /// Decode the rune ending at `index` (scanning backward).
    ///
    /// # Errors
    /// `OutOfRange` at the start or past the end, `InvalidEncoding` on
    /// malformed bytes.
    fn read_last_rune_at(&self, index: usize) -> Result<(char, usize)> {
        let len = self.len();
        if index == 0 || index > len {
            return Err(out_of_range(index, 0, len));
        }
        let n = index.min(4);
        let bytes = self.read_at(index - n, n)?;
        decode_last_rune(&bytes).ok_or(BufferError::InvalidEncoding { index })
    }
}

/// Write side of a buffer accessor.
pub trait Writer {
    /// Insert `bytes` at `index`.
    ///
    /// # Errors
    /// `OutOfRange` if `index` is past the end of the buffer.
    fn insert(&mut self, index: usize, bytes: &[u8]) -> Result<()>;

    /// Delete `len` bytes starting at `index`.
    ///
    /// # Errors
    /// `OutOfRange` if `index + len` is past the end of the buffer.
    fn delete(&mut self, index: usize, len: usize) -> Result<()>;
}

/// A buffer that can be both read and written.
pub trait ReadWriter: Reader + Writer {}

impl<T: Reader + Writer + ?Sized> ReadWriter for T {}

impl<R: Reader + ?Sized> Reader for &R {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn read_at(&self, index: usize, n: usize) -> Result<Vec<u8>> {
        (**self).read_at(index, n)
    }

    fn read_rune_at(&self, index: usize) -> Result<(char, usize)> {
        (**self).read_rune_at(index)
    }

    fn read_last_rune_at(&self, index: usize) -> Result<(char, usize)> {
        (**self).read_last_rune_at(index)
    }
}

impl<R: Reader + ?Sized> Reader for &mut R {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn read_at(&self, index: usize, n: usize) -> Result<Vec<u8>> {
        (**self).read_at(index, n)
    }

    fn read_rune_at(&self, index: usize) -> Result<(char, usize)> {
        (**self).read_rune_at(index)
    }

    fn read_last_rune_at(&self, index: usize) -> Result<(char, usize)> {
        (**self).read_last_rune_at(index)
    }
}

impl<W: Writer + ?Sized> Writer for &mut W {
    fn insert(&mut self, index: usize, bytes: &[u8]) -> Result<()> {
        (**self).insert(index, bytes)
    }

    fn delete(&mut self, index: usize, len: usize) -> Result<()> {
        (**self).delete(index, len)
    }
}

pub(crate) const fn out_of_range(index: usize, len: usize, buffer_len: usize) -> BufferError {
    BufferError::OutOfRange {
        index,
        len,
        buffer_len,
    }
}

/// Check that `index + len` lies inside a buffer of `buffer_len` bytes.
pub(crate) const fn check_range(index: usize, len: usize, buffer_len: usize) -> Result<()> {
    match index.checked_add(len) {
        Some(end) if end <= buffer_len => Ok(()),
        _ => Err(out_of_range(index, len, buffer_len)),
    }
}

/// Expected sequence length from a UTF-8 leading byte.
const fn utf8_width(b: u8) -> Option<usize> {
    match b {
        0x00..=0x7f => Some(1),
        0xc2..=0xdf => Some(2),
        0xe0..=0xef => Some(3),
        0xf0..=0xf4 => Some(4),
        _ => None,
    }
}

/// Decode the first rune in `bytes`.
fn decode_rune(bytes: &[u8]) -> Option<(char, usize)> {
    let width = utf8_width(*bytes.first()?)?;
    let seq = bytes.get(..width)?;
    let ch = std::str::from_utf8(seq).ok()?.chars().next()?;
    Some((ch, width))
}

/// Decode the last rune in `bytes`.
fn decode_last_rune(bytes: &[u8]) -> Option<(char, usize)> {
    // Walk back over continuation bytes to the leading byte.
    let end = bytes.len();
    let lower = end.saturating_sub(4);
    let mut start = end.checked_sub(1)?;
    while start > lower && bytes[start] & 0xc0 == 0x80 {
        start -= 1;
    }
    let (ch, width) = decode_rune(&bytes[start..])?;
    (start + width == end).then_some((ch, width))
}
