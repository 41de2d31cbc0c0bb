use ropey::Rope;

use super::{BufferError, Reader, Result, Writer, check_range};

/// A buffer backed by a rope, for large documents.
///
/// A rope only holds valid UTF-8, so on top of the usual range checks this
/// accessor rejects inserts of malformed bytes and offsets that fall inside a
/// multi-byte rune with [`BufferError::InvalidEncoding`].
#[derive(Clone, Default)]
pub struct RopeBuffer {
    rope: Rope,
}

impl RopeBuffer {
    /// Create a buffer from text.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// The full text content.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Number of lines, counting a trailing empty line.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Convert a byte offset to a char offset, rejecting mid-rune offsets.
    fn char_index(&self, byte_index: usize) -> Result<usize> {
        let char_index = self.rope.byte_to_char(byte_index);
        if self.rope.char_to_byte(char_index) == byte_index {
            Ok(char_index)
        } else {
            Err(BufferError::InvalidEncoding { index: byte_index })
        }
    }
}

impl Reader for RopeBuffer {
    fn len(&self) -> usize {
        self.rope.len_bytes()
    }

    fn read_at(&self, index: usize, n: usize) -> Result<Vec<u8>> {
        check_range(index, n, self.rope.len_bytes())?;
        Ok(self.rope.bytes_at(index).take(n).collect())
    }
}

impl Writer for RopeBuffer {
    fn insert(&mut self, index: usize, bytes: &[u8]) -> Result<()> {
        check_range(index, 0, self.rope.len_bytes())?;
        let text = std::str::from_utf8(bytes).map_err(|err| BufferError::InvalidEncoding {
            index: index + err.valid_up_to(),
        })?;
        let at = self.char_index(index)?;
        self.rope.insert(at, text);
        Ok(())
    }

    fn delete(&mut self, index: usize, len: usize) -> Result<()> {
        check_range(index, len, self.rope.len_bytes())?;
        let start = self.char_index(index)?;
        let end = self.char_index(index + len)?;
        self.rope.remove(start..end);
        Ok(())
    }
}

impl std::fmt::Debug for RopeBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RopeBuffer")
            .field(
                "rope",
                &format_args!(
                    "Rope({} bytes, {} lines)",
                    self.rope.len_bytes(),
                    self.rope.len_lines()
                ),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ByteBuffer;

    #[test]
    fn test_insert_delete_sequence_matches_byte_buffer() {
        let mut rope = RopeBuffer::from_text("0123");
        let mut bytes = ByteBuffer::from_text("0123");
        for (i, s) in [(1, "ab"), (5, "ab"), (0, "é")] {
            rope.insert(i, s.as_bytes()).unwrap();
            bytes.insert(i, s.as_bytes()).unwrap();
            assert_eq!(rope.text(), bytes.text());
        }
        for (i, n) in [(0, 2), (1, 2)] {
            rope.delete(i, n).unwrap();
            bytes.delete(i, n).unwrap();
            assert_eq!(rope.text(), bytes.text());
        }
    }

    #[test]
    fn test_reads_use_byte_offsets() {
        let buf = RopeBuffer::from_text("héllo\nwörld");
        assert_eq!(buf.len(), 13);
        assert_eq!(buf.read_at(1, 2).unwrap(), "é".as_bytes());
        assert_eq!(buf.read_rune_at(1).unwrap(), ('é', 2));
        assert_eq!(buf.read_last_rune_at(3).unwrap(), ('é', 2));
        assert_eq!(buf.line_count(), 2);
    }

    #[test]
    fn test_insert_inside_rune_is_rejected() {
        let mut buf = RopeBuffer::from_text("é");
        assert_eq!(
            buf.insert(1, b"x"),
            Err(BufferError::InvalidEncoding { index: 1 })
        );
        assert_eq!(buf.text(), "é");
    }

    #[test]
    fn test_insert_malformed_bytes_is_rejected() {
        let mut buf = RopeBuffer::from_text("ab");
        assert_eq!(
            buf.insert(1, &[b'x', 0xff]),
            Err(BufferError::InvalidEncoding { index: 2 })
        );
        assert_eq!(buf.text(), "ab");
    }

    #[test]
    fn test_delete_out_of_range() {
        let mut buf = RopeBuffer::from_text("ab");
        assert!(matches!(
            buf.delete(1, 5),
            Err(BufferError::OutOfRange { .. })
        ));
    }
}
