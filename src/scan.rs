//! Bounded rune scanning over buffer accessors.
//!
//! Searches examine at most `limit` runes so that word and line jumps stay
//! cheap on very large buffers. The two "not found" outcomes are kept apart:
//! [`ScanError::Eof`] means the buffer boundary was reached, while
//! [`ScanError::LimitReached`] means the search gave up early and carries the
//! offset where it stopped.

use thiserror::Error;

use crate::buffer::{BufferError, Reader};

/// Default number of runes examined by interactive scans.
pub const DEFAULT_SCAN_LIMIT: usize = 1000;

const CHUNK_SIZE: usize = 4096;

/// Outcomes of a scan that did not find a match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The buffer boundary was reached before a match.
    #[error("reached buffer boundary")]
    Eof,
    /// More than `limit` runes were examined; scanning stopped at `index`.
    #[error("scan limit reached at index {index}")]
    LimitReached { index: usize },
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

pub type Result<T> = std::result::Result<T, ScanError>;

/// Scan direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Find the first rune at or after `from` (or ending at or before `from`
/// when scanning backward) for which `pred` returns true.
///
/// Returns the start index of the matching rune and its byte size.
///
/// # Errors
/// [`ScanError::Eof`] at the buffer boundary, [`ScanError::LimitReached`]
/// after `limit` runes without a match, [`ScanError::Buffer`] on decode
/// failures.
pub fn index_func<R, F>(
    rw: &R,
    from: usize,
    limit: usize,
    direction: Direction,
    mut pred: F,
) -> Result<(usize, usize)>
where
    R: Reader + ?Sized,
    F: FnMut(char) -> bool,
{
    let len = rw.len();
    if from > len {
        return Err(BufferError::OutOfRange {
            index: from,
            len: 0,
            buffer_len: len,
        }
        .into());
    }
    let mut index = from;
    let mut examined = 0;
    loop {
        let at_boundary = match direction {
            Direction::Forward => index >= len,
            Direction::Backward => index == 0,
        };
        if at_boundary {
            return Err(ScanError::Eof);
        }
        if examined >= limit {
            return Err(ScanError::LimitReached { index });
        }
        examined += 1;
        match direction {
            Direction::Forward => {
                let (ch, size) = rw.read_rune_at(index)?;
                if pred(ch) {
                    return Ok((index, size));
                }
                index += size;
            }
            Direction::Backward => {
                let (ch, size) = rw.read_last_rune_at(index)?;
                index -= size;
                if pred(ch) {
                    return Ok((index, size));
                }
            }
        }
    }
}

/// Backward mirror of [`index_func`], scanning runes that end at or before
/// `from`.
///
/// # Errors
/// Same outcomes as [`index_func`].
pub fn last_index_func<R, F>(rw: &R, from: usize, limit: usize, pred: F) -> Result<(usize, usize)>
where
    R: Reader + ?Sized,
    F: FnMut(char) -> bool,
{
    index_func(rw, from, limit, Direction::Backward, pred)
}

/// Start of the line containing `index`: the offset just after the nearest
/// newline strictly before `index`, or 0.
///
/// # Errors
/// `OutOfRange` if `index` is past the end of the buffer.
pub fn line_start_index<R: Reader + ?Sized>(rw: &R, index: usize) -> Result<usize> {
    if index > rw.len() {
        return Err(crate::buffer::out_of_range(index, 0, rw.len()).into());
    }
    let mut end = index;
    while end > 0 {
        let start = end.saturating_sub(CHUNK_SIZE);
        let chunk = rw.read_at(start, end - start)?;
        if let Some(pos) = chunk.iter().rposition(|&b| b == b'\n') {
            return Ok(start + pos + 1);
        }
        end = start;
    }
    Ok(0)
}

/// End of the line containing `index`: the offset just after the nearest
/// newline at or after `index` (with `true`), or the buffer length (with
/// `false`) when the line is not newline-terminated.
///
/// # Errors
/// `OutOfRange` if `index` is past the end of the buffer.
pub fn line_end_index<R: Reader + ?Sized>(rw: &R, index: usize) -> Result<(usize, bool)> {
    let len = rw.len();
    if index > len {
        return Err(crate::buffer::out_of_range(index, 0, len).into());
    }
    let mut start = index;
    while start < len {
        let n = (len - start).min(CHUNK_SIZE);
        let chunk = rw.read_at(start, n)?;
        if let Some(pos) = chunk.iter().position(|&b| b == b'\n') {
            return Ok((start + pos + 1, true));
        }
        start += n;
    }
    Ok((len, false))
}

/// Expand `[a, b]` outward to whole lines.
///
/// Returns the start of the first touched line, the end of the last touched
/// line, and whether that end sits right after a newline. A range ending at
/// the start of a line (just after a newline) does not touch that line.
///
/// # Errors
/// `OutOfRange` if either index is past the end of the buffer.
pub fn lines_indexes<R: Reader + ?Sized>(rw: &R, a: usize, b: usize) -> Result<(usize, usize, bool)> {
    let start = line_start_index(rw, a)?;
    if b > a && rw.read_at(b - 1, 1)? == b"\n" {
        return Ok((start, b, true));
    }
    let (end, newline) = line_end_index(rw, b)?;
    Ok((start, end, newline))
}

/// Whether the bytes at `index` start with `prefix`. False when fewer bytes
/// remain than the prefix holds.
pub fn has_prefix<R: Reader + ?Sized>(rw: &R, index: usize, prefix: &[u8]) -> bool {
    rw.read_at(index, prefix.len())
        .is_ok_and(|bytes| bytes == prefix)
}

/// Letters, digits and underscore.
pub fn is_word_rune(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Whitespace other than a newline.
pub fn is_space_except_newline(ch: char) -> bool {
    ch.is_whitespace() && ch != '\n'
}

/// Stateful predicate for word jumps.
///
/// The first rune only sets the state. After that it matches on the first
/// transition out of a word, or on a newline seen while outside a word: the
/// next word edge or line start, whichever comes first.
pub fn edge_of_next_word_or_newline() -> impl FnMut(char) -> bool {
    let mut first = true;
    let mut in_word = false;
    move |ch| {
        let word = is_word_rune(ch);
        if first {
            first = false;
            in_word = word;
            return false;
        }
        if in_word {
            return !word;
        }
        in_word = word;
        ch == '\n'
    }
}
