use crate::buffer::{Reader, ReadWriter, Writer};
use crate::clipboard::{Clipboard, ClipboardKind};
use crate::cursor::TextCursor;
use crate::scan::{self, DEFAULT_SCAN_LIMIT, Direction, ScanError};

use super::Result;

/// Insert `s` at the cursor, replacing the selection, and move the cursor
/// past it.
///
/// # Errors
/// Propagates buffer failures.
pub fn insert_string<B: ReadWriter>(tc: &mut TextCursor<B>, s: &str) -> Result<()> {
    tc.edit(|tc| replace_selection(tc, s.as_bytes()))
}

/// Paste text that arrived from a clipboard.
///
/// # Errors
/// Propagates buffer failures.
pub fn paste_str<B: ReadWriter>(tc: &mut TextCursor<B>, s: &str) -> Result<()> {
    if s.is_empty() {
        return Ok(());
    }
    insert_string(tc, s)
}

fn replace_selection<B: ReadWriter>(tc: &mut TextCursor<B>, bytes: &[u8]) -> Result<()> {
    delete_selection(tc)?;
    let ci = tc.index();
    tc.rw().insert(ci, bytes)?;
    tc.set_index(ci + bytes.len());
    Ok(())
}

/// Delete the selection, if any, leaving the cursor at its start.
fn delete_selection<B: ReadWriter>(tc: &mut TextCursor<B>) -> Result<bool> {
    if !tc.selection_on() {
        return Ok(false);
    }
    let (a, b) = tc.selection_indexes();
    tc.rw().delete(a, b - a)?;
    tc.set_selection_off();
    tc.set_index(a);
    Ok(true)
}

/// Delete the selection, or the rune before the cursor.
///
/// # Errors
/// `OutOfRange` at the start of the buffer, decode failures otherwise.
pub fn backspace<B: ReadWriter>(tc: &mut TextCursor<B>) -> Result<()> {
    tc.edit(|tc| {
        if delete_selection(tc)? {
            return Ok(());
        }
        let ci = tc.index();
        let (_, size) = tc.view().read_last_rune_at(ci)?;
        tc.rw().delete(ci - size, size)?;
        tc.set_index(ci - size);
        Ok(())
    })
}

/// Delete the selection, or the rune at the cursor.
///
/// # Errors
/// `OutOfRange` at the end of the buffer, decode failures otherwise.
pub fn delete<B: ReadWriter>(tc: &mut TextCursor<B>) -> Result<()> {
    tc.edit(|tc| {
        if delete_selection(tc)? {
            return Ok(());
        }
        let ci = tc.index();
        let (_, size) = tc.view().read_rune_at(ci)?;
        tc.rw().delete(ci, size)?;
        Ok(())
    })
}

/// Insert a newline followed by the current line's leading whitespace.
///
/// # Errors
/// Propagates buffer and scan failures.
pub fn auto_indent<B: ReadWriter>(tc: &mut TextCursor<B>) -> Result<()> {
    let ci = tc.index();
    let start = scan::line_start_index(tc.view(), ci)?;
    let found = scan::index_func(tc.view(), start, DEFAULT_SCAN_LIMIT, Direction::Forward, |ch| {
        !scan::is_space_except_newline(ch)
    });
    let end = match found {
        Ok((i, _)) => i,
        Err(ScanError::Eof) => tc.len(),
        Err(ScanError::LimitReached { index }) => index,
        Err(err) => return Err(err.into()),
    };
    let mut text = b"\n".to_vec();
    text.extend(tc.view().read_at(start, end.min(ci) - start)?);
    tc.edit(|tc| replace_selection(tc, &text))
}

/// Indent the selected lines by `indent`, or insert it at the cursor.
///
/// # Errors
/// Propagates buffer failures.
pub fn tab_right<B: ReadWriter>(tc: &mut TextCursor<B>, indent: &str) -> Result<()> {
    if !tc.selection_on() {
        return insert_string(tc, indent);
    }
    let indent = indent.as_bytes();
    tc.edit(|tc| {
        let (a, mut b, newline) = tc.lines_indexes()?;
        let mut i = a;
        while i < b {
            tc.rw().insert(i, indent)?;
            b += indent.len();
            let (u, _) = scan::line_end_index(tc.view(), i)?;
            i = u;
        }
        select_lines(tc, a, b, newline);
        Ok(())
    })
}

/// Remove one `indent` from the start of each touched line.
///
/// # Errors
/// Propagates buffer failures.
pub fn tab_left<B: ReadWriter>(tc: &mut TextCursor<B>, indent: &str) -> Result<()> {
    let indent = indent.as_bytes();
    if indent.is_empty() {
        return Ok(());
    }
    tc.edit(|tc| {
        let (a, mut b, newline) = tc.lines_indexes()?;
        let mut ci = tc.index();
        let mut i = a;
        while i < b {
            if scan::has_prefix(tc.view(), i, indent) {
                tc.rw().delete(i, indent.len())?;
                b -= indent.len();
                if ci > i {
                    ci = ci.saturating_sub(indent.len()).max(i);
                }
            }
            let (u, _) = scan::line_end_index(tc.view(), i)?;
            i = u;
        }
        if tc.selection_on() {
            select_lines(tc, a, b, newline);
        } else {
            tc.set_index(ci);
        }
        Ok(())
    })
}

/// Duplicate the touched lines below themselves and select the copy.
///
/// # Errors
/// Propagates buffer failures.
pub fn duplicate_lines<B: ReadWriter>(tc: &mut TextCursor<B>) -> Result<()> {
    tc.edit(|tc| {
        let (a, b, newline) = tc.lines_indexes()?;
        let mut block = tc.view().read_at(a, b - a)?;
        let start = if newline {
            b
        } else {
            block.insert(0, b'\n');
            b + 1
        };
        tc.rw().insert(b, &block)?;
        let end = b + block.len();
        select_lines(tc, start, end, newline);
        Ok(())
    })
}

/// Remove the touched lines, including their newline.
///
/// # Errors
/// Propagates buffer failures.
pub fn remove_lines<B: ReadWriter>(tc: &mut TextCursor<B>) -> Result<()> {
    tc.edit(|tc| {
        let (a, b, _) = tc.lines_indexes()?;
        tc.rw().delete(a, b - a)?;
        tc.set_selection_off();
        tc.set_index(a);
        Ok(())
    })
}

/// Swap the touched lines with the line above.
///
/// # Errors
/// Propagates buffer failures.
pub fn move_line_up<B: ReadWriter>(tc: &mut TextCursor<B>) -> Result<()> {
    let (a, b, newline) = tc.lines_indexes()?;
    if a == 0 {
        return Ok(());
    }
    tc.edit(|tc| {
        let prev = scan::line_start_index(tc.view(), a - 1)?;
        let mut block = tc.view().read_at(a, b - a)?;
        if newline {
            tc.rw().delete(a, b - a)?;
        } else {
            // Last line: take the preceding newline with it.
            tc.rw().delete(a - 1, b - a + 1)?;
            block.push(b'\n');
        }
        tc.rw().insert(prev, &block)?;
        shift_cursor(tc, |i| i - (a - prev));
        Ok(())
    })
}

/// Swap the touched lines with the line below.
///
/// # Errors
/// Propagates buffer failures.
pub fn move_line_down<B: ReadWriter>(tc: &mut TextCursor<B>) -> Result<()> {
    let (a, b, newline) = tc.lines_indexes()?;
    if !newline || b >= tc.len() {
        return Ok(());
    }
    tc.edit(|tc| {
        let (c, next_newline) = scan::line_end_index(tc.view(), b)?;
        let mut next = tc.view().read_at(b, c - b)?;
        let shift = if next_newline {
            tc.rw().delete(b, c - b)?;
            c - b
        } else {
            // Next line is the last one: move our newline after it.
            tc.rw().delete(b - 1, c - b + 1)?;
            next.push(b'\n');
            c - b + 1
        };
        tc.rw().insert(a, &next)?;
        shift_cursor(tc, |i| i + shift);
        Ok(())
    })
}

/// Copy the selection to the clipboard.
///
/// # Errors
/// Propagates read and clipboard failures.
pub fn copy<B: ReadWriter, C: Clipboard + ?Sized>(tc: &TextCursor<B>, clipboard: &C) -> Result<()> {
    if !tc.selection_on() {
        return Ok(());
    }
    let bytes = tc.selection()?;
    clipboard.set(
        ClipboardKind::Clipboard,
        String::from_utf8_lossy(&bytes).into_owned(),
    )?;
    Ok(())
}

/// Copy the selection to the clipboard and delete it.
///
/// # Errors
/// Propagates read, clipboard and buffer failures.
pub fn cut<B: ReadWriter, C: Clipboard + ?Sized>(tc: &mut TextCursor<B>, clipboard: &C) -> Result<()> {
    if !tc.selection_on() {
        return Ok(());
    }
    copy(tc, clipboard)?;
    tc.edit(|tc| delete_selection(tc).map(|_| ()))
}

/// Select `[a, b)`, leaving a trailing newline out of the selection.
fn select_lines<B: ReadWriter>(tc: &mut TextCursor<B>, a: usize, b: usize, newline: bool) {
    let end = if newline && b > a { b - 1 } else { b };
    tc.set_selection(a, end);
}

fn shift_cursor<B: ReadWriter>(tc: &mut TextCursor<B>, shift: impl Fn(usize) -> usize) {
    if tc.selection_on() {
        let (si, ci) = (tc.selection_index(), tc.index());
        tc.set_selection(shift(si), shift(ci));
    } else {
        let ci = shift(tc.index());
        tc.set_index(ci);
    }
}
