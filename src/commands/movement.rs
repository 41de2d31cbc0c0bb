use crate::buffer::{Reader, ReadWriter};
use crate::cursor::TextCursor;
use crate::scan::{self, DEFAULT_SCAN_LIMIT, Direction, ScanError};

use super::Result;

/// Move one rune left.
///
/// # Errors
/// `OutOfRange` at the start of the buffer, `InvalidEncoding` when the
/// preceding bytes do not decode. The cursor does not move in either case.
pub fn move_cursor_left<B: ReadWriter>(tc: &mut TextCursor<B>, sel: bool) -> Result<()> {
    let ci = tc.index();
    let (_, size) = tc.view().read_last_rune_at(ci)?;
    tc.set_selection_update(sel, ci - size);
    Ok(())
}

/// Move one rune right.
///
/// # Errors
/// `OutOfRange` at the end of the buffer, `InvalidEncoding` when the next
/// bytes do not decode.
pub fn move_cursor_right<B: ReadWriter>(tc: &mut TextCursor<B>, sel: bool) -> Result<()> {
    let ci = tc.index();
    let (_, size) = tc.view().read_rune_at(ci)?;
    tc.set_selection_update(sel, ci + size);
    Ok(())
}

/// Jump left to the previous word edge or line start.
///
/// # Errors
/// Propagates decode failures.
pub fn move_cursor_jump_left<B: ReadWriter>(tc: &mut TextCursor<B>, sel: bool) -> Result<()> {
    let i = jump_left_index(tc)?;
    tc.set_selection_update(sel, i);
    Ok(())
}

/// Jump right to the next word edge or line start.
///
/// # Errors
/// Propagates decode failures.
pub fn move_cursor_jump_right<B: ReadWriter>(tc: &mut TextCursor<B>, sel: bool) -> Result<()> {
    let i = jump_right_index(tc)?;
    tc.set_selection_update(sel, i);
    Ok(())
}

fn jump_left_index<B: ReadWriter>(tc: &TextCursor<B>) -> Result<usize> {
    let found = scan::last_index_func(
        tc.view(),
        tc.index(),
        DEFAULT_SCAN_LIMIT,
        scan::edge_of_next_word_or_newline(),
    );
    match found {
        Ok((i, size)) => Ok(i + size),
        Err(ScanError::Eof) => Ok(0),
        Err(ScanError::LimitReached { index }) => Ok(index),
        Err(err) => Err(err.into()),
    }
}

fn jump_right_index<B: ReadWriter>(tc: &TextCursor<B>) -> Result<usize> {
    let found = scan::index_func(
        tc.view(),
        tc.index(),
        DEFAULT_SCAN_LIMIT,
        Direction::Forward,
        scan::edge_of_next_word_or_newline(),
    );
    match found {
        Ok((i, _)) => Ok(i),
        Err(ScanError::Eof) => Ok(tc.len()),
        Err(ScanError::LimitReached { index }) => Ok(index),
        Err(err) => Err(err.into()),
    }
}

/// Move to the start of the current line.
///
/// # Errors
/// Propagates read failures.
pub fn start_of_line<B: ReadWriter>(tc: &mut TextCursor<B>, sel: bool) -> Result<()> {
    let i = scan::line_start_index(tc.view(), tc.index())?;
    tc.set_selection_update(sel, i);
    Ok(())
}

/// Move to the end of the current line, before its newline.
///
/// # Errors
/// Propagates read failures.
pub fn end_of_line<B: ReadWriter>(tc: &mut TextCursor<B>, sel: bool) -> Result<()> {
    let (end, newline) = scan::line_end_index(tc.view(), tc.index())?;
    let i = if newline { end - 1 } else { end };
    tc.set_selection_update(sel, i);
    Ok(())
}

pub fn start_of_string<B: ReadWriter>(tc: &mut TextCursor<B>, sel: bool) {
    tc.set_selection_update(sel, 0);
}

pub fn end_of_string<B: ReadWriter>(tc: &mut TextCursor<B>, sel: bool) {
    let len = tc.len();
    tc.set_selection_update(sel, len);
}

pub fn select_all<B: ReadWriter>(tc: &mut TextCursor<B>) {
    let len = tc.len();
    tc.set_selection(0, len);
}

/// Select the word around the cursor. Off a word, the rune under the cursor
/// is selected instead; at the end of the buffer nothing changes.
///
/// # Errors
/// Propagates decode failures.
pub fn select_word<B: ReadWriter>(tc: &mut TextCursor<B>) -> Result<()> {
    let ci = tc.index();
    let start = match scan::last_index_func(tc.view(), ci, DEFAULT_SCAN_LIMIT, |ch| {
        !scan::is_word_rune(ch)
    }) {
        Ok((i, size)) => i + size,
        Err(ScanError::Eof) => 0,
        Err(ScanError::LimitReached { index }) => index,
        Err(err) => return Err(err.into()),
    };
    let end = match scan::index_func(tc.view(), ci, DEFAULT_SCAN_LIMIT, Direction::Forward, |ch| {
        !scan::is_word_rune(ch)
    }) {
        Ok((i, _)) => i,
        Err(ScanError::Eof) => tc.len(),
        Err(ScanError::LimitReached { index }) => index,
        Err(err) => return Err(err.into()),
    };
    if start < end {
        tc.set_selection(start, end);
        return Ok(());
    }
    if ci < tc.len() {
        let (_, size) = tc.view().read_rune_at(ci)?;
        tc.set_selection(ci, ci + size);
    }
    Ok(())
}

/// Select the lines touched by the cursor or selection, including the
/// trailing newline.
///
/// # Errors
/// Propagates range failures.
pub fn select_line<B: ReadWriter>(tc: &mut TextCursor<B>) -> Result<()> {
    let (a, b, _) = tc.lines_indexes()?;
    tc.set_selection(a, b);
    Ok(())
}
