//! Editing and navigation commands built on
//! [`TextCursor`](crate::cursor::TextCursor).
//!
//! Every command that changes content opens exactly one transaction on the
//! cursor, so each invocation is a single undo step. Navigation commands only
//! move the cursor and selection.

mod comment;
mod edit;
mod movement;

pub use comment::{comment, uncomment};
pub use edit::{
    auto_indent, backspace, copy, cut, delete, duplicate_lines, insert_string, move_line_down,
    move_line_up, paste_str, remove_lines, tab_left, tab_right,
};
pub use movement::{
    end_of_line, end_of_string, move_cursor_jump_left, move_cursor_jump_right, move_cursor_left,
    move_cursor_right, select_all, select_line, select_word, start_of_line, start_of_string,
};

use thiserror::Error;

use crate::buffer::BufferError;
use crate::clipboard::ClipboardError;
use crate::scan::ScanError;

/// Errors that abort a single command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

pub type Result<T> = std::result::Result<T, CommandError>;

#[cfg(test)]
fn cursor(text: &str) -> crate::cursor::TextCursor<crate::buffer::ByteBuffer> {
    crate::cursor::TextCursor::new(
        crate::buffer::ByteBuffer::from_text(text),
        crate::history::History::default(),
    )
}
