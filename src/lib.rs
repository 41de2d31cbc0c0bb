// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. buffer::BufferError)
    clippy::module_name_repetitions
)]

//! # textedit
//!
//! The editing core of a text area: a byte buffer with rune-aware
//! reads, an undoable transaction layer, a cursor with selection, and
//! the editing commands built on top of them.
//!
//! ## Architecture
//!
//! Edits flow through a fixed stack of layers:
//! - **Buffer**: raw byte storage behind the [`buffer::Reader`] and
//!   [`buffer::Writer`] traits
//! - **View**: a transaction gate that records undo/redo data for every
//!   write and reports a single change per transaction
//! - **Cursor**: caret and selection state over the view
//! - **Commands**: free functions that drive a cursor
//!
//! ## Modules
//!
//! - [`buffer`]: Byte buffer traits and implementations
//! - [`scan`]: Rune scanning and line boundary helpers
//! - [`history`]: Undo/redo edit groups with bounded depth
//! - [`view`]: Transactional view with change notifications
//! - [`cursor`]: Cursor and selection
//! - [`commands`]: Movement, editing and comment commands
//! - [`clipboard`]: Clipboard access and background paste
//! - [`config`]: Persisted editor defaults
//! - [`logging`]: Injectable tracing sink

pub mod buffer;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod cursor;
pub mod history;
pub mod logging;
pub mod scan;
pub mod view;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::buffer::{BufferError, ByteBuffer, ReadWriter, Reader, RopeBuffer, Writer};
    pub use crate::clipboard::{Clipboard, ClipboardKind, MemoryClipboard, PasteQueue};
    pub use crate::commands::CommandError;
    pub use crate::config::EditorConfig;
    pub use crate::cursor::TextCursor;
    pub use crate::history::History;
    pub use crate::logging::LogSink;
    pub use crate::view::{ChangeKind, ContentChanged, TextView};
}
