//! Cursor and selection state over a transactional text view.
//!
//! [`TextCursor`] owns the buffer (through a [`TextView`]), the cursor index
//! and the selection anchor. All navigation commands go through
//! [`TextCursor::set_selection_update`]; all content changes go through a
//! transaction opened on the cursor.

use crate::buffer::{BufferError, ReadWriter, Reader, Writer};
use crate::history::History;
use crate::logging::LogSink;
use crate::scan;
use crate::view::{ContentChanged, TextView};

/// Cursor index plus selection anchor.
///
/// `selection_on` is only true while `index != selection_index`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorState {
    pub index: usize,
    pub selection_on: bool,
    pub selection_index: usize,
}

type ChangeListener = Box<dyn FnMut(&ContentChanged)>;

/// Editable text with a cursor, a selection and undo/redo history.
pub struct TextCursor<B> {
    view: TextView<B>,
    state: CursorState,
    listener: Option<ChangeListener>,
    log: LogSink,
}

impl<B: ReadWriter> TextCursor<B> {
    /// Create a cursor at index 0 over `buffer`.
    pub fn new(buffer: B, history: History) -> Self {
        Self {
            view: TextView::new(buffer, history),
            state: CursorState::default(),
            listener: None,
            log: LogSink::default(),
        }
    }

    /// Route this cursor's log events to `log`.
    #[must_use]
    pub fn with_log_sink(mut self, log: LogSink) -> Self {
        self.log = log;
        self
    }

    /// Register the content-changed listener, replacing any previous one.
    pub fn set_change_listener(&mut self, listener: impl FnMut(&ContentChanged) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    // --- Transactions ---

    /// The transactional read/write path. Writes panic outside a transaction.
    pub fn rw(&mut self) -> &mut TextView<B> {
        &mut self.view
    }

    /// Read-only access to the content.
    pub const fn view(&self) -> &TextView<B> {
        &self.view
    }

    pub const fn history(&self) -> &History {
        self.view.history()
    }

    /// Run `f` inside one transaction; the transaction is closed even when
    /// `f` returns an error.
    pub fn edit<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.begin_edit();
        let out = f(self);
        self.end_edit();
        out
    }

    /// # Panics
    /// If a transaction is already open.
    pub fn begin_edit(&mut self) {
        self.view.begin_edit();
    }

    /// Commit the open transaction and notify the change listener.
    ///
    /// # Panics
    /// If no transaction is open.
    pub fn end_edit(&mut self) {
        let view = &mut self.view;
        if let Some(change) = self.log.in_scope(|| view.end_edit()) {
            self.clamp_to_content();
            self.changed(&change);
        }
    }

    /// Keep both selection ends inside the content after it changed.
    fn clamp_to_content(&mut self) {
        let len = self.len();
        self.state.index = self.state.index.min(len);
        self.state.selection_index = self.state.selection_index.min(len);
        if self.state.index == self.state.selection_index {
            self.state.selection_on = false;
        }
    }

    /// Undo the last transaction, moving the cursor to its earliest edit.
    ///
    /// Returns false when there was nothing to undo.
    ///
    /// # Errors
    /// Propagates a failing inverse edit.
    pub fn undo(&mut self) -> Result<bool, BufferError> {
        let view = &mut self.view;
        let replay = self.log.in_scope(|| view.undo())?;
        Ok(self.after_replay(replay))
    }

    /// Redo the last undone transaction.
    ///
    /// # Errors
    /// Propagates a failing edit.
    pub fn redo(&mut self) -> Result<bool, BufferError> {
        let view = &mut self.view;
        let replay = self.log.in_scope(|| view.redo())?;
        Ok(self.after_replay(replay))
    }

    /// Replace the entire content and reset cursor and selection.
    ///
    /// With `discard_history` the history is cleared; otherwise the
    /// replacement is recorded as one undoable transaction.
    ///
    /// # Errors
    /// Propagates buffer failures.
    pub fn set_text(&mut self, text: &str, discard_history: bool) -> Result<(), BufferError> {
        self.state = CursorState::default();
        if discard_history {
            let view = &mut self.view;
            let change = self.log.in_scope(|| view.reset(text.as_bytes()))?;
            self.changed(&change);
            return Ok(());
        }
        self.edit(|tc| {
            let len = tc.len();
            tc.rw().delete(0, len)?;
            tc.rw().insert(0, text.as_bytes())
        })
    }

    fn after_replay(&mut self, replay: Option<(usize, ContentChanged)>) -> bool {
        let Some((index, change)) = replay else {
            return false;
        };
        self.set_selection_off();
        self.set_index(index);
        self.changed(&change);
        true
    }

    fn changed(&mut self, change: &ContentChanged) {
        if let Some(listener) = self.listener.as_mut() {
            listener(change);
        }
    }

    // --- Content queries ---

    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The full content.
    pub fn bytes(&self) -> Vec<u8> {
        self.view.read_at(0, self.len()).unwrap_or_default()
    }

    /// The full content as text, replacing malformed sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    // --- Cursor ---

    pub const fn state(&self) -> CursorState {
        self.state
    }

    pub const fn index(&self) -> usize {
        self.state.index
    }

    /// Move the cursor, clamped to the content. An emptied selection is
    /// turned off.
    pub fn set_index(&mut self, index: usize) {
        self.state.index = index.min(self.len());
        if self.state.index == self.state.selection_index {
            self.state.selection_on = false;
        }
    }

    pub const fn selection_on(&self) -> bool {
        self.state.selection_on
    }

    pub const fn set_selection_off(&mut self) {
        self.state.selection_on = false;
    }

    pub const fn selection_index(&self) -> usize {
        self.state.selection_index
    }

    /// Set both selection ends. The selection is on iff they differ.
    pub fn set_selection(&mut self, selection_index: usize, index: usize) {
        let len = self.len();
        self.state.selection_index = selection_index.min(len);
        self.state.index = index.min(len);
        self.state.selection_on = self.state.index != self.state.selection_index;
    }

    /// Move the cursor to `index`, extending the selection from its anchor
    /// (or from the current index when none is active) when `extend` is
    /// set, collapsing it otherwise.
    pub fn set_selection_update(&mut self, extend: bool, index: usize) {
        if extend {
            let anchor = if self.selection_on() {
                self.selection_index()
            } else {
                self.index()
            };
            self.set_selection(anchor, index);
        } else {
            self.set_selection_off();
            self.set_index(index);
        }
    }

    /// Ordered selection bounds.
    ///
    /// # Panics
    /// If no selection is active.
    pub fn selection_indexes(&self) -> (usize, usize) {
        assert!(self.selection_on(), "selection is not on");
        let a = self.state.selection_index;
        let b = self.state.index;
        (a.min(b), a.max(b))
    }

    /// The selected bytes.
    ///
    /// # Errors
    /// Propagates read failures.
    ///
    /// # Panics
    /// If no selection is active.
    pub fn selection(&self) -> Result<Vec<u8>, BufferError> {
        let (a, b) = self.selection_indexes();
        self.view.read_at(a, b - a)
    }

    /// The selection (or the cursor position) expanded to whole lines, plus
    /// whether the expanded end follows a newline.
    ///
    /// # Errors
    /// Propagates range failures.
    pub fn lines_indexes(&self) -> scan::Result<(usize, usize, bool)> {
        let (a, b) = if self.selection_on() {
            self.selection_indexes()
        } else {
            (self.index(), self.index())
        };
        scan::lines_indexes(&self.view, a, b)
    }
}

impl<B: ReadWriter + std::fmt::Debug> std::fmt::Debug for TextCursor<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextCursor")
            .field("view", &self.view)
            .field("state", &self.state)
            .field("listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}
