//! Transactional write path over a buffer accessor.
//!
//! [`TextView`] wraps an inner [`ReadWriter`] and the [`History`]. Between
//! [`TextView::begin_edit`] and [`TextView::end_edit`] every insert and
//! delete is applied to the inner buffer and recorded with its inverse in the
//! open edit group. Writing outside a transaction, nesting transactions, or
//! closing one that is not open are integration bugs and panic.

use crate::buffer::{Reader, ReadWriter, Result, Writer};
use crate::history::{History, delete_undo_redo, insert_undo_redo};

/// What produced a content change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A committed transaction.
    Edit,
    Undo,
    Redo,
    /// Content replaced with history discarded.
    Reset,
}

/// Notification emitted once per committed transaction, undo, redo or reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentChanged {
    pub kind: ChangeKind,
    /// Content length before the change.
    pub old_len: usize,
    /// Content length after the change.
    pub new_len: usize,
    /// Earliest offset touched by the change.
    pub index: usize,
}

/// Transaction gate over an inner buffer.
#[derive(Debug, Clone)]
pub struct TextView<B> {
    inner: B,
    history: History,
    editing: bool,
    old_len: usize,
    touched: Option<usize>,
}

impl<B: ReadWriter> TextView<B> {
    pub fn new(inner: B, history: History) -> Self {
        Self {
            inner,
            history,
            editing: false,
            old_len: 0,
            touched: None,
        }
    }

    pub const fn inner(&self) -> &B {
        &self.inner
    }

    pub fn into_inner(self) -> B {
        self.inner
    }

    pub const fn history(&self) -> &History {
        &self.history
    }

    pub const fn is_editing(&self) -> bool {
        self.editing
    }

    /// Open a transaction.
    ///
    /// # Panics
    /// If a transaction is already open.
    pub fn begin_edit(&mut self) {
        self.panic_if_editing();
        self.editing = true;
        self.old_len = self.inner.len();
        self.touched = None;
        self.history.begin_group();
    }

    /// Close the transaction and commit its edits as one group.
    ///
    /// Returns `None` when nothing was written.
    ///
    /// # Panics
    /// If no transaction is open.
    pub fn end_edit(&mut self) -> Option<ContentChanged> {
        self.panic_if_not_editing();
        self.editing = false;
        let edits = self.history.end_group();
        if edits == 0 {
            return None;
        }
        let change = ContentChanged {
            kind: ChangeKind::Edit,
            old_len: self.old_len,
            new_len: self.inner.len(),
            index: self.touched.take().unwrap_or(0),
        };
        tracing::debug!(
            edits,
            old_len = change.old_len,
            new_len = change.new_len,
            "committed edit group"
        );
        Some(change)
    }

    /// Revert the last committed group.
    ///
    /// Returns the index the cursor should move to and the change, or `None`
    /// when there is nothing to undo.
    ///
    /// # Errors
    /// Propagates a failing inverse edit.
    ///
    /// # Panics
    /// If a transaction is open.
    pub fn undo(&mut self) -> Result<Option<(usize, ContentChanged)>> {
        self.panic_if_editing();
        let old_len = self.inner.len();
        let Some(index) = self.history.pop_undo(&mut self.inner)? else {
            return Ok(None);
        };
        tracing::debug!(index, "undo");
        Ok(Some((index, self.replayed(ChangeKind::Undo, old_len, index))))
    }

    /// Re-apply the last undone group.
    ///
    /// # Errors
    /// Propagates a failing edit.
    ///
    /// # Panics
    /// If a transaction is open.
    pub fn redo(&mut self) -> Result<Option<(usize, ContentChanged)>> {
        self.panic_if_editing();
        let old_len = self.inner.len();
        let Some(index) = self.history.pop_redo(&mut self.inner)? else {
            return Ok(None);
        };
        tracing::debug!(index, "redo");
        Ok(Some((index, self.replayed(ChangeKind::Redo, old_len, index))))
    }

    /// Replace the whole content and discard the history.
    ///
    /// # Errors
    /// Propagates failures from the inner buffer.
    ///
    /// # Panics
    /// If a transaction is open.
    pub fn reset(&mut self, bytes: &[u8]) -> Result<ContentChanged> {
        self.panic_if_editing();
        let old_len = self.inner.len();
        self.inner.delete(0, old_len)?;
        self.inner.insert(0, bytes)?;
        self.history.clear();
        tracing::debug!(old_len, new_len = bytes.len(), "content reset");
        Ok(ContentChanged {
            kind: ChangeKind::Reset,
            old_len,
            new_len: bytes.len(),
            index: 0,
        })
    }

    fn replayed(&self, kind: ChangeKind, old_len: usize, index: usize) -> ContentChanged {
        ContentChanged {
            kind,
            old_len,
            new_len: self.inner.len(),
            index,
        }
    }

    fn touch(&mut self, index: usize) {
        self.touched = Some(self.touched.map_or(index, |t| t.min(index)));
    }

    fn panic_if_editing(&self) {
        assert!(!self.editing, "edit mode is already set");
    }

    fn panic_if_not_editing(&self) {
        assert!(self.editing, "edit mode is not set");
    }
}

impl<B: ReadWriter> Reader for TextView<B> {
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn read_at(&self, index: usize, n: usize) -> Result<Vec<u8>> {
        self.inner.read_at(index, n)
    }

    fn read_rune_at(&self, index: usize) -> Result<(char, usize)> {
        self.inner.read_rune_at(index)
    }

    fn read_last_rune_at(&self, index: usize) -> Result<(char, usize)> {
        self.inner.read_last_rune_at(index)
    }
}

impl<B: ReadWriter> Writer for TextView<B> {
    /// # Panics
    /// If no transaction is open.
    fn insert(&mut self, index: usize, bytes: &[u8]) -> Result<()> {
        assert!(self.editing, "write attempted while not editing");
        let ur = insert_undo_redo(&mut self.inner, index, bytes)?;
        self.history.append(ur);
        self.touch(index);
        Ok(())
    }

    /// # Panics
    /// If no transaction is open.
    fn delete(&mut self, index: usize, len: usize) -> Result<()> {
        assert!(self.editing, "write attempted while not editing");
        let ur = delete_undo_redo(&mut self.inner, index, len)?;
        self.history.append(ur);
        self.touch(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ByteBuffer;

    fn view(text: &str) -> TextView<ByteBuffer> {
        TextView::new(ByteBuffer::from_text(text), History::default())
    }

    #[test]
    fn test_writes_are_recorded_and_committed() {
        let mut v = view("0123");
        v.begin_edit();
        v.insert(1, b"ab").unwrap();
        v.delete(4, 1).unwrap();
        let change = v.end_edit().unwrap();
        assert_eq!(v.inner().text(), "0ab13");
        assert_eq!(
            change,
            ContentChanged {
                kind: ChangeKind::Edit,
                old_len: 4,
                new_len: 5,
                index: 1
            }
        );
        assert!(v.history().can_undo());
    }

    #[test]
    fn test_empty_transaction_emits_nothing() {
        let mut v = view("abc");
        v.begin_edit();
        assert_eq!(v.end_edit(), None);
        assert!(!v.history().can_undo());
    }

    #[test]
    #[should_panic(expected = "write attempted while not editing")]
    fn test_write_outside_transaction_panics() {
        let mut v = view("abc");
        let _ = v.insert(0, b"x");
    }

    #[test]
    #[should_panic(expected = "edit mode is already set")]
    fn test_nested_begin_panics() {
        let mut v = view("abc");
        v.begin_edit();
        v.begin_edit();
    }

    #[test]
    #[should_panic(expected = "edit mode is not set")]
    fn test_unmatched_end_panics() {
        let mut v = view("abc");
        v.end_edit();
    }

    #[test]
    fn test_partial_group_is_committed() {
        let mut v = view("abc");
        v.begin_edit();
        v.insert(0, b"x").unwrap();
        assert!(v.delete(2, 10).is_err());
        assert!(v.end_edit().is_some());
        assert_eq!(v.inner().text(), "xabc");

        let (index, change) = v.undo().unwrap().unwrap();
        assert_eq!(index, 0);
        assert_eq!(change.kind, ChangeKind::Undo);
        assert_eq!(v.inner().text(), "abc");
    }

    #[test]
    fn test_undo_redo_report_changes() {
        let mut v = view("ab");
        v.begin_edit();
        v.insert(2, b"cd").unwrap();
        v.end_edit();

        let (_, undo) = v.undo().unwrap().unwrap();
        assert_eq!((undo.old_len, undo.new_len), (4, 2));
        let (index, redo) = v.redo().unwrap().unwrap();
        assert_eq!(index, 4);
        assert_eq!((redo.old_len, redo.new_len), (2, 4));
        assert_eq!(v.redo().unwrap(), None);
    }

    #[test]
    fn test_reset_discards_history() {
        let mut v = view("ab");
        v.begin_edit();
        v.insert(0, b"x").unwrap();
        v.end_edit();
        let change = v.reset(b"new").unwrap();
        assert_eq!(change.kind, ChangeKind::Reset);
        assert_eq!(v.inner().text(), "new");
        assert_eq!(v.undo().unwrap(), None);
    }
}
