//! Undo/redo history.
//!
//! Every mutation made inside a transaction is captured as an [`UndoRedo`]:
//! the edit itself plus its inverse, built at apply time from the buffer
//! state. The edits of one transaction form an [`EditGroup`], the unit of
//! undo and redo.

use std::collections::VecDeque;

use crate::buffer::{ReadWriter, Result, Writer};

/// Default number of edit groups kept for undo.
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

/// One atomic mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Insert { index: usize, bytes: Vec<u8> },
    Delete { index: usize, len: usize },
}

impl Edit {
    /// Apply this edit to `w`.
    ///
    /// # Errors
    /// Propagates range errors from the writer.
    pub fn apply<W: Writer + ?Sized>(&self, w: &mut W) -> Result<()> {
        match self {
            Self::Insert { index, bytes } => w.insert(*index, bytes),
            Self::Delete { index, len } => w.delete(*index, *len),
        }
    }

    pub const fn index(&self) -> usize {
        match self {
            Self::Insert { index, .. } | Self::Delete { index, .. } => *index,
        }
    }

    /// Offset right after the edit once applied.
    pub fn end_index(&self) -> usize {
        match self {
            Self::Insert { index, bytes } => index + bytes.len(),
            Self::Delete { index, .. } => *index,
        }
    }
}

/// An edit paired with its inverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoRedo {
    pub redo: Edit,
    pub undo: Edit,
}

/// Insert `bytes` at `index` and return the recorded edit.
///
/// # Errors
/// Propagates the insert failure; nothing is recorded in that case.
pub fn insert_undo_redo<W: ReadWriter + ?Sized>(
    rw: &mut W,
    index: usize,
    bytes: &[u8],
) -> Result<UndoRedo> {
    rw.insert(index, bytes)?;
    Ok(UndoRedo {
        redo: Edit::Insert {
            index,
            bytes: bytes.to_vec(),
        },
        undo: Edit::Delete {
            index,
            len: bytes.len(),
        },
    })
}

/// Delete `len` bytes at `index` and return the recorded edit.
///
/// # Errors
/// Propagates read or delete failures; nothing is recorded in that case.
pub fn delete_undo_redo<W: ReadWriter + ?Sized>(
    rw: &mut W,
    index: usize,
    len: usize,
) -> Result<UndoRedo> {
    let removed = rw.read_at(index, len)?;
    rw.delete(index, len)?;
    Ok(UndoRedo {
        redo: Edit::Delete { index, len },
        undo: Edit::Insert {
            index,
            bytes: removed,
        },
    })
}

/// Ordered edits of one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditGroup {
    edits: Vec<UndoRedo>,
}

impl EditGroup {
    pub fn push(&mut self, ur: UndoRedo) {
        self.edits.push(ur);
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn edits(&self) -> &[UndoRedo] {
        &self.edits
    }

    /// Position of the earliest edit in the group.
    pub fn start_index(&self) -> Option<usize> {
        self.edits.iter().map(|ur| ur.redo.index()).min()
    }

    /// Revert the group: inverses in reverse order.
    ///
    /// # Errors
    /// Propagates the first failing inverse.
    pub fn undo<W: Writer + ?Sized>(&self, w: &mut W) -> Result<()> {
        self.edits.iter().rev().try_for_each(|ur| ur.undo.apply(w))
    }

    /// Re-apply the group in original order.
    ///
    /// # Errors
    /// Propagates the first failing edit.
    pub fn redo<W: Writer + ?Sized>(&self, w: &mut W) -> Result<()> {
        self.edits.iter().try_for_each(|ur| ur.redo.apply(w))
    }
}

/// Undo and redo stacks of edit groups, bounded to `max_depth` groups.
#[derive(Debug, Clone)]
pub struct History {
    undone: VecDeque<EditGroup>,
    redone: Vec<EditGroup>,
    open: Option<EditGroup>,
    max_depth: usize,
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undone: VecDeque::new(),
            redone: Vec::new(),
            open: None,
            max_depth: max_depth.max(1),
        }
    }

    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Start collecting edits into a new group.
    ///
    /// # Panics
    /// If a group is already open.
    pub fn begin_group(&mut self) {
        assert!(self.open.is_none(), "history group already open");
        self.open = Some(EditGroup::default());
    }

    /// Append an edit to the open group.
    ///
    /// # Panics
    /// If no group is open.
    pub fn append(&mut self, ur: UndoRedo) {
        let Some(group) = self.open.as_mut() else {
            panic!("history group is not open");
        };
        group.push(ur);
    }

    /// Commit the open group.
    ///
    /// Empty groups are discarded. A committed group clears the redo stack
    /// and evicts the oldest groups beyond the depth bound. Returns the
    /// number of edits committed.
    ///
    /// # Panics
    /// If no group is open.
    pub fn end_group(&mut self) -> usize {
        let Some(group) = self.open.take() else {
            panic!("history group is not open");
        };
        if group.is_empty() {
            return 0;
        }
        let edits = group.len();
        self.redone.clear();
        self.undone.push_back(group);
        while self.undone.len() > self.max_depth {
            self.undone.pop_front();
            tracing::trace!(max_depth = self.max_depth, "evicted oldest edit group");
        }
        edits
    }

    pub fn is_group_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn can_undo(&self) -> bool {
        !self.undone.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redone.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undone.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redone.len()
    }

    /// Revert the most recent group against `w`.
    ///
    /// Returns `None` when there is nothing to undo, otherwise the position
    /// of the earliest edit in the group.
    ///
    /// # Errors
    /// Propagates a failing inverse edit; the group is dropped in that case.
    pub fn pop_undo<W: Writer + ?Sized>(&mut self, w: &mut W) -> Result<Option<usize>> {
        let Some(group) = self.undone.pop_back() else {
            return Ok(None);
        };
        group.undo(w)?;
        let index = group.start_index().unwrap_or(0);
        self.redone.push(group);
        Ok(Some(index))
    }

    /// Re-apply the most recently undone group against `w`.
    ///
    /// Returns `None` when there is nothing to redo, otherwise the offset
    /// right after the group's last edit.
    ///
    /// # Errors
    /// Propagates a failing edit; the group is dropped in that case.
    pub fn pop_redo<W: Writer + ?Sized>(&mut self, w: &mut W) -> Result<Option<usize>> {
        let Some(group) = self.redone.pop() else {
            return Ok(None);
        };
        group.redo(w)?;
        let index = group.edits().last().map_or(0, |ur| ur.redo.end_index());
        self.undone.push_back(group);
        Ok(Some(index))
    }

    /// Drop all history, including an open group.
    pub fn clear(&mut self) {
        self.undone.clear();
        self.redone.clear();
        self.open = None;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}
