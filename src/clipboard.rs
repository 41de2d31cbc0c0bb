//! Clipboard access and background paste retrieval.
//!
//! Reading a clipboard owned by another program needs a round trip to the
//! window system, so it must not run on the editing thread. [`PasteQueue`]
//! runs each retrieval on a worker thread and delivers the result as a
//! [`PasteCompleted`] message on a channel. The owner drains the channel on
//! its own thread and only then applies the text through a transaction.
//! In-flight requests cannot be cancelled; unwanted results are dropped by
//! the owner when they arrive.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

use crate::buffer::ReadWriter;
use crate::commands;
use crate::cursor::TextCursor;
use crate::logging::LogSink;

/// Which selection buffer to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipboardKind {
    /// The primary selection (middle-click paste).
    Primary,
    /// The explicit copy/paste clipboard.
    Clipboard,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard content is not text")]
    NotText,
}

/// Access to externally owned selection content.
pub trait Clipboard: Send + Sync {
    /// Fetch the current content. May block.
    ///
    /// # Errors
    /// When the content cannot be retrieved.
    fn get(&self, kind: ClipboardKind) -> Result<String, ClipboardError>;

    /// Replace the content.
    ///
    /// # Errors
    /// When the content cannot be stored.
    fn set(&self, kind: ClipboardKind, text: String) -> Result<(), ClipboardError>;
}

/// In-process clipboard.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Contents>,
}

#[derive(Debug, Default)]
struct Contents {
    primary: String,
    clipboard: String,
}

impl Contents {
    const fn slot(&mut self, kind: ClipboardKind) -> &mut String {
        match kind {
            ClipboardKind::Primary => &mut self.primary,
            ClipboardKind::Clipboard => &mut self.clipboard,
        }
    }
}

impl Clipboard for MemoryClipboard {
    fn get(&self, kind: ClipboardKind) -> Result<String, ClipboardError> {
        let mut contents = self
            .contents
            .lock()
            .map_err(|err| ClipboardError::Unavailable(err.to_string()))?;
        Ok(contents.slot(kind).clone())
    }

    fn set(&self, kind: ClipboardKind, text: String) -> Result<(), ClipboardError> {
        let mut contents = self
            .contents
            .lock()
            .map_err(|err| ClipboardError::Unavailable(err.to_string()))?;
        *contents.slot(kind) = text;
        Ok(())
    }
}

/// Result of a background retrieval, delivered to the owning thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteCompleted {
    pub kind: ClipboardKind,
    pub result: Result<String, ClipboardError>,
}

impl PasteCompleted {
    /// Paste the retrieved text at the cursor, replacing the selection.
    /// Empty text is ignored.
    ///
    /// # Errors
    /// The retrieval error, or a buffer failure while inserting.
    pub fn apply<B: ReadWriter>(self, tc: &mut TextCursor<B>) -> commands::Result<()> {
        let text = self.result?;
        commands::paste_str(tc, &text)
    }
}

/// Dispatches clipboard retrievals to worker threads.
pub struct PasteQueue {
    clipboard: Arc<dyn Clipboard>,
    tx: Sender<PasteCompleted>,
    rx: Receiver<PasteCompleted>,
    log: LogSink,
}

impl PasteQueue {
    pub fn new(clipboard: Arc<dyn Clipboard>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            clipboard,
            tx,
            rx,
            log: LogSink::default(),
        }
    }

    /// Route worker log events to `log`.
    #[must_use]
    pub fn with_log_sink(mut self, log: LogSink) -> Self {
        self.log = log;
        self
    }

    pub fn clipboard(&self) -> &dyn Clipboard {
        self.clipboard.as_ref()
    }

    /// Start retrieving `kind` in the background.
    pub fn request(&self, kind: ClipboardKind) {
        let clipboard = Arc::clone(&self.clipboard);
        let tx = self.tx.clone();
        let log = self.log.clone();
        std::thread::spawn(move || {
            let result = clipboard.get(kind);
            log.in_scope(|| {
                tracing::trace!(?kind, ok = result.is_ok(), "paste retrieval finished");
            });
            // The owner may be gone; nothing to deliver to then.
            let _ = tx.send(PasteCompleted { kind, result });
        });
    }

    /// Next completed retrieval, without blocking.
    pub fn try_next(&self) -> Option<PasteCompleted> {
        self.rx.try_recv().ok()
    }

    /// Next completed retrieval, waiting up to `timeout`.
    pub fn next_timeout(&self, timeout: Duration) -> Option<PasteCompleted> {
        self.rx.recv_timeout(timeout).ok()
    }
}

impl std::fmt::Debug for PasteQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasteQueue").finish_non_exhaustive()
    }
}
