use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use textedit::buffer::{ByteBuffer, RopeBuffer};
use textedit::clipboard::{ClipboardKind, MemoryClipboard, PasteQueue};
use textedit::commands;
use textedit::cursor::TextCursor;
use textedit::history::History;
use textedit::logging::LogSink;
use textedit::view::{ChangeKind, ContentChanged};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_comment_session_on_rope_buffer() {
    let mut tc = TextCursor::new(RopeBuffer::from_text("héllo\nwörld\n"), History::default());
    commands::select_all(&mut tc);

    commands::comment(&mut tc, "# ").unwrap();
    assert_eq!(tc.text(), "# héllo\n# wörld\n");
    assert_eq!(tc.selection_indexes(), (0, 17));

    commands::uncomment(&mut tc, "# ").unwrap();
    assert_eq!(tc.text(), "héllo\nwörld\n");
    assert_eq!(tc.selection_indexes(), (0, 13));

    assert!(tc.undo().unwrap());
    assert_eq!(tc.text(), "# héllo\n# wörld\n");
    assert!(tc.undo().unwrap());
    assert_eq!(tc.text(), "héllo\nwörld\n");
    assert!(!tc.undo().unwrap());

    assert!(tc.redo().unwrap());
    assert_eq!(tc.text(), "# héllo\n# wörld\n");
}

#[test]
fn test_listener_sees_one_change_per_command() {
    let seen: Rc<RefCell<Vec<ContentChanged>>> = Rc::default();
    let mut tc = TextCursor::new(ByteBuffer::from_text("a\nb"), History::default());
    let sink = Rc::clone(&seen);
    tc.set_change_listener(move |change| sink.borrow_mut().push(*change));

    commands::select_all(&mut tc);
    commands::comment(&mut tc, "#").unwrap();
    commands::move_cursor_right(&mut tc, false).unwrap();
    tc.undo().unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2, "navigation must not notify");
    assert_eq!(
        seen[0],
        ContentChanged {
            kind: ChangeKind::Edit,
            old_len: 3,
            new_len: 5,
            index: 0,
        }
    );
    assert_eq!(seen[1].kind, ChangeKind::Undo);
    assert_eq!((seen[1].old_len, seen[1].new_len), (5, 3));
}

#[test]
fn test_copy_then_background_paste() {
    let queue = PasteQueue::new(Arc::new(MemoryClipboard::default()));
    let mut tc = TextCursor::new(ByteBuffer::from_text("hello world"), History::default());

    tc.set_selection(0, 5);
    commands::copy(&tc, queue.clipboard()).unwrap();
    commands::end_of_string(&mut tc, false);

    queue.request(ClipboardKind::Clipboard);
    let completed = queue.next_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(completed.kind, ClipboardKind::Clipboard);
    completed.apply(&mut tc).unwrap();

    assert_eq!(tc.text(), "hello worldhello");
    assert_eq!(tc.index(), 16);

    tc.undo().unwrap();
    assert_eq!(tc.text(), "hello world");
}

#[test]
fn test_history_depth_bounds_undo() {
    let mut tc = TextCursor::new(ByteBuffer::default(), History::new(2));
    for s in ["a", "b", "c"] {
        commands::insert_string(&mut tc, s).unwrap();
    }
    assert_eq!(tc.history().undo_len(), 2);

    assert!(tc.undo().unwrap());
    assert!(tc.undo().unwrap());
    assert!(!tc.undo().unwrap());
    assert_eq!(tc.text(), "a");
}

#[test]
fn test_log_sink_receives_commit_events() {
    let buf = SharedBuf::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let log = LogSink::new(tracing::Dispatch::new(subscriber));

    let mut tc =
        TextCursor::new(ByteBuffer::from_text("x"), History::default()).with_log_sink(log);
    commands::end_of_string(&mut tc, false);
    commands::insert_string(&mut tc, "y").unwrap();

    let output = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("committed edit group"), "got: {output}");
}
