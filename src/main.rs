//! textedit - apply editing commands to a file.
//!
//! # Usage
//!
//! ```bash
//! textedit notes.txt --select 0:12 comment
//! textedit main.rs --cursor 40 duplicate-lines move-line-up --in-place
//! textedit script.py --comment-marker '#' --save
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

use textedit::buffer::ByteBuffer;
use textedit::clipboard::{ClipboardKind, MemoryClipboard, PasteQueue};
use textedit::commands;
use textedit::config::{
    ConfigFlags, EditorConfig, Indent, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_indent, save_config_flags,
};
use textedit::cursor::TextCursor;
use textedit::history::History;
use textedit::logging::LogSink;

const PASTE_TIMEOUT: Duration = Duration::from_secs(1);

/// Apply text-area editing commands to a file
#[derive(Parser, Debug)]
#[command(name = "textedit", version, about, long_about = None)]
struct Cli {
    /// File to edit
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Commands to run, in order
    #[arg(value_name = "COMMAND", value_enum)]
    commands: Vec<Op>,

    /// Initial selection as ANCHOR:CURSOR byte offsets
    #[arg(long, value_name = "A:B", value_parser = parse_selection)]
    select: Option<(usize, usize)>,

    /// Initial cursor byte offset
    #[arg(long, value_name = "N", conflicts_with = "select")]
    cursor: Option<usize>,

    /// Text used by the insert command
    #[arg(long, value_name = "TEXT", default_value = "")]
    text: String,

    /// Line comment marker
    #[arg(long, value_name = "MARKER")]
    comment_marker: Option<String>,

    /// Maximum number of undo steps kept
    #[arg(long, value_name = "N")]
    history_depth: Option<usize>,

    /// Indentation unit: "tab" or a number of spaces
    #[arg(long, value_name = "UNIT", value_parser = parse_indent_arg)]
    indent: Option<Indent>,

    /// Log filter directive (e.g. "textedit=debug")
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,

    /// Write the result back to FILE instead of stdout
    #[arg(short, long)]
    in_place: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Op {
    Comment,
    Uncomment,
    DuplicateLines,
    RemoveLines,
    MoveLineUp,
    MoveLineDown,
    TabRight,
    TabLeft,
    AutoIndent,
    Backspace,
    Delete,
    Insert,
    Copy,
    Cut,
    Paste,
    SelectAll,
    SelectWord,
    SelectLine,
    StartOfLine,
    EndOfLine,
    WordLeft,
    WordRight,
    Undo,
    Redo,
}

fn parse_selection(s: &str) -> Result<(usize, usize), String> {
    let (a, b) = s
        .split_once(':')
        .ok_or_else(|| format!("expected A:B, got {s:?}"))?;
    let a = a.trim().parse::<usize>().map_err(|err| format!("bad anchor {a:?}: {err}"))?;
    let b = b.trim().parse::<usize>().map_err(|err| format!("bad cursor {b:?}: {err}"))?;
    Ok((a, b))
}

fn parse_indent_arg(s: &str) -> Result<Indent, String> {
    parse_indent(s).ok_or_else(|| format!("expected \"tab\" or a positive number, got {s:?}"))
}

fn log_dispatch(filter: Option<&str>) -> Dispatch {
    let filter = filter
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| {
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
        });
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    Dispatch::new(subscriber)
}

fn run_op(
    tc: &mut TextCursor<ByteBuffer>,
    op: Op,
    config: &EditorConfig,
    text: &str,
    paste: &PasteQueue,
) -> Result<()> {
    match op {
        Op::Comment => commands::comment(tc, &config.comment_marker)?,
        Op::Uncomment => commands::uncomment(tc, &config.comment_marker)?,
        Op::DuplicateLines => commands::duplicate_lines(tc)?,
        Op::RemoveLines => commands::remove_lines(tc)?,
        Op::MoveLineUp => commands::move_line_up(tc)?,
        Op::MoveLineDown => commands::move_line_down(tc)?,
        Op::TabRight => commands::tab_right(tc, &config.indent)?,
        Op::TabLeft => commands::tab_left(tc, &config.indent)?,
        Op::AutoIndent => commands::auto_indent(tc)?,
        Op::Backspace => commands::backspace(tc)?,
        Op::Delete => commands::delete(tc)?,
        Op::Insert => commands::insert_string(tc, text)?,
        Op::Copy => commands::copy(tc, paste.clipboard())?,
        Op::Cut => commands::cut(tc, paste.clipboard())?,
        Op::Paste => {
            paste.request(ClipboardKind::Clipboard);
            let completed = paste
                .next_timeout(PASTE_TIMEOUT)
                .context("Timed out waiting for clipboard")?;
            completed.apply(tc)?;
        }
        Op::SelectAll => commands::select_all(tc),
        Op::SelectWord => commands::select_word(tc)?,
        Op::SelectLine => commands::select_line(tc)?,
        Op::StartOfLine => commands::start_of_line(tc, false)?,
        Op::EndOfLine => commands::end_of_line(tc, false)?,
        Op::WordLeft => commands::move_cursor_jump_left(tc, false)?,
        Op::WordRight => commands::move_cursor_jump_right(tc, false)?,
        Op::Undo => {
            tc.undo()?;
        }
        Op::Redo => {
            tc.redo()?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = ConfigFlags {
        comment_marker: cli.comment_marker.clone(),
        history_depth: cli.history_depth,
        indent: cli.indent,
        log_filter: cli.log.clone(),
    };

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);
    let config = effective.resolve();

    let log = LogSink::new(log_dispatch(effective.log_filter.as_deref()));

    if !cli.file.exists() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }
    let content = std::fs::read(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;

    let mut tc = TextCursor::new(ByteBuffer::new(content), History::new(config.history_depth))
        .with_log_sink(log.clone());
    if let Some((anchor, index)) = cli.select {
        tc.set_selection(anchor, index);
    } else if let Some(index) = cli.cursor {
        tc.set_index(index);
    }

    let paste = PasteQueue::new(Arc::new(MemoryClipboard::default())).with_log_sink(log.clone());
    for op in &cli.commands {
        log.in_scope(|| tracing::debug!(?op, index = tc.index(), "running command"));
        run_op(&mut tc, *op, &config, &cli.text, &paste)
            .with_context(|| format!("Command {op:?} failed"))?;
    }

    if cli.in_place {
        std::fs::write(&cli.file, tc.bytes())
            .with_context(|| format!("Failed to write {}", cli.file.display()))?;
    } else {
        use std::io::Write;
        std::io::stdout()
            .write_all(&tc.bytes())
            .context("Failed to write output")?;
    }
    Ok(())
}
