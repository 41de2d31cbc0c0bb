use crate::buffer::{Reader, ReadWriter, Writer};
use crate::cursor::TextCursor;
use crate::scan::{self, DEFAULT_SCAN_LIMIT, Direction, ScanError};

use super::Result;

/// Insert `marker` on every non-blank touched line, at the smallest
/// indentation among them.
///
/// Blank lines are left alone. With one commented line the selection is
/// dropped and the cursor keeps its place in the text; with several, the
/// whole transformed range is selected, without its trailing newline.
///
/// # Errors
/// Propagates buffer and scan failures. Edits made before a failure stay in
/// the transaction.
pub fn comment<B: ReadWriter>(tc: &mut TextCursor<B>, marker: &str) -> Result<()> {
    let marker = marker.as_bytes();
    if marker.is_empty() {
        return Ok(());
    }
    tc.edit(|tc| {
        let (a, mut b, newline) = tc.lines_indexes()?;

        // Smallest indentation, in runes, among non-blank lines.
        let mut column = None;
        let mut i = a;
        while i < b {
            let (indent, u) = line_indent(tc, i)?;
            if let Some(n) = indent {
                column = Some(column.map_or(n, |c: usize| c.min(n)));
            }
            i = u;
        }
        let Some(column) = column else {
            return Ok(());
        };

        let mut lines = 0;
        let mut inserted_at = 0;
        let mut i = a;
        while i < b {
            let (indent, mut u) = line_indent(tc, i)?;
            if indent.is_some() {
                lines += 1;
                inserted_at = skip_runes(tc, i, column)?;
                tc.rw().insert(inserted_at, marker)?;
                b += marker.len();
                u += marker.len();
            }
            i = u;
        }

        if lines == 1 {
            tc.set_selection_off();
            let ci = tc.index();
            if ci >= inserted_at {
                tc.set_index(ci + marker.len());
            }
        } else if lines > 1 {
            let end = if newline { b - 1 } else { b };
            tc.set_selection(a, end);
        }
        Ok(())
    })
}

/// Remove `marker` from the start of every touched line that has it after
/// its leading whitespace.
///
/// Cursor and selection follow the same policy as [`comment`]. A cursor
/// inside a removed marker moves to where the marker started.
///
/// # Errors
/// Propagates buffer and scan failures.
pub fn uncomment<B: ReadWriter>(tc: &mut TextCursor<B>, marker: &str) -> Result<()> {
    let marker = marker.as_bytes();
    if marker.is_empty() {
        return Ok(());
    }
    tc.edit(|tc| {
        let (a, mut b, newline) = tc.lines_indexes()?;
        let mut lines = 0;
        let mut ci = tc.index();
        let mut i = a;
        while i < b {
            // First non-space rune, possibly on a later line.
            let Ok((j, _)) = scan::index_func(
                tc.view(),
                i,
                DEFAULT_SCAN_LIMIT,
                Direction::Forward,
                |ch| !ch.is_whitespace(),
            ) else {
                break;
            };
            if j >= b {
                break;
            }
            i = j;

            if scan::has_prefix(tc.view(), i, marker) {
                lines += 1;
                tc.rw().delete(i, marker.len())?;
                b -= marker.len();
                if i < ci {
                    ci = if i + marker.len() > ci {
                        i
                    } else {
                        ci - marker.len()
                    };
                }
            }

            let (u, _) = scan::line_end_index(tc.view(), i)?;
            i = u;
        }

        if lines == 1 {
            tc.set_selection_off();
            tc.set_index(ci);
        } else if lines > 1 {
            let end = if newline { b - 1 } else { b };
            tc.set_selection(a, end);
        }
        Ok(())
    })
}

/// Leading whitespace of the line starting at `i`, counted in runes, or
/// `None` when the line is blank. Also returns the end of the line.
fn line_indent<B: ReadWriter>(tc: &TextCursor<B>, i: usize) -> Result<(Option<usize>, usize)> {
    let j = first_non_space(tc, i)?;
    let (u, has_newline) = scan::line_end_index(tc.view(), j)?;
    let content_end = if has_newline { u - 1 } else { u };
    if j >= content_end {
        return Ok((None, u));
    }
    let leading = tc.view().read_at(i, j - i)?;
    Ok((Some(String::from_utf8_lossy(&leading).chars().count()), u))
}

/// Byte offset `n` runes past `i`.
fn skip_runes<B: ReadWriter>(tc: &TextCursor<B>, i: usize, n: usize) -> Result<usize> {
    let mut k = i;
    for _ in 0..n {
        let (_, size) = tc.view().read_rune_at(k)?;
        k += size;
    }
    Ok(k)
}

/// Index of the first rune at or after `i` that is a newline or not
/// whitespace.
fn first_non_space<B: ReadWriter>(tc: &TextCursor<B>, i: usize) -> Result<usize> {
    let found = scan::index_func(tc.view(), i, DEFAULT_SCAN_LIMIT, Direction::Forward, |ch| {
        !scan::is_space_except_newline(ch)
    });
    match found {
        Ok((j, _)) => Ok(j),
        Err(ScanError::Eof) => Ok(tc.len()),
        Err(ScanError::LimitReached { index }) => Ok(index),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::commands::cursor;

    #[test]
    fn test_comment_two_full_lines_selects_range() {
        let mut tc = cursor("foo\nbar\n");
        tc.set_selection(0, 8);
        comment(&mut tc, "#").unwrap();
        assert_eq!(tc.text(), "#foo\n#bar\n");
        assert_eq!(tc.selection_indexes(), (0, 9));
    }

    #[test]
    fn test_comment_uses_smallest_indentation() {
        let mut tc = cursor("  a\n    b\n\n  c");
        tc.set_selection(0, 13);
        comment(&mut tc, "// ").unwrap();
        assert_eq!(tc.text(), "  // a\n  //   b\n\n  // c");
        assert_eq!(tc.selection_indexes(), (0, 23));
    }

    #[test]
    fn test_comment_ignores_whitespace_only_lines() {
        let mut tc = cursor("    x\n  \n    y\n");
        tc.set_selection(0, 15);
        comment(&mut tc, "#").unwrap();
        assert_eq!(tc.text(), "    #x\n  \n    #y\n");
    }

    #[test]
    fn test_comment_skips_unicode_whitespace_lines() {
        let mut tc = cursor("    x\n\u{3000}\n    abcdef\n");
        let len = tc.len();
        tc.set_selection(0, len);
        comment(&mut tc, "#").unwrap();
        assert_eq!(tc.text(), "    #x\n\u{3000}\n    #abcdef\n");

        let len = tc.len();
        tc.set_selection(0, len);
        uncomment(&mut tc, "#").unwrap();
        assert_eq!(tc.text(), "    x\n\u{3000}\n    abcdef\n");

        let mut tc = cursor("    x\n\u{a0}\n");
        let len = tc.len();
        tc.set_selection(0, len);
        comment(&mut tc, "#").unwrap();
        assert_eq!(tc.text(), "    #x\n\u{a0}\n");
    }

    #[test]
    fn test_comment_indentation_counts_runes() {
        let mut tc = cursor("\u{3000}a\n b\n");
        let len = tc.len();
        tc.set_selection(0, len);
        comment(&mut tc, "#").unwrap();
        assert_eq!(tc.text(), "\u{3000}#a\n #b\n");
    }

    #[test]
    fn test_comment_single_line_moves_cursor_after_marker() {
        let mut tc = cursor("  foo\nbar");
        tc.set_index(4);
        comment(&mut tc, "//").unwrap();
        assert_eq!(tc.text(), "  //foo\nbar");
        assert_eq!(tc.index(), 6);
        assert!(!tc.selection_on());
    }

    #[test]
    fn test_comment_single_line_cursor_before_column_stays() {
        let mut tc = cursor("  foo");
        tc.set_index(1);
        comment(&mut tc, "//").unwrap();
        assert_eq!(tc.text(), "  //foo");
        assert_eq!(tc.index(), 1);
    }

    #[test]
    fn test_comment_blank_lines_is_noop() {
        let mut tc = cursor("\n  \n");
        tc.set_selection(0, 4);
        comment(&mut tc, "#").unwrap();
        assert_eq!(tc.text(), "\n  \n");
        assert!(!tc.history().can_undo());
        assert_eq!(tc.selection_indexes(), (0, 4));
    }

    #[test]
    fn test_comment_empty_marker_is_noop() {
        let mut tc = cursor("foo");
        comment(&mut tc, "").unwrap();
        uncomment(&mut tc, "").unwrap();
        assert_eq!(tc.text(), "foo");
    }

    #[test]
    fn test_comment_is_one_undo_step() {
        let mut tc = cursor("a\nb\nc");
        tc.set_selection(0, 5);
        comment(&mut tc, "#").unwrap();
        assert_eq!(tc.text(), "#a\n#b\n#c");
        tc.undo().unwrap();
        assert_eq!(tc.text(), "a\nb\nc");
    }

    #[test]
    fn test_uncomment_multiple_lines() {
        let mut tc = cursor("#foo\n  #bar\n");
        tc.set_selection(0, 12);
        uncomment(&mut tc, "#").unwrap();
        assert_eq!(tc.text(), "foo\n  bar\n");
        assert_eq!(tc.selection_indexes(), (0, 9));
    }

    #[test]
    fn test_uncomment_single_line_moves_cursor_left() {
        let mut tc = cursor("  // foo");
        tc.set_index(7);
        uncomment(&mut tc, "//").unwrap();
        assert_eq!(tc.text(), "   foo");
        assert_eq!(tc.index(), 5);
    }

    #[test]
    fn test_uncomment_cursor_inside_marker_clamps_to_start() {
        let mut tc = cursor("  //foo");
        tc.set_index(3);
        uncomment(&mut tc, "//").unwrap();
        assert_eq!(tc.text(), "  foo");
        assert_eq!(tc.index(), 2);
    }

    #[test]
    fn test_uncomment_without_marker_is_noop() {
        let mut tc = cursor("foo\nbar");
        tc.set_selection(0, 7);
        uncomment(&mut tc, "#").unwrap();
        assert_eq!(tc.text(), "foo\nbar");
        assert!(!tc.history().can_undo());
    }

    #[test]
    fn test_uncomment_stops_at_range_end() {
        let mut tc = cursor("#a\n\n#b");
        tc.set_index(0);
        uncomment(&mut tc, "#").unwrap();
        assert_eq!(tc.text(), "a\n\n#b");
    }

    proptest! {
        #[test]
        fn comment_then_uncomment_round_trips(
            lines in proptest::collection::vec("[ \t\u{a0}\u{3000}]{0,3}[a-z#]{0,5}", 1..6),
            trailing_newline in any::<bool>(),
        ) {
            let mut text = lines.join("\n");
            if trailing_newline {
                text.push('\n');
            }
            prop_assume!(text.lines().any(|l| !l.trim().is_empty()));

            let mut tc = cursor(&text);
            let len = tc.len();
            tc.set_selection(0, len);
            comment(&mut tc, "#").unwrap();
            if !tc.selection_on() {
                // A single commented line: reselect everything.
                let len = tc.len();
                tc.set_selection(0, len);
            }
            uncomment(&mut tc, "#").unwrap();
            prop_assert_eq!(tc.text(), text);
        }
    }
}
