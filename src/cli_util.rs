use std::io::{self, Write};

use crate::lexer::{LexError, Position};
use crate::theme::Palette;

/// Print a lexer error with a caret under every offending bracket.
/// If `program` is `Some("bftape")`, messages are prefixed with "bftape: ...".
pub fn print_lex_error(program: Option<&str>, source: &str, err: &LexError, palette: &Palette) {
    let prefix = |msg: &str| match program {
        Some(p) => format!("{p}: {msg}"),
        None => msg.to_string(),
    };

    let messages = err.to_string();
    for (message, position) in messages.lines().zip(err.positions()) {
        eprintln!("{}", palette.error.paint(prefix(message)));
        print_error_with_context(source, *position, palette);
    }
    let _ = io::stderr().flush();
}

/// Show the source line holding `position` with a caret under its column.
///
/// `position.column` is a character offset into the whole source, so the
/// line is located by walking characters rather than by line number.
pub fn print_error_with_context(source: &str, position: Position, palette: &Palette) {
    // Keep very long lines readable
    const WINDOW_CHARS: usize = 32;

    let (line_text, caret_col) = line_around(source, position.column);
    let start = caret_col.saturating_sub(WINDOW_CHARS);
    let end = (caret_col + WINDOW_CHARS + 1).min(line_text.chars().count());
    let snippet: String = line_text.chars().skip(start).take(end.saturating_sub(start)).collect();

    eprintln!(
        "  {} {}",
        palette.location.paint(format!("{:>4} |", position.line)),
        palette.source.paint(snippet)
    );
    let underline = format!("{}^", " ".repeat(caret_col - start));
    eprintln!("         {}", palette.caret.paint(underline));
}

/// The line containing char offset `offset`, and the offset's column within it.
fn line_around(source: &str, offset: usize) -> (&str, usize) {
    let mut line_start_byte = 0usize;
    let mut line_start_char = 0usize;
    let mut target_byte = source.len();

    for (char_idx, (byte_idx, ch)) in source.char_indices().enumerate() {
        if char_idx == offset {
            target_byte = byte_idx;
            break;
        }
        if ch == '\n' {
            line_start_byte = byte_idx + 1;
            line_start_char = char_idx + 1;
        }
    }

    let line_end_byte = source[target_byte..]
        .find('\n')
        .map_or(source.len(), |i| target_byte + i);
    let line = source[line_start_byte..line_end_byte].trim_end_matches('\r');
    (line, offset.saturating_sub(line_start_char))
}
