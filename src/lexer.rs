//! Source text to token stream.
//!
//! The lexer keeps only the eight instruction characters `<>+-.,[]` and drops
//! everything else as commentary. Bracket balance is checked here, so a
//! [`TokenStream`] that comes out of [`lex`] is always structurally valid and
//! the executor never has to re-check it.
//!
//! Positions are reported as `(line, column)` where `line` is zero-based and
//! bumped on every `\n`, and `column` is the zero-based character offset into
//! the whole input. The column is deliberately *not* reset at line breaks.

use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::OnceLock;

/// One instruction of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    MoveLeft,
    MoveRight,
    Increment,
    Decrement,
    Output,
    Input,
    LoopStart,
    LoopEnd,
}

impl Token {
    /// Look up the token for a source character, if it is an instruction.
    pub fn from_char(ch: char) -> Option<Token> {
        token_table().get(&ch).copied()
    }

    /// The source character this token was lexed from.
    pub fn as_char(self) -> char {
        match self {
            Token::MoveLeft => '<',
            Token::MoveRight => '>',
            Token::Increment => '+',
            Token::Decrement => '-',
            Token::Output => '.',
            Token::Input => ',',
            Token::LoopStart => '[',
            Token::LoopEnd => ']',
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

static TOKEN_TABLE: OnceLock<HashMap<char, Token>> = OnceLock::new();

fn token_table() -> &'static HashMap<char, Token> {
    TOKEN_TABLE.get_or_init(|| {
        HashMap::from([
            ('<', Token::MoveLeft),
            ('>', Token::MoveRight),
            ('+', Token::Increment),
            ('-', Token::Decrement),
            ('.', Token::Output),
            (',', Token::Input),
            ('[', Token::LoopStart),
            (']', Token::LoopEnd),
        ])
    })
}

/// A validated, immutable sequence of tokens.
///
/// Derefs to `[Token]`, so it can be indexed and iterated like a slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream(Vec<Token>);

impl TokenStream {
    pub fn into_vec(self) -> Vec<Token> {
        self.0
    }
}

impl Deref for TokenStream {
    type Target = [Token];

    fn deref(&self) -> &[Token] {
        &self.0
    }
}

/// Where in the source a bracket was seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Zero-based line number.
    pub line: usize,
    /// Zero-based character offset into the whole source.
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Bracket structure errors. Lexing stops at the first of these; no partial
/// token stream is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    /// A `]` appeared while no `[` was open.
    #[error("Error on line {}, column {}: closing ']' without a matching '['", .position.line, .position.column)]
    UnmatchedClose { position: Position },

    /// One or more `[` were still open at the end of the input.
    #[error("{}", unclosed_message(.positions))]
    UnmatchedOpen { positions: Vec<Position> },
}

impl LexError {
    /// Every source position this error refers to.
    pub fn positions(&self) -> &[Position] {
        match self {
            LexError::UnmatchedClose { position } => std::slice::from_ref(position),
            LexError::UnmatchedOpen { positions } => positions,
        }
    }
}

fn unclosed_message(positions: &[Position]) -> String {
    positions
        .iter()
        .map(|p| {
            format!(
                "Error on line {}, column {}: '[' is never closed with a matching ']'",
                p.line, p.column
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convert `source` into a token stream, checking that every bracket is matched.
pub fn lex(source: &str) -> Result<TokenStream, LexError> {
    let mut tokens = Vec::new();
    let mut open_brackets: Vec<Position> = Vec::new();
    let mut line = 0usize;

    for (column, ch) in source.chars().enumerate() {
        let Some(token) = Token::from_char(ch) else {
            if ch == '\n' {
                line += 1;
            }
            continue;
        };

        match token {
            Token::LoopStart => open_brackets.push(Position { line, column }),
            Token::LoopEnd => {
                if open_brackets.pop().is_none() {
                    return Err(LexError::UnmatchedClose {
                        position: Position { line, column },
                    });
                }
            }
            _ => {}
        }

        tokens.push(token);
    }

    if !open_brackets.is_empty() {
        return Err(LexError::UnmatchedOpen { positions: open_brackets });
    }

    tracing::debug!(tokens = tokens.len(), lines = line + 1, "lexed source");
    Ok(TokenStream(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_instruction_character_maps_to_its_token() {
        let stream = lex("<>+-.,[]").unwrap();
        assert_eq!(
            stream.into_vec(),
            vec![
                Token::MoveLeft,
                Token::MoveRight,
                Token::Increment,
                Token::Decrement,
                Token::Output,
                Token::Input,
                Token::LoopStart,
                Token::LoopEnd,
            ]
        );
    }

    #[test]
    fn comments_and_whitespace_produce_no_tokens() {
        let source = "add two:\n  ++ # done\n[ loop -> ]\n";
        let stream = lex(source).unwrap();
        let recognized = source.chars().filter(|c| "<>+-.,[]".contains(*c)).count();
        assert_eq!(stream.len(), recognized);
    }

    #[test]
    fn empty_source_is_an_empty_stream() {
        assert!(lex("").unwrap().is_empty());
        assert!(lex("no instructions here\n").unwrap().is_empty());
    }

    #[test]
    fn stray_close_reports_its_offset() {
        let err = lex("++]").unwrap_err();
        assert_eq!(
            err,
            LexError::UnmatchedClose {
                position: Position { line: 0, column: 2 }
            }
        );
    }

    #[test]
    fn stray_close_stops_at_first_occurrence() {
        let err = lex("]]").unwrap_err();
        assert_eq!(err.positions(), &[Position { line: 0, column: 0 }]);
    }

    #[test]
    fn column_is_absolute_offset_across_lines() {
        // The ']' sits on the third line, but the column keeps counting from the
        // start of the input.
        let err = lex("+\n+\n]").unwrap_err();
        assert_eq!(err.positions(), &[Position { line: 2, column: 4 }]);
    }

    #[test]
    fn unclosed_open_reports_recorded_position() {
        let err = lex("+\n[+").unwrap_err();
        assert_eq!(
            err,
            LexError::UnmatchedOpen {
                positions: vec![Position { line: 1, column: 2 }]
            }
        );
    }

    #[test]
    fn every_unclosed_open_is_reported() {
        let err = lex("[[]\n[").unwrap_err();
        assert_eq!(
            err.positions(),
            &[Position { line: 0, column: 0 }, Position { line: 1, column: 4 }]
        );
        let message = err.to_string();
        assert!(message.contains("line 0, column 0"));
        assert!(message.contains("line 1, column 4"));
        assert_eq!(message.lines().count(), 2);
    }

    #[test]
    fn close_message_names_the_position() {
        let err = lex("\n]").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error on line 1, column 1: closing ']' without a matching '['"
        );
    }

    #[test]
    fn from_char_and_as_char_agree() {
        for ch in "<>+-.,[]".chars() {
            assert_eq!(Token::from_char(ch).map(Token::as_char), Some(ch));
        }
        assert_eq!(Token::from_char('a'), None);
    }
}
