//! A small interpreter for the eight-instruction tape language.
//!
//! Programs are plain text; only `<>+-.,[]` are instructions and every other
//! character is a comment. Running a program is two steps:
//!
//! 1. [`lex`] turns the source into a [`TokenStream`], rejecting unbalanced
//!    brackets with a [`LexError`] that points at each offending bracket.
//! 2. [`execute`] (or an [`Executor`] with custom I/O) runs the stream on a
//!    [`Tape`], a ring of byte cells (30,000 by default).
//!
//! Behaviors:
//! - Cell values and the data pointer both wrap around; nothing is ever out of
//!   bounds.
//! - `.` writes the current cell as a character, or as a number in
//!   [`OutputMode::Numeric`].
//! - `,` reads one line of input; input that is not a valid cell value ends
//!   the run with [`ExecError::InvalidInput`].
//! - A completion notice is written after the last instruction.
//!
//! Quick start:
//!
//! ```no_run
//! use bftape::{lex, execute, OutputMode, Tape};
//!
//! // Prints "Hi"
//! let code = "++++++++[>+++++++++<-]>.<+++++[>+++++++<-]>--.";
//! let stream = lex(code).expect("balanced brackets");
//! let mut tape = Tape::default();
//! execute(&stream, &mut tape, OutputMode::Char).expect("program should run");
//! ```

pub mod cli_util;
pub mod commands;
pub mod config;
pub mod executor;
pub mod lexer;
pub mod logging;
pub mod theme;

pub use config::{Config, ConfigError};
pub use executor::{
    execute, find_matching_end, ExecError, Executor, OutputMode, Status, StepControl, Tape, TapeError,
};
pub use lexer::{lex, LexError, Position, Token, TokenStream};
