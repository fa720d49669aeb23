//! Token stream execution against a circular byte tape.
//!
//! Behaviors:
//! - Cells are bytes and wrap: `255 + 1 == 0`, `0 - 1 == 255`.
//! - The data pointer wraps at both ends of the tape instead of erroring.
//! - `.` writes the current cell as a character, or as a decimal number in
//!   [`OutputMode::Numeric`] (numbers separated by a single space).
//! - `,` reads one line of input. In character mode the line must hold exactly
//!   one character with a code of at most 255; in numeric mode it must parse
//!   as an integer in `0..=255`. Anything else, including EOF, ends the run
//!   with [`ExecError::InvalidInput`].
//! - After the last instruction a completion notice is written to the output.

use std::fmt;
use std::io::{self, BufRead, IsTerminal, StdinLock, Stdout, Write};
use std::str::FromStr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::lexer::{Token, TokenStream};

/// Written to the output after the last instruction has run.
pub const COMPLETION_NOTICE: &str = "\nDone!\n";

/// How `.` renders a cell and how `,` interprets input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputMode {
    /// Cells are characters.
    #[default]
    #[value(alias = "character")]
    Char,
    /// Cells are decimal numbers.
    #[value(alias = "num")]
    Numeric,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Char => write!(f, "char"),
            OutputMode::Numeric => write!(f, "numeric"),
        }
    }
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "char" | "character" => Ok(OutputMode::Char),
            "num" | "numeric" => Ok(OutputMode::Numeric),
            other => Err(format!("unknown output mode '{other}' (expected char or numeric)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TapeError {
    #[error("tape must have at least one cell")]
    Empty,
}

/// A fixed-length ring of byte cells and the data pointer into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<u8>,
    pointer: usize,
}

impl Tape {
    pub const DEFAULT_LEN: usize = 30_000;

    /// A zeroed tape of `len` cells.
    pub fn new(len: usize) -> Result<Self, TapeError> {
        Self::from_cells(vec![0; len])
    }

    /// A tape holding `cells`, with the pointer on the first one.
    pub fn from_cells(cells: Vec<u8>) -> Result<Self, TapeError> {
        if cells.is_empty() {
            return Err(TapeError::Empty);
        }
        Ok(Self { cells, pointer: 0 })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: construction rejects empty tapes.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Value of the cell under the pointer.
    pub fn current(&self) -> u8 {
        self.cells[self.pointer]
    }

    fn set_current(&mut self, value: u8) {
        self.cells[self.pointer] = value;
    }

    pub fn move_left(&mut self) {
        self.pointer = (self.pointer + self.cells.len() - 1) % self.cells.len();
    }

    pub fn move_right(&mut self) {
        self.pointer = (self.pointer + 1) % self.cells.len();
    }

    pub fn increment(&mut self) {
        self.cells[self.pointer] = self.cells[self.pointer].wrapping_add(1);
    }

    pub fn decrement(&mut self) {
        self.cells[self.pointer] = self.cells[self.pointer].wrapping_sub(1);
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self {
            cells: vec![0; Self::DEFAULT_LEN],
            pointer: 0,
        }
    }
}

/// Errors that end a run early.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// `,` could not turn the supplied input into a cell value.
    #[error("Invalid input given, terminated")]
    InvalidInput { ip: usize, mode: OutputMode },

    /// Reading input or writing output failed.
    #[error("I/O error at instruction {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: io::Error,
    },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },
}

/// How a run ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The instruction pointer reached the end of the stream.
    Completed,
    /// The cancel flag was raised between two instructions.
    Interrupted,
}

/// Controls for cooperative cancellation and step limiting.
#[derive(Debug, Clone, Default)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }
}

/// Find the `]` that closes the `[` at `ip`.
///
/// The stream must be balanced and `stream[ip]` must be a `LoopStart`; both
/// hold for anything returned by [`crate::lex`].
pub fn find_matching_end(ip: usize, stream: &[Token]) -> usize {
    debug_assert_eq!(stream.get(ip), Some(&Token::LoopStart));

    let mut depth = 1usize;
    let mut pos = ip;
    while depth > 0 {
        pos += 1;
        match stream[pos] {
            Token::LoopStart => depth += 1,
            Token::LoopEnd => depth -= 1,
            _ => {}
        }
    }
    pos
}

/// Run `stream` on `tape` using stdin and stdout.
pub fn execute(stream: &TokenStream, tape: &mut Tape, mode: OutputMode) -> Result<Status, ExecError> {
    Executor::stdio(mode).execute(stream, tape)
}

/// The interpreter: owns its input and output, borrows the tape per run.
pub struct Executor<R, W> {
    input: R,
    output: W,
    mode: OutputMode,
    prompt: Option<String>,
    control: Option<StepControl>,
    debug: bool,
    emitted: usize,
}

impl Executor<StdinLock<'static>, Stdout> {
    /// An executor wired to the process's stdin and stdout.
    ///
    /// When stdin is a terminal, `,` prompts on stderr before reading.
    pub fn stdio(mode: OutputMode) -> Self {
        let prompt = io::stdin()
            .is_terminal()
            .then(|| "Input a single value: ".to_string());
        Self::new(io::stdin().lock(), io::stdout(), mode).with_prompt(prompt)
    }
}

impl<R: BufRead, W: Write> Executor<R, W> {
    pub fn new(input: R, output: W, mode: OutputMode) -> Self {
        Self {
            input,
            output,
            mode,
            prompt: None,
            control: None,
            debug: false,
            emitted: 0,
        }
    }

    /// Text written to stderr before every `,` read.
    pub fn with_prompt(mut self, prompt: Option<String>) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_control(mut self, control: StepControl) -> Self {
        self.control = Some(control);
        self
    }

    /// Print a step-by-step table of operations instead of performing I/O.
    ///
    /// The tape advances exactly as it would during a real run, but `.` only
    /// logs the value it would have written and `,` stores 0 without reading.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Give back the output sink, e.g. to inspect a buffer after a run.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run `stream` against `tape` until the stream ends, the cancel flag is
    /// raised, or an error occurs.
    pub fn execute(&mut self, stream: &[Token], tape: &mut Tape) -> Result<Status, ExecError> {
        let mut ip = 0usize;
        let mut loop_stack: Vec<usize> = Vec::new();
        let mut step = 0usize;
        self.emitted = 0;

        if self.debug {
            writeln!(self.output, "STEP | IP  | PTR | CELL | INSTR | ACTION")
                .and_then(|_| writeln!(self.output, "-----+-----+-----+------+-------+------------------------------------------------"))
                .map_err(|source| ExecError::Io { ip, source })?;
        }

        while ip < stream.len() {
            if let Some(ctrl) = self.control.as_ref() {
                if ctrl.cancel_flag.load(Ordering::Relaxed) {
                    tracing::debug!(ip, step, "run interrupted");
                    self.output.flush().map_err(|source| ExecError::Io { ip, source })?;
                    return Ok(Status::Interrupted);
                }
                if let Some(max) = ctrl.max_steps {
                    if step >= max {
                        return Err(ExecError::StepLimitExceeded { limit: max });
                    }
                }
            }

            let token = stream[ip];
            let (ptr_before, cell_before) = (tape.pointer(), tape.current());
            let mut action: Option<String> = if self.debug { Some(String::new()) } else { None };
            let ip_before = ip;

            match token {
                Token::MoveLeft => {
                    tape.move_left();
                    if let Some(a) = action.as_mut() { *a = format!("Moved pointer to index {}", tape.pointer()); }
                }
                Token::MoveRight => {
                    tape.move_right();
                    if let Some(a) = action.as_mut() { *a = format!("Moved pointer to index {}", tape.pointer()); }
                }
                Token::Increment => {
                    tape.increment();
                    if let Some(a) = action.as_mut() { *a = format!("Increment cell[{}] from {} to {}", ptr_before, cell_before, tape.current()); }
                }
                Token::Decrement => {
                    tape.decrement();
                    if let Some(a) = action.as_mut() { *a = format!("Decrement cell[{}] from {} to {}", ptr_before, cell_before, tape.current()); }
                }
                Token::Output => {
                    if let Some(a) = action.as_mut() {
                        *a = format!("Output {} (suppressed in debug)", self.render(tape.current()));
                    } else {
                        self.emit(tape.current()).map_err(|source| ExecError::Io { ip, source })?;
                    }
                }
                Token::Input => {
                    if let Some(a) = action.as_mut() {
                        tape.set_current(0);
                        *a = "Read input -> simulated 0".to_string();
                    } else {
                        let value = self.read_value(ip)?;
                        tape.set_current(value);
                    }
                }
                Token::LoopStart => {
                    if tape.current() == 0 {
                        ip = find_matching_end(ip, stream);
                        if let Some(a) = action.as_mut() { *a = format!("Cell is 0; skip loop to matching ']' at IP {}", ip); }
                    } else {
                        loop_stack.push(ip);
                        if let Some(a) = action.as_mut() { *a = "Enter loop (cell != 0)".to_string(); }
                    }
                }
                Token::LoopEnd => {
                    if tape.current() == 0 {
                        loop_stack.pop();
                        if let Some(a) = action.as_mut() { *a = "Exit loop (cell is 0)".to_string(); }
                    } else {
                        // The matching '[' stays on the stack; stepping past it
                        // re-enters the body without pushing again.
                        ip = *loop_stack.last().expect("balanced stream has an active loop at ']'");
                        if let Some(a) = action.as_mut() { *a = format!("Cell != 0; jump back to matching '[' at IP {}", ip); }
                    }
                }
            }

            tracing::trace!(step, ip = ip_before, ptr = ptr_before, cell = cell_before, instr = %token, "step");

            if let Some(action) = action {
                writeln!(
                    self.output,
                    "{:<4} | {:<3} | {:<3} | {:<4} |  {}    | {}",
                    step, ip_before, ptr_before, cell_before, token, action
                )
                .map_err(|source| ExecError::Io { ip: ip_before, source })?;
            }

            step += 1;
            ip += 1;
        }

        self.output
            .write_all(COMPLETION_NOTICE.as_bytes())
            .and_then(|_| self.output.flush())
            .map_err(|source| ExecError::Io { ip, source })?;

        tracing::debug!(steps = step, pointer = tape.pointer(), "run completed");
        Ok(Status::Completed)
    }

    fn render(&self, value: u8) -> String {
        match self.mode {
            OutputMode::Char => format!("{:?}", value as char),
            OutputMode::Numeric => value.to_string(),
        }
    }

    fn emit(&mut self, value: u8) -> io::Result<()> {
        match self.mode {
            OutputMode::Char => write!(self.output, "{}", value as char)?,
            OutputMode::Numeric => {
                if self.emitted > 0 {
                    write!(self.output, " ")?;
                }
                write!(self.output, "{value}")?;
            }
        }
        self.emitted += 1;
        Ok(())
    }

    /// Read one line and turn it into a cell value according to the mode.
    fn read_value(&mut self, ip: usize) -> Result<u8, ExecError> {
        let mode = self.mode;
        let invalid = move || ExecError::InvalidInput { ip, mode };

        // Anything already written should be visible before we block.
        self.output.flush().map_err(|source| ExecError::Io { ip, source })?;
        if let Some(prompt) = self.prompt.as_deref() {
            let mut stderr = io::stderr();
            let _ = write!(stderr, "{prompt}");
            let _ = stderr.flush();
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => return Err(invalid()),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::InvalidData => return Err(invalid()),
            Err(source) => return Err(ExecError::Io { ip, source }),
        }

        let line = line.strip_suffix('\n').unwrap_or(&line);
        let line = line.strip_suffix('\r').unwrap_or(line);

        match mode {
            OutputMode::Char => {
                let mut chars = line.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => u8::try_from(u32::from(ch)).map_err(|_| invalid()),
                    _ => Err(invalid()),
                }
            }
            OutputMode::Numeric => line.trim().parse::<u8>().map_err(|_| invalid()),
        }
    }
}
