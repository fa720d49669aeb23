use clap::Args;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use crate::cli_util::print_lex_error;
use crate::config::Config;
use crate::executor::{ExecError, Executor, OutputMode, Status, StepControl, Tape};
use crate::lexer::lex;
use crate::theme::Palette;

/// How often the waiting thread checks for an interrupt or an expired timeout.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

pub const INTERRUPT_MESSAGE: &str = "Execution interrupted";

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Program file to run (must end in .bf)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Tape length, same as --tape-len (also accepted after --code)
    #[arg(value_name = "TAPE_LEN")]
    pub tape_len_positional: Option<usize>,

    /// Run CODE instead of reading a file
    #[arg(short = 'c', long = "code", value_name = "CODE", allow_hyphen_values = true)]
    pub code: Option<String>,

    /// Render output and parse input as characters or decimal numbers
    #[arg(short = 'm', long = "mode", value_enum)]
    pub mode: Option<OutputMode>,

    /// Number of tape cells (fallback BFTAPE_TAPE_LEN; default 30000)
    #[arg(short = 't', long = "tape-len", value_name = "N")]
    pub tape_len: Option<usize>,

    /// Print a step-by-step table of operations instead of executing
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Maximum interpreter steps before abort (fallback BFTAPE_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<usize>,

    /// Wall-clock timeout in milliseconds (fallback BFTAPE_TIMEOUT_MS; default none)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        path,
        tape_len_positional,
        code,
        mode,
        tape_len,
        debug,
        max_steps,
        timeout_ms,
        ..
    } = args;

    let Some((program_source, tape_len_positional)) = resolve_program(path, tape_len_positional, code) else {
        usage_and_exit(program, 2);
    };

    // Resolve settings: flags -> env -> config file -> defaults
    let mut cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            return 1;
        }
    };
    if let Some(n) = tape_len.or(tape_len_positional) {
        cfg.tape_len = n;
    }
    if let Some(m) = mode {
        cfg.mode = m;
    }
    if max_steps.is_some() {
        cfg.max_steps = max_steps;
    }
    if timeout_ms.is_some() {
        cfg.timeout_ms = timeout_ms;
    }
    let palette = Palette::new(cfg.color && io::stderr().is_terminal());

    let source = match program_source {
        ProgramSource::File(path) => match read_program(&path) {
            Ok(s) => s,
            Err(msg) => {
                eprintln!("{program}: {msg}");
                let _ = io::stderr().flush();
                return 1;
            }
        },
        ProgramSource::Inline(code) => code,
    };

    let mut tape = match Tape::new(cfg.tape_len) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            return 2;
        }
    };

    let stream = match lex(&source) {
        Ok(s) => s,
        Err(err) => {
            print_lex_error(Some(program), &source, &err, &palette);
            return 1;
        }
    };

    let debug_table = debug;
    tracing::debug!(tape_len = cfg.tape_len, mode = %cfg.mode, debug_table, "starting run");

    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::Relaxed)) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
        return 1;
    }

    // Execute on a worker thread so an interrupt or timeout is noticed even
    // while the program is blocked reading input.
    let (tx, rx) = mpsc::channel::<Result<Status, ExecError>>();
    let ctrl = StepControl::new(cfg.max_steps, cancel.clone());
    let run_mode = cfg.mode;
    thread::spawn(move || {
        let mut exec = Executor::stdio(run_mode).debug(debug).with_control(ctrl);
        let res = exec.execute(&stream, &mut tape);
        let _ = tx.send(res);
    });

    let deadline = cfg.timeout_ms.map(|ms| Instant::now() + Duration::from_millis(ms));
    let result = loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(res) => break Some(res),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if cancel.load(Ordering::Relaxed) {
                    break Some(Ok(Status::Interrupted));
                }
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    cancel.store(true, Ordering::Relaxed);
                    break None;
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                eprintln!("{program}: interpreter thread exited unexpectedly");
                let _ = io::stderr().flush();
                return 1;
            }
        }
    };

    let _ = io::stdout().flush();
    let exit_code = match result {
        Some(Ok(Status::Completed)) => 0,
        Some(Ok(Status::Interrupted)) => {
            eprintln!("\n{}", palette.notice.paint(INTERRUPT_MESSAGE));
            0
        }
        Some(Err(err @ ExecError::InvalidInput { .. })) => {
            tracing::debug!(?err, "input rejected");
            eprintln!("{}", palette.error.paint(err.to_string()));
            1
        }
        Some(Err(err @ ExecError::StepLimitExceeded { .. })) => {
            eprintln!("{err}");
            1
        }
        Some(Err(err @ ExecError::Io { .. })) => {
            eprintln!("{program}: {}", palette.error.paint(err.to_string()));
            1
        }
        None => {
            eprintln!(
                "Execution aborted: wall-clock timeout exceeded ({} ms)",
                cfg.timeout_ms.unwrap_or_default()
            );
            1
        }
    };
    let _ = io::stderr().flush();
    exit_code
}

#[derive(Debug, PartialEq, Eq)]
enum ProgramSource {
    File(PathBuf),
    Inline(String),
}

/// Pick the program from PATH or --code. With --code, a lone positional is the
/// tape length, since clap binds the first positional to PATH.
fn resolve_program(
    path: Option<PathBuf>,
    tape_len_positional: Option<usize>,
    code: Option<String>,
) -> Option<(ProgramSource, Option<usize>)> {
    match (path, code) {
        (Some(path), None) => Some((ProgramSource::File(path), tape_len_positional)),
        (None, Some(code)) => Some((ProgramSource::Inline(code), tape_len_positional)),
        (Some(path), Some(code)) if tape_len_positional.is_none() => {
            let n = path.to_str()?.parse::<usize>().ok()?;
            Some((ProgramSource::Inline(code), Some(n)))
        }
        _ => None,
    }
}

/// Read a program file, insisting on an existing `.bf` file.
fn read_program(path: &Path) -> Result<String, String> {
    let is_bf = path.extension().is_some_and(|ext| ext == "bf");
    if !path.is_file() || !is_bf {
        return Err(format!("Invalid path or file given: {}", path.display()));
    }
    fs::read_to_string(path).map_err(|e| format!("failed to read program file as UTF-8: {e}"))
}

pub fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} [OPTIONS] <PATH> [TAPE_LEN]   # Run the program in PATH (a .bf file)
  {0} [OPTIONS] --code "<code>" [TAPE_LEN] # Run code given on the command line

Options:
  --code,     -c <CODE>        Run CODE instead of reading a file
  --mode,     -m <char|numeric> Output and input as characters (default) or numbers
  --tape-len, -t <N>           Number of tape cells (default 30000)
  --debug,    -d               Print a step-by-step table of operations instead of executing
  --max-steps <N>              Abort after N instructions
  --timeout   <MS>             Abort after MS milliseconds of wall-clock time
  --help,     -h               Show this help

Notes:
- Characters other than ><+-.,[] are comments.
- Input (`,`) reads one line: a single character in char mode, 0-255 in numeric mode.
  Anything else ends the run.
- Settings also come from BFTAPE_TAPE_LEN, BFTAPE_MODE, BFTAPE_MAX_STEPS,
  BFTAPE_TIMEOUT_MS and the [run] section of <config dir>/bftape.toml.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
