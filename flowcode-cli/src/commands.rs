//! CLI command implementations.
//!
//! Each command returns the process exit status. Errors from the library
//! crates are mapped to their status here and nowhere else.

use std::fs;
use std::io::{self, Read};

use tracing::debug;

use flowcode_common::error::InterpretError;
use flowcode_common::program::Program;
use flowcode_vm::InputCursor;

/// Execute a program: `run [--source FILE] [--input FILE]`.
///
/// Whichever of the two files is omitted falls back to stdin; at least one
/// must be named so both never compete for it.
pub fn run(args: &[String]) -> i32 {
    let (source, input) = match parse_run_args(args) {
        Ok(paths) => paths,
        Err(err) => return fail(&err),
    };

    let text = match read_source(source.as_deref()) {
        Ok(text) => text,
        Err(err) => return fail(&err),
    };

    let program = match flowcode_loader::load(&text) {
        Ok(program) => program,
        Err(err) => return fail(&err),
    };
    debug!(instructions = program.len(), "program loaded");

    let cursor = match &input {
        Some(path) => match read_file(path) {
            Ok(text) => InputCursor::from_text(&text),
            Err(err) => return fail(&err),
        },
        None => InputCursor::stdin(),
    };

    let stdout = io::stdout();
    let stderr = io::stderr();
    match flowcode_vm::run(&program, cursor, stdout.lock(), stderr.lock()) {
        Ok(outcome) => outcome.status(),
        Err(err) => fail(&err),
    }
}

/// Load and validate a program: `check <file>`.
pub fn check(args: &[String]) -> i32 {
    let path = match single_file_arg(args, "check") {
        Ok(path) => path,
        Err(err) => return fail(&err),
    };
    match load_path(&path) {
        Ok(program) => {
            println!("OK: {path} ({} instructions)", program.len());
            0
        }
        Err(err) => fail(&err),
    }
}

/// Print the canonical listing of a program: `dump <file>`.
pub fn dump(args: &[String]) -> i32 {
    let path = match single_file_arg(args, "dump") {
        Ok(path) => path,
        Err(err) => return fail(&err),
    };
    match load_path(&path) {
        Ok(program) => {
            print!("{}", flowcode_loader::listing(&program));
            0
        }
        Err(err) => fail(&err),
    }
}

// --- Helpers ---

fn fail(err: &InterpretError) -> i32 {
    eprintln!("error: {err}");
    err.exit_code()
}

/// Parse `--source FILE` / `--input FILE` flags.
fn parse_run_args(args: &[String]) -> Result<(Option<String>, Option<String>), InterpretError> {
    let mut source: Option<String> = None;
    let mut input: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let slot = match flag {
            "--source" => &mut source,
            "--input" => &mut input,
            other => {
                return Err(InterpretError::Usage(format!(
                    "unexpected argument '{other}'"
                )))
            }
        };
        let value = args.get(i + 1).ok_or_else(|| {
            InterpretError::Usage(format!("{flag} requires a file path"))
        })?;
        if slot.is_some() {
            return Err(InterpretError::Usage(format!("{flag} given twice")));
        }
        *slot = Some(value.clone());
        i += 2;
    }

    if source.is_none() && input.is_none() {
        return Err(InterpretError::Usage(
            "at least one of --source and --input is required".to_string(),
        ));
    }
    Ok((source, input))
}

fn single_file_arg(args: &[String], command: &str) -> Result<String, InterpretError> {
    match args {
        [path] => Ok(path.clone()),
        [] => Err(InterpretError::Usage(format!(
            "{command} requires an input file"
        ))),
        _ => Err(InterpretError::Usage(format!(
            "{command} takes exactly one argument"
        ))),
    }
}

fn read_file(path: &str) -> Result<String, InterpretError> {
    fs::read_to_string(path).map_err(|e| InterpretError::InputFile {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

fn read_source(path: Option<&str>) -> Result<String, InterpretError> {
    match path {
        Some(path) => read_file(path),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| InterpretError::InputFile {
                    path: "<stdin>".to_string(),
                    reason: e.to_string(),
                })?;
            Ok(text)
        }
    }
}

fn load_path(path: &str) -> Result<Program, InterpretError> {
    let text = read_file(path)?;
    flowcode_loader::load(&text)
}
