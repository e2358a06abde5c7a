//! Engine state: program counter, stacks, frames, and the IO seams.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use flowcode_common::error::InterpretError;
use flowcode_common::instruction::Operand;
use flowcode_common::program::Program;
use flowcode_common::value::Value;

use crate::frames::FrameManager;

/// How a finished run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The program counter ran past the last instruction.
    Completed,
    /// An `EXIT` instruction ended the run with this 0-49 status.
    Exited(i32),
}

impl Outcome {
    /// The process exit status this outcome maps to.
    pub fn status(&self) -> i32 {
        match self {
            Outcome::Completed => 0,
            Outcome::Exited(code) => *code,
        }
    }
}

/// Sequential cursor over the data input consumed by `READ`.
///
/// Lines are consumed strictly once and never replayed. An exhausted cursor
/// yields `None`, which `READ` turns into nil.
#[derive(Debug)]
pub struct InputCursor(Source);

#[derive(Debug)]
enum Source {
    /// Pre-read lines, consumed front to back.
    Lines(VecDeque<String>),
    /// Blocking reads from standard input.
    Stdin,
}

impl InputCursor {
    /// Cursor over the lines of `text`.
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(text.lines().map(str::to_string).collect())
    }

    /// Cursor over pre-read lines.
    pub fn from_lines(lines: Vec<String>) -> Self {
        InputCursor(Source::Lines(lines.into()))
    }

    /// Cursor with no input at all; every `READ` yields nil.
    pub fn empty() -> Self {
        Self::from_lines(Vec::new())
    }

    /// Cursor that blocks on standard input, for interactive runs.
    pub fn stdin() -> Self {
        InputCursor(Source::Stdin)
    }

    /// The next input line without its trailing newline, or `None` when
    /// exhausted.
    pub fn next_line(&mut self) -> Option<String> {
        match &mut self.0 {
            Source::Lines(lines) => lines.pop_front(),
            Source::Stdin => {
                let mut line = String::new();
                let read = io::stdin().lock().read_line(&mut line).ok()?;
                if read == 0 {
                    return None;
                }
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(line)
            }
        }
    }
}

/// The FlowCode execution engine.
///
/// All mutable run state lives here; nothing is process-global, so
/// independent runs (e.g. in tests) never share state.
pub struct Engine<'p, O: Write, E: Write> {
    pub(crate) program: &'p Program,
    pub(crate) frames: FrameManager,
    pub(crate) data_stack: Vec<Value>,
    pub(crate) call_stack: Vec<usize>,
    pub(crate) pc: usize,
    pub(crate) executed: u64,
    pub(crate) input: InputCursor,
    pub(crate) out: O,
    pub(crate) err: E,
}

impl<'p, O: Write, E: Write> Engine<'p, O, E> {
    /// Create an engine for one run of `program`.
    pub fn new(program: &'p Program, input: InputCursor, out: O, err: E) -> Self {
        Self {
            program,
            frames: FrameManager::new(),
            data_stack: Vec::new(),
            call_stack: Vec::new(),
            pc: 0,
            executed: 0,
            input,
            out,
            err,
        }
    }

    /// Resolve a symbol operand to a value, rejecting uninitialized reads.
    pub(crate) fn resolve(&self, operand: &Operand) -> Result<Value, InterpretError> {
        match operand {
            Operand::Const(value) => Ok(value.clone()),
            Operand::Var(var) => {
                let value = self.frames.read(var)?;
                if value.is_initialized() {
                    Ok(value.clone())
                } else {
                    Err(InterpretError::UninitializedRead {
                        var: var.to_string(),
                    })
                }
            }
            other => Err(InterpretError::Internal(format!(
                "{other:?} resolved as a symbol"
            ))),
        }
    }

    /// Resolve a symbol operand, tolerating `Uninit`. Only `TYPE` uses this.
    pub(crate) fn resolve_raw(&self, operand: &Operand) -> Result<Value, InterpretError> {
        match operand {
            Operand::Const(value) => Ok(value.clone()),
            Operand::Var(var) => Ok(self.frames.read(var)?.clone()),
            other => Err(InterpretError::Internal(format!(
                "{other:?} resolved as a symbol"
            ))),
        }
    }

    /// Pop the data stack.
    pub(crate) fn pop_data(&mut self) -> Result<Value, InterpretError> {
        self.data_stack
            .pop()
            .ok_or(InterpretError::EmptyStack { which: "data" })
    }
}
