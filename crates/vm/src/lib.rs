//! FlowCode virtual machine — executes validated programs.
//!
//! The engine is a frame/stack machine with:
//! - three variable scopes (global, temporary, local stack)
//! - a data stack for `PUSHS`/`POPS`
//! - a call stack of instruction indices for `CALL`/`RETURN`
//!
//! Dispatch is strictly sequential and deterministic: the same program and
//! the same input lines always produce the same output bytes and outcome.
//!
//! # Usage
//!
//! ```
//! use flowcode_common::{Instruction, Opcode, Operand, Program, Value, Variable};
//! use flowcode_vm::{run, InputCursor, Outcome};
//!
//! let program = Program::from_instructions(vec![
//!     Instruction::new(Opcode::DefVar, 1, vec![Operand::Var(Variable::global("x"))]),
//!     Instruction::new(
//!         Opcode::Move,
//!         2,
//!         vec![
//!             Operand::Var(Variable::global("x")),
//!             Operand::Const(Value::Int(42)),
//!         ],
//!     ),
//!     Instruction::new(Opcode::Write, 3, vec![Operand::Var(Variable::global("x"))]),
//! ])
//! .unwrap();
//!
//! let mut out = Vec::new();
//! let mut err = Vec::new();
//! let outcome = run(&program, InputCursor::empty(), &mut out, &mut err).unwrap();
//! assert_eq!(outcome, Outcome::Completed);
//! assert_eq!(out, b"42");
//! ```

pub mod execute;
pub mod frames;
pub mod machine;
mod ops;

pub use frames::{Frame, FrameManager};
pub use machine::{Engine, InputCursor, Outcome};

use std::io::Write;

use flowcode_common::error::InterpretError;
use flowcode_common::program::Program;

/// Execute a program against the given input cursor and output streams.
///
/// `out` receives `WRITE` output verbatim; `err` receives `DPRINT` and
/// `BREAK` diagnostics. Returns how the run ended, or the first error.
pub fn run<O: Write, E: Write>(
    program: &Program,
    input: InputCursor,
    out: O,
    err: E,
) -> Result<Outcome, InterpretError> {
    Engine::new(program, input, out, err).execute()
}
