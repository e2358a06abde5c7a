//! FlowCode source loader — text → validated instruction records.
//!
//! The loader enforces every lexical rule of the source format (header,
//! comments, operand grammar, string escapes) and assigns each instruction
//! its 1-based source position as the `order` value.
//! [`Program::from_instructions`] then independently re-checks ordering and
//! resolves labels, so a loaded program is fully validated before the first
//! instruction runs.
//!
//! # Usage
//!
//! ```
//! let program = flowcode_loader::load(".FLOWCODE\nDEFVAR GF@x\n").unwrap();
//! assert_eq!(program.len(), 1);
//! ```

mod lexer;
mod listing;
mod parser;

pub use listing::listing;

use tracing::debug;

use flowcode_common::error::InterpretError;
use flowcode_common::instruction::Instruction;
use flowcode_common::program::Program;

use lexer::{is_header, split_line};
use parser::parse_instruction;

/// Load FlowCode source text into an executable program.
pub fn load(text: &str) -> Result<Program, InterpretError> {
    let instructions = parse_source(text)?;
    Program::from_instructions(instructions)
}

/// Parse source text into instruction records, without building a program.
///
/// Returns the first error encountered.
pub fn parse_source(text: &str) -> Result<Vec<Instruction>, InterpretError> {
    let mut instructions = Vec::new();
    let mut header_seen = false;
    let mut order: i32 = 0;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let words = split_line(raw);
        if words.is_empty() {
            continue;
        }
        if !header_seen {
            if words.len() == 1 && is_header(words[0]) {
                header_seen = true;
                continue;
            }
            return Err(InterpretError::MissingHeader);
        }
        order += 1;
        instructions.push(parse_instruction(&words, line, order)?);
    }

    if !header_seen {
        return Err(InterpretError::MissingHeader);
    }

    debug!(count = instructions.len(), "source parsed");
    Ok(instructions)
}
