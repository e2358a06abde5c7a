//! The FlowCode error taxonomy.
//!
//! One error type flows up through loading, program construction, and
//! execution; the CLI maps it to a process exit status exactly once, at the
//! top level. Every variant belongs to one of the fixed status classes
//! returned by [`InterpretError::exit_code`].

use thiserror::Error;

use crate::instruction::FrameKind;

/// Any failure the interpreter can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpretError {
    // --- usage and file access ---
    /// Command-line misuse.
    #[error("{0}")]
    Usage(String),

    /// A named source or input file could not be read.
    #[error("cannot read '{path}': {reason}")]
    InputFile { path: String, reason: String },

    // --- malformed external representation ---
    /// The source text does not start with the `.FLOWCODE` header.
    #[error("missing '.FLOWCODE' header line")]
    MissingHeader,

    // --- structurally invalid instruction / program ---
    /// Unrecognized opcode mnemonic.
    #[error("line {line}: unknown opcode '{mnemonic}'")]
    UnknownOpcode { line: usize, mnemonic: String },

    /// An instruction line has the wrong number of operands.
    #[error("line {line}: {opcode} expects {expected} operand(s), found {found}")]
    OperandCount {
        line: usize,
        opcode: &'static str,
        expected: usize,
        found: usize,
    },

    /// An operand does not match the lexical rules for its expected kind.
    #[error("line {line}: invalid {expected} operand '{text}'")]
    InvalidOperand {
        line: usize,
        expected: &'static str,
        text: String,
    },

    /// An instruction record carries a non-positive order value.
    #[error("instruction order {order} is not a positive integer")]
    NonPositiveOrder { order: i32 },

    /// Two instruction records carry the same order value.
    #[error("duplicate instruction order {order}")]
    DuplicateOrder { order: i32 },

    /// An instruction record has the wrong number of operands.
    #[error("instruction {index}: {opcode} expects {expected} operand(s), found {found}")]
    BadOperandCount {
        index: usize,
        opcode: &'static str,
        expected: usize,
        found: usize,
    },

    /// An instruction record's operand has the wrong kind for its position.
    #[error("instruction {index}: {opcode} operand {position} has the wrong kind")]
    BadOperandKind {
        index: usize,
        opcode: &'static str,
        position: usize,
    },

    // --- static semantic violations ---
    /// A label name is declared by more than one `LABEL` instruction.
    #[error("label '{name}' declared more than once")]
    DuplicateLabel { name: String },

    /// A jump or call names a label no `LABEL` instruction declares.
    #[error("jump target '{name}' is not declared")]
    UndeclaredLabel { name: String },

    /// `DEFVAR` on a name already declared in the target frame.
    #[error("variable '{var}' is already declared")]
    Redefinition { var: String },

    // --- runtime type errors ---
    /// An operand resolved to a value of the wrong type.
    #[error("{operation}: wrong operand type ({found})")]
    WrongOperandType {
        operation: &'static str,
        found: String,
    },

    // --- runtime reference errors ---
    /// A variable reference names an undeclared variable.
    #[error("variable '{var}' is not declared")]
    UndefinedVariable { var: String },

    /// A variable reference or frame operation targets an absent frame.
    #[error("{frame} frame does not exist")]
    UndefinedFrame { frame: FrameKind },

    // --- missing values ---
    /// Pop from an empty data or call stack.
    #[error("pop from an empty {which} stack")]
    EmptyStack { which: &'static str },

    /// A declared variable was read before its first write.
    #[error("variable '{var}' is uninitialized")]
    UninitializedRead { var: String },

    // --- out-of-domain values ---
    /// `IDIV` with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,

    /// `EXIT` with an integer outside 0..=49.
    #[error("EXIT code {value} out of range 0..=49")]
    ExitCodeRange { value: i64 },

    // --- string operation errors ---
    /// A string index is negative or past the end.
    #[error("{operation}: index {index} out of bounds for string of length {len}")]
    IndexOutOfBounds {
        operation: &'static str,
        index: i64,
        len: usize,
    },

    /// `INT2CHAR` of a value that is not a Unicode scalar.
    #[error("INT2CHAR: {value} is not a Unicode code point")]
    InvalidCodePoint { value: i64 },

    /// `SETCHAR` with an empty replacement string.
    #[error("SETCHAR: replacement string is empty")]
    EmptyReplacement,

    // --- anything else ---
    /// A condition the interpreter itself should have made impossible.
    #[error("internal error: {0}")]
    Internal(String),
}

impl InterpretError {
    /// The process exit status for this error class.
    pub fn exit_code(&self) -> i32 {
        use InterpretError::*;
        match self {
            Usage(_) => 10,
            InputFile { .. } => 11,
            MissingHeader => 31,
            UnknownOpcode { .. }
            | OperandCount { .. }
            | InvalidOperand { .. }
            | NonPositiveOrder { .. }
            | DuplicateOrder { .. }
            | BadOperandCount { .. }
            | BadOperandKind { .. } => 32,
            DuplicateLabel { .. } | UndeclaredLabel { .. } | Redefinition { .. } => 52,
            WrongOperandType { .. } => 53,
            UndefinedVariable { .. } => 54,
            UndefinedFrame { .. } => 55,
            EmptyStack { .. } | UninitializedRead { .. } => 56,
            DivisionByZero | ExitCodeRange { .. } => 57,
            IndexOutOfBounds { .. } | InvalidCodePoint { .. } | EmptyReplacement => 58,
            Internal(_) => 99,
        }
    }
}
