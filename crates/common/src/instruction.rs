//! Instruction records handed to the engine by a loader.
//!
//! A loader performs lexical validation; `Program::from_instructions` then
//! re-checks operand shape against [`Opcode::signature`], so the engine can
//! use the typed accessors here without re-validating.

use std::fmt;

use crate::error::InterpretError;
use crate::opcode::{Opcode, OperandKind};
use crate::value::Value;

/// Storage scope tag of a variable reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// `GF` — the single global frame, always present.
    Global,
    /// `LF` — top of the local frame stack, absent when the stack is empty.
    Local,
    /// `TF` — the pending temporary frame, absent until `CREATEFRAME`.
    Temporary,
}

impl FrameKind {
    /// The two-letter scope tag used in source text.
    pub fn tag(&self) -> &'static str {
        match self {
            FrameKind::Global => "GF",
            FrameKind::Local => "LF",
            FrameKind::Temporary => "TF",
        }
    }

    /// Parse a scope tag. Tags are case-sensitive.
    pub fn from_tag(tag: &str) -> Option<FrameKind> {
        match tag {
            "GF" => Some(FrameKind::Global),
            "LF" => Some(FrameKind::Local),
            "TF" => Some(FrameKind::Temporary),
            _ => None,
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A scoped variable reference, e.g. `GF@counter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub frame: FrameKind,
    pub name: String,
}

impl Variable {
    pub fn new(frame: FrameKind, name: impl Into<String>) -> Self {
        Self {
            frame,
            name: name.into(),
        }
    }

    pub fn global(name: impl Into<String>) -> Self {
        Self::new(FrameKind::Global, name)
    }

    pub fn local(name: impl Into<String>) -> Self {
        Self::new(FrameKind::Local, name)
    }

    pub fn temporary(name: impl Into<String>) -> Self {
        Self::new(FrameKind::Temporary, name)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.frame, self.name)
    }
}

/// Type tag operand accepted by `READ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int,
    Bool,
    Str,
}

impl DataType {
    /// The lowercase source-text name of the type.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Bool => "bool",
            DataType::Str => "string",
        }
    }

    /// Parse a type tag name. Names are lowercase-only.
    pub fn from_name(name: &str) -> Option<DataType> {
        match name {
            "int" => Some(DataType::Int),
            "bool" => Some(DataType::Bool),
            "string" => Some(DataType::Str),
            _ => None,
        }
    }
}

/// One operand of an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A variable reference.
    Var(Variable),
    /// A typed constant. String constants are already escape-decoded.
    Const(Value),
    /// A label reference.
    Label(String),
    /// A type tag.
    Type(DataType),
}

impl Operand {
    /// Whether this operand satisfies the given expected kind.
    ///
    /// A `Symb` position accepts both constants and variable references.
    pub fn matches(&self, kind: OperandKind) -> bool {
        match kind {
            OperandKind::Var => matches!(self, Operand::Var(_)),
            OperandKind::Symb => matches!(self, Operand::Var(_) | Operand::Const(_)),
            OperandKind::Label => matches!(self, Operand::Label(_)),
            OperandKind::Type => matches!(self, Operand::Type(_)),
        }
    }
}

/// A single validated instruction record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    /// Source-declared sequence number. Must be positive and unique within a
    /// program; used only to establish execution order.
    pub order: i32,
    /// 0-3 operands matching `opcode.signature()`.
    pub operands: Vec<Operand>,
}

impl Instruction {
    pub fn new(opcode: Opcode, order: i32, operands: Vec<Operand>) -> Self {
        Self {
            opcode,
            order,
            operands,
        }
    }

    fn operand(&self, position: usize) -> Result<&Operand, InterpretError> {
        self.operands.get(position).ok_or_else(|| {
            InterpretError::Internal(format!(
                "{} has no operand {position}",
                self.opcode.mnemonic()
            ))
        })
    }

    /// The variable reference at `position`.
    pub fn var(&self, position: usize) -> Result<&Variable, InterpretError> {
        match self.operand(position)? {
            Operand::Var(v) => Ok(v),
            other => Err(Self::shape_error(self.opcode, position, other)),
        }
    }

    /// The symbol (constant or variable) at `position`.
    pub fn symb(&self, position: usize) -> Result<&Operand, InterpretError> {
        match self.operand(position)? {
            op @ (Operand::Var(_) | Operand::Const(_)) => Ok(op),
            other => Err(Self::shape_error(self.opcode, position, other)),
        }
    }

    /// The label name at `position`.
    pub fn label(&self, position: usize) -> Result<&str, InterpretError> {
        match self.operand(position)? {
            Operand::Label(name) => Ok(name),
            other => Err(Self::shape_error(self.opcode, position, other)),
        }
    }

    /// The type tag at `position`.
    pub fn data_type(&self, position: usize) -> Result<DataType, InterpretError> {
        match self.operand(position)? {
            Operand::Type(t) => Ok(*t),
            other => Err(Self::shape_error(self.opcode, position, other)),
        }
    }

    // Shape violations are rejected at program construction, so reaching one
    // of these from the engine is an interpreter bug, not a program error.
    fn shape_error(opcode: Opcode, position: usize, found: &Operand) -> InterpretError {
        InterpretError::Internal(format!(
            "{} operand {position} has unexpected shape {found:?}",
            opcode.mnemonic()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_tags_roundtrip() {
        for kind in [FrameKind::Global, FrameKind::Local, FrameKind::Temporary] {
            assert_eq!(FrameKind::from_tag(kind.tag()), Some(kind));
        }
    }

    #[test]
    fn frame_tags_are_case_sensitive() {
        assert_eq!(FrameKind::from_tag("gf"), None);
        assert_eq!(FrameKind::from_tag("Lf"), None);
    }

    #[test]
    fn variable_display() {
        assert_eq!(Variable::global("x").to_string(), "GF@x");
        assert_eq!(Variable::local("i").to_string(), "LF@i");
        assert_eq!(Variable::temporary("tmp").to_string(), "TF@tmp");
    }

    #[test]
    fn data_type_names() {
        assert_eq!(DataType::from_name("int"), Some(DataType::Int));
        assert_eq!(DataType::from_name("string"), Some(DataType::Str));
        assert_eq!(DataType::from_name("bool"), Some(DataType::Bool));
        assert_eq!(DataType::from_name("Int"), None);
        assert_eq!(DataType::from_name("nil"), None);
    }

    #[test]
    fn operand_kind_matching() {
        let var = Operand::Var(Variable::global("x"));
        let constant = Operand::Const(Value::Int(1));
        let label = Operand::Label("loop".to_string());

        assert!(var.matches(OperandKind::Var));
        assert!(var.matches(OperandKind::Symb));
        assert!(!var.matches(OperandKind::Label));

        assert!(constant.matches(OperandKind::Symb));
        assert!(!constant.matches(OperandKind::Var));

        assert!(label.matches(OperandKind::Label));
        assert!(!label.matches(OperandKind::Symb));
    }

    #[test]
    fn typed_accessors() {
        let instr = Instruction::new(
            Opcode::Move,
            1,
            vec![
                Operand::Var(Variable::global("x")),
                Operand::Const(Value::Int(42)),
            ],
        );
        assert_eq!(instr.var(0).unwrap(), &Variable::global("x"));
        assert!(matches!(instr.symb(1).unwrap(), Operand::Const(_)));
        assert!(instr.label(0).is_err());
        assert!(instr.var(2).is_err());
    }
}
