//! Program construction: ordering, label resolution, operand shape checks.
//!
//! Everything here runs before the first instruction executes, so a rejected
//! program can never produce partial output.

use rustc_hash::FxHashMap;

use crate::error::InterpretError;
use crate::instruction::{Instruction, Operand};
use crate::opcode::Opcode;
use crate::value::Value;

/// An executable program: instructions sorted stably by source order and
/// re-indexed into program-counter positions, plus the resolved label table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
    labels: FxHashMap<String, usize>,
}

impl Program {
    /// Validate instruction records and build the executable program.
    ///
    /// Checks, in order: every `order` positive, no duplicate `order`,
    /// operand counts and kinds against each opcode's signature, label
    /// declarations unique, and every jump/call target declared.
    pub fn from_instructions(
        mut instructions: Vec<Instruction>,
    ) -> Result<Self, InterpretError> {
        for instr in &instructions {
            if instr.order <= 0 {
                return Err(InterpretError::NonPositiveOrder { order: instr.order });
            }
        }

        instructions.sort_by_key(|instr| instr.order);
        for pair in instructions.windows(2) {
            if pair[0].order == pair[1].order {
                return Err(InterpretError::DuplicateOrder {
                    order: pair[0].order,
                });
            }
        }

        for (index, instr) in instructions.iter().enumerate() {
            check_shape(index, instr)?;
        }

        let mut labels = FxHashMap::default();
        for (index, instr) in instructions.iter().enumerate() {
            if instr.opcode == Opcode::Label {
                let name = instr.label(0)?;
                if labels.insert(name.to_string(), index).is_some() {
                    return Err(InterpretError::DuplicateLabel {
                        name: name.to_string(),
                    });
                }
            }
        }

        for instr in &instructions {
            let references_label = matches!(
                instr.opcode,
                Opcode::Jump | Opcode::Call | Opcode::JumpIfEq | Opcode::JumpIfNeq
            );
            if references_label {
                let name = instr.label(0)?;
                if !labels.contains_key(name) {
                    return Err(InterpretError::UndeclaredLabel {
                        name: name.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            instructions,
            labels,
        })
    }

    /// The instruction at program-counter position `pc`.
    pub fn get(&self, pc: usize) -> Option<&Instruction> {
        self.instructions.get(pc)
    }

    /// The program-counter index of a declared label.
    pub fn label_target(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    /// All instructions in execution order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

fn check_shape(index: usize, instr: &Instruction) -> Result<(), InterpretError> {
    let signature = instr.opcode.signature();
    if instr.operands.len() != signature.len() {
        return Err(InterpretError::BadOperandCount {
            index,
            opcode: instr.opcode.mnemonic(),
            expected: signature.len(),
            found: instr.operands.len(),
        });
    }
    for (position, (operand, kind)) in instr.operands.iter().zip(signature).enumerate() {
        // Uninit is a slot state, never a constant.
        let illegal_const = matches!(operand, Operand::Const(Value::Uninit));
        if illegal_const || !operand.matches(*kind) {
            return Err(InterpretError::BadOperandKind {
                index,
                opcode: instr.opcode.mnemonic(),
                position,
            });
        }
    }
    Ok(())
}
