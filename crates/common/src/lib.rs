//! FlowCode common types.
//!
//! This crate provides the foundational data structures shared by the
//! loader, the execution engine, and the CLI:
//!
//! - [`Opcode`] — the closed instruction set with its operand signature table
//! - [`Instruction`] — a validated instruction record with typed operands
//! - [`Value`] — the runtime value union
//! - [`Program`] — instructions sorted by source order plus the label table
//! - [`InterpretError`] — the single error taxonomy with fixed exit codes
//!
//! # Dependencies
//!
//! `thiserror` for the error derive and `rustc-hash` for the label table.

pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;
pub mod value;

// Re-export commonly used types at the crate root.
pub use error::InterpretError;
pub use instruction::{DataType, FrameKind, Instruction, Operand, Variable};
pub use opcode::{Opcode, OperandKind, ALL_OPCODES};
pub use program::Program;
pub use value::Value;

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for a set of distinct positive order values.
    fn arb_orders() -> impl Strategy<Value = Vec<i32>> {
        prop::collection::hash_set(1..=10_000i32, 1..40)
            .prop_map(|set| set.into_iter().collect::<Vec<i32>>())
            .prop_shuffle()
    }

    fn bare(order: i32) -> Instruction {
        Instruction::new(Opcode::CreateFrame, order, vec![])
    }

    proptest! {
        /// Programs built from shuffled distinct orders come out sorted
        /// ascending, regardless of input order.
        #[test]
        fn construction_sorts_ascending(orders in arb_orders()) {
            let instructions = orders.iter().map(|&o| bare(o)).collect();
            let program = Program::from_instructions(instructions).unwrap();
            let sorted: Vec<i32> = program.instructions().iter().map(|i| i.order).collect();
            let mut expected = orders.clone();
            expected.sort_unstable();
            prop_assert_eq!(sorted, expected);
        }

        /// A duplicated order value is always rejected, wherever the
        /// duplicate lands in the sequence.
        #[test]
        fn duplicate_order_always_rejected(
            orders in arb_orders(),
            pick in any::<prop::sample::Index>(),
        ) {
            let duplicated = orders[pick.index(orders.len())];
            let mut instructions: Vec<Instruction> =
                orders.iter().map(|&o| bare(o)).collect();
            instructions.push(bare(duplicated));

            let err = Program::from_instructions(instructions).unwrap_err();
            prop_assert_eq!(err, InterpretError::DuplicateOrder { order: duplicated });
        }

        /// A non-positive order is always rejected.
        #[test]
        fn non_positive_order_always_rejected(
            orders in arb_orders(),
            bad in -10_000..=0i32,
        ) {
            let mut instructions: Vec<Instruction> =
                orders.iter().map(|&o| bare(o)).collect();
            instructions.push(bare(bad));

            let err = Program::from_instructions(instructions).unwrap_err();
            prop_assert_eq!(err, InterpretError::NonPositiveOrder { order: bad });
        }
    }
}
