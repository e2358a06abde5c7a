//! Canonical listing writer for loaded programs.
//!
//! The output is flat text: the header, then one instruction per line in
//! execution order, no comments. Loading a listing yields the same program
//! the listing was produced from.

use flowcode_common::instruction::Operand;
use flowcode_common::program::Program;
use flowcode_common::value::Value;

/// Render a program as canonical FlowCode source.
pub fn listing(program: &Program) -> String {
    let mut text = String::from(".FLOWCODE\n");
    for instr in program.instructions() {
        text.push_str(instr.opcode.mnemonic());
        for operand in &instr.operands {
            text.push(' ');
            text.push_str(&operand_text(operand));
        }
        text.push('\n');
    }
    text
}

fn operand_text(operand: &Operand) -> String {
    match operand {
        Operand::Var(var) => var.to_string(),
        Operand::Label(name) => name.clone(),
        Operand::Type(t) => t.name().to_string(),
        Operand::Const(Value::Int(i)) => format!("int@{i}"),
        Operand::Const(Value::Bool(true)) => "bool@true".to_string(),
        Operand::Const(Value::Bool(false)) => "bool@false".to_string(),
        Operand::Const(Value::Nil) => "nil@nil".to_string(),
        Operand::Const(Value::Str(s)) => format!("string@{}", encode_escapes(s)),
        // Rejected at program construction; a listing never sees it.
        Operand::Const(Value::Uninit) => String::new(),
    }
}

/// Re-encode the characters the source grammar requires escaped.
fn encode_escapes(s: &str) -> String {
    let mut encoded = String::with_capacity(s.len());
    for c in s.chars() {
        if (c as u32) <= 0x20 || c == '#' || c == '\\' {
            encoded.push_str(&format!("\\{:03}", c as u32));
        } else {
            encoded.push(c);
        }
    }
    encoded
}
