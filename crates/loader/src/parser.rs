//! Operand parsing and instruction assembly for FlowCode source.
//!
//! Each instruction line is checked against the opcode's static signature;
//! every lexical rule is enforced here, so nothing structural is ever
//! deferred to execution.

use flowcode_common::error::InterpretError;
use flowcode_common::instruction::{DataType, FrameKind, Instruction, Operand, Variable};
use flowcode_common::opcode::{Opcode, OperandKind};
use flowcode_common::value::Value;

/// Parse one instruction line (already split into words, opcode first).
pub(crate) fn parse_instruction(
    words: &[&str],
    line: usize,
    order: i32,
) -> Result<Instruction, InterpretError> {
    let mnemonic = words[0];
    let opcode = Opcode::from_mnemonic(mnemonic).ok_or_else(|| InterpretError::UnknownOpcode {
        line,
        mnemonic: mnemonic.to_string(),
    })?;

    let signature = opcode.signature();
    let found = words.len() - 1;
    if found != signature.len() {
        return Err(InterpretError::OperandCount {
            line,
            opcode: opcode.mnemonic(),
            expected: signature.len(),
            found,
        });
    }

    let operands = signature
        .iter()
        .zip(&words[1..])
        .map(|(kind, word)| parse_operand(*kind, word, line))
        .collect::<Result<Vec<Operand>, InterpretError>>()?;

    Ok(Instruction::new(opcode, order, operands))
}

fn parse_operand(kind: OperandKind, word: &str, line: usize) -> Result<Operand, InterpretError> {
    match kind {
        OperandKind::Var => parse_variable(word, line).map(Operand::Var),
        OperandKind::Symb => parse_symbol(word, line),
        OperandKind::Label => {
            if is_identifier(word) {
                Ok(Operand::Label(word.to_string()))
            } else {
                Err(invalid(line, "label", word))
            }
        }
        OperandKind::Type => DataType::from_name(word)
            .map(Operand::Type)
            .ok_or_else(|| invalid(line, "type", word)),
    }
}

fn parse_variable(word: &str, line: usize) -> Result<Variable, InterpretError> {
    let Some((tag, name)) = word.split_once('@') else {
        return Err(invalid(line, "variable", word));
    };
    let frame = FrameKind::from_tag(tag).ok_or_else(|| invalid(line, "variable", word))?;
    if !is_identifier(name) {
        return Err(invalid(line, "variable", word));
    }
    Ok(Variable::new(frame, name))
}

fn parse_symbol(word: &str, line: usize) -> Result<Operand, InterpretError> {
    let Some((prefix, body)) = word.split_once('@') else {
        return Err(invalid(line, "symbol", word));
    };
    match prefix {
        "GF" | "LF" | "TF" => parse_variable(word, line).map(Operand::Var),
        "int" => parse_int_literal(body)
            .map(|v| Operand::Const(Value::Int(v)))
            .ok_or_else(|| invalid(line, "int", word)),
        "bool" => {
            if body.eq_ignore_ascii_case("true") {
                Ok(Operand::Const(Value::Bool(true)))
            } else if body.eq_ignore_ascii_case("false") {
                Ok(Operand::Const(Value::Bool(false)))
            } else {
                Err(invalid(line, "bool", word))
            }
        }
        "nil" => {
            if body == "nil" {
                Ok(Operand::Const(Value::Nil))
            } else {
                Err(invalid(line, "nil", word))
            }
        }
        "string" => decode_escapes(body, line).map(|s| Operand::Const(Value::Str(s))),
        _ => Err(invalid(line, "symbol", word)),
    }
}

/// Integer literal: optional sign, digits, no leading zero except `0`.
fn parse_int_literal(text: &str) -> Option<i64> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    text.parse::<i64>().ok()
}

/// Decode a string constant body.
///
/// `\xyz` with three decimal digits stands for the code point xyz; a raw
/// `#`, `\`, or character ≤ U+0020 is a lexical error (the source grammar
/// requires those to be escaped).
fn decode_escapes(body: &str, line: usize) -> Result<String, InterpretError> {
    let mut decoded = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let mut code: u32 = 0;
                for _ in 0..3 {
                    let digit = chars
                        .next()
                        .and_then(|d| d.to_digit(10))
                        .ok_or_else(|| invalid(line, "string", body))?;
                    code = code * 10 + digit;
                }
                let decoded_char =
                    char::from_u32(code).ok_or_else(|| invalid(line, "string", body))?;
                decoded.push(decoded_char);
            }
            '#' => return Err(invalid(line, "string", body)),
            c if (c as u32) <= 0x20 => return Err(invalid(line, "string", body)),
            c => decoded.push(c),
        }
    }
    Ok(decoded)
}

/// Identifier grammar shared by variable names and labels: a letter or one
/// of `_-$&%*!?`, then the same set plus digits.
fn is_identifier(text: &str) -> bool {
    let special = "_-$&%*!?";
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() && !special.contains(first) {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || special.contains(c))
}

fn invalid(line: usize, expected: &'static str, text: &str) -> InterpretError {
    InterpretError::InvalidOperand {
        line,
        expected,
        text: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(words: &[&str]) -> Result<Instruction, InterpretError> {
        parse_instruction(words, 1, 1)
    }

    #[test]
    fn parse_no_operand_instruction() {
        let instr = parse(&["CREATEFRAME"]).unwrap();
        assert_eq!(instr.opcode, Opcode::CreateFrame);
        assert!(instr.operands.is_empty());
    }

    #[test]
    fn opcode_is_case_insensitive() {
        assert_eq!(parse(&["createframe"]).unwrap().opcode, Opcode::CreateFrame);
        assert_eq!(
            parse(&["Move", "GF@x", "int@1"]).unwrap().opcode,
            Opcode::Move
        );
    }

    #[test]
    fn unknown_opcode() {
        let err = parse(&["FROB"]).unwrap_err();
        assert_eq!(
            err,
            InterpretError::UnknownOpcode {
                line: 1,
                mnemonic: "FROB".to_string()
            }
        );
    }

    #[test]
    fn operand_count_mismatch() {
        let err = parse(&["MOVE", "GF@x"]).unwrap_err();
        assert_eq!(
            err,
            InterpretError::OperandCount {
                line: 1,
                opcode: "MOVE",
                expected: 2,
                found: 1,
            }
        );
        assert!(parse(&["CREATEFRAME", "GF@x"]).is_err());
    }

    #[test]
    fn parse_variable_operand() {
        let instr = parse(&["DEFVAR", "LF@loop-counter!"]).unwrap();
        assert_eq!(
            instr.operands[0],
            Operand::Var(Variable::local("loop-counter!"))
        );
    }

    #[test]
    fn variable_frame_tag_is_case_sensitive() {
        assert!(parse(&["DEFVAR", "gf@x"]).is_err());
        assert!(parse(&["DEFVAR", "XF@x"]).is_err());
    }

    #[test]
    fn variable_needs_valid_name() {
        assert!(parse(&["DEFVAR", "GF@"]).is_err());
        assert!(parse(&["DEFVAR", "GF@1x"]).is_err());
        assert!(parse(&["DEFVAR", "GF@x,y"]).is_err());
        assert!(parse(&["DEFVAR", "GFx"]).is_err());
    }

    #[test]
    fn name_may_start_with_special_and_contain_digits() {
        assert!(parse(&["DEFVAR", "GF@_x1"]).is_ok());
        assert!(parse(&["DEFVAR", "GF@$-?!"]).is_ok());
        assert!(parse(&["DEFVAR", "GF@x2y"]).is_ok());
    }

    #[test]
    fn parse_int_constants() {
        let instr = parse(&["PUSHS", "int@-42"]).unwrap();
        assert_eq!(instr.operands[0], Operand::Const(Value::Int(-42)));
        assert_eq!(
            parse(&["PUSHS", "int@+7"]).unwrap().operands[0],
            Operand::Const(Value::Int(7))
        );
        assert_eq!(
            parse(&["PUSHS", "int@0"]).unwrap().operands[0],
            Operand::Const(Value::Int(0))
        );
    }

    #[test]
    fn int_rejects_leading_zero_and_garbage() {
        assert!(parse(&["PUSHS", "int@007"]).is_err());
        assert!(parse(&["PUSHS", "int@"]).is_err());
        assert!(parse(&["PUSHS", "int@1.5"]).is_err());
        assert!(parse(&["PUSHS", "int@abc"]).is_err());
        assert!(parse(&["PUSHS", "int@99999999999999999999"]).is_err());
    }

    #[test]
    fn parse_bool_constants_case_insensitive() {
        assert_eq!(
            parse(&["PUSHS", "bool@true"]).unwrap().operands[0],
            Operand::Const(Value::Bool(true))
        );
        assert_eq!(
            parse(&["PUSHS", "bool@FALSE"]).unwrap().operands[0],
            Operand::Const(Value::Bool(false))
        );
        assert!(parse(&["PUSHS", "bool@yes"]).is_err());
    }

    #[test]
    fn parse_nil_constant() {
        assert_eq!(
            parse(&["PUSHS", "nil@nil"]).unwrap().operands[0],
            Operand::Const(Value::Nil)
        );
        assert!(parse(&["PUSHS", "nil@null"]).is_err());
    }

    #[test]
    fn parse_string_with_escapes() {
        let instr = parse(&["PUSHS", "string@a\\032b"]).unwrap();
        assert_eq!(
            instr.operands[0],
            Operand::Const(Value::Str("a b".to_string()))
        );
        let instr = parse(&["PUSHS", "string@back\\092slash"]).unwrap();
        assert_eq!(
            instr.operands[0],
            Operand::Const(Value::Str("back\\slash".to_string()))
        );
        let instr = parse(&["PUSHS", "string@"]).unwrap();
        assert_eq!(instr.operands[0], Operand::Const(Value::Str(String::new())));
    }

    #[test]
    fn string_escape_needs_three_digits() {
        assert!(parse(&["PUSHS", "string@bad\\9"]).is_err());
        assert!(parse(&["PUSHS", "string@bad\\1x2"]).is_err());
        assert!(parse(&["PUSHS", "string@trailing\\"]).is_err());
    }

    #[test]
    fn symbol_position_accepts_variables() {
        let instr = parse(&["PUSHS", "TF@v"]).unwrap();
        assert_eq!(instr.operands[0], Operand::Var(Variable::temporary("v")));
    }

    #[test]
    fn symbol_rejects_unknown_prefix() {
        assert!(parse(&["PUSHS", "float@1.0"]).is_err());
        assert!(parse(&["PUSHS", "plain"]).is_err());
    }

    #[test]
    fn parse_label_operand() {
        let instr = parse(&["JUMP", "end"]).unwrap();
        assert_eq!(instr.operands[0], Operand::Label("end".to_string()));
        assert!(parse(&["JUMP", "1end"]).is_err());
    }

    #[test]
    fn parse_type_operand() {
        let instr = parse(&["READ", "GF@x", "int"]).unwrap();
        assert_eq!(instr.operands[1], Operand::Type(DataType::Int));
        assert!(parse(&["READ", "GF@x", "nil"]).is_err());
        assert!(parse(&["READ", "GF@x", "INT"]).is_err());
    }

    #[test]
    fn order_is_recorded() {
        let instr = parse_instruction(&["BREAK"], 3, 17).unwrap();
        assert_eq!(instr.order, 17);
    }
}
