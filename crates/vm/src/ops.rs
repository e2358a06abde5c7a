//! Type-checked operator semantics shared by the dispatch handlers.
//!
//! Every function takes fully resolved values (never `Uninit`; the resolver
//! rejects those first) and returns either the result value or the taxonomy
//! error for the failure.

use flowcode_common::error::InterpretError;
use flowcode_common::value::Value;

/// Binary integer arithmetic selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArithOp {
    Add,
    Sub,
    Mul,
    Idiv,
}

impl ArithOp {
    fn name(&self) -> &'static str {
        match self {
            ArithOp::Add => "ADD",
            ArithOp::Sub => "SUB",
            ArithOp::Mul => "MUL",
            ArithOp::Idiv => "IDIV",
        }
    }
}

/// Relational selector for `LT`/`GT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Relation {
    Lt,
    Gt,
}

impl Relation {
    fn name(&self) -> &'static str {
        match self {
            Relation::Lt => "LT",
            Relation::Gt => "GT",
        }
    }
}

fn wrong_binary(operation: &'static str, a: &Value, b: &Value) -> InterpretError {
    InterpretError::WrongOperandType {
        operation,
        found: format!("{} and {}", a.type_name(), b.type_name()),
    }
}

fn wrong_unary(operation: &'static str, a: &Value) -> InterpretError {
    InterpretError::WrongOperandType {
        operation,
        found: a.type_name().to_string(),
    }
}

/// Integer division flooring toward negative infinity.
///
/// `wrapping_div`/`wrapping_rem` keep `i64::MIN / -1` defined; the remainder
/// adjustment turns truncation into flooring.
pub(crate) fn floor_div(a: i64, b: i64) -> i64 {
    let quotient = a.wrapping_div(b);
    let remainder = a.wrapping_rem(b);
    if remainder != 0 && (remainder < 0) != (b < 0) {
        quotient - 1
    } else {
        quotient
    }
}

/// `ADD`/`SUB`/`MUL`/`IDIV`: both operands must be integers.
pub(crate) fn arith(op: ArithOp, a: Value, b: Value) -> Result<Value, InterpretError> {
    match (&a, &b) {
        (Value::Int(x), Value::Int(y)) => {
            let result = match op {
                ArithOp::Add => x.wrapping_add(*y),
                ArithOp::Sub => x.wrapping_sub(*y),
                ArithOp::Mul => x.wrapping_mul(*y),
                ArithOp::Idiv => {
                    if *y == 0 {
                        return Err(InterpretError::DivisionByZero);
                    }
                    floor_div(*x, *y)
                }
            };
            Ok(Value::Int(result))
        }
        _ => Err(wrong_binary(op.name(), &a, &b)),
    }
}

/// `LT`/`GT`: operands of the same non-nil type, natural ordering
/// (numeric, lexicographic by code point, false < true).
pub(crate) fn compare(op: Relation, a: Value, b: Value) -> Result<Value, InterpretError> {
    let ordering = match (&a, &b) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Str(x), Value::Str(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => return Err(wrong_binary(op.name(), &a, &b)),
    };
    let result = match op {
        Relation::Lt => ordering.is_lt(),
        Relation::Gt => ordering.is_gt(),
    };
    Ok(Value::Bool(result))
}

/// Equality shared by `EQ`, `JUMPIFEQ`, and `JUMPIFNEQ`.
///
/// Nil equals only nil; when either side is nil the answer is never a type
/// error. Otherwise both sides must share a type.
pub(crate) fn equal(
    operation: &'static str,
    a: &Value,
    b: &Value,
) -> Result<bool, InterpretError> {
    match (a, b) {
        (Value::Nil, _) | (_, Value::Nil) => Ok(a == b),
        (Value::Int(_), Value::Int(_))
        | (Value::Bool(_), Value::Bool(_))
        | (Value::Str(_), Value::Str(_)) => Ok(a == b),
        _ => Err(wrong_binary(operation, a, b)),
    }
}

/// `AND`/`OR`: boolean-only operands, fully resolved beforehand.
pub(crate) fn logical(
    operation: &'static str,
    conjunction: bool,
    a: Value,
    b: Value,
) -> Result<Value, InterpretError> {
    match (&a, &b) {
        (Value::Bool(x), Value::Bool(y)) => Ok(Value::Bool(if conjunction {
            *x && *y
        } else {
            *x || *y
        })),
        _ => Err(wrong_binary(operation, &a, &b)),
    }
}

/// `NOT`: boolean-only operand.
pub(crate) fn logical_not(a: Value) -> Result<Value, InterpretError> {
    match a {
        Value::Bool(x) => Ok(Value::Bool(!x)),
        other => Err(wrong_unary("NOT", &other)),
    }
}

/// `INT2CHAR`: integer to one-character string via the Unicode scalar.
pub(crate) fn int_to_char(a: Value) -> Result<Value, InterpretError> {
    match a {
        Value::Int(code) => {
            let scalar = u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .ok_or(InterpretError::InvalidCodePoint { value: code })?;
            Ok(Value::Str(scalar.to_string()))
        }
        other => Err(wrong_unary("INT2CHAR", &other)),
    }
}

/// Fetch the code point at `index`, shared by `STRI2INT` and `GETCHAR`.
fn char_at(operation: &'static str, s: &str, index: i64) -> Result<char, InterpretError> {
    let out_of_bounds = |len: usize| InterpretError::IndexOutOfBounds {
        operation,
        index,
        len,
    };
    let position = usize::try_from(index).map_err(|_| out_of_bounds(s.chars().count()))?;
    s.chars()
        .nth(position)
        .ok_or_else(|| out_of_bounds(s.chars().count()))
}

/// `STRI2INT`: code point of the character at the given index.
pub(crate) fn str_to_int(a: Value, b: Value) -> Result<Value, InterpretError> {
    match (&a, &b) {
        (Value::Str(s), Value::Int(i)) => {
            let c = char_at("STRI2INT", s, *i)?;
            Ok(Value::Int(c as i64))
        }
        _ => Err(wrong_binary("STRI2INT", &a, &b)),
    }
}

/// `GETCHAR`: single-character substring at the given index.
pub(crate) fn get_char(a: Value, b: Value) -> Result<Value, InterpretError> {
    match (&a, &b) {
        (Value::Str(s), Value::Int(i)) => {
            let c = char_at("GETCHAR", s, *i)?;
            Ok(Value::Str(c.to_string()))
        }
        _ => Err(wrong_binary("GETCHAR", &a, &b)),
    }
}

/// `SETCHAR`: replace one code point of `current` with the first character
/// of `replacement`.
pub(crate) fn set_char(
    current: &Value,
    index: Value,
    replacement: Value,
) -> Result<Value, InterpretError> {
    let (s, i, r) = match (current, &index, &replacement) {
        (Value::Str(s), Value::Int(i), Value::Str(r)) => (s, *i, r),
        _ => {
            return Err(InterpretError::WrongOperandType {
                operation: "SETCHAR",
                found: format!(
                    "{}, {} and {}",
                    current.type_name(),
                    index.type_name(),
                    replacement.type_name()
                ),
            })
        }
    };
    let new_char = r
        .chars()
        .next()
        .ok_or(InterpretError::EmptyReplacement)?;
    // Validates the index before splicing.
    char_at("SETCHAR", s, i)?;
    let position = i as usize;
    let result = s
        .chars()
        .enumerate()
        .map(|(at, c)| if at == position { new_char } else { c })
        .collect();
    Ok(Value::Str(result))
}

/// `STRLEN`: code-point length.
pub(crate) fn str_len(a: Value) -> Result<Value, InterpretError> {
    match a {
        Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
        other => Err(wrong_unary("STRLEN", &other)),
    }
}

/// `CONCAT`: string concatenation.
pub(crate) fn concat(a: Value, b: Value) -> Result<Value, InterpretError> {
    match (a, b) {
        (Value::Str(mut x), Value::Str(y)) => {
            x.push_str(&y);
            Ok(Value::Str(x))
        }
        (a, b) => Err(wrong_binary("CONCAT", &a, &b)),
    }
}
