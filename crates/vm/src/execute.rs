//! The dispatch loop and per-opcode handlers.

use std::fmt::Write as _;
use std::io::Write;

use tracing::{debug, trace};

use flowcode_common::error::InterpretError;
use flowcode_common::instruction::{DataType, Instruction};
use flowcode_common::opcode::Opcode;
use flowcode_common::value::Value;

use crate::frames::Frame;
use crate::machine::{Engine, Outcome};
use crate::ops::{self, ArithOp, Relation};

/// Where control goes after one instruction.
enum Flow {
    /// Fall through to the next instruction.
    Next,
    /// Transfer to the given program-counter index.
    Jump(usize),
    /// End the run with the given 0-49 status.
    Exit(i32),
}

impl<O: Write, E: Write> Engine<'_, O, E> {
    /// Run the program to completion, an `EXIT`, or the first error.
    pub fn execute(&mut self) -> Result<Outcome, InterpretError> {
        let result = self.run_loop();
        // Output produced before an error or EXIT must still reach the
        // stream.
        let _ = self.out.flush();
        result
    }

    fn run_loop(&mut self) -> Result<Outcome, InterpretError> {
        debug!(instructions = self.program.len(), "run start");
        let program = self.program;
        while self.pc < program.len() {
            let Some(instr) = program.get(self.pc) else {
                break;
            };
            trace!(pc = self.pc, opcode = instr.opcode.mnemonic(), "dispatch");
            self.executed += 1;
            match self.step(instr)? {
                Flow::Next => self.pc += 1,
                Flow::Jump(target) => self.pc = target,
                Flow::Exit(code) => {
                    debug!(code, executed = self.executed, "run exited");
                    return Ok(Outcome::Exited(code));
                }
            }
        }
        debug!(executed = self.executed, "run completed");
        Ok(Outcome::Completed)
    }

    fn step(&mut self, instr: &Instruction) -> Result<Flow, InterpretError> {
        match instr.opcode {
            // Frames and assignment
            Opcode::Move => {
                let value = self.resolve(instr.symb(1)?)?;
                self.frames.write(instr.var(0)?, value)?;
            }
            Opcode::CreateFrame => self.frames.create_temporary(),
            Opcode::PushFrame => self.frames.push_frame()?,
            Opcode::PopFrame => self.frames.pop_frame()?,
            Opcode::DefVar => self.frames.define(instr.var(0)?)?,

            // Call stack
            Opcode::Call => {
                let target = self.target(instr.label(0)?)?;
                // The CALL's own index; RETURN resumes one past it.
                self.call_stack.push(self.pc);
                return Ok(Flow::Jump(target));
            }
            Opcode::Return => {
                let caller = self
                    .call_stack
                    .pop()
                    .ok_or(InterpretError::EmptyStack { which: "call" })?;
                return Ok(Flow::Jump(caller + 1));
            }

            // Data stack
            Opcode::Pushs => {
                let value = self.resolve(instr.symb(0)?)?;
                self.data_stack.push(value);
            }
            Opcode::Pops => {
                let value = self.pop_data()?;
                self.frames.write(instr.var(0)?, value)?;
            }

            // Arithmetic
            Opcode::Add => self.binary(instr, |a, b| ops::arith(ArithOp::Add, a, b))?,
            Opcode::Sub => self.binary(instr, |a, b| ops::arith(ArithOp::Sub, a, b))?,
            Opcode::Mul => self.binary(instr, |a, b| ops::arith(ArithOp::Mul, a, b))?,
            Opcode::Idiv => self.binary(instr, |a, b| ops::arith(ArithOp::Idiv, a, b))?,

            // Relational and equality
            Opcode::Lt => self.binary(instr, |a, b| ops::compare(Relation::Lt, a, b))?,
            Opcode::Gt => self.binary(instr, |a, b| ops::compare(Relation::Gt, a, b))?,
            Opcode::Eq => {
                self.binary(instr, |a, b| ops::equal("EQ", &a, &b).map(Value::Bool))?
            }

            // Logic
            Opcode::And => self.binary(instr, |a, b| ops::logical("AND", true, a, b))?,
            Opcode::Or => self.binary(instr, |a, b| ops::logical("OR", false, a, b))?,
            Opcode::Not => self.unary(instr, ops::logical_not)?,

            // Conversions
            Opcode::Int2Char => self.unary(instr, ops::int_to_char)?,
            Opcode::Stri2Int => self.binary(instr, ops::str_to_int)?,

            // Input / output
            Opcode::Read => self.exec_read(instr)?,
            Opcode::Write => {
                let value = self.resolve(instr.symb(0)?)?;
                write!(self.out, "{value}").map_err(io_error)?;
            }

            // Strings
            Opcode::Concat => self.binary(instr, ops::concat)?,
            Opcode::Strlen => self.unary(instr, ops::str_len)?,
            Opcode::GetChar => self.binary(instr, ops::get_char)?,
            Opcode::SetChar => self.exec_set_char(instr)?,

            // Type introspection
            Opcode::Type => {
                let value = self.resolve_raw(instr.symb(1)?)?;
                let name = Value::Str(value.type_name().to_string());
                self.frames.write(instr.var(0)?, name)?;
            }

            // Control flow
            Opcode::Label => {}
            Opcode::Jump => return Ok(Flow::Jump(self.target(instr.label(0)?)?)),
            Opcode::JumpIfEq => return self.exec_jump_if(instr, "JUMPIFEQ", true),
            Opcode::JumpIfNeq => return self.exec_jump_if(instr, "JUMPIFNEQ", false),
            Opcode::Exit => return self.exec_exit(instr),

            // Diagnostics
            Opcode::Dprint => {
                let value = self.resolve(instr.symb(0)?)?;
                let text = match &value {
                    Value::Nil => "nil".to_string(),
                    other => other.to_string(),
                };
                writeln!(self.err, "{text}").map_err(io_error)?;
            }
            Opcode::Break => self.exec_break()?,
        }
        Ok(Flow::Next)
    }

    /// Resolve both symbols, apply `op`, store into the target variable.
    fn binary(
        &mut self,
        instr: &Instruction,
        op: impl FnOnce(Value, Value) -> Result<Value, InterpretError>,
    ) -> Result<(), InterpretError> {
        let a = self.resolve(instr.symb(1)?)?;
        let b = self.resolve(instr.symb(2)?)?;
        let result = op(a, b)?;
        self.frames.write(instr.var(0)?, result)
    }

    /// Resolve one symbol, apply `op`, store into the target variable.
    fn unary(
        &mut self,
        instr: &Instruction,
        op: impl FnOnce(Value) -> Result<Value, InterpretError>,
    ) -> Result<(), InterpretError> {
        let a = self.resolve(instr.symb(1)?)?;
        let result = op(a)?;
        self.frames.write(instr.var(0)?, result)
    }

    fn exec_read(&mut self, instr: &Instruction) -> Result<(), InterpretError> {
        let data_type = instr.data_type(1)?;
        let value = match self.input.next_line() {
            None => Value::Nil,
            Some(line) => parse_input(data_type, line),
        };
        self.frames.write(instr.var(0)?, value)
    }

    fn exec_set_char(&mut self, instr: &Instruction) -> Result<(), InterpretError> {
        let var = instr.var(0)?;
        let current = self.frames.read(var)?;
        if !current.is_initialized() {
            return Err(InterpretError::UninitializedRead {
                var: var.to_string(),
            });
        }
        let current = current.clone();
        let index = self.resolve(instr.symb(1)?)?;
        let replacement = self.resolve(instr.symb(2)?)?;
        let result = ops::set_char(&current, index, replacement)?;
        self.frames.write(instr.var(0)?, result)
    }

    fn exec_jump_if(
        &mut self,
        instr: &Instruction,
        operation: &'static str,
        jump_on_equal: bool,
    ) -> Result<Flow, InterpretError> {
        let target = self.target(instr.label(0)?)?;
        let a = self.resolve(instr.symb(1)?)?;
        let b = self.resolve(instr.symb(2)?)?;
        if ops::equal(operation, &a, &b)? == jump_on_equal {
            Ok(Flow::Jump(target))
        } else {
            Ok(Flow::Next)
        }
    }

    fn exec_exit(&mut self, instr: &Instruction) -> Result<Flow, InterpretError> {
        let value = self.resolve(instr.symb(0)?)?;
        let code = match value {
            Value::Int(code) => code,
            other => {
                return Err(InterpretError::WrongOperandType {
                    operation: "EXIT",
                    found: other.type_name().to_string(),
                })
            }
        };
        if !(0..=49).contains(&code) {
            return Err(InterpretError::ExitCodeRange { value: code });
        }
        Ok(Flow::Exit(code as i32))
    }

    fn exec_break(&mut self) -> Result<(), InterpretError> {
        let mut dump = String::new();
        let _ = writeln!(
            dump,
            "BREAK at instruction {} ({} executed)",
            self.pc, self.executed
        );
        let _ = writeln!(dump, "global frame: {}", dump_frame(self.frames.global()));
        match self.frames.temporary() {
            Some(frame) => {
                let _ = writeln!(dump, "temporary frame: {}", dump_frame(frame));
            }
            None => {
                let _ = writeln!(dump, "temporary frame: absent");
            }
        }
        match self.frames.local() {
            Some(frame) => {
                let _ = writeln!(
                    dump,
                    "local frames (depth {}), top: {}",
                    self.frames.local_depth(),
                    dump_frame(frame)
                );
            }
            None => {
                let _ = writeln!(dump, "local frames: empty");
            }
        }
        let stack: Vec<String> = self.data_stack.iter().rev().map(dump_value).collect();
        let _ = writeln!(dump, "data stack (top first): [{}]", stack.join(", "));
        let calls: Vec<String> = self
            .call_stack
            .iter()
            .rev()
            .map(|pc| pc.to_string())
            .collect();
        let _ = writeln!(dump, "call stack (top first): [{}]", calls.join(", "));
        self.err.write_all(dump.as_bytes()).map_err(io_error)
    }

    fn target(&self, name: &str) -> Result<usize, InterpretError> {
        // Label references were resolved against the table at load time.
        self.program.label_target(name).ok_or_else(|| {
            InterpretError::Internal(format!("label '{name}' escaped load-time checks"))
        })
    }
}

/// Interpret one input line according to the declared type. Malformed input
/// is nil, never an error.
fn parse_input(data_type: DataType, line: String) -> Value {
    match data_type {
        DataType::Int => line
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .unwrap_or(Value::Nil),
        DataType::Bool => Value::Bool(line.trim().eq_ignore_ascii_case("true")),
        DataType::Str => Value::Str(line),
    }
}

fn dump_value(value: &Value) -> String {
    match value {
        Value::Int(i) => format!("int@{i}"),
        Value::Bool(true) => "bool@true".to_string(),
        Value::Bool(false) => "bool@false".to_string(),
        Value::Str(s) => format!("string@{s}"),
        Value::Nil => "nil@nil".to_string(),
        Value::Uninit => "uninitialized".to_string(),
    }
}

fn dump_frame(frame: &Frame) -> String {
    if frame.is_empty() {
        return "(no variables)".to_string();
    }
    let slots: Vec<String> = frame
        .slots_sorted()
        .into_iter()
        .map(|(name, value)| format!("{name} = {}", dump_value(value)))
        .collect();
    slots.join(", ")
}

fn io_error(err: std::io::Error) -> InterpretError {
    InterpretError::Internal(format!("output stream failure: {err}"))
}
