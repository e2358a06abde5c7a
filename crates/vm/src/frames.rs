//! Variable frames: the global/temporary/local scopes and their lifecycle.

use rustc_hash::FxHashMap;

use flowcode_common::error::InterpretError;
use flowcode_common::instruction::{FrameKind, Variable};
use flowcode_common::value::Value;

/// A single variable scope: name → current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    slots: FxHashMap<String, Value>,
}

impl Frame {
    /// Declare a name with an `Uninit` slot. Redeclaration is a semantic
    /// error.
    fn define(&mut self, var: &Variable) -> Result<(), InterpretError> {
        if self.slots.contains_key(&var.name) {
            return Err(InterpretError::Redefinition {
                var: var.to_string(),
            });
        }
        self.slots.insert(var.name.clone(), Value::Uninit);
        Ok(())
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.slots.get(name)
    }

    fn set(&mut self, name: &str, value: Value) -> bool {
        match self.slots.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Slots sorted by name, for deterministic diagnostic dumps.
    pub fn slots_sorted(&self) -> Vec<(&str, &Value)> {
        let mut slots: Vec<(&str, &Value)> = self
            .slots
            .iter()
            .map(|(name, value)| (name.as_str(), value))
            .collect();
        slots.sort_by_key(|(name, _)| *name);
        slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// The three storage scopes addressed by `GF`/`LF`/`TF` references.
///
/// The global frame exists for the whole run. The temporary frame and the
/// local stack start absent/empty; `CREATEFRAME`, `PUSHFRAME`, and
/// `POPFRAME` move frames between them. `PUSHFRAME` moves ownership of the
/// temporary frame, it never copies.
#[derive(Debug, Default)]
pub struct FrameManager {
    global: Frame,
    temporary: Option<Frame>,
    locals: Vec<Frame>,
}

impl FrameManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a fresh empty temporary frame, discarding any existing one.
    pub fn create_temporary(&mut self) {
        self.temporary = Some(Frame::default());
    }

    /// Move the temporary frame onto the local stack.
    pub fn push_frame(&mut self) -> Result<(), InterpretError> {
        let frame = self.temporary.take().ok_or(InterpretError::UndefinedFrame {
            frame: FrameKind::Temporary,
        })?;
        self.locals.push(frame);
        Ok(())
    }

    /// Pop the local stack top back into the temporary frame. Any existing
    /// temporary frame is discarded.
    pub fn pop_frame(&mut self) -> Result<(), InterpretError> {
        let frame = self.locals.pop().ok_or(InterpretError::UndefinedFrame {
            frame: FrameKind::Local,
        })?;
        self.temporary = Some(frame);
        Ok(())
    }

    fn scope(&self, kind: FrameKind) -> Result<&Frame, InterpretError> {
        match kind {
            FrameKind::Global => Ok(&self.global),
            FrameKind::Local => self
                .locals
                .last()
                .ok_or(InterpretError::UndefinedFrame { frame: kind }),
            FrameKind::Temporary => self
                .temporary
                .as_ref()
                .ok_or(InterpretError::UndefinedFrame { frame: kind }),
        }
    }

    fn scope_mut(&mut self, kind: FrameKind) -> Result<&mut Frame, InterpretError> {
        match kind {
            FrameKind::Global => Ok(&mut self.global),
            FrameKind::Local => self
                .locals
                .last_mut()
                .ok_or(InterpretError::UndefinedFrame { frame: kind }),
            FrameKind::Temporary => self
                .temporary
                .as_mut()
                .ok_or(InterpretError::UndefinedFrame { frame: kind }),
        }
    }

    /// Declare `var` with an `Uninit` slot in its scope.
    pub fn define(&mut self, var: &Variable) -> Result<(), InterpretError> {
        self.scope_mut(var.frame)?.define(var)
    }

    /// Current value of `var`. May be `Uninit`; the caller decides whether
    /// that is tolerable.
    pub fn read(&self, var: &Variable) -> Result<&Value, InterpretError> {
        self.scope(var.frame)?
            .get(&var.name)
            .ok_or_else(|| InterpretError::UndefinedVariable {
                var: var.to_string(),
            })
    }

    /// Overwrite `var`, including over `Uninit`.
    pub fn write(&mut self, var: &Variable, value: Value) -> Result<(), InterpretError> {
        let written = self.scope_mut(var.frame)?.set(&var.name, value);
        if written {
            Ok(())
        } else {
            Err(InterpretError::UndefinedVariable {
                var: var.to_string(),
            })
        }
    }

    /// The global frame.
    pub fn global(&self) -> &Frame {
        &self.global
    }

    /// The temporary frame, if present.
    pub fn temporary(&self) -> Option<&Frame> {
        self.temporary.as_ref()
    }

    /// The current local frame (top of the stack), if present.
    pub fn local(&self) -> Option<&Frame> {
        self.locals.last()
    }

    /// Depth of the local frame stack.
    pub fn local_depth(&self) -> usize {
        self.locals.len()
    }
}
