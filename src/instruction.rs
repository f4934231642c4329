// Copyright (c) 2025 - Cowboy AI, Inc.
//! Instructions - Effects described as data
//!
//! An [`Instruction`] is the description of one effect: a [`Tag`] naming the
//! kind of effect, named operands, and the shape of value the effect is
//! expected to produce. Instructions do nothing on their own. The
//! [`Dispatcher`](crate::dispatch::Dispatcher) decides what a tag means.
//!
//! # Operands
//!
//! An operand is one of:
//!
//! - a plain [`Value`] (possibly a signal handle),
//! - a nested [`Program`] that the run loop evaluates, in declaration order,
//!   before the handler sees the instruction,
//! - a [`Callable`] that handlers may invoke to obtain further programs
//!   (fold reducers, event listeners).
//!
//! ```rust,ignore
//! let instr = Instruction::new(Tag::from_static("math.add"), ValueKind::Number)
//!     .with("a", 1.0)
//!     .with("b", math::mul(2.0, 3.0));
//! ```

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use crate::errors::{RunError, RunResult};
use crate::program::Program;
use crate::value::{ElementId, SignalId, SourceId, Value, ValueKind};

/// Name of an instruction kind, conventionally `namespace.operation`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(Cow<'static, str>);

impl Tag {
    /// Tag from a string literal, usable in `const` items
    pub const fn from_static(name: &'static str) -> Self {
        Tag(Cow::Borrowed(name))
    }

    /// Tag from an owned name
    pub fn new(name: impl Into<String>) -> Self {
        Tag(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Portion before the first `.`, or the whole tag
    pub fn namespace(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A function operand that produces a program from argument values
#[derive(Clone)]
pub struct Callable(Rc<dyn Fn(Vec<Value>) -> Program>);

impl Callable {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Program + 'static,
    {
        Callable(Rc::new(f))
    }

    /// Build the program for these arguments
    pub fn call(&self, args: Vec<Value>) -> Program {
        (self.0)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callable(..)")
    }
}

/// One operand of an instruction
#[derive(Debug)]
pub enum Operand {
    Value(Value),
    Program(Program),
    Callable(Callable),
}

impl Operand {
    fn describe(&self) -> String {
        match self {
            Operand::Value(v) => v.kind().to_string(),
            Operand::Program(_) => "program".to_string(),
            Operand::Callable(_) => "callable".to_string(),
        }
    }
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Value(v)
    }
}

impl From<Program> for Operand {
    fn from(p: Program) -> Self {
        Operand::Program(p)
    }
}

impl From<Callable> for Operand {
    fn from(c: Callable) -> Self {
        Operand::Callable(c)
    }
}

macro_rules! operand_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(v: $ty) -> Self {
                    Operand::Value(Value::from(v))
                }
            }
        )*
    };
}

operand_from_value!(bool, f64, i32, &str, String, SignalId, SourceId, ElementId);

/// A single effect description
pub struct Instruction {
    tag: Tag,
    operands: Vec<(Cow<'static, str>, Operand)>,
    result: ValueKind,
}

impl Instruction {
    /// Create an instruction with no operands
    ///
    /// # Arguments
    ///
    /// * `tag` - Effect kind, matched against dispatcher registrations
    /// * `result` - Shape of value the handler must produce
    pub fn new(tag: Tag, result: ValueKind) -> Self {
        Self {
            tag,
            operands: Vec::new(),
            result,
        }
    }

    /// Append a named operand
    pub fn with(mut self, name: impl Into<Cow<'static, str>>, operand: impl Into<Operand>) -> Self {
        self.operands.push((name.into(), operand.into()));
        self
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Declared result shape
    pub fn result(&self) -> ValueKind {
        self.result
    }

    pub fn operand_names(&self) -> impl Iterator<Item = &str> {
        self.operands.iter().map(|(name, _)| name.as_ref())
    }

    /// Whether every nested program operand has been evaluated
    pub fn is_resolved(&self) -> bool {
        !self
            .operands
            .iter()
            .any(|(_, op)| matches!(op, Operand::Program(_)))
    }

    /// Take the first unevaluated program operand, leaving a placeholder
    pub(crate) fn take_pending(&mut self) -> Option<(usize, Program)> {
        let index = self
            .operands
            .iter()
            .position(|(_, op)| matches!(op, Operand::Program(_)))?;
        let slot = &mut self.operands[index].1;
        match std::mem::replace(slot, Operand::Value(Value::Unit)) {
            Operand::Program(program) => Some((index, program)),
            other => {
                *slot = other;
                None
            }
        }
    }

    /// Store the result of an evaluated program operand
    pub(crate) fn fill(&mut self, index: usize, value: Value) {
        if let Some((_, slot)) = self.operands.get_mut(index) {
            *slot = Operand::Value(value);
        }
    }

    fn operand(&self, name: &str) -> RunResult<&Operand> {
        self.operands
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, op)| op)
            .ok_or_else(|| RunError::MissingOperand {
                tag: self.tag.clone(),
                operand: name.to_string(),
            })
    }

    fn mismatch(&self, name: &str, expected: &str, found: String) -> RunError {
        RunError::OperandType {
            tag: self.tag.clone(),
            operand: name.to_string(),
            expected: expected.to_string(),
            found,
        }
    }

    /// Value operand by name
    ///
    /// # Errors
    ///
    /// `MissingOperand` if absent, `UnresolvedOperand` if it is still a
    /// program, `OperandType` if it is a callable.
    pub fn value(&self, name: &str) -> RunResult<&Value> {
        match self.operand(name)? {
            Operand::Value(v) => Ok(v),
            Operand::Program(_) => Err(RunError::UnresolvedOperand {
                tag: self.tag.clone(),
                operand: name.to_string(),
            }),
            op @ Operand::Callable(_) => Err(self.mismatch(name, "a value", op.describe())),
        }
    }

    /// Every value operand, in declaration order
    pub fn values(&self) -> RunResult<Vec<Value>> {
        self.operands
            .iter()
            .filter(|(_, op)| !matches!(op, Operand::Callable(_)))
            .map(|(name, _)| self.value(name).cloned())
            .collect()
    }

    pub fn number(&self, name: &str) -> RunResult<f64> {
        let v = self.value(name)?;
        v.as_number()
            .ok_or_else(|| self.mismatch(name, "a number", v.kind().to_string()))
    }

    pub fn text(&self, name: &str) -> RunResult<&str> {
        let v = self.value(name)?;
        v.as_text()
            .ok_or_else(|| self.mismatch(name, "text", v.kind().to_string()))
    }

    pub fn element(&self, name: &str) -> RunResult<ElementId> {
        let v = self.value(name)?;
        v.as_element()
            .ok_or_else(|| self.mismatch(name, "an element", v.kind().to_string()))
    }

    pub fn source(&self, name: &str) -> RunResult<SourceId> {
        let v = self.value(name)?;
        v.as_source()
            .ok_or_else(|| self.mismatch(name, "an event source", v.kind().to_string()))
    }

    pub fn callable(&self, name: &str) -> RunResult<&Callable> {
        match self.operand(name)? {
            Operand::Callable(c) => Ok(c),
            op => Err(self.mismatch(name, "a callable", op.describe())),
        }
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operands: Vec<String> = self
            .operands
            .iter()
            .map(|(name, op)| match op {
                Operand::Value(v) => format!("{name}={v}"),
                other => format!("{name}=<{}>", other.describe()),
            })
            .collect();
        f.debug_struct("Instruction")
            .field("tag", &self.tag.as_str())
            .field("operands", &operands)
            .field("result", &self.result)
            .finish()
    }
}
