// Copyright (c) 2025 - Cowboy AI, Inc.
//! Signal instructions - mutable state as cells
//!
//! Programs hold state in cells: `cell` creates one, `sample` reads the
//! current value, `set` writes and settles dependents, and `modify` reads,
//! transforms and writes in one step.
//!
//! # Example
//!
//! ```rust,ignore
//! let program = signal::cell(0.0).and_then(|counter| {
//!     signal::modify(counter.clone(), |n| Value::from(n.as_number().unwrap_or(0.0) + 1.0))
//!         .then(signal::sample(counter))
//! });
//! ```

use crate::dispatch::{DispatcherBuilder, Plugin};
use crate::errors::{Fault, RunError};
use crate::instruction::{Callable, Instruction, Operand, Tag};
use crate::program::Program;
use crate::runtime::Runtime;
use crate::value::{SignalId, Value, ValueKind};

pub const CELL: Tag = Tag::from_static("signal.cell");
pub const SAMPLE: Tag = Tag::from_static("signal.sample");
pub const SET: Tag = Tag::from_static("signal.set");
pub const MODIFY: Tag = Tag::from_static("signal.modify");

/// Create a writable signal holding `initial`
pub fn cell(initial: impl Into<Operand>) -> Program {
    Program::lift(Instruction::new(CELL, ValueKind::Signal).with("initial", initial))
}

/// Current value of a signal (non-signals are returned unchanged)
pub fn sample(signal: impl Into<Operand>) -> Program {
    Program::lift(Instruction::new(SAMPLE, ValueKind::Any).with("signal", signal))
}

/// Write a cell
pub fn set(signal: impl Into<Operand>, value: impl Into<Operand>) -> Program {
    Program::lift(
        Instruction::new(SET, ValueKind::Unit)
            .with("signal", signal)
            .with("value", value),
    )
}

/// Replace a cell's value with `f(current)`
pub fn modify<F>(signal: impl Into<Operand>, f: F) -> Program
where
    F: Fn(Value) -> Value + 'static,
{
    let update = Callable::new(move |mut args| Program::pure(f(args.pop().unwrap_or_default())));
    Program::lift(
        Instruction::new(MODIFY, ValueKind::Unit)
            .with("signal", signal)
            .with("update", update),
    )
}

fn signal_operand(instr: &Instruction) -> Result<SignalId, RunError> {
    let value = instr.value("signal")?;
    value.as_signal().ok_or_else(|| RunError::OperandType {
        tag: instr.tag().clone(),
        operand: "signal".to_string(),
        expected: "a signal".to_string(),
        found: value.kind().to_string(),
    })
}

fn handle_cell(rt: &Runtime, instr: &Instruction) -> Result<Value, Fault> {
    let initial = rt.read(instr.value("initial")?)?;
    Ok(Value::Signal(rt.cell(initial)))
}

fn handle_sample(rt: &Runtime, instr: &Instruction) -> Result<Value, Fault> {
    Ok(rt.read(instr.value("signal")?)?)
}

fn handle_set(rt: &Runtime, instr: &Instruction) -> Result<Value, Fault> {
    let target = signal_operand(instr)?;
    let value = rt.read(instr.value("value")?)?;
    rt.set(target, value)?;
    Ok(Value::Unit)
}

fn handle_modify(rt: &Runtime, instr: &Instruction) -> Result<Value, Fault> {
    let target = signal_operand(instr)?;
    let update = instr.callable("update")?;
    let current = rt.sample(target)?;
    let next = rt.run(update.call(vec![current]))?;
    rt.set(target, next)?;
    Ok(Value::Unit)
}

/// Handlers for `signal.*`
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalPlugin;

impl Plugin for SignalPlugin {
    fn name(&self) -> &'static str {
        "signal"
    }

    fn install(&self, builder: &mut DispatcherBuilder) {
        builder.insert(CELL, handle_cell);
        builder.insert(SAMPLE, handle_sample);
        builder.insert(SET, handle_set);
        builder.insert(MODIFY, handle_modify);
    }
}
