// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event Combinators
//!
//! Program-level constructors for working with event sources, and the
//! [`EventPlugin`] that interprets them.
//!
//! # Available Combinators
//!
//! - `on` - Source fired by a host event on an element
//! - `source` - Source fired by the host program
//! - `fold` - Signal accumulated with a pure reducer
//! - `fold_m` - Signal accumulated with an effectful reducer
//! - `constant_on` - Signal reset to a value on every occurrence
//! - `listen` - Run a program for every occurrence
//! - `merge` - Source fired by either of two sources
//!
//! # Examples
//!
//! ## Counting clicks
//!
//! ```rust,ignore
//! let clicks = on("click", button);
//! let count = fold(clicks, 0.0, |n, _| Value::from(n.as_number().unwrap_or(0.0) + 1.0));
//! ```
//!
//! ## Reading the host on every occurrence
//!
//! ```rust,ignore
//! let todos = fold_m(submit, Value::List(vec![]), move |state, _| {
//!     list::append(state, dom::get_property("value", input))
//! });
//! ```

use crate::dispatch::{DispatcherBuilder, Plugin};
use crate::errors::{Fault, RunError};
use crate::instruction::{Callable, Instruction, Operand, Tag};
use crate::program::Program;
use crate::runtime::Runtime;
use crate::value::{Value, ValueKind};

pub const ON: Tag = Tag::from_static("event.on");
pub const SOURCE: Tag = Tag::from_static("event.source");
pub const FOLD: Tag = Tag::from_static("event.fold");
pub const FOLD_M: Tag = Tag::from_static("event.fold_m");
pub const CONSTANT_ON: Tag = Tag::from_static("event.constant_on");
pub const LISTEN: Tag = Tag::from_static("event.listen");
pub const MERGE: Tag = Tag::from_static("event.merge");

fn pair(args: Vec<Value>) -> (Value, Value) {
    let mut args = args.into_iter();
    let state = args.next().unwrap_or_default();
    let event = args.next().unwrap_or_default();
    (state, event)
}

/// Source fired whenever the host dispatches `event` on `target`
///
/// # Arguments
///
/// * `event` - Event name, e.g. `"click"`
/// * `target` - Element, or a program producing one
pub fn on(event: impl Into<Operand>, target: impl Into<Operand>) -> Program {
    Program::lift(
        Instruction::new(ON, ValueKind::Source)
            .with("event", event)
            .with("target", target),
    )
}

/// Source fired only through `Runtime::fire`
pub fn source(name: impl Into<Operand>) -> Program {
    Program::lift(Instruction::new(SOURCE, ValueKind::Source).with("name", name))
}

/// Signal holding `initial`, then `reducer(previous, payload)` after each occurrence
///
/// The reducer must not perform effects; use [`fold_m`] when it needs to.
pub fn fold<F>(source: impl Into<Operand>, initial: impl Into<Operand>, reducer: F) -> Program
where
    F: Fn(&Value, &Value) -> Value + 'static,
{
    fold_with(
        source,
        initial,
        Callable::new(move |args| {
            let (state, event) = pair(args);
            Program::pure(reducer(&state, &event))
        }),
    )
}

/// [`fold`] with a reducer given as a callable producing a program
///
/// The produced program must finish without performing any instruction;
/// otherwise the occurrence fails with `RunError::ImpureReducer`.
pub fn fold_with(source: impl Into<Operand>, initial: impl Into<Operand>, reducer: Callable) -> Program {
    Program::lift(
        Instruction::new(FOLD, ValueKind::Signal)
            .with("source", source)
            .with("initial", initial)
            .with("reducer", reducer),
    )
}

/// Signal accumulated by running `reducer(previous, payload)` on each occurrence
///
/// `initial` may itself be a program; it runs once, when the fold is created.
/// The state stored is always a plain value: signals in a reducer's result
/// are read, and nodes the reducer creates are removed after it runs.
pub fn fold_m<F>(source: impl Into<Operand>, initial: impl Into<Operand>, reducer: F) -> Program
where
    F: Fn(Value, Value) -> Program + 'static,
{
    let reducer = Callable::new(move |args| {
        let (state, event) = pair(args);
        reducer(state, event)
    });
    Program::lift(
        Instruction::new(FOLD_M, ValueKind::Signal)
            .with("source", source)
            .with("initial", initial)
            .with("reducer", reducer),
    )
}

/// Signal holding `value`, reset to `value` on every occurrence
pub fn constant_on(source: impl Into<Operand>, value: impl Into<Operand>) -> Program {
    Program::lift(
        Instruction::new(CONSTANT_ON, ValueKind::Signal)
            .with("source", source)
            .with("value", value),
    )
}

/// Run `handler(payload)` after every occurrence has settled
///
/// Nodes the handler creates last only for that run.
pub fn listen<F>(source: impl Into<Operand>, handler: F) -> Program
where
    F: Fn(Value) -> Program + 'static,
{
    let handler = Callable::new(move |args| handler(args.into_iter().next().unwrap_or_default()));
    Program::lift(
        Instruction::new(LISTEN, ValueKind::Unit)
            .with("source", source)
            .with("handler", handler),
    )
}

/// Source fired whenever `left` or `right` fires
pub fn merge(left: impl Into<Operand>, right: impl Into<Operand>) -> Program {
    Program::lift(
        Instruction::new(MERGE, ValueKind::Source)
            .with("left", left)
            .with("right", right),
    )
}

fn handle_on(rt: &Runtime, instr: &Instruction) -> Result<Value, Fault> {
    let event = instr.text("event")?;
    let target = instr.element("target")?;
    Ok(Value::Source(rt.on(target, event)))
}

fn handle_source(rt: &Runtime, instr: &Instruction) -> Result<Value, Fault> {
    let name = instr.value("name")?.to_string();
    Ok(Value::Source(rt.source(name)))
}

fn handle_fold(rt: &Runtime, instr: &Instruction) -> Result<Value, Fault> {
    let source = instr.source("source")?;
    let initial = rt.read(instr.value("initial")?)?;
    let reducer = instr.callable("reducer")?.clone();

    let id = rt.fold(source, initial, move |state, event| {
        reducer
            .call(vec![state.clone(), event.clone()])
            .run_with(|effect| Err(Fault::Abort(RunError::ImpureReducer(effect.tag().clone()))))
            .map_err(Fault::from)
    })?;
    Ok(Value::Signal(id))
}

fn handle_fold_m(rt: &Runtime, instr: &Instruction) -> Result<Value, Fault> {
    let source = instr.source("source")?;
    let initial = rt.read(instr.value("initial")?)?;
    let reducer = instr.callable("reducer")?.clone();

    let id = rt.fold_m(source, Program::pure(initial), move |state, event| {
        reducer.call(vec![state, event])
    })?;
    Ok(Value::Signal(id))
}

fn handle_constant_on(rt: &Runtime, instr: &Instruction) -> Result<Value, Fault> {
    let source = instr.source("source")?;
    let value = rt.read(instr.value("value")?)?;
    Ok(Value::Signal(rt.constant_on(source, value)?))
}

fn handle_listen(rt: &Runtime, instr: &Instruction) -> Result<Value, Fault> {
    let source = instr.source("source")?;
    let handler = instr.callable("handler")?.clone();
    rt.listen(source, move |rt, payload| {
        rt.run_reaction(handler.call(vec![payload.clone()]))?;
        Ok(())
    })?;
    Ok(Value::Unit)
}

fn handle_merge(rt: &Runtime, instr: &Instruction) -> Result<Value, Fault> {
    let left = instr.source("left")?;
    let right = instr.source("right")?;
    Ok(Value::Source(rt.merge(left, right)?))
}

/// Handlers for `event.*`
#[derive(Debug, Clone, Copy, Default)]
pub struct EventPlugin;

impl Plugin for EventPlugin {
    fn name(&self) -> &'static str {
        "event"
    }

    fn install(&self, builder: &mut DispatcherBuilder) {
        builder.insert(ON, handle_on);
        builder.insert(SOURCE, handle_source);
        builder.insert(FOLD, handle_fold);
        builder.insert(FOLD_M, handle_fold_m);
        builder.insert(CONSTANT_ON, handle_constant_on);
        builder.insert(LISTEN, handle_listen);
        builder.insert(MERGE, handle_merge);
    }
}
