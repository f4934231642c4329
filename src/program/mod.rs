// Copyright (c) 2025 - Cowboy AI, Inc.
//! Programs - Composable effect descriptions
//!
//! A [`Program`] is an inert description of a computation: either a finished
//! value, or an instruction together with what to do with its result. Nothing
//! happens until a program is run against an interpreter.
//!
//! # Representation
//!
//! A program is a *head* plus a queue of continuations. The head is the next
//! thing to do (return a value, perform an instruction, raise, or run a body
//! under a handler); the queue holds the rest of the computation.
//!
//! ```text
//! Program = Head × [Value → Program]
//! ```
//!
//! `and_then` pushes onto the queue in O(1) and never inspects the head, so
//! binding is lazy and building a chain of a million steps costs a million
//! pushes, not a million nested frames. Running drains the queues with a
//! loop (see `trampoline`), so evaluation depth never reaches the call stack.
//!
//! # Laws
//!
//! ```text
//! pure(a).and_then(f)           ≡ f(a)
//! m.and_then(pure)              ≡ m
//! m.and_then(f).and_then(g)     ≡ m.and_then(|x| f(x).and_then(g))
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use weft::prelude::*;
//!
//! let program = math::add(1.0, 2.0)
//!     .and_then(|sum| text::concat("sum = ", show::show(sum)));
//!
//! let label = runtime.run(program)?;
//! ```

mod failure;
mod trampoline;

use std::collections::VecDeque;
use std::fmt;

use crate::instruction::Instruction;
use crate::value::Value;

pub use failure::{catch, map_error, or_else, recover_with, require, require_or, require_outcome, throw};

/// Continuation stored in a program's queue
pub(crate) type Continuation = Box<dyn FnOnce(Value) -> Program>;

pub(crate) enum Head {
    Pure(Value),
    Instr(Instruction),
    Throw(Value),
    Catch {
        body: Box<Program>,
        handler: Continuation,
    },
}

/// A description of a computation that may perform effects
pub struct Program {
    pub(crate) head: Head,
    pub(crate) queue: VecDeque<Continuation>,
}

impl Program {
    fn from_head(head: Head) -> Self {
        Self {
            head,
            queue: VecDeque::new(),
        }
    }

    /// A finished program
    pub fn pure(value: impl Into<Value>) -> Self {
        Self::from_head(Head::Pure(value.into()))
    }

    /// Perform one instruction and finish with its result
    ///
    /// The empty queue plays the role of the identity continuation.
    pub fn lift(instr: Instruction) -> Self {
        Self::from_head(Head::Instr(instr))
    }

    /// Perform one instruction and continue with `resume`
    pub fn suspend<F>(instr: Instruction, resume: F) -> Self
    where
        F: FnOnce(Value) -> Program + 'static,
    {
        Self::lift(instr).and_then(resume)
    }

    /// Sequence another computation after this one
    pub fn and_then<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Value) -> Program + 'static,
    {
        self.queue.push_back(Box::new(f));
        self
    }

    /// Transform the final value
    pub fn map<F>(self, f: F) -> Self
    where
        F: FnOnce(Value) -> Value + 'static,
    {
        self.and_then(move |value| Program::pure(f(value)))
    }

    /// Run `next` after this program, discarding this program's value
    pub fn then(self, next: Program) -> Self {
        self.and_then(move |_| next)
    }

    /// Whether the program is a finished value with nothing queued
    pub fn is_done(&self) -> bool {
        matches!(self.head, Head::Pure(_)) && self.queue.is_empty()
    }

    /// Instruction the program will perform first, if any
    pub fn next_instruction(&self) -> Option<&Instruction> {
        match &self.head {
            Head::Instr(instr) => Some(instr),
            _ => None,
        }
    }

    /// Resolve failures raised by this program with `handler`
    pub fn catch<F>(self, handler: F) -> Self
    where
        F: FnOnce(Value) -> Program + 'static,
    {
        catch(self, handler)
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = match &self.head {
            Head::Pure(v) => format!("Pure({v})"),
            Head::Instr(instr) => format!("Instr({})", instr.tag()),
            Head::Throw(v) => format!("Throw({v})"),
            Head::Catch { .. } => "Catch".to_string(),
        };
        f.debug_struct("Program")
            .field("head", &head)
            .field("queued", &self.queue.len())
            .finish()
    }
}

impl From<Value> for Program {
    fn from(value: Value) -> Self {
        Program::pure(value)
    }
}

fn push_item(list: Value, item: Value) -> Value {
    match list {
        Value::List(mut items) => {
            items.push(item);
            Value::List(items)
        }
        other => other,
    }
}

/// Run programs in order and collect their results into a list
///
/// Linear in the number of programs: the accumulator is moved from step to
/// step and extended in place.
pub fn sequence<I>(programs: I) -> Program
where
    I: IntoIterator<Item = Program>,
{
    programs
        .into_iter()
        .fold(Program::pure(Value::List(Vec::new())), |acc, program| {
            acc.and_then(move |items| program.map(move |item| push_item(items, item)))
        })
}

/// Map each item to a program and sequence the results
pub fn traverse<T, I, F>(items: I, f: F) -> Program
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Program,
{
    sequence(items.into_iter().map(f))
}

/// Run programs in order, keeping only the last result (`Unit` when empty)
pub fn chain<I>(programs: I) -> Program
where
    I: IntoIterator<Item = Program>,
{
    programs
        .into_iter()
        .fold(Program::pure(Value::Unit), |acc, program| acc.then(program))
}

/// Combine the results of two programs, running `a` first
pub fn lift2<F>(a: Program, b: Program, f: F) -> Program
where
    F: FnOnce(Value, Value) -> Value + 'static,
{
    a.and_then(move |x| b.map(move |y| f(x, y)))
}
