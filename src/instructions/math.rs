// Copyright (c) 2025 - Cowboy AI, Inc.
//! Arithmetic on numbers
//!
//! ```rust,ignore
//! let total = math::add(math::mul(2.0, 3.0), 1.0); // 7
//! ```

use crate::dispatch::{DispatcherBuilder, Plugin};
use crate::errors::Fault;
use crate::instruction::{Instruction, Operand, Tag};
use crate::program::Program;
use crate::runtime::Runtime;
use crate::value::{Value, ValueKind};

pub const ADD: Tag = Tag::from_static("math.add");
pub const SUB: Tag = Tag::from_static("math.sub");
pub const MUL: Tag = Tag::from_static("math.mul");
pub const DIV: Tag = Tag::from_static("math.div");

/// A number literal
pub fn num(n: f64) -> Program {
    Program::pure(n)
}

fn binary(tag: Tag, a: impl Into<Operand>, b: impl Into<Operand>) -> Program {
    Program::lift(
        Instruction::new(tag, ValueKind::Number)
            .with("a", a)
            .with("b", b),
    )
}

pub fn add(a: impl Into<Operand>, b: impl Into<Operand>) -> Program {
    binary(ADD, a, b)
}

pub fn sub(a: impl Into<Operand>, b: impl Into<Operand>) -> Program {
    binary(SUB, a, b)
}

pub fn mul(a: impl Into<Operand>, b: impl Into<Operand>) -> Program {
    binary(MUL, a, b)
}

/// Division; a zero divisor raises a catchable failure
pub fn div(a: impl Into<Operand>, b: impl Into<Operand>) -> Program {
    binary(DIV, a, b)
}

type Op = fn(f64, f64) -> Result<f64, Fault>;

fn arithmetic(rt: &Runtime, instr: &Instruction, op: Op) -> Result<Value, Fault> {
    let tag = instr.tag().clone();
    let operands = vec![instr.value("a")?.clone(), instr.value("b")?.clone()];
    rt.derive(operands, move |values| {
        let a = super::number(&tag, values, 0, "a")?;
        let b = super::number(&tag, values, 1, "b")?;
        Ok(Value::Number(op(a, b)?))
    })
}

fn divide(a: f64, b: f64) -> Result<f64, Fault> {
    if b == 0.0 {
        return Err(Fault::raise("division by zero"));
    }
    Ok(a / b)
}

/// Handlers for `math.*`
#[derive(Debug, Clone, Copy, Default)]
pub struct MathPlugin;

impl Plugin for MathPlugin {
    fn name(&self) -> &'static str {
        "math"
    }

    fn install(&self, builder: &mut DispatcherBuilder) {
        let ops: [(Tag, Op); 4] = [
            (ADD, |a, b| Ok(a + b)),
            (SUB, |a, b| Ok(a - b)),
            (MUL, |a, b| Ok(a * b)),
            (DIV, divide),
        ];
        for (tag, op) in ops {
            builder.insert(tag, move |rt, instr| arithmetic(rt, instr, op));
        }
    }
}
