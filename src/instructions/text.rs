// Copyright (c) 2025 - Cowboy AI, Inc.
//! Text concatenation

use crate::dispatch::{DispatcherBuilder, Plugin};
use crate::errors::Fault;
use crate::instruction::{Instruction, Operand, Tag};
use crate::program::Program;
use crate::runtime::Runtime;
use crate::value::{Value, ValueKind};

pub const CONCAT: Tag = Tag::from_static("text.concat");

/// A text literal
pub fn text(s: impl Into<String>) -> Program {
    Program::pure(Value::Text(s.into()))
}

/// `a` followed by `b`; both must be text
pub fn concat(a: impl Into<Operand>, b: impl Into<Operand>) -> Program {
    Program::lift(
        Instruction::new(CONCAT, ValueKind::Text)
            .with("a", a)
            .with("b", b),
    )
}

fn handle_concat(rt: &Runtime, instr: &Instruction) -> Result<Value, Fault> {
    let tag = instr.tag().clone();
    let operands = vec![instr.value("a")?.clone(), instr.value("b")?.clone()];
    rt.derive(operands, move |values| {
        let a = super::text(&tag, values, 0, "a")?;
        let b = super::text(&tag, values, 1, "b")?;
        Ok(Value::Text(format!("{a}{b}")))
    })
}

/// Handlers for `text.*`
#[derive(Debug, Clone, Copy, Default)]
pub struct TextPlugin;

impl Plugin for TextPlugin {
    fn name(&self) -> &'static str {
        "text"
    }

    fn install(&self, builder: &mut DispatcherBuilder) {
        builder.insert(CONCAT, handle_concat);
    }
}
