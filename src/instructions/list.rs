// Copyright (c) 2025 - Cowboy AI, Inc.
//! List building and joining

use crate::dispatch::{DispatcherBuilder, Plugin};
use crate::errors::Fault;
use crate::instruction::{Instruction, Operand, Tag};
use crate::program::Program;
use crate::runtime::Runtime;
use crate::value::{Value, ValueKind};

pub const APPEND: Tag = Tag::from_static("list.append");
pub const JOIN: Tag = Tag::from_static("list.join");

/// `list` with `item` added at the end
pub fn append(list: impl Into<Operand>, item: impl Into<Operand>) -> Program {
    Program::lift(
        Instruction::new(APPEND, ValueKind::List)
            .with("list", list)
            .with("item", item),
    )
}

/// Items rendered as text and joined with `separator`
pub fn join(list: impl Into<Operand>, separator: impl Into<Operand>) -> Program {
    Program::lift(
        Instruction::new(JOIN, ValueKind::Text)
            .with("list", list)
            .with("separator", separator),
    )
}

fn handle_append(rt: &Runtime, instr: &Instruction) -> Result<Value, Fault> {
    let tag = instr.tag().clone();
    let operands = vec![instr.value("list")?.clone(), instr.value("item")?.clone()];
    rt.derive(operands, move |values| {
        let mut items = super::list(&tag, values, 0, "list")?.to_vec();
        items.push(super::arg(&tag, values, 1, "item")?.clone());
        Ok(Value::List(items))
    })
}

fn handle_join(rt: &Runtime, instr: &Instruction) -> Result<Value, Fault> {
    let tag = instr.tag().clone();
    let operands = vec![instr.value("list")?.clone(), instr.value("separator")?.clone()];
    rt.derive(operands, move |values| {
        let items = super::list(&tag, values, 0, "list")?;
        let separator = super::text(&tag, values, 1, "separator")?;
        let joined = items
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(separator);
        Ok(Value::Text(joined))
    })
}

/// Handlers for `list.*`
#[derive(Debug, Clone, Copy, Default)]
pub struct ListPlugin;

impl Plugin for ListPlugin {
    fn name(&self) -> &'static str {
        "list"
    }

    fn install(&self, builder: &mut DispatcherBuilder) {
        builder.insert(APPEND, handle_append);
        builder.insert(JOIN, handle_join);
    }
}
