// Copyright (c) 2025 - Cowboy AI, Inc.
//! Boolean logic, comparison and selection
//!
//! `and`, `or`, `not` and `if_else` use truthiness (`Value::is_truthy`).
//! Comparisons accept two numbers or two texts.

use std::cmp::Ordering;

use crate::dispatch::{DispatcherBuilder, Plugin};
use crate::errors::{Fault, RunError};
use crate::instruction::{Instruction, Operand, Tag};
use crate::program::{sequence, Program};
use crate::runtime::Runtime;
use crate::value::{Value, ValueKind};

pub const AND: Tag = Tag::from_static("logic.and");
pub const OR: Tag = Tag::from_static("logic.or");
pub const NOT: Tag = Tag::from_static("logic.not");
pub const EQUALS: Tag = Tag::from_static("logic.equals");
pub const GREATER_THAN: Tag = Tag::from_static("logic.greater_than");
pub const LESS_THAN: Tag = Tag::from_static("logic.less_than");
pub const IF_ELSE: Tag = Tag::from_static("logic.if_else");
pub const MATCH: Tag = Tag::from_static("logic.match");

fn binary(tag: Tag, left: impl Into<Operand>, right: impl Into<Operand>) -> Program {
    Program::lift(
        Instruction::new(tag, ValueKind::Bool)
            .with("left", left)
            .with("right", right),
    )
}

pub fn and(left: impl Into<Operand>, right: impl Into<Operand>) -> Program {
    binary(AND, left, right)
}

pub fn or(left: impl Into<Operand>, right: impl Into<Operand>) -> Program {
    binary(OR, left, right)
}

pub fn not(value: impl Into<Operand>) -> Program {
    Program::lift(Instruction::new(NOT, ValueKind::Bool).with("value", value))
}

pub fn equals(left: impl Into<Operand>, right: impl Into<Operand>) -> Program {
    binary(EQUALS, left, right)
}

pub fn greater_than(left: impl Into<Operand>, right: impl Into<Operand>) -> Program {
    binary(GREATER_THAN, left, right)
}

pub fn less_than(left: impl Into<Operand>, right: impl Into<Operand>) -> Program {
    binary(LESS_THAN, left, right)
}

/// `then_branch` when `condition` is truthy, else `else_branch`
///
/// Both branches are evaluated; only the selection is conditional.
pub fn if_else(
    condition: impl Into<Operand>,
    then_branch: impl Into<Operand>,
    else_branch: impl Into<Operand>,
) -> Program {
    Program::lift(
        Instruction::new(IF_ELSE, ValueKind::Any)
            .with("condition", condition)
            .with("then", then_branch)
            .with("else", else_branch),
    )
}

/// Value of the first truthy condition, or `default`
pub fn match_first(cases: Vec<(Program, Program)>, default: impl Into<Operand>) -> Program {
    let pairs = sequence(
        cases
            .into_iter()
            .map(|(condition, value)| sequence([condition, value])),
    );
    Program::lift(
        Instruction::new(MATCH, ValueKind::Any)
            .with("cases", pairs)
            .with("default", default),
    )
}

fn compare(tag: &Tag, values: &[Value]) -> Result<Ordering, RunError> {
    let left = super::arg(tag, values, 0, "left")?;
    let right = super::arg(tag, values, 1, "right")?;
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b).ok_or_else(|| RunError::OperandType {
            tag: tag.clone(),
            operand: "right".to_string(),
            expected: "a comparable number".to_string(),
            found: "NaN".to_string(),
        }),
        (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
        _ => Err(RunError::OperandType {
            tag: tag.clone(),
            operand: "right".to_string(),
            expected: format!("the same kind as left ({})", left.kind()),
            found: right.kind().to_string(),
        }),
    }
}

type Rule = fn(&Tag, &[Value]) -> Result<Value, RunError>;

fn reactive(rt: &Runtime, instr: &Instruction, rule: Rule) -> Result<Value, Fault> {
    let tag = instr.tag().clone();
    rt.derive(instr.values()?, move |values| Ok(rule(&tag, values)?))
}

fn rule_and(tag: &Tag, v: &[Value]) -> Result<Value, RunError> {
    Ok(Value::Bool(
        super::arg(tag, v, 0, "left")?.is_truthy() && super::arg(tag, v, 1, "right")?.is_truthy(),
    ))
}

fn rule_or(tag: &Tag, v: &[Value]) -> Result<Value, RunError> {
    Ok(Value::Bool(
        super::arg(tag, v, 0, "left")?.is_truthy() || super::arg(tag, v, 1, "right")?.is_truthy(),
    ))
}

fn rule_not(tag: &Tag, v: &[Value]) -> Result<Value, RunError> {
    Ok(Value::Bool(!super::arg(tag, v, 0, "value")?.is_truthy()))
}

fn rule_equals(tag: &Tag, v: &[Value]) -> Result<Value, RunError> {
    Ok(Value::Bool(super::arg(tag, v, 0, "left")? == super::arg(tag, v, 1, "right")?))
}

fn rule_greater(tag: &Tag, v: &[Value]) -> Result<Value, RunError> {
    Ok(Value::Bool(compare(tag, v)? == Ordering::Greater))
}

fn rule_less(tag: &Tag, v: &[Value]) -> Result<Value, RunError> {
    Ok(Value::Bool(compare(tag, v)? == Ordering::Less))
}

fn rule_if_else(tag: &Tag, v: &[Value]) -> Result<Value, RunError> {
    let index = if super::arg(tag, v, 0, "condition")?.is_truthy() { 1 } else { 2 };
    super::arg(tag, v, index, if index == 1 { "then" } else { "else" }).cloned()
}

fn rule_match(tag: &Tag, v: &[Value]) -> Result<Value, RunError> {
    for case in super::list(tag, v, 0, "cases")? {
        if let Some([condition, value]) = case.as_list() {
            if condition.is_truthy() {
                return Ok(value.clone());
            }
        }
    }
    super::arg(tag, v, 1, "default").cloned()
}

/// Handlers for `logic.*`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogicPlugin;

impl Plugin for LogicPlugin {
    fn name(&self) -> &'static str {
        "logic"
    }

    fn install(&self, builder: &mut DispatcherBuilder) {
        let rules: [(Tag, Rule); 8] = [
            (AND, rule_and),
            (OR, rule_or),
            (NOT, rule_not),
            (EQUALS, rule_equals),
            (GREATER_THAN, rule_greater),
            (LESS_THAN, rule_less),
            (IF_ELSE, rule_if_else),
            (MATCH, rule_match),
        ];
        for (tag, rule) in rules {
            builder.insert(tag, move |rt, instr| reactive(rt, instr, rule));
        }
    }
}
