// Copyright (c) 2025 - Cowboy AI, Inc.
//! Instruction catalog
//!
//! Ready-made instruction sets, each a constructor module plus a [`Plugin`]:
//!
//! | Module | Tags |
//! |---|---|
//! | [`math`] | `math.add`, `math.sub`, `math.mul`, `math.div` |
//! | [`text`] | `text.concat` |
//! | [`list`] | `list.append`, `list.join` |
//! | [`logic`] | `logic.and`, `logic.or`, `logic.not`, `logic.equals`, `logic.greater_than`, `logic.less_than`, `logic.if_else`, `logic.match` |
//! | [`show`] | `show.show` |
//! | [`debug`] | `debug.log` |
//! | [`dom`] | `dom.get_element_by_id`, `dom.get_property`, `dom.set_property` |
//!
//! Handlers are reactive-aware: when an operand is a signal the handler
//! returns a derived signal instead of a plain value, and effects are kept
//! in step with their inputs.
//!
//! [`Plugin`]: crate::dispatch::Plugin

pub mod debug;
pub mod dom;
pub mod list;
pub mod logic;
pub mod math;
pub mod show;
pub mod text;

pub use debug::DebugPlugin;
pub use dom::{DomPlugin, MemoryDocument, SharedDocument};
pub use list::ListPlugin;
pub use logic::LogicPlugin;
pub use math::MathPlugin;
pub use show::{ShowPlugin, ShowRegistry};
pub use text::TextPlugin;

use crate::errors::RunError;
use crate::instruction::Tag;
use crate::value::Value;

/// Resolved operand `index` of a reactive computation
pub(crate) fn arg<'a>(tag: &Tag, values: &'a [Value], index: usize, name: &str) -> Result<&'a Value, RunError> {
    values.get(index).ok_or_else(|| RunError::MissingOperand {
        tag: tag.clone(),
        operand: name.to_string(),
    })
}

fn mismatch(tag: &Tag, name: &str, expected: &str, found: &Value) -> RunError {
    RunError::OperandType {
        tag: tag.clone(),
        operand: name.to_string(),
        expected: expected.to_string(),
        found: found.kind().to_string(),
    }
}

pub(crate) fn number(tag: &Tag, values: &[Value], index: usize, name: &str) -> Result<f64, RunError> {
    let value = arg(tag, values, index, name)?;
    value.as_number().ok_or_else(|| mismatch(tag, name, "a number", value))
}

pub(crate) fn text<'a>(tag: &Tag, values: &'a [Value], index: usize, name: &str) -> Result<&'a str, RunError> {
    let value = arg(tag, values, index, name)?;
    value.as_text().ok_or_else(|| mismatch(tag, name, "text", value))
}

pub(crate) fn list<'a>(tag: &Tag, values: &'a [Value], index: usize, name: &str) -> Result<&'a [Value], RunError> {
    let value = arg(tag, values, index, name)?;
    value.as_list().ok_or_else(|| mismatch(tag, name, "a list", value))
}
