// Copyright (c) 2025 - Cowboy AI, Inc.
//! Debug logging
//!
//! `log` emits its message through `tracing` at INFO with target
//! `weft::log`. A signal message is logged now and again on every change.

use tracing::info;

use crate::dispatch::{DispatcherBuilder, Plugin};
use crate::errors::Fault;
use crate::instruction::{Instruction, Operand, Tag};
use crate::program::Program;
use crate::runtime::Runtime;
use crate::value::{Value, ValueKind};

pub const LOG: Tag = Tag::from_static("debug.log");

pub fn log(message: impl Into<Operand>) -> Program {
    Program::lift(Instruction::new(LOG, ValueKind::Unit).with("message", message))
}

fn handle_log(rt: &Runtime, instr: &Instruction) -> Result<Value, Fault> {
    rt.watch(instr.value("message")?.clone(), |message| {
        info!(target: "weft::log", "{message}");
        Ok(())
    })?;
    Ok(Value::Unit)
}

/// Handler for `debug.log`
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugPlugin;

impl Plugin for DebugPlugin {
    fn name(&self) -> &'static str {
        "debug"
    }

    fn install(&self, builder: &mut DispatcherBuilder) {
        builder.insert(LOG, handle_log);
    }
}
