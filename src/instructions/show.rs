// Copyright (c) 2025 - Cowboy AI, Inc.
//! Rendering values as text
//!
//! A [`ShowRegistry`] maps value kinds to formatters. The default registry
//! renders numbers without a trailing `.0` when they are integral, text
//! as-is, and lists and records element by element. A kind with no formatter
//! falls back to `Display` and logs a warning.
//!
//! # Example
//!
//! ```rust,ignore
//! let registry = ShowRegistry::default()
//!     .with_formatter(ValueKind::Bool, |v| if v.is_truthy() { "yes" } else { "no" }.into());
//! let dispatcher = Dispatcher::builder().plugin(ShowPlugin::new(registry)).build();
//! ```

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use crate::dispatch::{DispatcherBuilder, Plugin};
use crate::errors::Fault;
use crate::instruction::{Instruction, Operand, Tag};
use crate::program::Program;
use crate::runtime::Runtime;
use crate::value::{format_number, Value, ValueKind};

pub const SHOW: Tag = Tag::from_static("show.show");

/// Render `value` as text
pub fn show(value: impl Into<Operand>) -> Program {
    Program::lift(Instruction::new(SHOW, ValueKind::Text).with("value", value))
}

type Formatter = Rc<dyn Fn(&Value, &ShowRegistry) -> String>;

/// Formatters keyed by value kind
#[derive(Clone)]
pub struct ShowRegistry {
    formatters: HashMap<ValueKind, Formatter>,
}

impl ShowRegistry {
    /// Registry with no formatters at all
    pub fn empty() -> Self {
        Self {
            formatters: HashMap::new(),
        }
    }

    /// Register (or replace) the formatter for `kind`
    pub fn register<F>(&mut self, kind: ValueKind, formatter: F)
    where
        F: Fn(&Value) -> String + 'static,
    {
        self.formatters
            .insert(kind, Rc::new(move |value: &Value, _: &ShowRegistry| formatter(value)));
    }

    pub fn with_formatter<F>(mut self, kind: ValueKind, formatter: F) -> Self
    where
        F: Fn(&Value) -> String + 'static,
    {
        self.register(kind, formatter);
        self
    }

    fn register_nested(&mut self, kind: ValueKind, formatter: fn(&Value, &ShowRegistry) -> String) {
        self.formatters.insert(kind, Rc::new(formatter));
    }

    pub fn format(&self, value: &Value) -> String {
        match self.formatters.get(&value.kind()) {
            Some(formatter) => formatter(value, self),
            None => {
                warn!(kind = %value.kind(), "no formatter registered; using default");
                value.to_string()
            }
        }
    }
}

fn show_list(value: &Value, registry: &ShowRegistry) -> String {
    let items = value.as_list().unwrap_or_default();
    let parts: Vec<String> = items.iter().map(|item| registry.format(item)).collect();
    format!("[{}]", parts.join(", "))
}

fn show_record(value: &Value, registry: &ShowRegistry) -> String {
    let Value::Record(fields) = value else {
        return value.to_string();
    };
    let parts: Vec<String> = fields
        .iter()
        .map(|(key, field)| format!("{key}: {}", registry.format(field)))
        .collect();
    format!("{{{}}}", parts.join(", "))
}

impl Default for ShowRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(ValueKind::Unit, |_| String::new());
        registry.register(ValueKind::Bool, |v| v.to_string());
        registry.register(ValueKind::Number, |v| format_number(v.as_number().unwrap_or_default()));
        registry.register(ValueKind::Text, |v| v.as_text().unwrap_or_default().to_string());
        registry.register_nested(ValueKind::List, show_list);
        registry.register_nested(ValueKind::Record, show_record);
        registry
    }
}

impl fmt::Debug for ShowRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<String> = self.formatters.keys().map(ToString::to_string).collect();
        kinds.sort();
        f.debug_struct("ShowRegistry").field("kinds", &kinds).finish()
    }
}

/// Handler for `show.show`, backed by a registry
#[derive(Debug, Clone, Default)]
pub struct ShowPlugin {
    registry: ShowRegistry,
}

impl ShowPlugin {
    pub fn new(registry: ShowRegistry) -> Self {
        Self { registry }
    }
}

impl Plugin for ShowPlugin {
    fn name(&self) -> &'static str {
        "show"
    }

    fn install(&self, builder: &mut DispatcherBuilder) {
        let registry = Rc::new(self.registry.clone());
        builder.insert(SHOW, move |rt, instr| {
            let registry = Rc::clone(&registry);
            rt.derive(vec![instr.value("value")?.clone()], move |values| {
                let value = super::arg(&SHOW, values, 0, "value")?;
                Ok(Value::Text(registry.format(value)))
            })
        });
    }
}
