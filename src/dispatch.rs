// Copyright (c) 2025 - Cowboy AI, Inc.
//! Instruction Dispatcher
//!
//! Maps instruction tags to handlers. The run loop hands every resolved
//! instruction to [`Dispatcher::dispatch`], which looks the tag up, invokes the
//! handler, and checks the produced value against the instruction's declared
//! result shape.
//!
//! # Architecture
//!
//! ```text
//! Program                 Dispatcher                 Handlers
//! ───────                 ──────────                 ────────
//!
//! Instruction ──tag──>  ┌────────────┐   lookup   ┌────────────┐
//!                       │ dispatch() │ ─────────> │ math.add   │
//!                       └────────────┘            │ event.fold │
//!      ▲                      │                   │ dom.…      │
//!      │        Value         │                   └────────────┘
//!      └──────────────────────┘
//! ```
//!
//! Handler sets are assembled from [`Plugin`]s, so a catalog of instructions
//! can be added or replaced without touching the run loop. A handler that
//! needs host state captures it when the plugin installs it.
//!
//! # Example
//!
//! ```rust,ignore
//! let dispatcher = Dispatcher::standard()
//!     .plugin(DomPlugin::new(document.clone()))
//!     .build();
//! let runtime = Runtime::new(dispatcher);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{trace, warn};

use crate::errors::{Fault, RunError};
use crate::frp::{EventPlugin, SignalPlugin};
use crate::instruction::{Instruction, Tag};
use crate::instructions::{DebugPlugin, ListPlugin, LogicPlugin, MathPlugin, ShowPlugin, TextPlugin};
use crate::runtime::Runtime;
use crate::value::{Value, ValueKind};

/// Interprets one kind of instruction
pub type Handler = Rc<dyn Fn(&Runtime, &Instruction) -> Result<Value, Fault>>;

/// A bundle of handlers installed together
pub trait Plugin {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Register this plugin's handlers
    ///
    /// # Arguments
    ///
    /// * `builder` - Builder to register handlers on
    fn install(&self, builder: &mut DispatcherBuilder);
}

/// Collects handlers before freezing them into a [`Dispatcher`]
#[derive(Default)]
pub struct DispatcherBuilder {
    handlers: HashMap<Tag, Handler>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `tag`
    ///
    /// Registering a tag twice replaces the earlier handler.
    pub fn insert<F>(&mut self, tag: Tag, handler: F)
    where
        F: Fn(&Runtime, &Instruction) -> Result<Value, Fault> + 'static,
    {
        if self.handlers.insert(tag.clone(), Rc::new(handler)).is_some() {
            warn!(%tag, "handler replaced");
        }
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn handler<F>(mut self, tag: Tag, handler: F) -> Self
    where
        F: Fn(&Runtime, &Instruction) -> Result<Value, Fault> + 'static,
    {
        self.insert(tag, handler);
        self
    }

    /// Install every handler of `plugin`
    pub fn plugin(mut self, plugin: impl Plugin) -> Self {
        let before = self.handlers.len();
        plugin.install(&mut self);
        trace!(
            plugin = plugin.name(),
            added = self.handlers.len().saturating_sub(before),
            "plugin installed"
        );
        self
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            handlers: Rc::new(self.handlers),
        }
    }
}

/// Tag-to-handler table
#[derive(Clone)]
pub struct Dispatcher {
    handlers: Rc<HashMap<Tag, Handler>>,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Builder preloaded with the host-independent catalog
    ///
    /// Everything except host plugins such as `DomPlugin`, which the caller
    /// adds with its own document.
    pub fn standard() -> DispatcherBuilder {
        DispatcherBuilder::new()
            .plugin(EventPlugin)
            .plugin(SignalPlugin)
            .plugin(MathPlugin)
            .plugin(TextPlugin)
            .plugin(ListPlugin)
            .plugin(LogicPlugin)
            .plugin(ShowPlugin::default())
            .plugin(DebugPlugin)
    }

    pub fn contains(&self, tag: &Tag) -> bool {
        self.handlers.contains_key(tag)
    }

    /// Registered tags, sorted
    pub fn tags(&self) -> Vec<&Tag> {
        let mut tags: Vec<&Tag> = self.handlers.keys().collect();
        tags.sort();
        tags
    }

    /// Interpret one resolved instruction
    ///
    /// # Errors
    ///
    /// `UnknownTag` when no handler is registered, `ResultShape` when result
    /// checking is enabled and the value does not match, or whatever the
    /// handler itself faults with.
    pub fn dispatch(&self, runtime: &Runtime, instr: Instruction) -> Result<Value, Fault> {
        let handler = self
            .handlers
            .get(instr.tag())
            .ok_or_else(|| RunError::UnknownTag(instr.tag().clone()))?;

        let value = handler(runtime, &instr)?;

        if runtime.config().check_results {
            check_shape(runtime, &instr, &value)?;
        }
        Ok(value)
    }
}

/// A signal satisfies any declaration its current value satisfies
fn check_shape(runtime: &Runtime, instr: &Instruction, value: &Value) -> Result<(), RunError> {
    let expected = instr.result();
    if expected.admits(value.kind()) {
        return Ok(());
    }
    let found = match value {
        Value::Signal(id) => runtime.sample(*id)?.kind(),
        other => other.kind(),
    };
    if expected.admits(found) {
        Ok(())
    } else {
        Err(RunError::ResultShape {
            tag: instr.tag().clone(),
            expected,
            found,
        })
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tags", &self.tags())
            .finish()
    }
}
