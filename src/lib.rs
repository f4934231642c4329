// Copyright (c) 2025 - Cowboy AI, Inc.
//! Effect descriptions as data, run over a glitch-free reactive graph
//!
//! A [`Program`] describes a computation as a chain of [`Instruction`]s.
//! Programs are inert values: they are built with `pure`, `lift` and
//! `and_then`, and only do something when a [`Runtime`] runs them. The
//! runtime hands each instruction to a [`Dispatcher`], which maps the
//! instruction's tag to a handler.
//!
//! Handlers are reactive-aware. When an operand is a signal, a handler
//! returns a derived signal that is kept up to date as its inputs change.
//! Event sources turn discrete occurrences into signals with `fold`,
//! `fold_m` and `constant_on`.
//!
//! # Example
//!
//! ```rust,ignore
//! use weft::prelude::*;
//!
//! let document = MemoryDocument::shared();
//! document.borrow_mut().create_element("button", "increment");
//! document.borrow_mut().create_element("span", "count");
//!
//! let runtime = Runtime::new(
//!     Dispatcher::standard()
//!         .plugin(DomPlugin::new(document.clone()))
//!         .build(),
//! );
//!
//! runtime.run(click_counter())?;
//! ```

pub mod config;
pub mod dispatch;
pub mod errors;
pub mod frp;
pub mod instruction;
pub mod instructions;
pub mod program;
pub mod runtime;
pub mod value;

pub use config::RuntimeConfig;
pub use dispatch::{Dispatcher, DispatcherBuilder, Handler, Plugin};
pub use errors::{Fault, RunError, RunResult};
pub use instruction::{Callable, Instruction, Operand, Tag};
pub use program::Program;
pub use runtime::Runtime;
pub use value::{ElementId, SignalId, SourceId, Value, ValueKind};

/// Everything needed to build and run programs
pub mod prelude {
    pub use crate::config::RuntimeConfig;
    pub use crate::dispatch::{Dispatcher, Plugin};
    pub use crate::errors::{Fault, RunError, RunResult};
    pub use crate::frp::combinators as events;
    pub use crate::frp::signal;
    pub use crate::instruction::{Callable, Instruction, Operand, Tag};
    pub use crate::instructions::dom::{DomPlugin, MemoryDocument, SharedDocument};
    pub use crate::instructions::{debug, dom, list, logic, math, show, text};
    pub use crate::program::{
        catch, chain, lift2, map_error, or_else, recover_with, require, require_or,
        require_outcome, sequence, throw, traverse, Program,
    };
    pub use crate::runtime::Runtime;
    pub use crate::value::{ElementId, SignalId, SourceId, Value, ValueKind};
}
