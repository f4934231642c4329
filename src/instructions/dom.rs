// Copyright (c) 2025 - Cowboy AI, Inc.
//! Document access
//!
//! Instructions for finding elements and reading or writing their
//! properties. The handlers work against a [`MemoryDocument`], an in-memory
//! element tree shared with the host through [`SharedDocument`].
//!
//! # Architecture
//!
//! ```text
//! Program                DomPlugin                 MemoryDocument
//! ───────                ─────────                 ──────────────
//!
//! get_element_by_id ──>  lookup by id      ──>     { ok: element#0 }
//! get_property      ──>  read property     ──>     Value
//! set_property      ──>  watch(value)      ──>     property kept in step
//! ```
//!
//! `set_property` with a signal value keeps the property equal to the
//! signal's current value for as long as the signal lives.
//!
//! # Example
//!
//! ```rust,ignore
//! let document = MemoryDocument::shared();
//! let button = document.borrow_mut().create_element("button", "increment");
//!
//! let program = dom::element("increment").and_then(|button| {
//!     dom::set_property("textContent", "+1", button)
//! });
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use tracing::trace;

use crate::dispatch::{DispatcherBuilder, Plugin};
use crate::errors::{Fault, RunError, RunResult};
use crate::instruction::{Instruction, Operand, Tag};
use crate::program::{require_outcome, Program};
use crate::runtime::Runtime;
use crate::value::{ElementId, Value, ValueKind};

pub const GET_ELEMENT_BY_ID: Tag = Tag::from_static("dom.get_element_by_id");
pub const GET_PROPERTY: Tag = Tag::from_static("dom.get_property");
pub const SET_PROPERTY: Tag = Tag::from_static("dom.set_property");

/// Document handle shared between handlers and the host
pub type SharedDocument = Rc<RefCell<MemoryDocument>>;

#[derive(Debug, Clone)]
struct ElementData {
    tag_name: String,
    dom_id: String,
    properties: BTreeMap<String, Value>,
}

/// In-memory element store
#[derive(Debug, Default)]
pub struct MemoryDocument {
    elements: Vec<ElementData>,
    by_id: HashMap<String, ElementId>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty document behind a shared handle
    pub fn shared() -> SharedDocument {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Add an element; a later element with the same id shadows earlier ones
    pub fn create_element(&mut self, tag_name: &str, dom_id: &str) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(ElementData {
            tag_name: tag_name.to_string(),
            dom_id: dom_id.to_string(),
            properties: BTreeMap::new(),
        });
        self.by_id.insert(dom_id.to_string(), id);
        id
    }

    pub fn element_by_id(&self, dom_id: &str) -> Option<ElementId> {
        self.by_id.get(dom_id).copied()
    }

    fn element(&self, id: ElementId) -> RunResult<&ElementData> {
        self.elements
            .get(id.0)
            .ok_or_else(|| RunError::Host(format!("no {id} in document")))
    }

    pub fn tag_name(&self, id: ElementId) -> RunResult<&str> {
        Ok(&self.element(id)?.tag_name)
    }

    pub fn dom_id(&self, id: ElementId) -> RunResult<&str> {
        Ok(&self.element(id)?.dom_id)
    }

    /// Property value; an unset property reads as `Unit`
    pub fn property(&self, id: ElementId, name: &str) -> RunResult<Value> {
        Ok(self
            .element(id)?
            .properties
            .get(name)
            .cloned()
            .unwrap_or_default())
    }

    pub fn set_property(&mut self, id: ElementId, name: &str, value: Value) -> RunResult<()> {
        let element = self
            .elements
            .get_mut(id.0)
            .ok_or_else(|| RunError::Host(format!("no {id} in document")))?;
        trace!(element = %id, property = name, %value, "property written");
        element.properties.insert(name.to_string(), value);
        Ok(())
    }

    /// `textContent` rendered as a string
    pub fn text_content(&self, id: ElementId) -> RunResult<String> {
        Ok(match self.property(id, "textContent")? {
            Value::Unit => String::new(),
            other => other.to_string(),
        })
    }
}

/// Look up an element; yields `{ ok: element }` or `{ err: message }`
pub fn get_element_by_id(dom_id: impl Into<Operand>) -> Program {
    Program::lift(Instruction::new(GET_ELEMENT_BY_ID, ValueKind::Record).with("id", dom_id))
}

/// Look up an element, raising a failure when it does not exist
pub fn element(dom_id: impl Into<Operand>) -> Program {
    require_outcome(get_element_by_id(dom_id))
}

pub fn get_property(prop: impl Into<Operand>, target: impl Into<Operand>) -> Program {
    Program::lift(
        Instruction::new(GET_PROPERTY, ValueKind::Any)
            .with("prop", prop)
            .with("target", target),
    )
}

/// Write a property, keeping it in step with `value` when it is a signal
pub fn set_property(prop: impl Into<Operand>, value: impl Into<Operand>, target: impl Into<Operand>) -> Program {
    Program::lift(
        Instruction::new(SET_PROPERTY, ValueKind::Unit)
            .with("prop", prop)
            .with("value", value)
            .with("target", target),
    )
}

/// Handlers for `dom.*`, bound to one document
#[derive(Debug, Clone)]
pub struct DomPlugin {
    document: SharedDocument,
}

impl DomPlugin {
    pub fn new(document: SharedDocument) -> Self {
        Self { document }
    }
}

impl Plugin for DomPlugin {
    fn name(&self) -> &'static str {
        "dom"
    }

    fn install(&self, builder: &mut DispatcherBuilder) {
        let document = Rc::clone(&self.document);
        builder.insert(GET_ELEMENT_BY_ID, move |_, instr| {
            let dom_id = instr.text("id")?;
            Ok(match document.borrow().element_by_id(dom_id) {
                Some(id) => Value::ok(id),
                None => Value::err(format!("no element with id `{dom_id}`")),
            })
        });

        let document = Rc::clone(&self.document);
        builder.insert(GET_PROPERTY, move |_, instr| {
            let prop = instr.text("prop")?;
            let target = instr.element("target")?;
            let value = document.borrow().property(target, prop)?;
            Ok(value)
        });

        let document = Rc::clone(&self.document);
        builder.insert(SET_PROPERTY, move |rt, instr| {
            let prop = instr.text("prop")?.to_string();
            let target = instr.element("target")?;
            let document = Rc::clone(&document);
            rt.watch(instr.value("value")?.clone(), move |value| {
                document
                    .borrow_mut()
                    .set_property(target, &prop, value.clone())
                    .map_err(Fault::Abort)
            })?;
            Ok(Value::Unit)
        });
    }
}
