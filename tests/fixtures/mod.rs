// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for weft
//!
//! Provides deterministic runtimes, documents and applications for the
//! integration tests.
//!
//! # Design Principles
//! - Handlers used by law tests record every call, so two programs can be
//!   compared by what they did and not only by what they returned
//! - Documents are built with fixed element ids
//! - Applications are built here once and shared by every scenario test

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use weft::prelude::*;

/// Tag of the recording instruction
pub const RECORD: Tag = Tag::from_static("test.record");

/// Tag of an instruction that always raises
pub const FAIL: Tag = Tag::from_static("test.fail");

/// Ordered log of `test.record` arguments
pub type CallLog = Rc<RefCell<Vec<f64>>>;

/// Record `n`; the instruction yields `n + 1`
pub fn record(n: f64) -> Program {
    Program::lift(Instruction::new(RECORD, ValueKind::Number).with("n", n))
}

/// Raise `message` from inside a handler
pub fn fail(message: &str) -> Program {
    Program::lift(Instruction::new(FAIL, ValueKind::Any).with("message", message))
}

/// Continuation that records its input plus `offset`
pub fn record_plus(offset: f64) -> impl Fn(Value) -> Program + Clone + 'static {
    move |value: Value| record(value.as_number().unwrap_or(0.0) + offset)
}

/// A runtime whose dispatcher knows `test.record`, `test.fail` and the
/// standard catalog, together with the log of recorded calls
pub fn recording_runtime() -> (Runtime, CallLog) {
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let calls = Rc::clone(&log);
    let dispatcher = Dispatcher::standard()
        .handler(RECORD, move |_, instr| {
            let n = instr.number("n")?;
            calls.borrow_mut().push(n);
            Ok(Value::from(n + 1.0))
        })
        .handler(FAIL, |_, instr| Err(Fault::raise(instr.text("message")?)))
        .build();
    (Runtime::new(dispatcher), log)
}

/// Runtime with the standard catalog and no host
pub fn plain_runtime() -> Runtime {
    Runtime::new(Dispatcher::standard().build())
}

/// A document with the elements both demo applications expect, and a
/// runtime bound to it
pub struct App {
    pub runtime: Runtime,
    pub document: SharedDocument,
    pub increment: ElementId,
    pub count: ElementId,
    pub todo_input: ElementId,
    pub todo_button: ElementId,
    pub todo_list: ElementId,
}

impl App {
    pub fn new() -> Self {
        let document = MemoryDocument::shared();
        let (increment, count, todo_input, todo_button, todo_list) = {
            let mut doc = document.borrow_mut();
            (
                doc.create_element("button", "increment"),
                doc.create_element("span", "count"),
                doc.create_element("input", "todo-input"),
                doc.create_element("button", "todo-button"),
                doc.create_element("ul", "todo-list"),
            )
        };
        let runtime = Runtime::new(
            Dispatcher::standard()
                .plugin(DomPlugin::new(Rc::clone(&document)))
                .build(),
        );
        Self {
            runtime,
            document,
            increment,
            count,
            todo_input,
            todo_button,
            todo_list,
        }
    }

    pub fn click(&self, element: ElementId) {
        self.runtime
            .dispatch_event(element, "click", Value::Unit)
            .expect("click settles");
    }

    pub fn text_content(&self, element: ElementId) -> String {
        self.document
            .borrow()
            .text_content(element)
            .expect("element exists")
    }

    pub fn property(&self, element: ElementId, name: &str) -> Value {
        self.document
            .borrow()
            .property(element, name)
            .expect("element exists")
    }

    /// Simulate typing into an input
    pub fn type_into(&self, element: ElementId, text: &str) {
        self.document
            .borrow_mut()
            .set_property(element, "value", Value::from(text))
            .expect("element exists");
    }
}

fn increment(count: &Value, _event: &Value) -> Value {
    Value::from(count.as_number().unwrap_or(0.0) + 1.0)
}

/// Counter: yields `[count, label]` and renders the label into `#count`
pub fn click_counter() -> Program {
    dom::element("increment").and_then(|button| {
        dom::element("count").and_then(move |display| {
            events::on("click", button).and_then(move |clicks| {
                events::fold(clicks, 0.0, increment).and_then(move |count| {
                    text::concat("Clicks: ", show::show(count.clone())).and_then(move |label| {
                        dom::set_property("textContent", label.clone(), display)
                            .map(move |_| Value::List(vec![count, label]))
                    })
                })
            })
        })
    })
}

/// Todo list: yields the todos signal
pub fn todo_list() -> Program {
    dom::element("todo-input").and_then(|input| {
        dom::element("todo-button").and_then(move |button| {
            dom::element("todo-list").and_then(move |list_el| {
                events::on("click", button).and_then(move |submit| {
                    let reader = input.clone();
                    events::fold_m(submit.clone(), Value::List(Vec::new()), move |todos, _| {
                        list::append(todos, dom::get_property("value", reader.clone()))
                    })
                    .and_then(move |todos| {
                        chain([
                            dom::set_property("textContent", list::join(todos.clone(), ", "), list_el),
                            dom::set_property("value", events::constant_on(submit, ""), input),
                        ])
                        .map(move |_| todos)
                    })
                })
            })
        })
    })
}
