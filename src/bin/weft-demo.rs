// Copyright (c) 2025 - Cowboy AI, Inc.
//! Weft demo
//!
//! Runs two small applications against an in-memory document and simulates
//! user input:
//!
//! - a click counter that renders `Clicks: N`
//! - a todo list that collects the input field on every submit
//!
//! Run with: cargo run --bin weft-demo
//!
//! Set `RUST_LOG=weft=trace` to watch propagation, `WEFT_STEP_LIMIT` to
//! bound every run.

use anyhow::{Context, Result};
use tracing::info;
use weft::prelude::*;

fn increment(count: &Value, _event: &Value) -> Value {
    Value::from(count.as_number().unwrap_or(0.0) + 1.0)
}

/// Counter: every click on `increment` updates `count`
fn click_counter() -> Program {
    dom::element("increment").and_then(|button| {
        dom::element("count").and_then(move |display| {
            let clicks = events::on("click", button);
            let count = events::fold(clicks, 0.0, increment);
            let label = text::concat("Clicks: ", show::show(count));
            dom::set_property("textContent", label, display)
        })
    })
}

/// Todo list: submitting appends the input's value and clears the field
fn todo_list() -> Program {
    dom::element("todo-input").and_then(|input| {
        dom::element("todo-button").and_then(move |button| {
            dom::element("todo-list").and_then(move |list_el| {
                events::on("click", button).and_then(move |submit| {
                    let reader = input.clone();
                    let todos = events::fold_m(submit.clone(), Value::List(Vec::new()), move |todos, _| {
                        list::append(todos, dom::get_property("value", reader.clone()))
                    });
                    let cleared = events::constant_on(submit, "");

                    chain([
                        dom::set_property("textContent", list::join(todos, ", "), list_el),
                        dom::set_property("value", cleared, input),
                    ])
                })
            })
        })
    })
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let document = MemoryDocument::shared();
    let (button, count, input, submit, list) = {
        let mut doc = document.borrow_mut();
        (
            doc.create_element("button", "increment"),
            doc.create_element("span", "count"),
            doc.create_element("input", "todo-input"),
            doc.create_element("button", "todo-button"),
            doc.create_element("ul", "todo-list"),
        )
    };

    let runtime = Runtime::with_config(
        Dispatcher::standard()
            .plugin(DomPlugin::new(document.clone()))
            .build(),
        RuntimeConfig::from_env(),
    );

    runtime.run(click_counter()).context("starting the click counter")?;
    info!(label = %document.borrow().text_content(count)?, "counter ready");
    for _ in 0..3 {
        runtime.dispatch_event(button, "click", Value::Unit)?;
        info!(label = %document.borrow().text_content(count)?, "clicked");
    }

    runtime.run(todo_list()).context("starting the todo list")?;
    for item in ["milk", "eggs", "bread"] {
        document.borrow_mut().set_property(input, "value", Value::from(item))?;
        runtime.dispatch_event(submit, "click", Value::Unit)?;
        info!(
            todos = %document.borrow().text_content(list)?,
            input = %document.borrow().property(input, "value")?,
            "submitted"
        );
    }

    info!(signals = runtime.signal_count(), "demo finished");
    Ok(())
}
