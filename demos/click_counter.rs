// Copyright (c) 2025 - Cowboy AI, Inc.
//! Click counter, step by step
//!
//! Shows what the runtime builds for a three-node pipeline
//! (`fold → show → concat`) and how a click settles through it.
//!
//! Run with: cargo run --example click_counter

use anyhow::Result;
use weft::prelude::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let document = MemoryDocument::shared();
    let button = document.borrow_mut().create_element("button", "increment");
    let runtime = Runtime::new(
        Dispatcher::standard()
            .plugin(DomPlugin::new(document.clone()))
            .build(),
    );

    let clicks = runtime.on(button, "click");
    let program = events::fold(clicks, 0.0, |count, _| {
        Value::from(count.as_number().unwrap_or(0.0) + 1.0)
    })
    .and_then(|count| {
        text::concat("Clicks: ", show::show(count.clone()))
            .map(move |label| Value::List(vec![count, label]))
    });

    let handles = runtime.run(program)?;
    let signals: Vec<SignalId> = handles
        .as_list()
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_signal)
        .collect();

    for _ in 0..2 {
        runtime.dispatch_event(button, "click", Value::Unit)?;
    }

    for id in signals {
        let node = runtime.inspect(id)?;
        println!(
            "{id}: {} rank={} value={:?} evaluations={}",
            node.kind, node.rank, node.value, node.evaluations
        );
    }
    Ok(())
}
