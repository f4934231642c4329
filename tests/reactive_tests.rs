// Copyright (c) 2025 - Cowboy AI, Inc.
//! Reactive Graph Tests
//!
//! Glitch freedom on diamonds, fold semantics over event sources, failure
//! isolation during propagation, and teardown.

mod fixtures;

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use weft::prelude::*;

use fixtures::plain_runtime;

fn number(value: &Value) -> f64 {
    value.as_number().unwrap_or(f64::NAN)
}

/// Watch `signal`, collecting every value it is observed with
fn observe(rt: &Runtime, signal: SignalId) -> Rc<RefCell<Vec<Value>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    rt.watch(Value::Signal(signal), move |value| {
        log.borrow_mut().push(value.clone());
        Ok(())
    })
    .expect("watch attaches");
    seen
}

fn signal_id(value: Value) -> SignalId {
    value.as_signal().expect("a signal")
}

// ============================================================================
// Diamonds
// ============================================================================

#[test]
fn test_diamond_recomputes_join_once_with_fresh_inputs() {
    let rt = plain_runtime();
    let s = rt.cell(1);
    let a = rt
        .derive(vec![Value::Signal(s)], |v| Ok(Value::from(number(&v[0]) * 2.0)))
        .map(signal_id)
        .unwrap();
    let b = rt
        .derive(vec![Value::Signal(s)], |v| Ok(Value::from(number(&v[0]) + 10.0)))
        .map(signal_id)
        .unwrap();

    let calls = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&calls);
    let c = rt
        .derive(vec![Value::Signal(a), Value::Signal(b)], move |v| {
            let (x, y) = (number(&v[0]), number(&v[1]));
            log.borrow_mut().push((x, y));
            Ok(Value::from(x + y))
        })
        .map(signal_id)
        .unwrap();

    assert_eq!(*calls.borrow(), vec![(2.0, 11.0)]);

    rt.set(s, 5).unwrap();
    assert_eq!(*calls.borrow(), vec![(2.0, 11.0), (10.0, 15.0)]);
    assert_eq!(rt.sample(c).unwrap(), Value::from(25.0));
}

#[test]
fn test_diamond_built_from_programs() {
    let rt = plain_runtime();
    let program = signal::cell(1).and_then(|s| {
        lift2(math::mul(s.clone(), 2), math::add(s.clone(), 10), |a, b| {
            Value::List(vec![a, b])
        })
        .and_then(move |pair| {
            let items = pair.as_list().unwrap_or_default().to_vec();
            math::add(items[0].clone(), items[1].clone())
                .map(move |c| Value::List(vec![s, c]))
        })
    });
    let handles = rt.run(program).unwrap();
    let handles = handles.as_list().unwrap();
    let (s, c) = (signal_id(handles[0].clone()), signal_id(handles[1].clone()));

    let seen = observe(&rt, c);
    let before = rt.inspect(c).unwrap().evaluations;
    rt.set(s, 4).unwrap();

    assert_eq!(rt.inspect(c).unwrap().evaluations, before + 1);
    assert_eq!(*seen.borrow(), vec![Value::from(13.0), Value::from(22.0)]);
}

#[test]
fn test_deeper_branch_does_not_expose_stale_join() {
    let rt = plain_runtime();
    let s = rt.cell(1);
    let short = rt.derive(vec![Value::Signal(s)], |v| Ok(v[0].clone())).map(signal_id).unwrap();
    let mut long = s;
    for _ in 0..5 {
        long = rt.derive(vec![Value::Signal(long)], |v| Ok(v[0].clone())).map(signal_id).unwrap();
    }
    let joined = rt
        .derive(vec![Value::Signal(short), Value::Signal(long)], |v| {
            Ok(Value::from(number(&v[0]) == number(&v[1])))
        })
        .map(signal_id)
        .unwrap();

    let seen = observe(&rt, joined);
    for n in 2..6 {
        rt.set(s, n).unwrap();
    }
    assert!(seen.borrow().iter().all(|v| *v == Value::Bool(true)));
    assert_eq!(seen.borrow().len(), 5);
}

// ============================================================================
// Folds
// ============================================================================

#[test]
fn test_fold_sums_payloads() {
    let rt = plain_runtime();
    let numbers = rt.source("numbers");
    let sum = rt
        .run(events::fold(numbers, 0, |s, e| Value::from(number(s) + number(e))))
        .map(signal_id)
        .unwrap();
    let seen = observe(&rt, sum);

    let mut after_each = Vec::new();
    for payload in [1, 2, 3] {
        rt.fire(numbers, payload).unwrap();
        after_each.push(rt.sample(sum).unwrap());
    }

    assert_eq!(after_each, vec![Value::from(1), Value::from(3), Value::from(6)]);
    assert_eq!(
        *seen.borrow(),
        vec![Value::from(0), Value::from(1), Value::from(3), Value::from(6)]
    );
}

#[test]
fn test_listeners_see_settled_values() {
    let rt = plain_runtime();
    let numbers = rt.source("numbers");
    let sum = rt
        .run(events::fold(numbers, 0, |s, e| Value::from(number(s) + number(e))))
        .map(signal_id)
        .unwrap();
    let doubled = rt.run(math::mul(sum, 2)).map(signal_id).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    rt.listen(numbers, move |rt, payload| {
        log.borrow_mut().push((payload.clone(), rt.sample(sum)?, rt.sample(doubled)?));
        Ok(())
    })
    .unwrap();

    rt.fire(numbers, 1).unwrap();
    rt.fire(numbers, 2).unwrap();
    assert_eq!(
        *seen.borrow(),
        vec![
            (Value::from(1), Value::from(1), Value::from(2)),
            (Value::from(2), Value::from(3), Value::from(6)),
        ]
    );
}

#[test]
fn test_program_listener_runs_after_each_occurrence() {
    let rt = plain_runtime();
    let pings = rt.source("pings");
    let hits = rt.cell(0);
    rt.run(events::listen(pings, move |_| {
        signal::modify(hits, |n| Value::from(number(&n) + 1.0))
    }))
    .unwrap();

    rt.fire(pings, Value::Unit).unwrap();
    rt.fire(pings, Value::Unit).unwrap();
    assert_eq!(rt.sample(hits).unwrap(), Value::from(2.0));
}

#[test]
fn test_fold_m_failure_keeps_previous_value() {
    let rt = plain_runtime();
    let amounts = rt.source("amounts");
    let total = rt
        .run(events::fold_m(amounts, 0, |total, amount| {
            if number(&amount) < 0.0 {
                throw("negative amount")
            } else {
                math::add(total, amount)
            }
        }))
        .map(signal_id)
        .unwrap();

    rt.fire(amounts, 5).unwrap();
    let result = rt.fire(amounts, -1);
    match result {
        Err(RunError::Propagation { failures }) => assert!(matches!(
            failures.as_slice(),
            [RunError::Uncaught(Value::Text(message))] if message == "negative amount"
        )),
        other => panic!("expected a propagation failure, got {other:?}"),
    }
    assert_eq!(rt.sample(total).unwrap(), Value::from(5));

    rt.fire(amounts, 2).unwrap();
    assert_eq!(rt.sample(total).unwrap(), Value::from(7));
}

#[test]
fn test_fold_m_initial_program_runs_once() {
    let rt = plain_runtime();
    let ticks = rt.source("ticks");
    let total = rt
        .run(events::fold_m(ticks, math::add(40, 2), |n, _| math::add(n, 1)))
        .map(signal_id)
        .unwrap();
    assert_eq!(rt.sample(total).unwrap(), Value::from(42));
    rt.fire(ticks, Value::Unit).unwrap();
    assert_eq!(rt.sample(total).unwrap(), Value::from(43));
}

#[test]
fn test_constant_on_resets_after_edits() {
    let rt = plain_runtime();
    let submit = rt.source("submit");
    let field = rt.run(events::constant_on(submit, "")).map(signal_id).unwrap();
    assert_eq!(rt.sample(field).unwrap(), Value::text(""));

    rt.set(field, "draft").unwrap();
    assert_eq!(rt.sample(field).unwrap(), Value::text("draft"));

    let seen = observe(&rt, field);
    rt.fire(submit, Value::Unit).unwrap();
    rt.fire(submit, Value::Unit).unwrap();
    assert_eq!(rt.sample(field).unwrap(), Value::text(""));
    assert_eq!(
        *seen.borrow(),
        vec![Value::text("draft"), Value::text(""), Value::text("")]
    );
}

#[test]
fn test_merged_source_counts_both_inputs() {
    let rt = plain_runtime();
    let left = rt.source("left");
    let right = rt.source("right");
    let either = rt.run(events::merge(left, right)).unwrap();
    let either = either.as_source().unwrap();
    let count = rt
        .run(events::fold(either, 0, |n, _| Value::from(number(n) + 1.0)))
        .map(signal_id)
        .unwrap();

    rt.fire(left, Value::Unit).unwrap();
    rt.fire(right, Value::Unit).unwrap();
    rt.fire(left, Value::Unit).unwrap();

    assert_eq!(rt.sample(count).unwrap(), Value::from(3));
    assert_eq!(rt.occurrences(either).unwrap(), 3);
    assert_eq!(rt.occurrences(left).unwrap(), 2);
}

#[test]
fn test_host_event_without_binding_is_ignored() {
    let rt = plain_runtime();
    let button = MemoryDocument::new().create_element("button", "lonely");
    let delivered = rt.dispatch_event(button, "click", Value::Unit).unwrap();
    assert_eq!(delivered, 0);
}

// ============================================================================
// Cells and Teardown
// ============================================================================

#[test]
fn test_cell_programs() {
    let rt = plain_runtime();
    let program = signal::cell(1).and_then(|s| {
        signal::modify(s.clone(), |n| Value::from(number(&n) * 10.0))
            .then(signal::set(s.clone(), math::add(signal::sample(s.clone()), 5)))
            .then(signal::sample(s))
    });
    assert_eq!(rt.run(program).unwrap(), Value::from(15));
}

#[test]
fn test_teardown_removes_dependents_and_detaches_folds() {
    let rt = plain_runtime();
    let clicks = rt.source("clicks");
    let count = rt
        .run(events::fold(clicks, 0, |n, _| Value::from(number(n) + 1.0)))
        .map(signal_id)
        .unwrap();
    let label = rt
        .run(text::concat("Clicks: ", show::show(count)))
        .map(signal_id)
        .unwrap();
    let seen = observe(&rt, label);
    assert_eq!(rt.subscriber_count(clicks).unwrap(), 1);

    let removed = rt.teardown(count).unwrap();
    // count, show, label and the observer
    assert_eq!(removed, 4);
    assert!(matches!(rt.sample(count), Err(RunError::UnknownSignal(id)) if id == count));
    assert_eq!(rt.subscriber_count(clicks).unwrap(), 0);

    rt.fire(clicks, Value::Unit).unwrap();
    assert_eq!(*seen.borrow(), vec![Value::text("Clicks: 0")]);
    assert_eq!(rt.signal_count(), 0);
}

#[test]
fn test_set_inside_watch_is_queued() {
    let rt = plain_runtime();
    let source = rt.cell(0);
    let mirror = rt.cell(0);
    let writer = rt.clone();
    rt.watch(Value::Signal(source), move |value| {
        writer.set(mirror, value.clone()).map_err(Fault::from)
    })
    .unwrap();
    let seen = observe(&rt, mirror);

    rt.set(source, 7).unwrap();
    assert_eq!(rt.sample(mirror).unwrap(), Value::from(7));
    assert_eq!(*seen.borrow(), vec![Value::from(0), Value::from(7)]);
}

#[test]
fn test_listener_sees_its_own_writes() {
    let rt = plain_runtime();
    let pings = rt.source("pings");
    let hits = rt.cell(0);
    rt.run(events::listen(pings, move |_| {
        signal::modify(hits, |n| Value::from(number(&n) + 1.0))
            .then(signal::modify(hits, |n| Value::from(number(&n) + 1.0)))
    }))
    .unwrap();
    let seen = observe(&rt, hits);

    rt.fire(pings, Value::Unit).unwrap();
    assert_eq!(rt.sample(hits).unwrap(), Value::from(2.0));
    rt.fire(pings, Value::Unit).unwrap();
    assert_eq!(rt.sample(hits).unwrap(), Value::from(4.0));
    // one notification per occurrence, with the final value
    assert_eq!(
        *seen.borrow(),
        vec![Value::from(0), Value::from(2.0), Value::from(4.0)]
    );
}

#[test]
fn test_reducer_reads_back_a_cell_it_wrote() {
    let rt = plain_runtime();
    let ticks = rt.source("ticks");
    let mirror = rt.cell(0);
    let total = rt
        .run(events::fold_m(ticks, 0, move |_, payload| {
            signal::set(mirror, payload).then(signal::sample(mirror))
        }))
        .map(signal_id)
        .unwrap();

    rt.fire(ticks, 7).unwrap();
    assert_eq!(rt.sample(total).unwrap(), Value::from(7));
    assert_eq!(rt.sample(mirror).unwrap(), Value::from(7));
}

#[test]
fn test_fold_m_stores_values_from_reactive_reducers() {
    let rt = plain_runtime();
    let ticks = rt.source("ticks");
    let step = rt.cell(2);
    let total = rt
        .run(events::fold_m(ticks, 0, move |state, _| math::add(state, step)))
        .map(signal_id)
        .unwrap();
    let nodes = rt.signal_count();

    for _ in 0..3 {
        rt.fire(ticks, Value::Unit).unwrap();
    }
    assert_eq!(rt.sample(total).unwrap(), Value::from(6));
    assert_eq!(rt.signal_count(), nodes, "reducer runs leave no nodes behind");

    rt.set(step, 5).unwrap();
    assert_eq!(rt.sample(total).unwrap(), Value::from(6), "state is a value, not a derivation");
    rt.fire(ticks, Value::Unit).unwrap();
    assert_eq!(rt.sample(total).unwrap(), Value::from(11));
}
