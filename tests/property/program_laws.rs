// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Program Composition
//!
//! Two programs are equivalent when, run against identical recording
//! dispatchers, they produce the same result and the handlers see the same
//! calls in the same order.

use proptest::prelude::*;
use weft::prelude::*;

use crate::fixtures::{record, record_plus, recording_runtime};

// ============================================================================
// Helpers
// ============================================================================

/// Result and handler calls of one run
fn observe(program: Program) -> (Result<Value, String>, Vec<f64>) {
    let (rt, log) = recording_runtime();
    let result = rt.run(program).map_err(|err| err.to_string());
    let calls = log.borrow().clone();
    (result, calls)
}

/// A program performing one recorded call per offset, threading results
fn recorded_chain(offsets: &[f64]) -> Program {
    offsets.iter().fold(Program::pure(0.0), |program, offset| {
        program.and_then(record_plus(*offset))
    })
}

fn offsets() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((-50i32..50).prop_map(f64::from), 0..8)
}

fn offset() -> impl Strategy<Value = f64> {
    (-50i32..50).prop_map(f64::from)
}

// ============================================================================
// Monad Laws
// ============================================================================

proptest! {
    /// pure(a).and_then(f) behaves as f(a)
    #[test]
    fn prop_left_identity(a in offset(), k in offset()) {
        let f = record_plus(k);
        let left = observe(Program::pure(a).and_then(f.clone()));
        let right = observe(f(Value::from(a)));
        prop_assert_eq!(left, right);
    }

    /// m.and_then(pure) behaves as m
    #[test]
    fn prop_right_identity(ops in offsets()) {
        let left = observe(recorded_chain(&ops).and_then(|value| Program::pure(value)));
        let right = observe(recorded_chain(&ops));
        prop_assert_eq!(left, right);
    }

    /// (m >>= f) >>= g behaves as m >>= (x => f(x) >>= g)
    #[test]
    fn prop_associativity(ops in offsets(), k1 in offset(), k2 in offset()) {
        let (f, g) = (record_plus(k1), record_plus(k2));
        let left = observe(recorded_chain(&ops).and_then(f.clone()).and_then(g.clone()));
        let right = observe(recorded_chain(&ops).and_then(move |x| f(x).and_then(g)));
        prop_assert_eq!(left, right);
    }

    /// Nesting the same steps to the left or to the right changes nothing
    #[test]
    fn prop_nesting_direction_is_irrelevant(ops in offsets()) {
        fn nest_right(ops: Vec<f64>) -> Program {
            fn go(mut rest: std::vec::IntoIter<f64>, acc: Value) -> Program {
                match rest.next() {
                    Some(offset) => record_plus(offset)(acc).and_then(move |next| go(rest, next)),
                    None => Program::pure(acc),
                }
            }
            go(ops.into_iter(), Value::from(0.0))
        }
        let left = observe(recorded_chain(&ops));
        let right = observe(nest_right(ops));
        prop_assert_eq!(left, right);
    }
}

// ============================================================================
// Failure Laws
// ============================================================================

proptest! {
    /// A raised failure skips every continuation after it
    #[test]
    fn prop_throw_short_circuits(ops in offsets(), payload in "[a-z]{1,8}") {
        let program = throw(payload.as_str()).and_then(|_| recorded_chain(&[1.0, 2.0]));
        let caught = catch(program, |payload| Program::pure(payload));
        let (result, calls) = observe(recorded_chain(&ops).then(caught));
        prop_assert_eq!(result, Ok(Value::from(payload.as_str())));
        prop_assert_eq!(calls.len(), ops.len());
    }

    /// Catching a program that does not fail is the identity
    #[test]
    fn prop_catch_of_success_is_identity(ops in offsets()) {
        let left = observe(catch(recorded_chain(&ops), |_| record(-1.0)));
        let right = observe(recorded_chain(&ops));
        prop_assert_eq!(left, right);
    }

    /// `sequence` runs every program once, in order, and collects results
    #[test]
    fn prop_sequence_preserves_order(ns in prop::collection::vec(offset(), 0..16)) {
        let (result, calls) = observe(sequence(ns.iter().map(|n| record(*n))));
        let expected: Vec<Value> = ns.iter().map(|n| Value::from(n + 1.0)).collect();
        prop_assert_eq!(result, Ok(Value::List(expected)));
        prop_assert_eq!(calls, ns);
    }
}
