// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Propagation
//!
//! Builds random acyclic graphs of summing nodes over a few cells, applies
//! random writes, and checks after each write that:
//!
//! - every node holds the value a from-scratch evaluation gives
//! - every node downstream of the written cell was computed exactly once
//! - every other node was not computed at all

use std::collections::BTreeSet;

use proptest::prelude::*;
use weft::prelude::*;

/// Node `i` sums the nodes listed in `operands[i]`, all with lower indices
#[derive(Debug, Clone)]
struct Shape {
    cells: usize,
    operands: Vec<Vec<usize>>,
}

fn shapes() -> impl Strategy<Value = Shape> {
    (1usize..4, 1usize..12).prop_flat_map(|(cells, derived)| {
        let nodes = (0..derived)
            .map(move |i| prop::collection::vec(0..cells + i, 1..4))
            .collect::<Vec<_>>();
        nodes.prop_map(move |picks: Vec<Vec<usize>>| Shape {
            cells,
            operands: picks
                .into_iter()
                .map(|pick| pick.into_iter().collect::<BTreeSet<_>>().into_iter().collect())
                .collect(),
        })
    })
}

fn sum(values: &[Value]) -> Result<Value, Fault> {
    Ok(Value::from(values.iter().filter_map(Value::as_number).sum::<f64>()))
}

/// Values of every node computed directly from the cell values
fn evaluate(shape: &Shape, cells: &[f64]) -> Vec<f64> {
    let mut values = cells.to_vec();
    for operands in &shape.operands {
        let total = operands.iter().map(|i| values[*i]).sum();
        values.push(total);
    }
    values
}

/// Whether node `target` depends on node `source`
fn depends_on(shape: &Shape, target: usize, source: usize) -> bool {
    if target == source {
        return true;
    }
    if target < shape.cells {
        return false;
    }
    shape.operands[target - shape.cells]
        .iter()
        .any(|operand| depends_on(shape, *operand, source))
}

fn build(rt: &Runtime, shape: &Shape) -> Vec<SignalId> {
    let mut ids: Vec<SignalId> = (0..shape.cells).map(|_| rt.cell(0)).collect();
    for operands in &shape.operands {
        let inputs = operands.iter().map(|i| Value::Signal(ids[*i])).collect();
        let id = rt
            .derive(inputs, sum)
            .expect("summing cannot fail")
            .as_signal()
            .expect("signal operands yield a signal");
        ids.push(id);
    }
    ids
}

fn write_batches() -> impl Strategy<Value = Vec<(usize, i32)>> {
    prop::collection::vec((0usize..3, -20i32..20), 1..8)
}

proptest! {
    #[test]
    fn prop_every_node_is_current_and_computed_once(shape in shapes(), writes in write_batches()) {
        let rt = Runtime::new(Dispatcher::builder().build());
        let ids = build(&rt, &shape);
        let mut cells = vec![0.0; shape.cells];

        for (cell, value) in writes {
            let cell = cell % shape.cells;
            cells[cell] = f64::from(value);

            let before: Vec<u64> = ids
                .iter()
                .map(|id| rt.inspect(*id).map(|node| node.evaluations))
                .collect::<Result<_, _>>()?;
            rt.set(ids[cell], value)?;

            let expected = evaluate(&shape, &cells);
            for (index, id) in ids.iter().enumerate().skip(shape.cells) {
                let node = rt.inspect(*id)?;
                prop_assert_eq!(node.value, Value::from(expected[index]));

                let computed = node.evaluations - before[index];
                let affected = depends_on(&shape, index, cell);
                prop_assert_eq!(computed, u64::from(affected), "node {} after writing cell {}", index, cell);
            }
        }
    }

    #[test]
    fn prop_ranks_exceed_every_upstream_rank(shape in shapes()) {
        let rt = Runtime::new(Dispatcher::builder().build());
        for id in build(&rt, &shape) {
            let node = rt.inspect(id)?;
            for upstream in node.upstream {
                prop_assert!(rt.inspect(upstream)?.rank < node.rank);
            }
        }
    }

    #[test]
    fn prop_teardown_removes_exactly_the_dependents(shape in shapes(), root in 0usize..3) {
        let rt = Runtime::new(Dispatcher::builder().build());
        let ids = build(&rt, &shape);
        let root = root % shape.cells;

        let removed = rt.teardown(ids[root])?;
        let expected: Vec<usize> = (0..ids.len())
            .filter(|index| depends_on(&shape, *index, root))
            .collect();
        prop_assert_eq!(removed, expected.len());

        for (index, id) in ids.iter().enumerate() {
            let gone = matches!(rt.inspect(*id), Err(RunError::UnknownSignal(_)));
            prop_assert_eq!(gone, expected.contains(&index));
        }
    }
}
