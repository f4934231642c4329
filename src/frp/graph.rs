// Copyright (c) 2025 - Cowboy AI, Inc.
//! Dependency graph of reactive nodes
//!
//! Nodes live in an arena indexed by [`SignalId`]. Slots are never reused, so
//! a torn-down id stays invalid forever.
//!
//! Every node carries a *rank*: sources have rank 0 and a derived node sits
//! one above its highest-ranked input. Edges only ever point from lower to
//! higher rank, which makes the graph acyclic by construction and lets a
//! change be settled by visiting the affected nodes in `(rank, id)` order:
//!
//! ```text
//!         s (0)              set(s)
//!        /     \             plan = [a, b, c]
//!    a (1)     b (1)         a, b see the new s
//!        \     /             c runs once, after both
//!         c (2)
//! ```

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::errors::{Fault, RunError, RunResult};
use crate::value::{SignalId, Value};

/// Pure recomputation of a derived node from its resolved operands
pub(crate) type Compute = Rc<dyn Fn(&[Value]) -> Result<Value, Fault>>;

/// Side effect run with the resolved input of a watch node
pub(crate) type Effect = Rc<dyn Fn(&Value) -> Result<(), Fault>>;

/// Whether a node has produced its first value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    Uninitialized,
    Settled,
}

#[derive(Clone)]
pub(crate) enum NodeKind {
    /// Written from outside: cells, folds, constant_on
    Cell,
    Derived {
        operands: Vec<Value>,
        compute: Compute,
    },
    Watch {
        input: Value,
        effect: Effect,
    },
}

impl NodeKind {
    fn label(&self) -> &'static str {
        match self {
            NodeKind::Cell => "cell",
            NodeKind::Derived { .. } => "derived",
            NodeKind::Watch { .. } => "watch",
        }
    }
}

struct Node {
    kind: NodeKind,
    value: Value,
    state: NodeState,
    rank: usize,
    upstream: Vec<SignalId>,
    downstream: Vec<SignalId>,
    evaluations: u64,
}

/// Snapshot of a node, for diagnostics and tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: SignalId,
    pub kind: String,
    pub state: NodeState,
    pub rank: usize,
    pub value: Value,
    pub upstream: Vec<SignalId>,
    pub downstream: Vec<SignalId>,
    /// Times the node's value has been written or recomputed
    pub evaluations: u64,
}

/// Arena of reactive nodes
#[derive(Default)]
pub struct Graph {
    nodes: Vec<Option<Node>>,
    live: usize,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn contains(&self, id: SignalId) -> bool {
        matches!(self.nodes.get(id.0), Some(Some(_)))
    }

    /// Position the next inserted node will take
    pub(crate) fn mark(&self) -> usize {
        self.nodes.len()
    }

    /// Live nodes inserted at or after `mark`, in ascending order
    pub(crate) fn created_since(&self, mark: usize) -> Vec<SignalId> {
        (mark..self.nodes.len())
            .map(SignalId)
            .filter(|id| self.contains(*id))
            .collect()
    }

    fn node(&self, id: SignalId) -> RunResult<&Node> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(RunError::UnknownSignal(id))
    }

    fn node_mut(&mut self, id: SignalId) -> RunResult<&mut Node> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(RunError::UnknownSignal(id))
    }

    /// Add a node depending on `upstream`
    ///
    /// The node starts `Uninitialized`; its first value is written by the
    /// caller once computed.
    pub(crate) fn insert(&mut self, kind: NodeKind, upstream: Vec<SignalId>) -> RunResult<SignalId> {
        let mut rank = 0;
        for parent in &upstream {
            rank = rank.max(self.node(*parent)?.rank + 1);
        }

        let id = SignalId(self.nodes.len());
        for parent in &upstream {
            self.node_mut(*parent)?.downstream.push(id);
        }
        self.nodes.push(Some(Node {
            kind,
            value: Value::Unit,
            state: NodeState::Uninitialized,
            rank,
            upstream,
            downstream: Vec::new(),
            evaluations: 0,
        }));
        self.live += 1;
        Ok(id)
    }

    /// Add a settled cell holding `value`
    pub(crate) fn insert_cell(&mut self, value: Value) -> SignalId {
        let id = SignalId(self.nodes.len());
        self.nodes.push(Some(Node {
            kind: NodeKind::Cell,
            value,
            state: NodeState::Settled,
            rank: 0,
            upstream: Vec::new(),
            downstream: Vec::new(),
            evaluations: 1,
        }));
        self.live += 1;
        id
    }

    /// Store a freshly computed or written value
    pub(crate) fn settle(&mut self, id: SignalId, value: Value) -> RunResult<()> {
        let node = self.node_mut(id)?;
        node.value = value;
        node.state = NodeState::Settled;
        node.evaluations += 1;
        Ok(())
    }

    pub fn value(&self, id: SignalId) -> RunResult<&Value> {
        Ok(&self.node(id)?.value)
    }

    pub fn state(&self, id: SignalId) -> RunResult<NodeState> {
        Ok(self.node(id)?.state)
    }

    pub(crate) fn kind(&self, id: SignalId) -> RunResult<NodeKind> {
        Ok(self.node(id)?.kind.clone())
    }

    pub(crate) fn is_cell(&self, id: SignalId) -> RunResult<bool> {
        Ok(matches!(self.node(id)?.kind, NodeKind::Cell))
    }

    pub(crate) fn is_watch(&self, id: SignalId) -> RunResult<bool> {
        Ok(matches!(self.node(id)?.kind, NodeKind::Watch { .. }))
    }

    /// Replace signal handles by the current values of their nodes
    ///
    /// Lists and records are resolved element-wise. A signal's value is taken
    /// as stored; handles nested inside it are not chased.
    pub fn resolve(&self, value: &Value) -> RunResult<Value> {
        match value {
            Value::Signal(id) => Ok(self.node(*id)?.value.clone()),
            Value::List(items) => items
                .iter()
                .map(|item| self.resolve(item))
                .collect::<RunResult<Vec<_>>>()
                .map(Value::List),
            Value::Record(fields) => fields
                .iter()
                .map(|(k, v)| Ok((k.clone(), self.resolve(v)?)))
                .collect::<RunResult<_>>()
                .map(Value::Record),
            other => Ok(other.clone()),
        }
    }

    /// Every node transitively downstream of `roots`, each once, in `(rank, id)` order
    pub(crate) fn plan(&self, roots: &[SignalId]) -> Vec<SignalId> {
        let mut seen: HashSet<SignalId> = roots.iter().copied().collect();
        let mut work: Vec<SignalId> = roots.to_vec();
        let mut affected = Vec::new();

        while let Some(id) = work.pop() {
            let Ok(node) = self.node(id) else { continue };
            for child in &node.downstream {
                if seen.insert(*child) {
                    affected.push(*child);
                    work.push(*child);
                }
            }
        }

        affected.sort_by_key(|id| (self.node(*id).map(|n| n.rank).unwrap_or(usize::MAX), *id));
        affected
    }

    /// Remove `id` and everything downstream of it
    ///
    /// Returns the removed ids in ascending order.
    pub(crate) fn remove(&mut self, id: SignalId) -> RunResult<Vec<SignalId>> {
        self.node(id)?;
        let mut removed = self.plan(&[id]);
        removed.push(id);
        removed.sort();

        let doomed: HashSet<SignalId> = removed.iter().copied().collect();
        for victim in &removed {
            let upstream = self.node(*victim).map(|n| n.upstream.clone()).unwrap_or_default();
            for parent in upstream {
                if doomed.contains(&parent) {
                    continue;
                }
                if let Ok(node) = self.node_mut(parent) {
                    node.downstream.retain(|child| child != victim);
                }
            }
        }
        for victim in &removed {
            if let Some(slot) = self.nodes.get_mut(victim.0) {
                *slot = None;
            }
        }
        self.live -= removed.len();
        Ok(removed)
    }

    pub fn inspect(&self, id: SignalId) -> RunResult<NodeInfo> {
        let node = self.node(id)?;
        Ok(NodeInfo {
            id,
            kind: node.kind.label().to_string(),
            state: node.state,
            rank: node.rank,
            value: node.value.clone(),
            upstream: node.upstream.clone(),
            downstream: node.downstream.clone(),
            evaluations: node.evaluations,
        })
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("live", &self.live)
            .field("slots", &self.nodes.len())
            .finish()
    }
}
