// Copyright (c) 2025 - Cowboy AI, Inc.
//! Runtime - runs programs against a dispatcher and owns the reactive state
//!
//! The runtime is a cheap handle (`Rc` inside). Handlers receive it so they
//! can create signals, subscribe to sources and run nested programs.
//!
//! # Changes
//!
//! Every externally triggered change (a [`Runtime::fire`] or a
//! [`Runtime::set`]) is settled as one batch:
//!
//! 1. fold reducers of the source run in subscription order and write
//!    their cells,
//! 2. one propagation pass recomputes every affected derived node exactly
//!    once, in rank order, then runs affected watches,
//! 3. listeners run with the payload.
//!
//! Changes requested while a batch is settling are queued and settled
//! after it, in request order. A cell written during a batch takes its new
//! value at once, so the rest of the running program reads it back; only
//! the propagation of that write waits for the queue. A failing computation
//! keeps its node's previous value; the rest of the pass continues and the
//! failures are reported together.
//!
//! Programs run in reaction to an occurrence (effectful fold reducers and
//! program listeners) are transient: their result is read to a plain value
//! and every node they created is removed once they finish.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::config::RuntimeConfig;
use crate::dispatch::Dispatcher;
use crate::errors::{Fault, RunError, RunResult};
use crate::frp::event::{EventHub, Subscriber};
use crate::frp::graph::{Graph, NodeInfo, NodeKind};
use crate::program::Program;
use crate::value::{ElementId, SignalId, SourceId, Value};

#[derive(PartialEq)]
enum Change {
    Fire(SourceId, Value),
    /// A cell was written; its dependents are not yet recomputed
    Written(SignalId),
}

struct Inner {
    dispatcher: Dispatcher,
    config: RuntimeConfig,
    graph: RefCell<Graph>,
    hub: RefCell<EventHub>,
    settling: Cell<bool>,
    queued: RefCell<VecDeque<Change>>,
}

/// Handle to an interpreter and its reactive graph
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<Inner>,
}

impl Runtime {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self::with_config(dispatcher, RuntimeConfig::default())
    }

    pub fn with_config(dispatcher: Dispatcher, config: RuntimeConfig) -> Self {
        Self {
            inner: Rc::new(Inner {
                dispatcher,
                config,
                graph: RefCell::new(Graph::new()),
                hub: RefCell::new(EventHub::new()),
                settling: Cell::new(false),
                queued: RefCell::new(VecDeque::new()),
            }),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    /// Interpret `program` to completion
    ///
    /// # Errors
    ///
    /// Unknown tags, shape mismatches, handler aborts, and failures that
    /// escape every `catch` (as `RunError::Uncaught`).
    pub fn run(&self, program: Program) -> RunResult<Value> {
        program.run_configured(&self.inner.config, |instr| {
            self.inner.dispatcher.dispatch(self, instr)
        })
    }

    // ---------------------------------------------------------------
    // Signals
    // ---------------------------------------------------------------

    /// Current value of a signal
    pub fn sample(&self, id: SignalId) -> RunResult<Value> {
        self.inner.graph.borrow().value(id).cloned()
    }

    /// Replace signal handles in `value` with their current values
    pub fn read(&self, value: &Value) -> RunResult<Value> {
        self.inner.graph.borrow().resolve(value)
    }

    /// Compute `compute(operands)`, reactively when any operand is a signal
    ///
    /// With no signal among the operands the result is returned directly.
    /// Otherwise a derived node is created, computed once now, and a
    /// `Value::Signal` handle to it is returned; the node is recomputed
    /// whenever an input changes.
    pub fn derive<F>(&self, operands: Vec<Value>, compute: F) -> Result<Value, Fault>
    where
        F: Fn(&[Value]) -> Result<Value, Fault> + 'static,
    {
        let mut upstream = Vec::new();
        for operand in &operands {
            operand.collect_signals(&mut upstream);
        }
        if upstream.is_empty() {
            return compute(&operands);
        }

        let id = self.inner.graph.borrow_mut().insert(
            NodeKind::Derived {
                operands,
                compute: Rc::new(compute),
            },
            upstream,
        )?;
        if let Err(fault) = self.evaluate(id) {
            self.inner.graph.borrow_mut().remove(id)?;
            return Err(fault);
        }
        trace!(signal = %id, "derived signal created");
        Ok(Value::Signal(id))
    }

    /// Run `effect` with the resolved `input` now, and again on every change
    ///
    /// Returns the watch node's id when `input` is reactive.
    pub fn watch<F>(&self, input: Value, effect: F) -> Result<Option<SignalId>, Fault>
    where
        F: Fn(&Value) -> Result<(), Fault> + 'static,
    {
        if !input.is_reactive() {
            effect(&input)?;
            return Ok(None);
        }
        let mut upstream = Vec::new();
        input.collect_signals(&mut upstream);

        let id = self.inner.graph.borrow_mut().insert(
            NodeKind::Watch {
                input,
                effect: Rc::new(effect),
            },
            upstream,
        )?;
        if let Err(fault) = self.evaluate(id) {
            self.inner.graph.borrow_mut().remove(id)?;
            return Err(fault);
        }
        Ok(Some(id))
    }

    /// A writable signal
    pub fn cell(&self, initial: impl Into<Value>) -> SignalId {
        self.inner.graph.borrow_mut().insert_cell(initial.into())
    }

    /// Write a cell and settle everything downstream of it
    ///
    /// Called while another change is settling, the value is stored now and
    /// the recomputation of its dependents is queued.
    pub fn set(&self, cell: SignalId, value: impl Into<Value>) -> RunResult<()> {
        {
            let mut graph = self.inner.graph.borrow_mut();
            if !graph.is_cell(cell)? {
                return Err(RunError::NotWritable(cell));
            }
            graph.settle(cell, value.into())?;
        }
        self.settle(Change::Written(cell))
    }

    /// Remove a signal and everything that depends on it
    ///
    /// Fold subscriptions writing into removed cells are detached. Returns
    /// the number of nodes removed.
    pub fn teardown(&self, id: SignalId) -> RunResult<usize> {
        let removed = self.inner.graph.borrow_mut().remove(id)?;
        self.inner.hub.borrow_mut().detach(&removed);
        debug!(signal = %id, removed = removed.len(), "signal torn down");
        Ok(removed.len())
    }

    pub fn inspect(&self, id: SignalId) -> RunResult<NodeInfo> {
        self.inner.graph.borrow().inspect(id)
    }

    /// Number of live signals
    pub fn signal_count(&self) -> usize {
        self.inner.graph.borrow().len()
    }

    // ---------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------

    /// A source fired only by [`fire`](Self::fire)
    pub fn source(&self, name: impl Into<String>) -> SourceId {
        self.inner.hub.borrow_mut().create(name)
    }

    /// A source fired by host events named `event` on `element`
    pub fn on(&self, element: ElementId, event: &str) -> SourceId {
        let mut hub = self.inner.hub.borrow_mut();
        let id = hub.create(format!("{event}@{element}"));
        hub.bind(element, event, id);
        id
    }

    /// Deliver a host event to every source bound to it
    ///
    /// Returns how many sources received it.
    pub fn dispatch_event(&self, element: ElementId, event: &str, payload: impl Into<Value>) -> RunResult<usize> {
        let sources = self.inner.hub.borrow().bound(element, event);
        if sources.is_empty() {
            trace!(%element, event, "no source bound");
            return Ok(0);
        }
        let payload = payload.into();
        let mut failures = Vec::new();
        for source in &sources {
            match self.fire(*source, payload.clone()) {
                Ok(()) => {}
                Err(RunError::Propagation { failures: inner }) => failures.extend(inner),
                Err(err) => failures.push(err),
            }
        }
        into_result(failures).map(|_| sources.len())
    }

    /// A cell folded over the occurrences of `source`
    ///
    /// Holds `initial` until the first occurrence, then
    /// `reducer(previous, payload)` after each.
    pub fn fold<F>(&self, source: SourceId, initial: impl Into<Value>, reducer: F) -> RunResult<SignalId>
    where
        F: Fn(&Value, &Value) -> Result<Value, Fault> + 'static,
    {
        self.inner.hub.borrow().name(source)?;
        let target = self.cell(initial);
        self.inner.hub.borrow_mut().subscribe(
            source,
            Subscriber::Fold {
                target,
                reducer: Rc::new(reducer),
            },
        )?;
        debug!(%source, signal = %target, "fold attached");
        Ok(target)
    }

    /// A cell folded with an effectful reducer
    ///
    /// `initial` is run once, now. On each occurrence the program returned
    /// by `reducer(previous, payload)` is run and its result stored. A run
    /// that fails leaves the cell unchanged.
    pub fn fold_m<F>(&self, source: SourceId, initial: Program, reducer: F) -> RunResult<SignalId>
    where
        F: Fn(Value, Value) -> Program + 'static,
    {
        self.inner.hub.borrow().name(source)?;
        let seed = self.run_reaction(initial)?;
        let target = self.cell(seed);
        self.inner.hub.borrow_mut().subscribe(
            source,
            Subscriber::FoldM {
                target,
                reducer: Rc::new(reducer),
            },
        )?;
        debug!(%source, signal = %target, "effectful fold attached");
        Ok(target)
    }

    /// A cell that holds `value` and is reset to it on every occurrence
    pub fn constant_on(&self, source: SourceId, value: impl Into<Value>) -> RunResult<SignalId> {
        let value = value.into();
        let reset = value.clone();
        self.fold(source, value, move |_, _| Ok(reset.clone()))
    }

    /// Run `listener` with each payload, after the graph has settled
    pub fn listen<F>(&self, source: SourceId, listener: F) -> RunResult<()>
    where
        F: Fn(&Runtime, &Value) -> Result<(), Fault> + 'static,
    {
        self.inner
            .hub
            .borrow_mut()
            .subscribe(source, Subscriber::Listener(Rc::new(listener)))
    }

    /// A source that fires whenever `left` or `right` fires
    pub fn merge(&self, left: SourceId, right: SourceId) -> RunResult<SourceId> {
        let mut hub = self.inner.hub.borrow_mut();
        let name = format!("{} | {}", hub.name(left)?, hub.name(right)?);
        let merged = hub.create(name);
        hub.subscribe(left, Subscriber::Forward(merged))?;
        hub.subscribe(right, Subscriber::Forward(merged))?;
        Ok(merged)
    }

    /// Deliver one occurrence to `source` and settle the consequences
    ///
    /// Called while another change is settling, the occurrence is queued
    /// and `Ok(())` is returned immediately.
    pub fn fire(&self, source: SourceId, payload: impl Into<Value>) -> RunResult<()> {
        self.inner.hub.borrow().name(source)?;
        self.settle(Change::Fire(source, payload.into()))
    }

    /// Occurrences delivered to `source` so far
    pub fn occurrences(&self, source: SourceId) -> RunResult<u64> {
        self.inner.hub.borrow().occurrences(source)
    }

    pub fn subscriber_count(&self, source: SourceId) -> RunResult<usize> {
        self.inner.hub.borrow().subscriber_count(source)
    }

    // ---------------------------------------------------------------
    // Settling
    // ---------------------------------------------------------------

    /// Run a program reacting to an occurrence
    ///
    /// The result is read to a plain value. Nodes created during the run are
    /// removed afterwards, whether it succeeded or not.
    pub(crate) fn run_reaction(&self, program: Program) -> RunResult<Value> {
        let mark = self.inner.graph.borrow().mark();
        let outcome = self.run(program).and_then(|value| self.read(&value));
        self.discard_since(mark)?;
        outcome
    }

    fn discard_since(&self, mark: usize) -> RunResult<()> {
        let created = self.inner.graph.borrow().created_since(mark);
        for id in created {
            if !self.inner.graph.borrow().contains(id) {
                continue;
            }
            let removed = self.inner.graph.borrow_mut().remove(id)?;
            self.inner.hub.borrow_mut().detach(&removed);
            trace!(signal = %id, removed = removed.len(), "transient nodes discarded");
        }
        Ok(())
    }

    fn settle(&self, change: Change) -> RunResult<()> {
        if self.inner.settling.get() {
            let mut queued = self.inner.queued.borrow_mut();
            if matches!(change, Change::Written(_)) && queued.contains(&change) {
                return Ok(());
            }
            trace!("change queued behind the current batch");
            queued.push_back(change);
            return Ok(());
        }

        self.inner.settling.set(true);
        let mut failures = Vec::new();
        let mut next = Some(change);
        while let Some(change) = next {
            failures.extend(self.apply(change));
            next = self.inner.queued.borrow_mut().pop_front();
        }
        self.inner.settling.set(false);

        if !failures.is_empty() {
            warn!(count = failures.len(), "change settled with failures");
        }
        into_result(failures)
    }

    fn apply(&self, change: Change) -> Vec<RunError> {
        match change {
            Change::Written(cell) => self.propagate(&[cell]),
            Change::Fire(source, payload) => self.deliver(source, payload),
        }
    }

    fn deliver(&self, source: SourceId, payload: Value) -> Vec<RunError> {
        let subscribers = match self.inner.hub.borrow_mut().deliver(source) {
            Ok(subscribers) => subscribers,
            Err(err) => return vec![err],
        };
        trace!(%source, subscribers = subscribers.len(), "delivering occurrence");

        let mut failures = Vec::new();
        let mut written = Vec::new();
        let mut listeners = Vec::new();

        for subscriber in subscribers {
            let (target, next) = match subscriber {
                Subscriber::Fold { target, reducer } => {
                    let next = self
                        .sample(target)
                        .map_err(Fault::Abort)
                        .and_then(|current| reducer(&current, &payload))
                        .map_err(Fault::into_run_error)
                        .and_then(|value| self.read(&value));
                    (target, next)
                }
                Subscriber::FoldM { target, reducer } => {
                    let next = self
                        .sample(target)
                        .and_then(|current| self.run_reaction(reducer(current, payload.clone())));
                    (target, next)
                }
                Subscriber::Listener(listener) => {
                    listeners.push(listener);
                    continue;
                }
                Subscriber::Forward(_) => continue,
            };
            match next.and_then(|value| self.inner.graph.borrow_mut().settle(target, value)) {
                Ok(()) => {
                    if !written.contains(&target) {
                        written.push(target);
                    }
                }
                Err(err) => {
                    debug!(signal = %target, error = %err, "reducer failed; keeping previous value");
                    failures.push(err);
                }
            }
        }

        failures.extend(self.propagate(&written));

        for listener in listeners {
            if let Err(fault) = listener(self, &payload) {
                failures.push(fault.into_run_error());
            }
        }
        failures
    }

    /// Recompute everything downstream of `roots`, each node once
    ///
    /// Derived nodes are recomputed first, in rank order; watches run after
    /// every derived value is current.
    fn propagate(&self, roots: &[SignalId]) -> Vec<RunError> {
        if roots.is_empty() {
            return Vec::new();
        }
        let plan = self.inner.graph.borrow().plan(roots);
        let (watches, derived): (Vec<SignalId>, Vec<SignalId>) = {
            let graph = self.inner.graph.borrow();
            plan.into_iter()
                .partition(|id| graph.is_watch(*id).unwrap_or(false))
        };
        trace!(roots = roots.len(), derived = derived.len(), watches = watches.len(), "propagating");

        let mut failures = Vec::new();
        for id in derived.into_iter().chain(watches) {
            if !self.inner.graph.borrow().contains(id) {
                continue;
            }
            if let Err(fault) = self.evaluate(id) {
                let err = fault.into_run_error();
                debug!(signal = %id, error = %err, "recomputation failed; keeping previous value");
                failures.push(err);
            }
        }
        failures
    }

    /// Compute a derived or watch node from the current values of its inputs
    fn evaluate(&self, id: SignalId) -> Result<(), Fault> {
        let kind = self.inner.graph.borrow().kind(id)?;
        match kind {
            NodeKind::Cell => Ok(()),
            NodeKind::Derived { operands, compute } => {
                let resolved = {
                    let graph = self.inner.graph.borrow();
                    operands
                        .iter()
                        .map(|operand| graph.resolve(operand))
                        .collect::<RunResult<Vec<_>>>()?
                };
                let value = compute(&resolved)?;
                self.inner.graph.borrow_mut().settle(id, value)?;
                Ok(())
            }
            NodeKind::Watch { input, effect } => {
                let resolved = self.read(&input)?;
                effect(&resolved)?;
                self.inner.graph.borrow_mut().settle(id, Value::Unit)?;
                Ok(())
            }
        }
    }
}

fn into_result(failures: Vec<RunError>) -> RunResult<()> {
    if failures.is_empty() {
        Ok(())
    } else {
        Err(RunError::Propagation { failures })
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.inner.config)
            .field("signals", &self.signal_count())
            .field("sources", &self.inner.hub.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn runtime() -> Runtime {
        Runtime::new(Dispatcher::builder().build())
    }

    fn add(values: &[Value]) -> Result<Value, Fault> {
        let sum = values.iter().filter_map(Value::as_number).sum::<f64>();
        Ok(Value::from(sum))
    }

    #[test]
    fn test_derive_without_signals_is_direct() {
        let rt = runtime();
        let value = rt.derive(vec![Value::from(1), Value::from(2)], add).unwrap();
        assert_eq!(value, Value::from(3));
        assert_eq!(rt.signal_count(), 0);
    }

    #[test]
    fn test_derive_tracks_cell() {
        let rt = runtime();
        let s = rt.cell(1);
        let sum = rt.derive(vec![Value::Signal(s), Value::from(10)], add).unwrap();
        let id = sum.as_signal().unwrap();

        assert_eq!(rt.sample(id).unwrap(), Value::from(11));
        rt.set(s, 5).unwrap();
        assert_eq!(rt.sample(id).unwrap(), Value::from(15));
    }

    #[test]
    fn test_derived_nodes_are_not_writable() {
        let rt = runtime();
        let s = rt.cell(1);
        let d = rt.derive(vec![Value::Signal(s)], add).unwrap().as_signal().unwrap();
        assert!(matches!(rt.set(d, 3), Err(RunError::NotWritable(id)) if id == d));
    }

    #[test]
    fn test_failed_recompute_keeps_previous_value() {
        let rt = runtime();
        let s = rt.cell(1);
        let d = rt
            .derive(vec![Value::Signal(s)], |values| match values[0].as_number() {
                Some(n) if n >= 0.0 => Ok(Value::from(n.sqrt())),
                _ => Err(Fault::raise("negative")),
            })
            .unwrap()
            .as_signal()
            .unwrap();

        match rt.set(s, -4) {
            Err(RunError::Propagation { failures }) => {
                assert!(matches!(failures.as_slice(), [RunError::Uncaught(Value::Text(t))] if t == "negative"));
            }
            other => panic!("expected a propagation failure, got {other:?}"),
        }
        assert_eq!(rt.sample(d).unwrap(), Value::from(1));
        rt.set(s, 9).unwrap();
        assert_eq!(rt.sample(d).unwrap(), Value::from(3));
    }

    #[test]
    fn test_watch_runs_now_and_on_change() {
        let rt = runtime();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = rt.cell("a");
        let log = Rc::clone(&seen);
        rt.watch(Value::Signal(s), move |v| {
            log.borrow_mut().push(v.to_string());
            Ok(())
        })
        .unwrap();

        rt.set(s, "b").unwrap();
        assert_eq!(*seen.borrow(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_listener_fire_is_queued_until_batch_settles() {
        let rt = runtime();
        let first = rt.source("first");
        let second = rt.source("second");
        let order = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&order);
        rt.listen(first, move |rt, _| {
            log.borrow_mut().push("first:start");
            rt.fire(second, Value::Unit)?;
            log.borrow_mut().push("first:end");
            Ok(())
        })
        .unwrap();
        let log = Rc::clone(&order);
        rt.listen(second, move |_, _| {
            log.borrow_mut().push("second");
            Ok(())
        })
        .unwrap();

        rt.fire(first, Value::Unit).unwrap();
        assert_eq!(*order.borrow(), vec!["first:start", "first:end", "second"]);
    }

    #[test]
    fn test_unknown_source() {
        let rt = runtime();
        assert!(matches!(
            rt.fire(SourceId(3), Value::Unit),
            Err(RunError::UnknownSource(_))
        ));
    }
}
