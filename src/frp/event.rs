// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event sources and their subscribers
//!
//! An event source is a named stream of discrete occurrences. Sources have
//! no value of their own; subscribers turn occurrences into state:
//!
//! - `Fold` applies a pure reducer and writes the result into a cell
//! - `FoldM` runs a reducer program and writes its result into a cell
//! - `Listener` reacts to the occurrence after the graph has settled
//! - `Forward` re-delivers the occurrence to another source (merge)
//!
//! ```text
//! Time: ────────────────────────────→
//! click:      ●       ●   ●
//! fold(+1): 0 ─ 1 ─── 2 ─ 3 ──────→
//! ```
//!
//! Host events reach sources through bindings keyed by element and event
//! name; `Runtime::dispatch_event` looks the bindings up.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::errors::{Fault, RunError, RunResult};
use crate::program::Program;
use crate::runtime::Runtime;
use crate::value::{ElementId, SignalId, SourceId, Value};

pub(crate) type PureReducer = Rc<dyn Fn(&Value, &Value) -> Result<Value, Fault>>;
pub(crate) type ProgramReducer = Rc<dyn Fn(Value, Value) -> Program>;
pub(crate) type Listener = Rc<dyn Fn(&Runtime, &Value) -> Result<(), Fault>>;

#[derive(Clone)]
pub(crate) enum Subscriber {
    Fold { target: SignalId, reducer: PureReducer },
    FoldM { target: SignalId, reducer: ProgramReducer },
    Listener(Listener),
    Forward(SourceId),
}

impl Subscriber {
    fn target(&self) -> Option<SignalId> {
        match self {
            Subscriber::Fold { target, .. } | Subscriber::FoldM { target, .. } => Some(*target),
            _ => None,
        }
    }
}

struct SourceSlot {
    name: String,
    subscribers: Vec<Subscriber>,
    occurrences: u64,
}

/// Registry of event sources
#[derive(Default)]
pub struct EventHub {
    sources: Vec<SourceSlot>,
    bindings: HashMap<(ElementId, String), Vec<SourceId>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn create(&mut self, name: impl Into<String>) -> SourceId {
        let id = SourceId(self.sources.len());
        self.sources.push(SourceSlot {
            name: name.into(),
            subscribers: Vec::new(),
            occurrences: 0,
        });
        id
    }

    fn slot(&self, id: SourceId) -> RunResult<&SourceSlot> {
        self.sources.get(id.0).ok_or(RunError::UnknownSource(id))
    }

    fn slot_mut(&mut self, id: SourceId) -> RunResult<&mut SourceSlot> {
        self.sources.get_mut(id.0).ok_or(RunError::UnknownSource(id))
    }

    pub(crate) fn subscribe(&mut self, source: SourceId, subscriber: Subscriber) -> RunResult<()> {
        self.slot_mut(source)?.subscribers.push(subscriber);
        Ok(())
    }

    /// Route host events named `event` on `element` to `source`
    pub(crate) fn bind(&mut self, element: ElementId, event: &str, source: SourceId) {
        self.bindings
            .entry((element, event.to_string()))
            .or_default()
            .push(source);
    }

    pub(crate) fn bound(&self, element: ElementId, event: &str) -> Vec<SourceId> {
        self.bindings
            .get(&(element, event.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Subscribers reached by one occurrence on `source`, in subscription order
    ///
    /// Forwarded sources are expanded in place; a source reached twice is
    /// only expanded the first time.
    pub(crate) fn deliver(&mut self, source: SourceId) -> RunResult<Vec<Subscriber>> {
        self.slot(source)?;
        let mut visited = HashSet::new();
        let mut out = Vec::new();
        self.expand(source, &mut visited, &mut out);
        for id in &visited {
            if let Ok(slot) = self.slot_mut(*id) {
                slot.occurrences += 1;
            }
        }
        Ok(out)
    }

    fn expand(&self, source: SourceId, visited: &mut HashSet<SourceId>, out: &mut Vec<Subscriber>) {
        if !visited.insert(source) {
            return;
        }
        let Ok(slot) = self.slot(source) else { return };
        for subscriber in &slot.subscribers {
            match subscriber {
                Subscriber::Forward(next) => self.expand(*next, visited, out),
                other => out.push(other.clone()),
            }
        }
    }

    /// Drop fold subscriptions whose cells were torn down
    pub(crate) fn detach(&mut self, removed: &[SignalId]) {
        for slot in &mut self.sources {
            slot.subscribers
                .retain(|s| s.target().map_or(true, |t| !removed.contains(&t)));
        }
    }

    pub fn name(&self, source: SourceId) -> RunResult<&str> {
        Ok(&self.slot(source)?.name)
    }

    pub fn subscriber_count(&self, source: SourceId) -> RunResult<usize> {
        Ok(self.slot(source)?.subscribers.len())
    }

    /// Occurrences delivered to `source`, directly or through a merge
    pub fn occurrences(&self, source: SourceId) -> RunResult<u64> {
        Ok(self.slot(source)?.occurrences)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
