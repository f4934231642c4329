// Copyright (c) 2025 - Cowboy AI, Inc.
//! Functional Reactive Programming (FRP) engine
//!
//! Time-varying values are modelled with two kinds of things:
//!
//! ## Signals (continuous)
//!
//! A signal always has a current value. Cells are written from outside;
//! derived signals are recomputed from their inputs.
//!
//! ```text
//! Time: ────────────────────────────→
//! Value:  ≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈≈
//! ```
//!
//! ## Event sources (discrete)
//!
//! A source has occurrences at specific moments and no value in between.
//! Folding a source produces a signal.
//!
//! ```text
//! Time: ────────────────────────────→
//! Value:      ●       ●   ●       ●
//! ```
//!
//! # Consistency
//!
//! Propagation is glitch-free: when a change settles, every derived signal
//! is recomputed at most once, after all of its inputs are current. A
//! diamond `s → {a, b} → c` recomputes `c` once, with both new inputs.
//!
//! # Usage
//!
//! ```rust,ignore
//! use weft::frp::combinators::*;
//!
//! let clicks = on("click", button);
//! let count = fold(clicks, 0.0, |n, _| Value::from(n.as_number().unwrap_or(0.0) + 1.0));
//! let label = text::concat("Clicks: ", show::show(count));
//! ```

pub mod combinators;
pub mod event;
pub mod graph;
pub mod signal;

pub use combinators::EventPlugin;
pub use event::EventHub;
pub use graph::{Graph, NodeInfo, NodeState};
pub use signal::SignalPlugin;
