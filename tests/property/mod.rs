// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! - `program_laws`: identity and associativity of `and_then`, compared by
//!   the calls handlers observed
//! - `propagation`: every derived node is current and computed once per change

mod program_laws;
mod propagation;
