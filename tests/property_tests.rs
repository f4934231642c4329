// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Entry Point
//!
//! This test suite uses proptest to verify the laws programs obey and the
//! guarantees the reactive graph gives for all valid inputs.

mod fixtures;
mod property;
