// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for running programs and propagating changes
//!
//! Two channels are kept apart:
//!
//! - [`RunError`] is fatal. It aborts `run` (or a firing) and is never
//!   intercepted by a program's own `catch`.
//! - [`Fault`] is what handlers and reactive computations return. A
//!   [`Fault::Raise`] is a signaled failure that travels as data until a
//!   `catch` resolves it; a [`Fault::Abort`] wraps a fatal [`RunError`].

use thiserror::Error;

use crate::instruction::Tag;
use crate::value::{SignalId, SourceId, Value, ValueKind};

/// Errors that abort execution
#[derive(Debug, Error)]
pub enum RunError {
    /// No handler is registered for the instruction's tag
    #[error("no handler registered for instruction `{0}`")]
    UnknownTag(Tag),

    /// A handler asked for an operand the instruction does not carry
    #[error("instruction `{tag}` is missing operand `{operand}`")]
    MissingOperand {
        /// Instruction tag
        tag: Tag,
        /// Operand name
        operand: String,
    },

    /// An operand did not have the shape the handler requires
    #[error("operand `{operand}` of `{tag}` must be {expected}, found {found}")]
    OperandType {
        /// Instruction tag
        tag: Tag,
        /// Operand name
        operand: String,
        /// Required shape
        expected: String,
        /// Actual shape
        found: String,
    },

    /// A nested program operand reached a handler unevaluated
    #[error("operand `{operand}` of `{tag}` reached its handler unevaluated")]
    UnresolvedOperand {
        /// Instruction tag
        tag: Tag,
        /// Operand name
        operand: String,
    },

    /// A handler produced a value that does not match the declared result
    #[error("`{tag}` declares a {expected} result but its handler produced {found}")]
    ResultShape {
        /// Instruction tag
        tag: Tag,
        /// Declared result shape
        expected: ValueKind,
        /// Shape actually produced
        found: ValueKind,
    },

    /// A signaled failure that no `catch` resolved
    #[error("uncaught failure: {0}")]
    Uncaught(Value),

    /// The signal was never created or has been torn down
    #[error("unknown signal {0}")]
    UnknownSignal(SignalId),

    /// The event source was never created
    #[error("unknown event source {0}")]
    UnknownSource(SourceId),

    /// Only cells accept external writes
    #[error("{0} is derived and cannot be written directly")]
    NotWritable(SignalId),

    /// A pure fold reducer tried to perform an effect
    #[error("pure reducer requested `{0}`; effectful reducers belong in fold_m")]
    ImpureReducer(Tag),

    /// The configured step budget ran out
    #[error("program exceeded the step limit of {0}")]
    StepLimit(u64),

    /// The host rejected an operation
    #[error("host error: {0}")]
    Host(String),

    /// Failures collected while settling one externally triggered change
    #[error("{} failure(s) while propagating a change", .failures.len())]
    Propagation {
        /// Every failure, in the order it occurred
        failures: Vec<RunError>,
    },
}

/// Result type for running programs
pub type RunResult<T> = Result<T, RunError>;

/// Outcome of a handler or a reactive computation that did not produce a value
#[derive(Debug, Error)]
pub enum Fault {
    /// Signaled, catchable failure carrying a payload
    #[error("raised: {0}")]
    Raise(Value),

    /// Fatal failure
    #[error(transparent)]
    Abort(RunError),
}

impl Fault {
    /// Signal a catchable failure
    pub fn raise(payload: impl Into<Value>) -> Self {
        Fault::Raise(payload.into())
    }

    /// Collapse into the fatal channel, turning a raise into `Uncaught`
    pub fn into_run_error(self) -> RunError {
        match self {
            Fault::Raise(payload) => RunError::Uncaught(payload),
            Fault::Abort(err) => err,
        }
    }
}

impl From<RunError> for Fault {
    fn from(err: RunError) -> Self {
        match err {
            // An uncaught failure from a nested run is still a signaled failure.
            RunError::Uncaught(payload) => Fault::Raise(payload),
            other => Fault::Abort(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncaught_round_trips_through_fault() {
        let fault = Fault::from(RunError::Uncaught(Value::text("boom")));
        assert!(matches!(fault, Fault::Raise(Value::Text(ref s)) if s == "boom"));

        let err = fault.into_run_error();
        assert!(matches!(err, RunError::Uncaught(Value::Text(ref s)) if s == "boom"));
    }

    #[test]
    fn test_fatal_errors_stay_fatal() {
        let fault = Fault::from(RunError::StepLimit(10));
        assert!(matches!(fault, Fault::Abort(RunError::StepLimit(10))));
    }

    #[test]
    fn test_propagation_message_counts_failures() {
        let err = RunError::Propagation {
            failures: vec![RunError::StepLimit(1), RunError::Host("gone".into())],
        };
        assert_eq!(err.to_string(), "2 failure(s) while propagating a change");
    }
}
