// Copyright (c) 2025 - Cowboy AI, Inc.
//! Signaled failures: throw, catch, require
//!
//! A raised failure skips every continuation between the `throw` and the
//! nearest enclosing `catch`. Without one, the run ends with
//! `RunError::Uncaught` carrying the payload.

use super::{Head, Program};
use crate::value::Value;

/// Raise a failure carrying `payload`
pub fn throw(payload: impl Into<Value>) -> Program {
    Program {
        head: Head::Throw(payload.into()),
        queue: Default::default(),
    }
}

/// Run `body`; if it raises, resolve the failure with `handler`
///
/// The handler is invoked at most once, with the raised payload. A body that
/// finishes normally passes its value through unchanged.
pub fn catch<F>(body: Program, handler: F) -> Program
where
    F: FnOnce(Value) -> Program + 'static,
{
    Program {
        head: Head::Catch {
            body: Box::new(body),
            handler: Box::new(handler),
        },
        queue: Default::default(),
    }
}

/// Lift a host outcome: success continues, failure raises its payload
pub fn require(outcome: Result<Value, Value>) -> Program {
    match outcome {
        Ok(value) => Program::pure(value),
        Err(payload) => throw(payload),
    }
}

/// Like [`require`], but an empty failure payload is replaced by `message`
pub fn require_or(outcome: Result<Value, Value>, message: impl Into<String>) -> Program {
    match outcome {
        Ok(value) => Program::pure(value),
        Err(Value::Unit) => throw(Value::Text(message.into())),
        Err(Value::Text(s)) if s.is_empty() => throw(Value::Text(message.into())),
        Err(payload) => throw(payload),
    }
}

/// Run `program`, which yields an `ok`/`err` record, and require it
///
/// A value that is not an outcome record passes through unchanged.
pub fn require_outcome(program: Program) -> Program {
    program.and_then(|value| match value.clone().into_outcome() {
        Some(outcome) => require(outcome),
        None => Program::pure(value),
    })
}

/// Transform the payload of any failure `program` raises
pub fn map_error<F>(program: Program, f: F) -> Program
where
    F: FnOnce(Value) -> Value + 'static,
{
    catch(program, move |payload| throw(f(payload)))
}

/// Replace any failure with `fallback`
pub fn or_else(program: Program, fallback: impl Into<Value>) -> Program {
    let fallback = fallback.into();
    catch(program, move |_| Program::pure(fallback))
}

/// Replace any failure with the result of `alternative`
pub fn recover_with(program: Program, alternative: Program) -> Program {
    catch(program, move |_| alternative)
}
