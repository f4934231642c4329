// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack-safe interpretation loop
//!
//! Continuation queues are never concatenated. When a continuation returns a
//! program with its own queue, that queue is pushed onto a stack of queues and
//! drained first, so every continuation is moved exactly once and a run costs
//! time proportional to the number of steps.
//!
//! `catch` frames snapshot the continuation stack. When the body finishes the
//! snapshot is restored; when the body raises, the handler runs against the
//! snapshot instead.

use std::collections::VecDeque;

use tracing::{debug, trace};

use super::{Continuation, Head, Program};
use crate::config::RuntimeConfig;
use crate::errors::{Fault, RunError, RunResult};
use crate::instruction::Instruction;
use crate::value::Value;

#[derive(Default)]
struct QueueStack {
    current: VecDeque<Continuation>,
    pending: Vec<VecDeque<Continuation>>,
}

impl QueueStack {
    fn push(&mut self, queue: VecDeque<Continuation>) {
        if queue.is_empty() {
            return;
        }
        let previous = std::mem::replace(&mut self.current, queue);
        if !previous.is_empty() {
            self.pending.push(previous);
        }
    }

    fn pop(&mut self) -> Option<Continuation> {
        loop {
            if let Some(next) = self.current.pop_front() {
                return Some(next);
            }
            self.current = self.pending.pop()?;
        }
    }
}

struct CatchFrame {
    handler: Continuation,
    saved: QueueStack,
}

enum Outcome {
    Resume(Value),
    Raise(Value),
}

impl Program {
    /// Run the program, answering every instruction with `interpret`
    ///
    /// Uses the default [`RuntimeConfig`]: no step limit.
    ///
    /// # Errors
    ///
    /// Returns `RunError::Uncaught` when a raised failure escapes every
    /// `catch`, or the fatal error `interpret` aborted with.
    pub fn run_with<F>(self, interpret: F) -> RunResult<Value>
    where
        F: FnMut(Instruction) -> Result<Value, Fault>,
    {
        self.run_configured(&RuntimeConfig::default(), interpret)
    }

    /// Run the program under `config`
    pub fn run_configured<F>(self, config: &RuntimeConfig, mut interpret: F) -> RunResult<Value>
    where
        F: FnMut(Instruction) -> Result<Value, Fault>,
    {
        let mut stack = QueueStack::default();
        let mut catches: Vec<CatchFrame> = Vec::new();
        let mut current = self;
        let mut steps: u64 = 0;

        loop {
            steps += 1;
            if let Some(limit) = config.step_limit {
                if steps > limit {
                    debug!(limit, "step limit reached");
                    return Err(RunError::StepLimit(limit));
                }
            }

            let Program { head, queue } = current;
            stack.push(queue);

            let outcome = match head {
                Head::Pure(value) => Outcome::Resume(value),
                Head::Throw(payload) => Outcome::Raise(payload),
                Head::Catch { body, handler } => {
                    catches.push(CatchFrame {
                        handler,
                        saved: std::mem::take(&mut stack),
                    });
                    current = *body;
                    continue;
                }
                Head::Instr(mut instr) => {
                    if let Some((slot, operand)) = instr.take_pending() {
                        let resume: Continuation = Box::new(move |value| {
                            instr.fill(slot, value);
                            Program::lift(instr)
                        });
                        stack.push(VecDeque::from([resume]));
                        current = operand;
                        continue;
                    }
                    if config.trace_steps {
                        trace!(step = steps, tag = %instr.tag(), "dispatching instruction");
                    }
                    match interpret(instr) {
                        Ok(value) => Outcome::Resume(value),
                        Err(Fault::Raise(payload)) => Outcome::Raise(payload),
                        Err(Fault::Abort(err)) => return Err(err),
                    }
                }
            };

            current = match outcome {
                Outcome::Resume(value) => match stack.pop() {
                    Some(next) => next(value),
                    None => match catches.pop() {
                        Some(frame) => {
                            stack = frame.saved;
                            Program::pure(value)
                        }
                        None => {
                            trace!(steps, "program finished");
                            return Ok(value);
                        }
                    },
                },
                Outcome::Raise(payload) => match catches.pop() {
                    Some(frame) => {
                        stack = frame.saved;
                        (frame.handler)(payload)
                    }
                    None => {
                        debug!(steps, %payload, "failure escaped every handler");
                        return Err(RunError::Uncaught(payload));
                    }
                },
            };
        }
    }
}
