// Copyright (c) 2025 - Cowboy AI, Inc.
//! Runtime configuration

use tracing::warn;

/// Environment variable holding the step limit
pub const STEP_LIMIT_ENV: &str = "WEFT_STEP_LIMIT";
/// Environment variable toggling result-shape checks
pub const CHECK_RESULTS_ENV: &str = "WEFT_CHECK_RESULTS";

/// Settings for a [`Runtime`](crate::runtime::Runtime)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Abort a run after this many interpretation steps
    pub step_limit: Option<u64>,

    /// Verify handler results against each instruction's declared shape
    pub check_results: bool,

    /// Emit a `trace!` event for every dispatched instruction
    pub trace_steps: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            step_limit: None,
            check_results: true,
            trace_steps: false,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `WEFT_STEP_LIMIT` and `WEFT_CHECK_RESULTS`
    ///
    /// Unparseable values are reported and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(STEP_LIMIT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(limit) => config.step_limit = Some(limit),
                Err(e) => warn!(value = %raw, error = %e, "ignoring {}", STEP_LIMIT_ENV),
            }
        }

        if let Some(raw) = lookup(CHECK_RESULTS_ENV) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.check_results = true,
                "0" | "false" | "no" | "off" => config.check_results = false,
                _ => warn!(value = %raw, "ignoring {}", CHECK_RESULTS_ENV),
            }
        }

        config
    }

    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    pub fn with_check_results(mut self, check: bool) -> Self {
        self.check_results = check;
        self
    }

    pub fn with_trace_steps(mut self, trace: bool) -> Self {
        self.trace_steps = trace;
        self
    }
}
