//! Config types for tailwatch.
//!
//! Defines structures for parsing and representing configuration files.

use serde::Deserialize;
use std::time::Duration;

use crate::worker::{
    WorkerOptions, DEFAULT_MAX_LINES, DEFAULT_MAX_READ_FAILURES, DEFAULT_POLL_INTERVAL,
};

/// Keys accepted in a config file, used for typo suggestions.
pub const KNOWN_FIELDS: &[&str] = &["max_lines", "poll_interval_ms", "max_read_failures", "watch"];

/// Raw config file structure (used for parsing).
///
/// Every key is optional so a project file can override a single value
/// from the global file. Unknown fields are rejected with an error.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    /// Number of trailing lines to keep.
    pub max_lines: Option<usize>,
    /// Wait between cycles in milliseconds.
    pub poll_interval_ms: Option<u64>,
    /// Consecutive failed reads before a tail is abandoned.
    pub max_read_failures: Option<u32>,
    /// Use filesystem notifications to wake up early.
    pub watch: Option<bool>,
}

/// Effective configuration after merging global, project and CLI values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub max_lines: usize,
    pub poll_interval_ms: u64,
    pub max_read_failures: u32,
    pub watch: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_lines: DEFAULT_MAX_LINES,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            max_read_failures: DEFAULT_MAX_READ_FAILURES,
            watch: true,
        }
    }
}

impl Config {
    /// Overlay the values present in `raw`.
    pub fn merge(&mut self, raw: &RawConfig) {
        if let Some(max_lines) = raw.max_lines {
            self.max_lines = max_lines;
        }
        if let Some(poll_interval_ms) = raw.poll_interval_ms {
            self.poll_interval_ms = poll_interval_ms;
        }
        if let Some(max_read_failures) = raw.max_read_failures {
            self.max_read_failures = max_read_failures;
        }
        if let Some(watch) = raw.watch {
            self.watch = watch;
        }
    }

    pub fn worker_options(&self) -> WorkerOptions {
        WorkerOptions {
            max_lines: self.max_lines,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_read_failures: self.max_read_failures,
            watch: self.watch,
        }
    }
}
