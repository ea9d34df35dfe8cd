//! Leveled, timestamped logging on top of `tracing`.
//!
//! [`init`] installs the global subscriber once per process. [`Logger`] is a
//! cheap, cloneable handle that page objects and the harness receive by
//! injection; it tags every event with its scope and adds the step and
//! assertion markers used by scenario scripts.

use crate::result::ProbeError;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Parse from a config value; anything but `json` is text
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Returns `false` when a
/// subscriber was already installed (tests call this repeatedly).
pub fn init(level: &str, format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.is_ok()
}

/// Scoped logging handle
#[derive(Debug, Clone)]
pub struct Logger {
    scope: Arc<str>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new("hrm-probe")
    }
}

impl Logger {
    /// Create a logger for a scope
    #[must_use]
    pub fn new(scope: &str) -> Self {
        Self {
            scope: Arc::from(scope),
        }
    }

    /// Derive a child logger (`parent::child`)
    #[must_use]
    pub fn scoped(&self, child: &str) -> Self {
        Self::new(&format!("{}::{child}", self.scope))
    }

    /// Scope name
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!(scope = %self.scope, "{message}");
    }

    pub fn info(&self, message: &str) {
        tracing::info!(scope = %self.scope, "{message}");
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(scope = %self.scope, "{message}");
    }

    pub fn error(&self, message: &str) {
        tracing::error!(scope = %self.scope, "{message}");
    }

    /// Log an operation failure with the underlying error attached
    pub fn failure(&self, operation: &str, err: &ProbeError) {
        tracing::error!(scope = %self.scope, error = %err, "{operation} failed");
    }

    /// Step marker: `STEP: name - details`
    pub fn step(&self, name: &str, details: Option<&str>) {
        tracing::info!(scope = %self.scope, "{}", step_message(name, details));
    }

    /// Assertion marker: `ASSERTION: description - PASSED|FAILED`
    pub fn assertion(&self, description: &str, passed: bool) {
        let message = assertion_message(description, passed);
        if passed {
            tracing::info!(scope = %self.scope, "{message}");
        } else {
            tracing::error!(scope = %self.scope, "{message}");
        }
    }
}

pub(crate) fn step_message(name: &str, details: Option<&str>) -> String {
    match details {
        Some(details) if !details.is_empty() => format!("STEP: {name} - {details}"),
        _ => format!("STEP: {name}"),
    }
}

pub(crate) fn assertion_message(description: &str, passed: bool) -> String {
    let status = if passed { "PASSED" } else { "FAILED" };
    format!("ASSERTION: {description} - {status}")
}
