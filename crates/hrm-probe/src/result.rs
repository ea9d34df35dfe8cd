//! Result and error types for hrm-probe.

use thiserror::Error;

/// Result type for hrm-probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving the application under test
#[derive(Debug, Error)]
pub enum ProbeError {
    /// A wait condition was not met before its deadline
    #[error("Timed out after {elapsed_ms}ms waiting for {target} to be {condition}")]
    WaitTimeout {
        /// What was being waited on (locator, page, url)
        target: String,
        /// Condition that never held
        condition: String,
        /// Time spent waiting
        elapsed_ms: u64,
    },

    /// A click, type or select could not be performed
    #[error("{action} failed on {target}: {message}")]
    ActionFailure {
        /// Action name
        action: String,
        /// Element description
        target: String,
        /// Error message
        message: String,
    },

    /// HTTP response status differs from the expected one
    #[error("Expected status {expected}, but got {actual}: {body}")]
    UnexpectedStatus {
        /// Expected status code
        expected: u16,
        /// Actual status code
        actual: u16,
        /// Response body rendered as text
        body: String,
    },

    /// Required configuration value is absent
    #[error("Missing required configuration: {key}")]
    ConfigMissing {
        /// Configuration key
        key: String,
    },

    /// Configuration value could not be parsed
    #[error("Invalid value for {key}: {value:?}")]
    ConfigInvalid {
        /// Configuration key
        key: String,
        /// Raw value
        value: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Browser launch or protocol error
    #[error("Browser error: {message}")]
    Browser {
        /// Error message
        message: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Data a scenario depends on does not exist in the environment
    #[error("Prerequisite missing: {what}")]
    PrerequisiteMissing {
        /// Description of the missing data
        what: String,
    },

    /// Caller supplied an argument outside the accepted range
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// Scenario exceeded the overall test timeout
    #[error("Scenario {name:?} exceeded {ms}ms")]
    ScenarioTimeout {
        /// Scenario name
        name: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProbeError {
    /// Shorthand for an [`ProbeError::ActionFailure`]
    pub fn action(action: &str, target: impl ToString, message: impl Into<String>) -> Self {
        Self::ActionFailure {
            action: action.to_string(),
            target: target.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for an [`ProbeError::AssertionFailed`]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Whether this error is a wait deadline expiring
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::WaitTimeout { .. } | Self::ScenarioTimeout { .. })
    }

    /// Whether the scenario should be reported as skipped rather than failed
    #[must_use]
    pub const fn is_skip(&self) -> bool {
        matches!(self, Self::PrerequisiteMissing { .. })
    }
}
