//! Result and error types for todo-probar.
//!
//! Two failure classes exist in a journey run. Assertion mismatches never
//! surface here: they are recorded as defects by the scenario driver. This
//! module covers the other class, faults of the browser-automation capability
//! itself, plus lookups that failed to resolve an element.

use thiserror::Error;

/// Result type for todo-probar operations
pub type ProbarResult<T> = Result<T, ProbarError>;

/// Errors that can occur while driving the application under test
#[derive(Debug, Error)]
pub enum ProbarError {
    /// Browser executable not found
    #[error("Browser not found. Install Chromium or set CHROMIUM_PATH")]
    BrowserNotFound,

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// No element matched the selector
    #[error("No such element: {selector}")]
    ElementNotFound {
        /// Human-readable selector description
        selector: String,
    },

    /// The handle refers to a node that is no longer attached to the page
    #[error("Stale element handle #{node}")]
    StaleElement {
        /// Backend node reference
        node: u64,
    },

    /// A backend command (read, click, type) failed
    #[error("Browser command failed: {message}")]
    CommandFailed {
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was being waited for
        waited_for: String,
    },

    /// Invalid harness configuration
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbarError {
    /// Create an element-not-found error
    #[must_use]
    pub fn not_found(selector: impl Into<String>) -> Self {
        Self::ElementNotFound {
            selector: selector.into(),
        }
    }

    /// Create a command failure from any displayable backend error
    #[must_use]
    pub fn command(message: impl std::fmt::Display) -> Self {
        Self::CommandFailed {
            message: message.to_string(),
        }
    }

    /// Whether this error only invalidates the current check.
    ///
    /// Locate failures are scoped to a single check; everything else ends the run.
    #[must_use]
    pub const fn is_locate_failure(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. } | Self::StaleElement { .. })
    }
}
