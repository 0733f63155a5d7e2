//! Result and error types for storeprobe.

use thiserror::Error;

/// Result type for storeprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving the storefront
#[derive(Debug, Error)]
pub enum ProbeError {
    /// An explicit wait never saw its condition hold
    #[error("Timed out after {ms}ms waiting for {target} {condition}")]
    Timeout {
        /// What was polled (a locator or the page URL)
        target: String,
        /// Human-readable condition description
        condition: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Element handle no longer attached to the rendered page
    #[error("Stale element: {locator}")]
    StaleElement {
        /// Locator the element was found with
        locator: String,
    },

    /// Generic driver failure
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Configured browser is not supported by any backend
    #[error("Browser '{name}' not supported!")]
    UnsupportedBrowser {
        /// Browser name as configured
        name: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Dropdown has no option with the requested value
    #[error("Cannot locate option with value: {value}")]
    NoSuchOption {
        /// Requested option value
        value: String,
    },

    /// Invalid state error (page object used on the wrong page)
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Assertion failed inside a scenario
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Whether this error came from an explicit wait running out of time
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether this error means the element went away between lookup and use
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::StaleElement { .. })
    }
}
