//! Assertions for scenario scripts.
//!
//! Scenarios return [`ProbeResult`], so a failed check is an error value
//! rather than a panic:
//!
//! ```rust,ignore
//! Assertion::equals(&"Products", &title.as_str()).check()?;
//! Assertion::is_true(products.is_cart_badge_displayed().await?, "badge should appear").check()?;
//! ```

use crate::result::{ProbeError, ProbeResult};
use std::fmt::Debug;

/// Result of an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Prefix the failure message with what was being checked
    #[must_use]
    pub fn context(mut self, context: &str) -> Self {
        if !self.passed {
            self.message = format!("{context}: {}", self.message);
        }
        self
    }

    /// `Err(AssertionFailed)` if the assertion failed
    pub fn check(self) -> ProbeResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(ProbeError::assertion(self.message))
        }
    }
}

/// Assertion helpers for scenarios
#[derive(Debug)]
pub struct Assertion;

impl Assertion {
    /// Assert two values are equal
    #[must_use]
    pub fn equals<T: PartialEq + Debug + ?Sized>(expected: &T, actual: &T) -> AssertionResult {
        if expected == actual {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected {expected:?}, got {actual:?}"))
        }
    }

    /// Assert a string contains a substring
    #[must_use]
    pub fn contains(haystack: &str, needle: &str) -> AssertionResult {
        if haystack.contains(needle) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected '{haystack}' to contain '{needle}'"))
        }
    }

    /// Assert a condition is true
    #[must_use]
    pub fn is_true(condition: bool, message: &str) -> AssertionResult {
        if condition {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(message)
        }
    }

    /// Assert a condition is false
    #[must_use]
    pub fn is_false(condition: bool, message: &str) -> AssertionResult {
        if condition {
            AssertionResult::fail(message)
        } else {
            AssertionResult::pass()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equals() {
        assert!(Assertion::equals(&3, &3).passed);
        let failed = Assertion::equals("Products", "Your Cart");
        assert!(!failed.passed);
        assert_eq!(failed.message, "expected \"Products\", got \"Your Cart\"");
    }

    #[test]
    fn test_contains() {
        assert!(Assertion::contains("Epic sadface: Username is required", "Username is required").passed);
        assert!(!Assertion::contains("Total: $32.39", "Thank you").passed);
    }

    #[test]
    fn test_bool_checks() {
        assert!(Assertion::is_true(true, "x").passed);
        assert!(Assertion::is_false(false, "x").passed);
        assert_eq!(Assertion::is_false(true, "badge visible").message, "badge visible");
    }

    #[test]
    fn test_check_maps_to_error() {
        assert!(AssertionResult::pass().check().is_ok());
        let err = Assertion::is_true(false, "cart should be empty")
            .context("remove all")
            .check()
            .unwrap_err();
        assert_eq!(err.to_string(), "Assertion failed: remove all: cart should be empty");
    }

    #[test]
    fn test_context_leaves_passes_alone() {
        assert_eq!(AssertionResult::pass().context("x"), AssertionResult::pass());
    }
}
