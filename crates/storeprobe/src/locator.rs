//! Locators: how page objects find elements in the rendered page.
//!
//! A locator is a (strategy, value) pair. Page objects declare theirs as
//! `const` items; the only runtime-built locators are the product buttons whose
//! ids embed a slug of the product name.

use std::borrow::Cow;
use std::fmt;

/// Lookup strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum By {
    /// Match the `id` attribute exactly
    Id,
    /// Match one entry of the `class` attribute
    ClassName,
    /// Raw CSS selector
    Css,
}

impl By {
    /// Short name used in log lines and error messages
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::ClassName => "class",
            Self::Css => "css",
        }
    }
}

/// An immutable element locator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    by: By,
    value: Cow<'static, str>,
}

impl Locator {
    /// Locate by element id
    #[must_use]
    pub const fn id(value: &'static str) -> Self {
        Self {
            by: By::Id,
            value: Cow::Borrowed(value),
        }
    }

    /// Locate by class name
    #[must_use]
    pub const fn class_name(value: &'static str) -> Self {
        Self {
            by: By::ClassName,
            value: Cow::Borrowed(value),
        }
    }

    /// Locate by CSS selector
    #[must_use]
    pub const fn css(value: &'static str) -> Self {
        Self {
            by: By::Css,
            value: Cow::Borrowed(value),
        }
    }

    /// Build a locator whose value is only known at runtime
    #[must_use]
    pub fn dynamic(by: By, value: impl Into<String>) -> Self {
        Self {
            by,
            value: Cow::Owned(value.into()),
        }
    }

    /// Lookup strategy
    #[must_use]
    pub const fn by(&self) -> By {
        self.by
    }

    /// Raw locator value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Render as a CSS selector for backends that only speak CSS.
    ///
    /// Ids and class names with characters outside `[A-Za-z0-9_-]` fall back
    /// to quoted attribute selectors, so slugs like
    /// `add-to-cart-test.allthethings()-t-shirt-(red)` stay valid.
    #[must_use]
    pub fn to_css(&self) -> String {
        match self.by {
            By::Id if is_plain_ident(&self.value) => format!("#{}", self.value),
            By::Id => format!("[id=\"{}\"]", escape_css_string(&self.value)),
            By::ClassName if is_plain_ident(&self.value) => format!(".{}", self.value),
            By::ClassName => format!("[class~=\"{}\"]", escape_css_string(&self.value)),
            By::Css => self.value.to_string(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.by.as_str(), self.value)
    }
}

/// Convert a product name into the slug the storefront embeds in button ids.
///
/// Slugs pass through unchanged, so callers may hand in either form.
#[must_use]
pub fn product_slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

fn is_plain_ident(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with(|c: char| c.is_ascii_digit())
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn escape_css_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
