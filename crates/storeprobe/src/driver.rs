//! Abstract browser automation traits.
//!
//! Page objects never talk to a browser directly. They go through
//! [`BrowserDriver`], which can be backed by a real Chromium over CDP
//! (`browser` feature) or by the in-process mock storefront.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  BrowserDriver (trait object, shared through Session)        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────┐        ┌─────────────────────────┐  │
//! │  │  ChromiumDriver     │        │  MockDriver             │  │
//! │  │  chromiumoxide/CDP  │        │  simulated storefront   │  │
//! │  └─────────────────────┘        └─────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use crate::config::{BrowserKind, Settings};
use crate::locator::Locator;
use crate::result::ProbeResult;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Owned handle to one element found by a driver
pub type Element = Box<dyn ElementHandle>;

/// Element-level operations.
///
/// Implementations return [`crate::ProbeError::StaleElement`] when the element
/// is no longer part of the rendered page.
#[async_trait]
pub trait ElementHandle: Send + Sync + Debug {
    /// Click the element
    async fn click(&self) -> ProbeResult<()>;

    /// Clear an input's current value
    async fn clear(&self) -> ProbeResult<()>;

    /// Type text into the element (appends to the current value)
    async fn send_keys(&self, text: &str) -> ProbeResult<()>;

    /// Rendered text content
    async fn text(&self) -> ProbeResult<String>;

    /// Whether the element is rendered and visible
    async fn is_displayed(&self) -> ProbeResult<bool>;

    /// Whether the element accepts interaction
    async fn is_enabled(&self) -> ProbeResult<bool>;

    /// Choose the `<option>` with the given value on a `<select>`
    async fn select_by_value(&self, value: &str) -> ProbeResult<()>;
}

/// Page-level operations of one browser session.
#[async_trait]
pub trait BrowserDriver: Send + Sync + Debug {
    /// Navigate to URL
    async fn navigate(&self, url: &str) -> ProbeResult<()>;

    /// All elements currently matching `locator`, in document order. Never waits.
    async fn find_elements(&self, locator: &Locator) -> ProbeResult<Vec<Element>>;

    /// Get current URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// Document title
    async fn title(&self) -> ProbeResult<String>;

    /// PNG screenshot of the viewport
    async fn screenshot(&self) -> ProbeResult<Vec<u8>>;

    /// Close the session. Further calls may fail.
    async fn quit(&self) -> ProbeResult<()>;
}

/// Opens a new browser session for one scenario.
#[async_trait]
pub trait DriverFactory: Send + Sync + Debug {
    /// Backend name for logs and reports
    fn name(&self) -> &str;

    /// Launch a driver for an already validated browser kind
    async fn launch(
        &self,
        settings: &Settings,
        browser: BrowserKind,
    ) -> ProbeResult<Arc<dyn BrowserDriver>>;
}
