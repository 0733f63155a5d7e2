//! Storeprobe: page-object browser tests for the Swag Labs storefront
//!
//! Scenarios drive the storefront through typed page objects. Every
//! interaction synchronizes on an explicit wait, never a fixed sleep.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   STOREPROBE Architecture                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenarios  │    │ Page       │    │ Wait       │            │
//! │   │ + Harness  │───►│ Objects    │───►│ Helper     │            │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │         │                                   ▼                   │
//! │   ┌────────────┐                     ┌────────────┐             │
//! │   │ Session    │────────────────────►│ Browser    │             │
//! │   │ Fixture    │                     │ Driver     │             │
//! │   └────────────┘                     └─────┬──────┘             │
//! │                           ┌────────────────┴────────┐           │
//! │                    ┌──────▼─────┐            ┌──────▼─────┐     │
//! │                    │ Chromium   │            │ Mock       │     │
//! │                    │ (CDP)      │            │ storefront │     │
//! │                    └────────────┘            └────────────┘     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use storeprobe::prelude::*;
//!
//! let settings = Arc::new(Settings::load(None)?);
//! let fixture = SessionFixture::new(settings, Arc::new(MockLauncher::new())).with_screenshots();
//! let results = TestHarness::new().run(&scenarios::suite(), &fixture).await;
//! assert!(results.all_passed());
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod assertion;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod base_page;
#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate, missing_docs)]
mod browser;
mod config;
mod driver;
mod fixture;
mod harness;
mod locator;
#[allow(clippy::missing_errors_doc)]
mod page_object;
mod result;
mod session;
#[allow(clippy::missing_errors_doc, clippy::cast_possible_truncation)]
mod wait;

/// In-process storefront used when no real browser is wanted
///
/// Renders the same element ids and classes as the live site, so page
/// objects run unchanged against it.
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::too_many_lines
)]
pub mod mock;

/// Page objects for the login, product, cart and checkout screens
#[allow(missing_docs, clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod pages;

/// The storefront scenario catalogue
pub mod scenarios;

pub use assertion::{Assertion, AssertionResult};
pub use base_page::{BasePage, Visibility};
#[cfg(feature = "browser")]
pub use browser::{ChromiumDriver, ChromiumElement, ChromiumLauncher};
pub use config::{
    BrowserKind, Credentials, Paths, RunSettings, Settings, BROWSER_ARGS, CONFIG_ENV,
    DEFAULT_CONFIG_FILE, DEFAULT_POLL_INTERVAL_MS,
};
pub use driver::{BrowserDriver, DriverFactory, Element, ElementHandle};
pub use fixture::{Failure, FailureHook, ScreenshotHook, SessionFixture};
pub use harness::{
    Scenario, ScenarioFilter, ScenarioFn, SuiteResults, TestHarness, TestResult, TestSuite,
};
pub use locator::{product_slug, By, Locator};
pub use mock::{MockDriver, MockLauncher};
pub use page_object::{Page, PageObject};
pub use pages::{CartPage, CheckoutPage, CheckoutStep, LoginPage, ProductsPage};
pub use result::{ProbeError, ProbeResult};
pub use session::Session;
pub use wait::{url_path, Condition, WaitHelper};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::assertion::*;
    #[cfg(feature = "browser")]
    pub use super::browser::{ChromiumDriver, ChromiumLauncher};
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::fixture::*;
    pub use super::harness::*;
    pub use super::locator::*;
    pub use super::mock::{MockDriver, MockLauncher};
    pub use super::page_object::*;
    pub use super::pages::*;
    pub use super::result::*;
    pub use super::scenarios;
    pub use super::session::*;
    pub use super::wait::*;
    pub use std::sync::Arc;
}
