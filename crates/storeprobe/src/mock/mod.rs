//! Browserless backend.
//!
//! [`MockDriver`] implements [`crate::BrowserDriver`] over [`Storefront`], an
//! in-process model of the demo site's DOM contract. Page objects and
//! scenarios run against it unchanged, which keeps the suite testable in CI
//! without Chromium.
//!
//! ## Example
//!
//! ```rust,ignore
//! use storeprobe::mock::MockLauncher;
//! use std::time::Duration;
//!
//! // Every page renders 200ms after it loads, like a slow SPA
//! let launcher = MockLauncher::new().with_render_delay(Duration::from_millis(200));
//! ```

pub mod driver;
pub mod storefront;

pub use driver::{MockDriver, MockLauncher};
pub use storefront::{Field, Product, Screen, SortOrder, Storefront, CATALOG, DEMO_PASSWORD, DEMO_USERS};
