//! Page Object Model support.
//!
//! A page object is a typed handle meaning "the browser is showing page X".
//! Navigating actions consume the current page object and return the next
//! one, so the flow graph is checked by the compiler:
//!
//! ```text
//! LoginPage ──login──▶ ProductsPage ──go_to_cart──▶ CartPage
//!     ▲                  ▲      ▲                     │  │
//!     └─────logout───────┘      └──continue_shopping──┘  │ proceed_to_checkout
//!                        ▲                               ▼
//!                        └──click_back_home── CheckoutPage{StepOne, StepTwo, Complete}
//! ```
//!
//! When the next page is only known at runtime, [`Page`] carries whichever
//! page object the browser is actually on.

use crate::base_page::BasePage;
use crate::locator::Locator;
use crate::pages::{CartPage, CheckoutPage, CheckoutStep, LoginPage, ProductsPage};
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use crate::wait::url_path;
use async_trait::async_trait;
use std::fmt;

/// Trait for page objects representing one page of the storefront.
#[async_trait]
pub trait PageObject: Sized + Send + Sync {
    /// Page name for logging/debugging
    fn page_name(&self) -> &'static str;

    /// Fragment the URL path contains while this page is shown, if any
    fn url_fragment(&self) -> Option<&'static str>;

    /// Element that is visible once the page has rendered
    fn ready_locator(&self) -> Locator;

    /// Shared action primitives
    fn base(&self) -> &BasePage;

    /// Bind to a session without checking what the browser shows
    fn from_session(session: Session) -> Self;

    /// Give the session back
    fn into_session(self) -> Session;

    /// Wait until the URL matches and the page has rendered
    async fn wait_until_loaded(&self) -> ProbeResult<()> {
        let wait = self.base().wait();
        if let Some(fragment) = self.url_fragment() {
            wait.wait_for_path_contains(fragment).await?;
        }
        wait.wait_for_element_visible(&self.ready_locator()).await?;
        tracing::debug!(page = self.page_name(), "page loaded");
        Ok(())
    }

    /// Bind to a session, then wait for the page to load
    async fn arrive(session: Session) -> ProbeResult<Self> {
        let page = Self::from_session(session);
        page.wait_until_loaded().await?;
        Ok(page)
    }
}

/// Which page object the browser is on.
#[derive(Debug, Clone)]
pub enum Page {
    /// Login form
    Login(LoginPage),
    /// Product listing
    Products(ProductsPage),
    /// Cart
    Cart(CartPage),
    /// Any checkout step
    Checkout(CheckoutPage),
}

impl Page {
    /// Build the page object matching the current URL path.
    ///
    /// Does not wait: call after the navigation has settled.
    pub async fn detect(session: Session) -> ProbeResult<Self> {
        let url = session.driver().current_url().await?;
        let path = url_path(&url);
        let page = if path.contains("checkout-step-one") {
            Self::Checkout(CheckoutPage::at_step(session, CheckoutStep::StepOne))
        } else if path.contains("checkout-step-two") {
            Self::Checkout(CheckoutPage::at_step(session, CheckoutStep::StepTwo))
        } else if path.contains("checkout-complete") {
            Self::Checkout(CheckoutPage::at_step(session, CheckoutStep::Complete))
        } else if path.contains("inventory") {
            Self::Products(ProductsPage::from_session(session))
        } else if path.contains("cart") {
            Self::Cart(CartPage::from_session(session))
        } else {
            Self::Login(LoginPage::from_session(session))
        };
        tracing::debug!(%url, page = %page, "detected page");
        Ok(page)
    }

    /// Page name
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login(p) => p.page_name(),
            Self::Products(p) => p.page_name(),
            Self::Cart(p) => p.page_name(),
            Self::Checkout(p) => p.page_name(),
        }
    }

    /// Session the page is bound to
    #[must_use]
    pub fn session(&self) -> &Session {
        match self {
            Self::Login(p) => p.base().session(),
            Self::Products(p) => p.base().session(),
            Self::Cart(p) => p.base().session(),
            Self::Checkout(p) => p.base().session(),
        }
    }

    /// Expect the login page
    pub fn into_login(self) -> ProbeResult<LoginPage> {
        match self {
            Self::Login(p) => Ok(p),
            other => Err(other.unexpected("LoginPage")),
        }
    }

    /// Expect the product listing
    pub fn into_products(self) -> ProbeResult<ProductsPage> {
        match self {
            Self::Products(p) => Ok(p),
            other => Err(other.unexpected("ProductsPage")),
        }
    }

    /// Expect the cart
    pub fn into_cart(self) -> ProbeResult<CartPage> {
        match self {
            Self::Cart(p) => Ok(p),
            other => Err(other.unexpected("CartPage")),
        }
    }

    /// Expect a checkout step
    pub fn into_checkout(self) -> ProbeResult<CheckoutPage> {
        match self {
            Self::Checkout(p) => Ok(p),
            other => Err(other.unexpected("CheckoutPage")),
        }
    }

    fn unexpected(&self, wanted: &str) -> ProbeError {
        ProbeError::InvalidState {
            message: format!("expected {wanted}, browser is on {self}"),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checkout(p) => write!(f, "{} ({})", self.name(), p.step()),
            _ => f.write_str(self.name()),
        }
    }
}

impl From<LoginPage> for Page {
    fn from(page: LoginPage) -> Self {
        Self::Login(page)
    }
}

impl From<ProductsPage> for Page {
    fn from(page: ProductsPage) -> Self {
        Self::Products(page)
    }
}

impl From<CartPage> for Page {
    fn from(page: CartPage) -> Self {
        Self::Cart(page)
    }
}

impl From<CheckoutPage> for Page {
    fn from(page: CheckoutPage) -> Self {
        Self::Checkout(page)
    }
}
