//! Login form at the storefront root.

use super::ProductsPage;
use crate::base_page::BasePage;
use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::ProbeResult;
use crate::session::Session;

/// Page object for the login form
#[derive(Debug, Clone)]
pub struct LoginPage {
    base: BasePage,
}

impl LoginPage {
    // =========================================================================
    // Locators
    // =========================================================================

    pub const USERNAME_INPUT: Locator = Locator::id("user-name");
    pub const PASSWORD_INPUT: Locator = Locator::id("password");
    pub const LOGIN_BUTTON: Locator = Locator::id("login-button");
    pub const ERROR_MESSAGE: Locator = Locator::css("[data-test='error']");
    pub const LOGIN_LOGO: Locator = Locator::class_name("login_logo");

    /// Navigate to the base URL and wait for the form
    pub async fn open(session: Session) -> ProbeResult<Self> {
        session.open_base().await?;
        Self::arrive(session).await
    }

    // =========================================================================
    // Actions
    // =========================================================================

    pub async fn enter_username(&self, username: &str) -> ProbeResult<()> {
        self.base.type_text(&Self::USERNAME_INPUT, username).await
    }

    pub async fn enter_password(&self, password: &str) -> ProbeResult<()> {
        self.base.type_text(&Self::PASSWORD_INPUT, password).await
    }

    pub async fn click_login_button(&self) -> ProbeResult<()> {
        self.base.click(&Self::LOGIN_BUTTON).await
    }

    /// Log in and wait for the product listing.
    ///
    /// Assumes the credentials are accepted; if they are not, the wait for
    /// the listing times out.
    pub async fn login(self, username: &str, password: &str) -> ProbeResult<ProductsPage> {
        self.submit(username, password).await?;
        ProductsPage::arrive(self.into_session()).await
    }

    /// Submit credentials that should be refused and wait for the error banner.
    ///
    /// Times out if the form is accepted instead.
    pub async fn login_expecting_failure(self, username: &str, password: &str) -> ProbeResult<Self> {
        self.submit(username, password).await?;
        self.base
            .wait()
            .wait_for_element_visible(&Self::ERROR_MESSAGE)
            .await?;
        Ok(self)
    }

    async fn submit(&self, username: &str, password: &str) -> ProbeResult<()> {
        tracing::info!(username, "logging in");
        self.enter_username(username).await?;
        self.enter_password(password).await?;
        self.click_login_button().await
    }

    // =========================================================================
    // Verifications
    // =========================================================================

    /// Logo and login button are both visible
    pub async fn is_login_page_displayed(&self) -> bool {
        self.base.is_displayed(&Self::LOGIN_LOGO).await
            && self.base.is_displayed(&Self::LOGIN_BUTTON).await
    }

    pub async fn is_error_message_displayed(&self) -> bool {
        self.base.is_displayed(&Self::ERROR_MESSAGE).await
    }

    pub async fn get_error_message_text(&self) -> ProbeResult<String> {
        self.base.get_text(&Self::ERROR_MESSAGE).await
    }
}

impl PageObject for LoginPage {
    fn page_name(&self) -> &'static str {
        "LoginPage"
    }

    fn url_fragment(&self) -> Option<&'static str> {
        None
    }

    fn ready_locator(&self) -> Locator {
        Self::LOGIN_BUTTON
    }

    fn base(&self) -> &BasePage {
        &self.base
    }

    fn from_session(session: Session) -> Self {
        Self {
            base: BasePage::new(session),
        }
    }

    fn into_session(self) -> Session {
        self.base.into_session()
    }
}
