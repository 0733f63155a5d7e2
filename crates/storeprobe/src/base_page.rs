//! Action primitives shared by every page object.
//!
//! Each primitive is a wait followed by one driver call. Nothing here knows
//! about a particular page.

use crate::driver::Element;
use crate::locator::Locator;
use crate::result::ProbeResult;
use crate::session::Session;
use crate::wait::WaitHelper;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a visibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    /// Displayed within the timeout
    Visible,
    /// Present in the page but never displayed
    Hidden,
    /// No element matched when the wait ran out
    NotFound,
    /// The wait ran out and the final state could not be read
    TimedOut,
}

impl Visibility {
    /// True only for [`Visibility::Visible`]
    #[must_use]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::NotFound => "not found",
            Self::TimedOut => "timed out",
        };
        f.write_str(s)
    }
}

/// Session plus wait helper; embedded by every page object.
#[derive(Debug, Clone)]
pub struct BasePage {
    session: Session,
    wait: WaitHelper,
}

impl BasePage {
    /// Bind to a session
    #[must_use]
    pub fn new(session: Session) -> Self {
        let wait = session.wait();
        Self { session, wait }
    }

    /// Session this page is bound to
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Give the session back, e.g. to build the next page object
    #[must_use]
    pub fn into_session(self) -> Session {
        self.session
    }

    /// Wait helper
    #[must_use]
    pub const fn wait(&self) -> &WaitHelper {
        &self.wait
    }

    /// Wait until clickable, then click
    pub async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        tracing::debug!(%locator, "click");
        self.wait
            .wait_for_element_clickable(locator)
            .await?
            .click()
            .await
    }

    /// Wait until visible, clear, then type
    pub async fn type_text(&self, locator: &Locator, text: &str) -> ProbeResult<()> {
        tracing::debug!(%locator, len = text.len(), "type");
        let element = self.wait.wait_for_element_visible(locator).await?;
        element.clear().await?;
        element.send_keys(text).await
    }

    /// Wait until visible, then read its text
    pub async fn get_text(&self, locator: &Locator) -> ProbeResult<String> {
        self.wait
            .wait_for_element_visible(locator)
            .await?
            .text()
            .await
    }

    /// Whether the element becomes visible within the timeout. Failures read as `false`.
    pub async fn is_displayed(&self, locator: &Locator) -> bool {
        match self.visibility(locator).await {
            Ok(visibility) => visibility.is_visible(),
            Err(e) => {
                tracing::warn!(%locator, error = %e, "visibility check failed");
                false
            }
        }
    }

    /// Why an element is or is not visible.
    ///
    /// Waits like [`Self::is_displayed`]. Driver failures other than a
    /// timeout are returned as errors.
    pub async fn visibility(&self, locator: &Locator) -> ProbeResult<Visibility> {
        match self.wait.wait_for_element_visible(locator).await {
            Ok(_) => Ok(Visibility::Visible),
            Err(e) if e.is_timeout() => Ok(self.settle(locator).await),
            Err(e) => Err(e),
        }
    }

    async fn settle(&self, locator: &Locator) -> Visibility {
        let Ok(elements) = self.session.driver().find_elements(locator).await else {
            return Visibility::TimedOut;
        };
        let Some(first) = elements.first() else {
            return Visibility::NotFound;
        };
        match first.is_displayed().await {
            Ok(true) => Visibility::Visible,
            Ok(false) => Visibility::Hidden,
            Err(_) => Visibility::TimedOut,
        }
    }

    /// All current matches, without waiting
    pub async fn get_elements(&self, locator: &Locator) -> ProbeResult<Vec<Element>> {
        self.session.driver().find_elements(locator).await
    }

    /// At least one match exists right now
    pub async fn is_element_present(&self, locator: &Locator) -> ProbeResult<bool> {
        Ok(!self.get_elements(locator).await?.is_empty())
    }

    /// Text of every current match, without waiting
    pub async fn texts(&self, locator: &Locator) -> ProbeResult<Vec<String>> {
        let mut texts = Vec::new();
        for element in self.get_elements(locator).await? {
            texts.push(element.text().await?);
        }
        Ok(texts)
    }

    /// Wait until clickable, then choose the option with `value`
    pub async fn select_by_value(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
        tracing::debug!(%locator, value, "select");
        self.wait
            .wait_for_element_clickable(locator)
            .await?
            .select_by_value(value)
            .await
    }

    /// Current URL
    pub async fn current_url(&self) -> ProbeResult<String> {
        self.session.driver().current_url().await
    }

    /// Document title
    pub async fn page_title(&self) -> ProbeResult<String> {
        self.session.driver().title().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::mock::{Field, MockDriver, Storefront};
    use std::sync::Arc;
    use std::time::Duration;

    fn page() -> (BasePage, Arc<MockDriver>) {
        let settings = Settings::default()
            .with_base_url(Storefront::BASE_URL)
            .with_explicit_wait(Duration::from_millis(100))
            .with_poll_interval(Duration::from_millis(10));
        let driver = Arc::new(MockDriver::new());
        let session = Session::new(driver.clone(), Arc::new(settings));
        (BasePage::new(session), driver)
    }

    async fn opened() -> (BasePage, Arc<MockDriver>) {
        let (page, driver) = page();
        page.session().open_base().await.unwrap();
        (page, driver)
    }

    mod visibility_tests {
        use super::*;

        #[tokio::test]
        async fn test_visible() {
            let (page, _) = opened().await;
            assert_eq!(
                page.visibility(&Locator::id("login-button")).await.unwrap(),
                Visibility::Visible
            );
            assert!(page.is_displayed(&Locator::id("login-button")).await);
        }

        #[tokio::test]
        async fn test_not_found() {
            let (page, _) = opened().await;
            assert_eq!(
                page.visibility(&Locator::class_name("no_such_thing"))
                    .await
                    .unwrap(),
                Visibility::NotFound
            );
            assert!(!page.is_displayed(&Locator::class_name("no_such_thing")).await);
        }

        #[tokio::test]
        async fn test_hidden() {
            let (page, _) = opened().await;
            // Sidebar links exist but stay hidden until the burger menu opens
            page.type_text(&Locator::id("user-name"), "standard_user")
                .await
                .unwrap();
            page.type_text(&Locator::id("password"), "secret_sauce")
                .await
                .unwrap();
            page.click(&Locator::id("login-button")).await.unwrap();
            assert_eq!(
                page.visibility(&Locator::id("logout_sidebar_link"))
                    .await
                    .unwrap(),
                Visibility::Hidden
            );
        }
    }

    mod action_tests {
        use super::*;

        #[tokio::test]
        async fn test_type_text_overwrites() {
            let (page, driver) = opened().await;
            let field = Locator::id("user-name");
            page.type_text(&field, "first").await.unwrap();
            page.type_text(&field, "second").await.unwrap();
            assert_eq!(driver.field_value(Field::Username), "second");
        }

        #[tokio::test]
        async fn test_get_elements_does_not_wait() {
            let (page, driver) = opened().await;
            let before = driver.call_count("find_elements");
            assert!(page
                .get_elements(&Locator::class_name("inventory_item"))
                .await
                .unwrap()
                .is_empty());
            assert_eq!(driver.call_count("find_elements"), before + 1);
        }

        #[tokio::test]
        async fn test_presence_ignores_visibility() {
            let (page, _) = opened().await;
            assert!(page
                .is_element_present(&Locator::class_name("login_logo"))
                .await
                .unwrap());
            assert!(!page
                .is_element_present(&Locator::class_name("shopping_cart_badge"))
                .await
                .unwrap());
        }

        #[tokio::test]
        async fn test_click_missing_times_out() {
            let (page, _) = opened().await;
            let err = page.click(&Locator::id("finish")).await.unwrap_err();
            assert!(err.is_timeout());
        }
    }
}
