//! Explicit waits.
//!
//! Turns an asynchronously rendering UI into deterministic calls: every
//! condition is re-checked at a fixed interval until it holds or the single
//! configured timeout elapses. There is no per-call override, no backoff and
//! no jitter.

use crate::config::Settings;
use crate::driver::{BrowserDriver, Element};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// State a wait polls for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// First match is displayed
    Visible(Locator),
    /// First match is displayed and enabled
    Clickable(Locator),
    /// At least one match exists, visible or not
    Present(Locator),
    /// At least one match exists and every match is displayed
    AllVisible(Locator),
    /// No match, or the first match is not displayed
    Invisible(Locator),
    /// First match's text contains the given text
    TextPresent(Locator, String),
    /// Current URL contains the fragment
    UrlContains(String),
    /// Path of the current URL (host excluded) contains the fragment
    PathContains(String),
    /// Current URL equals the value exactly
    UrlToBe(String),
}

impl Condition {
    /// What is being polled, for error messages
    #[must_use]
    pub fn target(&self) -> String {
        match self {
            Self::Visible(l)
            | Self::Clickable(l)
            | Self::Present(l)
            | Self::AllVisible(l)
            | Self::Invisible(l)
            | Self::TextPresent(l, _) => l.to_string(),
            Self::UrlContains(_) | Self::UrlToBe(_) => "page URL".to_string(),
            Self::PathContains(_) => "page path".to_string(),
        }
    }

    /// The state being waited for
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Visible(_) => "to be visible".to_string(),
            Self::Clickable(_) => "to be clickable".to_string(),
            Self::Present(_) => "to be present".to_string(),
            Self::AllVisible(_) => "to be visible (all matches)".to_string(),
            Self::Invisible(_) => "to be invisible".to_string(),
            Self::TextPresent(_, text) => format!("to contain text {text:?}"),
            Self::UrlContains(part) | Self::PathContains(part) => format!("to contain {part:?}"),
            Self::UrlToBe(url) => format!("to be {url:?}"),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.target(), self.description())
    }
}

/// Everything after the host: path, query and fragment.
///
/// URLs without a scheme are returned unchanged.
#[must_use]
pub fn url_path(url: &str) -> &str {
    let Some((_, rest)) = url.split_once("://") else {
        return url;
    };
    rest.find('/').map_or("/", |i| &rest[i..])
}

/// What a satisfied condition produced
enum Observation {
    Element(Element),
    Elements(Vec<Element>),
    Satisfied,
}

/// Polls a driver for element and URL conditions.
#[derive(Debug, Clone)]
pub struct WaitHelper {
    driver: Arc<dyn BrowserDriver>,
    timeout: Duration,
    poll_interval: Duration,
}

impl WaitHelper {
    /// Bind to a driver using the configured timeout and interval
    #[must_use]
    pub fn new(driver: Arc<dyn BrowserDriver>, settings: &Settings) -> Self {
        Self {
            driver,
            timeout: settings.explicit_wait(),
            poll_interval: settings.poll_interval(),
        }
    }

    /// Timeout applied to every wait
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Polling interval
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Wait for element to be visible and return it
    pub async fn wait_for_element_visible(&self, locator: &Locator) -> ProbeResult<Element> {
        self.until_element(Condition::Visible(locator.clone())).await
    }

    /// Wait for element to be clickable and return it
    pub async fn wait_for_element_clickable(&self, locator: &Locator) -> ProbeResult<Element> {
        self.until_element(Condition::Clickable(locator.clone()))
            .await
    }

    /// Wait for element to be present in the page structure
    pub async fn wait_for_element_present(&self, locator: &Locator) -> ProbeResult<Element> {
        self.until_element(Condition::Present(locator.clone())).await
    }

    /// Wait for all matches to be visible
    pub async fn wait_for_elements_visible(&self, locator: &Locator) -> ProbeResult<Vec<Element>> {
        match self.until(&Condition::AllVisible(locator.clone())).await? {
            Observation::Elements(elements) => Ok(elements),
            Observation::Element(element) => Ok(vec![element]),
            Observation::Satisfied => Ok(Vec::new()),
        }
    }

    /// Wait for element to become invisible or disappear
    pub async fn wait_for_element_invisible(&self, locator: &Locator) -> ProbeResult<bool> {
        self.until(&Condition::Invisible(locator.clone())).await?;
        Ok(true)
    }

    /// Wait for text to be present in element
    pub async fn wait_for_text_present(&self, locator: &Locator, text: &str) -> ProbeResult<bool> {
        self.until(&Condition::TextPresent(locator.clone(), text.to_string()))
            .await?;
        Ok(true)
    }

    /// Wait for URL to contain a fragment
    pub async fn wait_for_url_contains(&self, url_part: &str) -> ProbeResult<bool> {
        self.until(&Condition::UrlContains(url_part.to_string()))
            .await?;
        Ok(true)
    }

    /// Wait for the URL path to contain a fragment, ignoring the host
    pub async fn wait_for_path_contains(&self, path_part: &str) -> ProbeResult<bool> {
        self.until(&Condition::PathContains(path_part.to_string()))
            .await?;
        Ok(true)
    }

    /// Wait for URL to be exactly as specified
    pub async fn wait_for_url_to_be(&self, url: &str) -> ProbeResult<bool> {
        self.until(&Condition::UrlToBe(url.to_string())).await?;
        Ok(true)
    }

    /// Poll several conditions at once and return the index of the first one
    /// that holds. Conditions are checked in slice order on every poll.
    pub async fn wait_for_any(&self, conditions: &[Condition]) -> ProbeResult<usize> {
        let start = Instant::now();
        loop {
            for (index, condition) in conditions.iter().enumerate() {
                if self.check(condition).await?.is_some() {
                    tracing::debug!(
                        condition = %condition,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "wait satisfied"
                    );
                    return Ok(index);
                }
            }
            if !self.pause(start).await {
                let target = conditions
                    .iter()
                    .map(Condition::target)
                    .collect::<Vec<_>>()
                    .join(" | ");
                let condition = conditions
                    .iter()
                    .map(Condition::description)
                    .collect::<Vec<_>>()
                    .join(" | ");
                return Err(self.timeout_error(target, condition));
            }
        }
    }

    async fn until_element(&self, condition: Condition) -> ProbeResult<Element> {
        match self.until(&condition).await? {
            Observation::Element(element) => Ok(element),
            Observation::Elements(mut elements) if !elements.is_empty() => {
                Ok(elements.swap_remove(0))
            }
            _ => Err(ProbeError::InvalidState {
                message: format!("{condition} produced no element"),
            }),
        }
    }

    async fn until(&self, condition: &Condition) -> ProbeResult<Observation> {
        let start = Instant::now();
        tracing::trace!(condition = %condition, "waiting");
        loop {
            if let Some(observation) = self.check(condition).await? {
                tracing::debug!(
                    condition = %condition,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "wait satisfied"
                );
                return Ok(observation);
            }
            if !self.pause(start).await {
                return Err(self.timeout_error(condition.target(), condition.description()));
            }
        }
    }

    /// Sleep until the next poll. Returns false once the deadline has passed.
    async fn pause(&self, start: Instant) -> bool {
        let elapsed = start.elapsed();
        if elapsed >= self.timeout {
            return false;
        }
        tokio::time::sleep(self.poll_interval.min(self.timeout - elapsed)).await;
        true
    }

    fn timeout_error(&self, target: String, condition: String) -> ProbeError {
        let ms = self.timeout.as_millis() as u64;
        tracing::debug!(%target, %condition, ms, "wait timed out");
        ProbeError::Timeout {
            target,
            condition,
            ms,
        }
    }

    /// One poll. Stale elements count as "not yet".
    async fn check(&self, condition: &Condition) -> ProbeResult<Option<Observation>> {
        match self.observe(condition).await {
            Err(e) if e.is_stale() => {
                if matches!(condition, Condition::Invisible(_)) {
                    Ok(Some(Observation::Satisfied))
                } else {
                    Ok(None)
                }
            }
            other => other,
        }
    }

    async fn observe(&self, condition: &Condition) -> ProbeResult<Option<Observation>> {
        match condition {
            Condition::Visible(locator) => {
                let Some(first) = self.first(locator).await? else {
                    return Ok(None);
                };
                Ok(first
                    .is_displayed()
                    .await?
                    .then_some(Observation::Element(first)))
            }
            Condition::Clickable(locator) => {
                let Some(first) = self.first(locator).await? else {
                    return Ok(None);
                };
                let ready = first.is_displayed().await? && first.is_enabled().await?;
                Ok(ready.then_some(Observation::Element(first)))
            }
            Condition::Present(locator) => Ok(self.first(locator).await?.map(Observation::Element)),
            Condition::AllVisible(locator) => {
                let elements = self.driver.find_elements(locator).await?;
                if elements.is_empty() {
                    return Ok(None);
                }
                for element in &elements {
                    if !element.is_displayed().await? {
                        return Ok(None);
                    }
                }
                Ok(Some(Observation::Elements(elements)))
            }
            Condition::Invisible(locator) => match self.first(locator).await? {
                None => Ok(Some(Observation::Satisfied)),
                Some(first) => Ok((!first.is_displayed().await?).then_some(Observation::Satisfied)),
            },
            Condition::TextPresent(locator, text) => {
                let Some(first) = self.first(locator).await? else {
                    return Ok(None);
                };
                Ok(first
                    .text()
                    .await?
                    .contains(text.as_str())
                    .then_some(Observation::Satisfied))
            }
            Condition::UrlContains(part) => Ok(self
                .driver
                .current_url()
                .await?
                .contains(part.as_str())
                .then_some(Observation::Satisfied)),
            Condition::PathContains(part) => Ok(url_path(&self.driver.current_url().await?)
                .contains(part.as_str())
                .then_some(Observation::Satisfied)),
            Condition::UrlToBe(url) => Ok((self.driver.current_url().await? == *url)
                .then_some(Observation::Satisfied)),
        }
    }

    async fn first(&self, locator: &Locator) -> ProbeResult<Option<Element>> {
        Ok(self.driver.find_elements(locator).await?.into_iter().next())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::ElementHandle;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Elements keyed by locator value that appear, show and go stale on a schedule
    #[derive(Debug, Clone)]
    struct FakeNode {
        key: &'static str,
        text: &'static str,
        shown_after: Duration,
        enabled: bool,
        stale: bool,
    }

    impl FakeNode {
        fn new(key: &'static str) -> Self {
            Self {
                key,
                text: "",
                shown_after: Duration::ZERO,
                enabled: true,
                stale: false,
            }
        }
    }

    #[derive(Debug)]
    struct FakeDriver {
        born: Instant,
        nodes: Mutex<Vec<FakeNode>>,
        url: Mutex<String>,
        lookups: Mutex<usize>,
    }

    impl FakeDriver {
        fn new(nodes: Vec<FakeNode>) -> Arc<Self> {
            Arc::new(Self {
                born: Instant::now(),
                nodes: Mutex::new(nodes),
                url: Mutex::new("https://shop.test/".to_string()),
                lookups: Mutex::new(0),
            })
        }
    }

    #[derive(Debug)]
    struct FakeElement {
        node: FakeNode,
        born: Instant,
    }

    #[async_trait]
    impl ElementHandle for FakeElement {
        async fn click(&self) -> ProbeResult<()> {
            Ok(())
        }
        async fn clear(&self) -> ProbeResult<()> {
            Ok(())
        }
        async fn send_keys(&self, _text: &str) -> ProbeResult<()> {
            Ok(())
        }
        async fn text(&self) -> ProbeResult<String> {
            Ok(self.node.text.to_string())
        }
        async fn is_displayed(&self) -> ProbeResult<bool> {
            if self.node.stale {
                return Err(ProbeError::StaleElement {
                    locator: self.node.key.to_string(),
                });
            }
            Ok(self.born.elapsed() >= self.node.shown_after)
        }
        async fn is_enabled(&self) -> ProbeResult<bool> {
            Ok(self.node.enabled)
        }
        async fn select_by_value(&self, _value: &str) -> ProbeResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl BrowserDriver for FakeDriver {
        async fn navigate(&self, url: &str) -> ProbeResult<()> {
            *self.url.lock().unwrap() = url.to_string();
            Ok(())
        }
        async fn find_elements(&self, locator: &Locator) -> ProbeResult<Vec<Element>> {
            *self.lookups.lock().unwrap() += 1;
            Ok(self
                .nodes
                .lock()
                .unwrap()
                .iter()
                .filter(|n| n.key == locator.value())
                .map(|n| {
                    Box::new(FakeElement {
                        node: n.clone(),
                        born: self.born,
                    }) as Element
                })
                .collect())
        }
        async fn current_url(&self) -> ProbeResult<String> {
            Ok(self.url.lock().unwrap().clone())
        }
        async fn title(&self) -> ProbeResult<String> {
            Ok(String::new())
        }
        async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
            Ok(Vec::new())
        }
        async fn quit(&self) -> ProbeResult<()> {
            Ok(())
        }
    }

    fn helper(driver: Arc<FakeDriver>, timeout_ms: u64) -> WaitHelper {
        let settings = Settings::default()
            .with_explicit_wait(Duration::from_millis(timeout_ms))
            .with_poll_interval(Duration::from_millis(10));
        WaitHelper::new(driver, &settings)
    }

    mod condition_tests {
        use super::*;

        #[test]
        fn test_display() {
            let c = Condition::Clickable(Locator::id("finish"));
            assert_eq!(c.to_string(), "id=\"finish\" to be clickable");
            let u = Condition::UrlContains("inventory".to_string());
            assert_eq!(u.to_string(), "page URL to contain \"inventory\"");
            let p = Condition::PathContains("cart".to_string());
            assert_eq!(p.to_string(), "page path to contain \"cart\"");
        }

        #[test]
        fn test_url_path_drops_host() {
            assert_eq!(url_path("https://cart.shop.test/inventory.html"), "/inventory.html");
            assert_eq!(url_path("http://localhost:3000/cart.html?x=1"), "/cart.html?x=1");
            assert_eq!(url_path("https://cart.shop.test"), "/");
            assert_eq!(url_path("about:blank"), "about:blank");
        }
    }

    mod element_wait_tests {
        use super::*;

        #[tokio::test]
        async fn test_visible_immediately() {
            let driver = FakeDriver::new(vec![FakeNode::new("title")]);
            let wait = helper(driver.clone(), 500);
            wait.wait_for_element_visible(&Locator::class_name("title"))
                .await
                .unwrap();
            assert_eq!(*driver.lookups.lock().unwrap(), 1);
        }

        #[tokio::test]
        async fn test_render_delay_is_absorbed() {
            let mut node = FakeNode::new("title");
            node.shown_after = Duration::from_millis(60);
            let driver = FakeDriver::new(vec![node]);
            let wait = helper(driver.clone(), 1000);

            let start = Instant::now();
            wait.wait_for_element_visible(&Locator::class_name("title"))
                .await
                .unwrap();
            assert!(start.elapsed() >= Duration::from_millis(60));
            assert!(*driver.lookups.lock().unwrap() > 1);
        }

        #[tokio::test]
        async fn test_missing_element_times_out() {
            let wait = helper(FakeDriver::new(vec![]), 80);
            let start = Instant::now();
            let err = wait
                .wait_for_element_visible(&Locator::id("nope"))
                .await
                .unwrap_err();
            assert!(start.elapsed() >= Duration::from_millis(80));
            match err {
                ProbeError::Timeout {
                    target,
                    condition,
                    ms,
                } => {
                    assert_eq!(target, "id=\"nope\"");
                    assert_eq!(condition, "to be visible");
                    assert_eq!(ms, 80);
                }
                other => panic!("expected timeout, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_disabled_is_not_clickable() {
            let mut node = FakeNode::new("finish");
            node.enabled = false;
            let wait = helper(FakeDriver::new(vec![node]), 50);
            let err = wait
                .wait_for_element_clickable(&Locator::id("finish"))
                .await
                .unwrap_err();
            assert!(err.is_timeout());
        }

        #[tokio::test]
        async fn test_present_ignores_visibility() {
            let mut node = FakeNode::new("badge");
            node.shown_after = Duration::from_secs(60);
            let wait = helper(FakeDriver::new(vec![node]), 50);
            wait.wait_for_element_present(&Locator::class_name("badge"))
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_multiple_matches_resolve_to_first() {
            let mut first = FakeNode::new("btn");
            first.text = "first";
            let mut second = FakeNode::new("btn");
            second.text = "second";
            let wait = helper(FakeDriver::new(vec![first, second]), 50);
            let element = wait
                .wait_for_element_clickable(&Locator::class_name("btn"))
                .await
                .unwrap();
            assert_eq!(element.text().await.unwrap(), "first");
        }

        #[tokio::test]
        async fn test_all_visible_requires_every_match() {
            let mut late = FakeNode::new("item");
            late.shown_after = Duration::from_secs(60);
            let wait = helper(
                FakeDriver::new(vec![FakeNode::new("item"), late]),
                50,
            );
            assert!(wait
                .wait_for_elements_visible(&Locator::class_name("item"))
                .await
                .unwrap_err()
                .is_timeout());
        }

        #[tokio::test]
        async fn test_stale_counts_as_not_yet() {
            let mut node = FakeNode::new("x");
            node.stale = true;
            let wait = helper(FakeDriver::new(vec![node]), 50);
            let err = wait
                .wait_for_element_visible(&Locator::id("x"))
                .await
                .unwrap_err();
            assert!(err.is_timeout());
        }
    }

    mod invisibility_tests {
        use super::*;

        #[tokio::test]
        async fn test_absent_is_invisible() {
            let wait = helper(FakeDriver::new(vec![]), 50);
            assert!(wait
                .wait_for_element_invisible(&Locator::id("spinner"))
                .await
                .unwrap());
        }

        #[tokio::test]
        async fn test_stale_is_invisible() {
            let mut node = FakeNode::new("spinner");
            node.stale = true;
            let wait = helper(FakeDriver::new(vec![node]), 50);
            assert!(wait
                .wait_for_element_invisible(&Locator::id("spinner"))
                .await
                .unwrap());
        }

        #[tokio::test]
        async fn test_visible_element_times_out() {
            let wait = helper(FakeDriver::new(vec![FakeNode::new("spinner")]), 50);
            assert!(wait
                .wait_for_element_invisible(&Locator::id("spinner"))
                .await
                .unwrap_err()
                .is_timeout());
        }
    }

    mod text_and_url_tests {
        use super::*;

        #[tokio::test]
        async fn test_text_present() {
            let mut node = FakeNode::new("error");
            node.text = "Epic sadface: Username is required";
            let wait = helper(FakeDriver::new(vec![node]), 50);
            assert!(wait
                .wait_for_text_present(&Locator::id("error"), "Username is required")
                .await
                .unwrap());
            assert!(wait
                .wait_for_text_present(&Locator::id("error"), "locked out")
                .await
                .is_err());
        }

        #[tokio::test]
        async fn test_url_conditions() {
            let driver = FakeDriver::new(vec![]);
            driver
                .navigate("https://shop.test/inventory.html")
                .await
                .unwrap();
            let wait = helper(driver, 50);
            assert!(wait.wait_for_url_contains("inventory").await.unwrap());
            assert!(wait
                .wait_for_url_to_be("https://shop.test/inventory.html")
                .await
                .unwrap());
            let err = wait.wait_for_url_to_be("https://shop.test/").await.unwrap_err();
            assert!(err.to_string().contains("page URL"));
        }

        #[tokio::test]
        async fn test_path_condition_ignores_host() {
            let driver = FakeDriver::new(vec![]);
            driver
                .navigate("https://cart.shop.test/inventory.html")
                .await
                .unwrap();
            let wait = helper(driver, 50);
            assert!(wait.wait_for_url_contains("cart").await.unwrap());
            assert!(wait.wait_for_path_contains("inventory").await.unwrap());
            let err = wait.wait_for_path_contains("cart").await.unwrap_err();
            assert!(err.to_string().contains("page path"));
        }
    }

    mod wait_for_any_tests {
        use super::*;

        #[tokio::test]
        async fn test_returns_first_satisfied_index() {
            let wait = helper(FakeDriver::new(vec![FakeNode::new("error")]), 200);
            let index = wait
                .wait_for_any(&[
                    Condition::UrlContains("checkout-step-two".to_string()),
                    Condition::Visible(Locator::id("error")),
                ])
                .await
                .unwrap();
            assert_eq!(index, 1);
        }

        #[tokio::test]
        async fn test_timeout_lists_every_condition() {
            let wait = helper(FakeDriver::new(vec![]), 40);
            let err = wait
                .wait_for_any(&[
                    Condition::UrlContains("a".to_string()),
                    Condition::Visible(Locator::id("b")),
                ])
                .await
                .unwrap_err();
            let message = err.to_string();
            assert!(message.contains("page URL | id=\"b\""), "{message}");
        }
    }

    #[test]
    fn test_timeout_comes_from_settings() {
        let settings = Settings::default().with_explicit_wait(Duration::from_secs(7));
        let wait = WaitHelper::new(FakeDriver::new(vec![]), &settings);
        assert_eq!(wait.timeout(), Duration::from_secs(7));
        assert_eq!(wait.poll_interval(), Duration::from_millis(500));
    }
}
