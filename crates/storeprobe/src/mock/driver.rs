//! [`BrowserDriver`] over the simulated storefront.

use super::storefront::{Field, Storefront};
use crate::config::{BrowserKind, Settings};
use crate::driver::{BrowserDriver, DriverFactory, Element, ElementHandle};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// 1x1 transparent PNG returned by [`MockDriver::screenshot`]
const BLANK_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

#[derive(Debug)]
struct Shared {
    store: Mutex<Storefront>,
    calls: Mutex<Vec<String>>,
    closed: AtomicBool,
}

impl Shared {
    fn store(&self) -> ProbeResult<MutexGuard<'_, Storefront>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ProbeError::driver("session closed"));
        }
        self.store
            .lock()
            .map_err(|_| ProbeError::driver("storefront state poisoned"))
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

/// Mock driver for running page objects without a browser
#[derive(Debug, Clone)]
pub struct MockDriver {
    shared: Arc<Shared>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    /// Fresh storefront, no render delay
    #[must_use]
    pub fn new() -> Self {
        Self::with_storefront(Storefront::new())
    }

    /// Drive a prepared storefront
    #[must_use]
    pub fn with_storefront(store: Storefront) -> Self {
        Self {
            shared: Arc::new(Shared {
                store: Mutex::new(store),
                calls: Mutex::new(Vec::new()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Run `f` against the storefront state
    pub fn inspect<T>(&self, f: impl FnOnce(&Storefront) -> T) -> ProbeResult<T> {
        Ok(f(&*self.shared.store()?))
    }

    /// Current value of a text input
    #[must_use]
    pub fn field_value(&self, field: Field) -> String {
        self.inspect(|s| s.field_value(field).to_string())
            .unwrap_or_default()
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.shared
            .calls
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.history().iter().any(|c| c.starts_with(method))
    }

    /// Number of calls to `method`
    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        self.history()
            .iter()
            .filter(|c| c.split(':').next() == Some(method))
            .count()
    }

    /// Whether [`BrowserDriver::quit`] has run
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserDriver for MockDriver {
    async fn navigate(&self, url: &str) -> ProbeResult<()> {
        self.shared.record(format!("navigate:{url}"));
        self.shared.store()?.navigate(url)
    }

    async fn find_elements(&self, locator: &Locator) -> ProbeResult<Vec<Element>> {
        self.shared.record(format!("find_elements:{locator}"));
        let store = self.shared.store()?;
        let epoch = store.epoch();
        Ok(store
            .find(locator)?
            .into_iter()
            .map(|node| {
                Box::new(MockElement {
                    shared: Arc::clone(&self.shared),
                    epoch,
                    key: node.key,
                }) as Element
            })
            .collect())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.shared.store()?.current_url())
    }

    async fn title(&self) -> ProbeResult<String> {
        Ok(self.shared.store()?.title().to_string())
    }

    async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        self.shared.record("screenshot".to_string());
        drop(self.shared.store()?);
        Ok(BLANK_PNG.to_vec())
    }

    async fn quit(&self) -> ProbeResult<()> {
        self.shared.record("quit".to_string());
        self.shared.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Handle to one rendered storefront node
#[derive(Debug)]
struct MockElement {
    shared: Arc<Shared>,
    epoch: u64,
    key: String,
}

impl MockElement {
    fn with_store<T>(
        &self,
        f: impl FnOnce(&mut Storefront) -> ProbeResult<T>,
    ) -> ProbeResult<T> {
        let mut store = self.shared.store()?;
        if store.epoch() != self.epoch || store.node(&self.key).is_none() {
            return Err(ProbeError::StaleElement {
                locator: self.key.clone(),
            });
        }
        f(&mut store)
    }
}

#[async_trait]
impl ElementHandle for MockElement {
    async fn click(&self) -> ProbeResult<()> {
        self.shared.record(format!("click:{}", self.key));
        self.with_store(|s| s.click(&self.key))
    }

    async fn clear(&self) -> ProbeResult<()> {
        self.with_store(|s| s.clear(&self.key))
    }

    async fn send_keys(&self, text: &str) -> ProbeResult<()> {
        self.shared.record(format!("send_keys:{}", self.key));
        self.with_store(|s| s.send_keys(&self.key, text))
    }

    async fn text(&self) -> ProbeResult<String> {
        self.with_store(|s| Ok(s.node(&self.key).map(|n| n.text).unwrap_or_default()))
    }

    async fn is_displayed(&self) -> ProbeResult<bool> {
        self.with_store(|s| Ok(s.node(&self.key).is_some_and(|n| n.displayed)))
    }

    async fn is_enabled(&self) -> ProbeResult<bool> {
        self.with_store(|s| Ok(s.node(&self.key).is_some_and(|n| n.enabled)))
    }

    async fn select_by_value(&self, value: &str) -> ProbeResult<()> {
        self.shared.record(format!("select:{}={value}", self.key));
        self.with_store(|s| s.select(&self.key, value))
    }
}

/// Launches a fresh [`MockDriver`] per session
#[derive(Debug, Clone, Default)]
pub struct MockLauncher {
    render_delay: Duration,
}

impl MockLauncher {
    /// Launcher with no render delay
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide each page for `delay` after it changes
    #[must_use]
    pub const fn with_render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }
}

#[async_trait]
impl DriverFactory for MockLauncher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn launch(
        &self,
        _settings: &Settings,
        browser: BrowserKind,
    ) -> ProbeResult<Arc<dyn BrowserDriver>> {
        tracing::debug!(%browser, delay_ms = self.render_delay.as_millis() as u64, "launching mock storefront");
        let store = Storefront::new().with_render_delay(self.render_delay);
        Ok(Arc::new(MockDriver::with_storefront(store)))
    }
}
