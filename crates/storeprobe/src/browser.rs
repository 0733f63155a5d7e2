//! Real browser backend over the Chrome DevTools Protocol.
//!
//! Compiled with the `browser` feature. One [`ChromiumDriver`] owns one
//! browser process with a single tab; [`ChromiumLauncher`] starts a fresh one
//! per scenario.

use crate::config::{BrowserKind, Settings, BROWSER_ARGS};
use crate::driver::{BrowserDriver, DriverFactory, Element, ElementHandle};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::element::Element as CdpElement;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Lower bound for the CDP request timeout
const MIN_REQUEST_TIMEOUT: Duration = Duration::from_secs(1);

// Element scripts return null when the node has left the document.
const JS_IS_DISPLAYED: &str = "function() {
    if (!this.isConnected) return null;
    const style = window.getComputedStyle(this);
    const rect = this.getBoundingClientRect();
    return style.display !== 'none' && style.visibility !== 'hidden'
        && rect.width > 0 && rect.height > 0;
}";
const JS_IS_ENABLED: &str = "function() {
    if (!this.isConnected) return null;
    return !this.disabled;
}";
const JS_FOCUS_SELECT: &str = "function() {
    if (!this.isConnected) return null;
    this.focus();
    if (typeof this.select === 'function') this.select();
    return true;
}";
const JS_CONNECTED: &str = "function() { return this.isConnected ? true : null; }";

/// Launches Chrome, Chromium or Edge through chromiumoxide
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromiumLauncher;

impl ChromiumLauncher {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DriverFactory for ChromiumLauncher {
    fn name(&self) -> &str {
        "chromium"
    }

    async fn launch(
        &self,
        settings: &Settings,
        browser: BrowserKind,
    ) -> ProbeResult<Arc<dyn BrowserDriver>> {
        Ok(Arc::new(ChromiumDriver::launch(settings, browser).await?))
    }
}

/// One browser process driving a single tab
#[derive(Debug)]
pub struct ChromiumDriver {
    browser: Mutex<CdpBrowser>,
    page: CdpPage,
    handler: tokio::task::JoinHandle<()>,
}

impl ChromiumDriver {
    /// Start the browser and open a blank tab
    pub async fn launch(settings: &Settings, browser: BrowserKind) -> ProbeResult<Self> {
        let mut builder = CdpConfig::builder()
            .request_timeout(settings.implicit_wait().max(MIN_REQUEST_TIMEOUT))
            .args(BROWSER_ARGS.iter().copied());

        if !settings.headless() {
            builder = builder.with_head();
        }

        if !settings.sandbox() {
            builder = builder.no_sandbox();
        }

        match (browser, settings.run.browser_path.as_deref()) {
            (_, Some(path)) => builder = builder.chrome_executable(path),
            (BrowserKind::Edge, None) => {
                return Err(ProbeError::BrowserLaunch {
                    message: "edge requires settings.browser_path".to_string(),
                })
            }
            (BrowserKind::Chrome | BrowserKind::Chromium, None) => {}
        }

        let config = builder
            .build()
            .map_err(|message| ProbeError::BrowserLaunch { message })?;

        let (cdp, mut handler) =
            CdpBrowser::launch(config)
                .await
                .map_err(|e| ProbeError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = cdp
            .new_page("about:blank")
            .await
            .map_err(|e| ProbeError::BrowserLaunch {
                message: e.to_string(),
            })?;

        tracing::info!(
            %browser,
            headless = settings.headless(),
            sandbox = settings.sandbox(),
            "browser launched"
        );
        Ok(Self {
            browser: Mutex::new(cdp),
            page,
            handler,
        })
    }
}

fn cdp_error(e: &CdpError) -> ProbeError {
    ProbeError::driver(e.to_string())
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> ProbeResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ProbeError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn find_elements(&self, locator: &Locator) -> ProbeResult<Vec<Element>> {
        let found = self
            .page
            .find_elements(locator.to_css())
            .await
            .map_err(|e| cdp_error(&e))?;
        let label = locator.to_string();
        Ok(found
            .into_iter()
            .map(|inner| {
                Box::new(ChromiumElement {
                    inner,
                    locator: label.clone(),
                }) as Element
            })
            .collect())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self
            .page
            .url()
            .await
            .map_err(|e| cdp_error(&e))?
            .unwrap_or_default())
    }

    async fn title(&self) -> ProbeResult<String> {
        Ok(self
            .page
            .get_title()
            .await
            .map_err(|e| cdp_error(&e))?
            .unwrap_or_default())
    }

    async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let screenshot = self
            .page
            .execute(params)
            .await
            .map_err(|e| cdp_error(&e))?;

        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|e| ProbeError::driver(format!("screenshot decode failed: {e}")))
    }

    async fn quit(&self) -> ProbeResult<()> {
        let mut browser = self.browser.lock().await;
        let closed = browser.close().await.map_err(|e| cdp_error(&e));
        let _ = browser.wait().await;
        self.handler.abort();
        tracing::debug!("browser closed");
        closed.map(|_| ())
    }
}

/// Element found on a [`ChromiumDriver`] page
#[derive(Debug)]
pub struct ChromiumElement {
    inner: CdpElement,
    locator: String,
}

impl ChromiumElement {
    fn stale(&self) -> ProbeError {
        ProbeError::StaleElement {
            locator: self.locator.clone(),
        }
    }

    fn map_err(&self, e: &CdpError) -> ProbeError {
        let message = e.to_string();
        let lower = message.to_lowercase();
        if lower.contains("no node") || lower.contains("could not find node") {
            self.stale()
        } else {
            ProbeError::driver(message)
        }
    }

    /// Run `function` with the element as `this`; `null` means detached
    async fn call(&self, function: impl Into<String>) -> ProbeResult<Value> {
        let returns = self
            .inner
            .call_js_fn(function, false)
            .await
            .map_err(|e| self.map_err(&e))?;
        match returns.result.value {
            None | Some(Value::Null) => Err(self.stale()),
            Some(value) => Ok(value),
        }
    }

    async fn call_bool(&self, function: &str) -> ProbeResult<bool> {
        Ok(self.call(function).await?.as_bool().unwrap_or(false))
    }
}

#[async_trait]
impl ElementHandle for ChromiumElement {
    async fn click(&self) -> ProbeResult<()> {
        self.call(JS_CONNECTED).await?;
        self.inner.click().await.map_err(|e| self.map_err(&e))?;
        Ok(())
    }

    async fn clear(&self) -> ProbeResult<()> {
        self.call(JS_FOCUS_SELECT).await?;
        self.inner
            .press_key("Backspace")
            .await
            .map_err(|e| self.map_err(&e))?;
        Ok(())
    }

    async fn send_keys(&self, text: &str) -> ProbeResult<()> {
        self.inner.focus().await.map_err(|e| self.map_err(&e))?;
        self.inner
            .type_str(text)
            .await
            .map_err(|e| self.map_err(&e))?;
        Ok(())
    }

    async fn text(&self) -> ProbeResult<String> {
        self.call(JS_CONNECTED).await?;
        Ok(self
            .inner
            .inner_text()
            .await
            .map_err(|e| self.map_err(&e))?
            .unwrap_or_default())
    }

    async fn is_displayed(&self) -> ProbeResult<bool> {
        self.call_bool(JS_IS_DISPLAYED).await
    }

    async fn is_enabled(&self) -> ProbeResult<bool> {
        self.call_bool(JS_IS_ENABLED).await
    }

    async fn select_by_value(&self, value: &str) -> ProbeResult<()> {
        let literal = serde_json::to_string(value)
            .map_err(|e| ProbeError::driver(e.to_string()))?;
        let function = format!(
            "function() {{
                if (!this.isConnected) return null;
                const option = Array.from(this.options || []).find(o => o.value === {literal});
                if (!option) return false;
                this.value = option.value;
                this.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }}"
        );
        if self.call(function).await?.as_bool().unwrap_or(false) {
            Ok(())
        } else {
            Err(ProbeError::NoSuchOption {
                value: value.to_string(),
            })
        }
    }
}
