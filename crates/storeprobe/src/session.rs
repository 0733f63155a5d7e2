//! One browser session bound to one scenario.

use crate::config::Settings;
use crate::driver::BrowserDriver;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::WaitHelper;
use std::sync::Arc;

/// A driver plus the read-only settings every page object needs.
///
/// Cloning is cheap; all clones share the same browser tab.
#[derive(Debug, Clone)]
pub struct Session {
    driver: Arc<dyn BrowserDriver>,
    settings: Arc<Settings>,
}

impl Session {
    /// Bind a driver to settings
    #[must_use]
    pub fn new(driver: Arc<dyn BrowserDriver>, settings: Arc<Settings>) -> Self {
        Self { driver, settings }
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn BrowserDriver> {
        &self.driver
    }

    /// Settings this session runs with
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Shared handle to the settings
    #[must_use]
    pub fn settings_arc(&self) -> Arc<Settings> {
        Arc::clone(&self.settings)
    }

    /// A wait helper using the configured timeout
    #[must_use]
    pub fn wait(&self) -> WaitHelper {
        WaitHelper::new(Arc::clone(&self.driver), &self.settings)
    }

    /// Navigate to an absolute URL
    pub async fn open(&self, url: &str) -> ProbeResult<()> {
        tracing::info!(%url, "navigating");
        self.driver
            .navigate(url)
            .await
            .map_err(|e| match e {
                ProbeError::Navigation { .. } => e,
                other => ProbeError::Navigation {
                    url: url.to_string(),
                    message: other.to_string(),
                },
            })
    }

    /// Navigate to the storefront entry page
    pub async fn open_base(&self) -> ProbeResult<()> {
        let url = self.settings.base_url().to_string();
        self.open(&url).await
    }

    /// Resolve a page path (`inventory.html`) against the base URL
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.settings.base_url().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// PNG of the current viewport
    pub async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        self.driver.screenshot().await
    }

    /// Close the browser
    pub async fn quit(&self) -> ProbeResult<()> {
        tracing::info!("closing session");
        self.driver.quit().await
    }
}
