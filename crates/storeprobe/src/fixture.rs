//! Session fixture: one browser per scenario, always torn down.
//!
//! ```text
//! setup ──▶ validate browser ──▶ launch ──▶ open base URL
//!   │
//!   ▼
//! scenario body (error or panic captured)
//!   │
//!   ├─ failed? ──▶ notify failure hooks (screenshot, ...)
//!   ▼
//! quit session ──▶ return result / resume panic
//! ```

use crate::config::Settings;
use crate::driver::DriverFactory;
use crate::result::ProbeResult;
use crate::session::Session;
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::fmt::Debug;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Why a scenario failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The scenario returned an error
    Error(String),
    /// The scenario panicked
    Panic(String),
}

impl Failure {
    /// Failure message
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Error(m) | Self::Panic(m) => m,
        }
    }

    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panic(message)
    }
}

/// Notified once when a scenario fails, before its session closes.
///
/// Hooks cannot change the outcome; their own errors are logged and dropped.
#[async_trait]
pub trait FailureHook: Send + Sync + Debug {
    /// Hook name for logs
    fn name(&self) -> &str;

    /// React to a failed scenario
    async fn on_failure(&self, scenario: &str, session: &Session, failure: &Failure) -> ProbeResult<()>;
}

/// Writes `<dir>/<scenario>.png` when a scenario fails
#[derive(Debug, Clone)]
pub struct ScreenshotHook {
    dir: PathBuf,
}

impl ScreenshotHook {
    /// Save into `dir` (created on demand)
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Save into the configured `screenshot_path`
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.screenshot_path())
    }

    /// Target directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a scenario's screenshot is written to
    #[must_use]
    pub fn path_for(&self, scenario: &str) -> PathBuf {
        let file: String = scenario
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file}.png"))
    }
}

#[async_trait]
impl FailureHook for ScreenshotHook {
    fn name(&self) -> &str {
        "screenshot"
    }

    async fn on_failure(&self, scenario: &str, session: &Session, _failure: &Failure) -> ProbeResult<()> {
        let png = session.screenshot().await?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(scenario);
        tokio::fs::write(&path, png).await?;
        tracing::info!(path = %path.display(), "saved failure screenshot");
        Ok(())
    }
}

/// Acquires and releases one session per scenario
#[derive(Debug, Clone)]
pub struct SessionFixture {
    settings: Arc<Settings>,
    factory: Arc<dyn DriverFactory>,
    hooks: Vec<Arc<dyn FailureHook>>,
}

impl SessionFixture {
    /// Fixture with no failure hooks
    #[must_use]
    pub fn new(settings: Arc<Settings>, factory: Arc<dyn DriverFactory>) -> Self {
        Self {
            settings,
            factory,
            hooks: Vec::new(),
        }
    }

    /// Register a failure hook
    #[must_use]
    pub fn with_hook(mut self, hook: impl FailureHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Register a [`ScreenshotHook`] for the configured directory
    #[must_use]
    pub fn with_screenshots(self) -> Self {
        let hook = ScreenshotHook::from_settings(&self.settings);
        self.with_hook(hook)
    }

    /// Settings every session gets
    #[must_use]
    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// Backend name
    #[must_use]
    pub fn backend(&self) -> &str {
        self.factory.name()
    }

    /// Registered hooks
    #[must_use]
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Launch a browser and open the storefront.
    ///
    /// The browser name is checked before anything is launched.
    pub async fn setup(&self) -> ProbeResult<Session> {
        let browser = self.settings.browser().map_err(|e| {
            tracing::error!(browser = %self.settings.run.browser, "unsupported browser");
            e
        })?;
        tracing::info!(backend = self.factory.name(), %browser, "starting session");
        let driver = self.factory.launch(&self.settings, browser).await?;
        let session = Session::new(driver, Arc::clone(&self.settings));
        if let Err(e) = session.open_base().await {
            Self::teardown(&session).await;
            return Err(e);
        }
        Ok(session)
    }

    /// Close a session, logging rather than returning errors
    pub async fn teardown(session: &Session) {
        if let Err(e) = session.quit().await {
            tracing::warn!(error = %e, "failed to close session");
        }
    }

    /// Run `body` on a fresh session.
    ///
    /// The session is closed whether `body` succeeds, fails or panics. Hooks
    /// run only on failure. A panic is re-raised after teardown.
    pub async fn run_with_session<F, Fut, T>(&self, scenario: &str, body: F) -> ProbeResult<T>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = ProbeResult<T>>,
    {
        let session = self.setup().await?;
        let outcome = AssertUnwindSafe(body(session.clone())).catch_unwind().await;

        let failure = match &outcome {
            Ok(Ok(_)) => None,
            Ok(Err(e)) => Some(Failure::Error(e.to_string())),
            Err(payload) => Some(Failure::from_panic(&**payload)),
        };
        if let Some(failure) = &failure {
            tracing::warn!(scenario, failure = failure.message(), "scenario failed");
            self.notify(scenario, &session, failure).await;
        }

        Self::teardown(&session).await;

        match outcome {
            Ok(result) => result,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }

    async fn notify(&self, scenario: &str, session: &Session, failure: &Failure) {
        for hook in &self.hooks {
            if let Err(e) = hook.on_failure(scenario, session, failure).await {
                tracing::warn!(hook = hook.name(), error = %e, "failure hook failed");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::BrowserKind;
    use crate::result::ProbeError;
    use crate::driver::BrowserDriver;
    use crate::mock::{MockDriver, Storefront};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Launches mock drivers and keeps a handle to each for inspection
    #[derive(Debug, Default)]
    struct KeepingLauncher {
        launched: Mutex<Vec<MockDriver>>,
    }

    impl KeepingLauncher {
        fn last(&self) -> Option<MockDriver> {
            self.launched.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl DriverFactory for KeepingLauncher {
        fn name(&self) -> &str {
            "keeping"
        }

        async fn launch(&self, _: &Settings, _: BrowserKind) -> ProbeResult<Arc<dyn BrowserDriver>> {
            let driver = MockDriver::new();
            self.launched.lock().unwrap().push(driver.clone());
            Ok(Arc::new(driver))
        }
    }

    #[derive(Debug, Default)]
    struct RecordingHook {
        seen: Mutex<Vec<(String, Failure)>>,
    }

    #[async_trait]
    impl FailureHook for Arc<RecordingHook> {
        fn name(&self) -> &str {
            "recording"
        }

        async fn on_failure(&self, scenario: &str, _: &Session, failure: &Failure) -> ProbeResult<()> {
            self.seen
                .lock()
                .unwrap()
                .push((scenario.to_string(), failure.clone()));
            Ok(())
        }
    }

    fn settings() -> Settings {
        Settings::default()
            .with_base_url(Storefront::BASE_URL)
            .with_explicit_wait(Duration::from_millis(100))
            .with_poll_interval(Duration::from_millis(10))
    }

    fn fixture(settings: Settings) -> (SessionFixture, Arc<KeepingLauncher>, Arc<RecordingHook>) {
        let launcher = Arc::new(KeepingLauncher::default());
        let hook = Arc::new(RecordingHook::default());
        let fixture =
            SessionFixture::new(Arc::new(settings), launcher.clone()).with_hook(hook.clone());
        (fixture, launcher, hook)
    }

    mod setup_tests {
        use super::*;

        #[tokio::test]
        async fn test_setup_opens_base_url() {
            let (fixture, _, _) = fixture(settings());
            let session = fixture.setup().await.unwrap();
            assert_eq!(
                session.driver().current_url().await.unwrap(),
                Storefront::BASE_URL
            );
        }

        #[tokio::test]
        async fn test_unknown_browser_fails_before_launch() {
            let (fixture, launcher, _) = fixture(settings().with_browser("netscape"));
            let err = fixture.setup().await.unwrap_err();
            assert!(matches!(err, ProbeError::UnsupportedBrowser { .. }));
            assert!(launcher.last().is_none());
        }

        #[tokio::test]
        async fn test_bad_base_url_closes_session() {
            let (fixture, launcher, _) =
                fixture(settings().with_base_url("https://www.saucedemo.com/missing.html"));
            assert!(matches!(
                fixture.setup().await.unwrap_err(),
                ProbeError::Navigation { .. }
            ));
            assert!(launcher.last().unwrap().is_closed());
        }
    }

    mod run_tests {
        use super::*;

        #[tokio::test]
        async fn test_success_closes_without_hooks() {
            let (fixture, launcher, hook) = fixture(settings());
            let value = fixture
                .run_with_session("passes", |_session| async { Ok(42) })
                .await
                .unwrap();
            assert_eq!(value, 42);
            assert!(launcher.last().unwrap().is_closed());
            assert!(hook.seen.lock().unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_error_notifies_and_closes() {
            let (fixture, launcher, hook) = fixture(settings());
            let err = fixture
                .run_with_session("fails", |_session| async {
                    Err::<(), _>(ProbeError::assertion("badge was 2"))
                })
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::AssertionFailed { .. }));
            assert!(launcher.last().unwrap().is_closed());
            let seen = hook.seen.lock().unwrap();
            assert_eq!(seen.len(), 1);
            assert_eq!(seen[0].0, "fails");
            assert!(seen[0].1.message().contains("badge was 2"));
        }

        #[tokio::test]
        async fn test_panic_notifies_closes_and_resumes() {
            let (fixture, launcher, hook) = fixture(settings());
            let outcome = AssertUnwindSafe(fixture.run_with_session("panics", |_session| async {
                if true {
                    panic!("boom");
                }
                Ok(())
            }))
            .catch_unwind()
            .await;
            assert!(outcome.is_err());
            assert!(launcher.last().unwrap().is_closed());
            let seen = hook.seen.lock().unwrap();
            assert_eq!(seen[0].1, Failure::Panic("boom".to_string()));
        }
    }

    mod screenshot_tests {
        use super::*;

        #[test]
        fn test_path_is_sanitized() {
            let hook = ScreenshotHook::new("shots");
            assert_eq!(
                hook.path_for("test_checkout::missing zip"),
                Path::new("shots").join("test_checkout__missing_zip.png")
            );
        }

        #[tokio::test]
        async fn test_failure_writes_png() {
            let dir = tempfile::tempdir().unwrap();
            let shots = dir.path().join("screenshots");
            let fixture = SessionFixture::new(
                Arc::new(settings().with_screenshot_path(&shots)),
                Arc::new(KeepingLauncher::default()),
            )
            .with_screenshots();
            assert_eq!(fixture.hook_count(), 1);

            let _ = fixture
                .run_with_session("test_invalid_login", |_session| async {
                    Err::<(), _>(ProbeError::assertion("nope"))
                })
                .await;

            let png = std::fs::read(shots.join("test_invalid_login.png")).unwrap();
            assert_eq!(&png[1..4], b"PNG");
        }

        #[tokio::test]
        async fn test_success_writes_nothing() {
            let dir = tempfile::tempdir().unwrap();
            let fixture = SessionFixture::new(
                Arc::new(settings().with_screenshot_path(dir.path())),
                Arc::new(KeepingLauncher::default()),
            )
            .with_screenshots();
            fixture
                .run_with_session("ok", |_session| async { Ok(()) })
                .await
                .unwrap();
            assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        }
    }
}
