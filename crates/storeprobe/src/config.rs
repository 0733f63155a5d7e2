//! Suite configuration.
//!
//! Loaded once per process and handed to every session as `Arc<Settings>`.
//! Nothing mutates it after load.
//!
//! ```yaml
//! settings:
//!   base_url: https://www.saucedemo.com/
//!   browser: chrome
//!   headless: true
//!   implicit_wait: 5
//!   explicit_wait: 10
//! credentials:
//!   valid_username: standard_user
//!   valid_password: secret_sauce
//!   invalid_username: invalid_user
//!   invalid_password: wrong_password
//!   locked_username: locked_out_user
//! paths:
//!   screenshot_path: screenshots
//! ```

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable naming the settings file
pub const CONFIG_ENV: &str = "STOREPROBE_CONFIG";

/// Settings file used when neither a path nor [`CONFIG_ENV`] is given
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Default polling interval for explicit waits (500ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Chromium switches passed to every launched browser
pub const BROWSER_ARGS: &[&str] = &[
    "--start-maximized",
    "--disable-notifications",
    "--disable-gpu",
    "--disable-features=PasswordLeakDetection",
    "--disable-save-password-bubble",
    "--password-store=basic",
    "--disable-blink-features=AutomationControlled",
];

const ENV_BASE_URL: &str = "STOREPROBE_BASE_URL";
const ENV_BROWSER: &str = "STOREPROBE_BROWSER";
const ENV_HEADLESS: &str = "STOREPROBE_HEADLESS";

/// Browsers a backend can be asked to launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    /// Google Chrome
    Chrome,
    /// Chromium
    Chromium,
    /// Microsoft Edge (Chromium based, needs `browser_path`)
    Edge,
}

impl BrowserKind {
    /// Configuration name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Chromium => "chromium",
            Self::Edge => "edge",
        }
    }
}

impl FromStr for BrowserKind {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chrome" => Ok(Self::Chrome),
            "chromium" => Ok(Self::Chromium),
            "edge" => Ok(Self::Edge),
            _ => Err(ProbeError::UnsupportedBrowser {
                name: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `settings` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Storefront entry URL (the login page)
    pub base_url: String,
    /// Browser name; validated at session setup, not at load
    pub browser: String,
    /// Run without a visible window
    pub headless: bool,
    /// Driver-level request timeout in seconds
    pub implicit_wait: u64,
    /// Explicit wait timeout in seconds
    pub explicit_wait: f64,
    /// Polling interval for explicit waits
    pub poll_interval_ms: u64,
    /// Browser executable override
    pub browser_path: Option<String>,
    /// Keep the Chromium sandbox; must stay off when running as root
    pub sandbox: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.saucedemo.com/".to_string(),
            browser: "chrome".to_string(),
            headless: true,
            implicit_wait: 5,
            explicit_wait: 10.0,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            browser_path: None,
            sandbox: false,
        }
    }
}

/// `credentials` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Account that can log in
    pub valid_username: String,
    /// Password shared by all demo accounts
    pub valid_password: String,
    /// Unknown account name
    pub invalid_username: String,
    /// Wrong password
    pub invalid_password: String,
    /// Account the storefront refuses
    pub locked_username: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            valid_username: "standard_user".to_string(),
            valid_password: "secret_sauce".to_string(),
            invalid_username: "invalid_user".to_string(),
            invalid_password: "wrong_password".to_string(),
            locked_username: "locked_out_user".to_string(),
        }
    }
}

/// `paths` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Directory failure screenshots are written to
    pub screenshot_path: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            screenshot_path: PathBuf::from("screenshots"),
        }
    }
}

/// Complete, read-only configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `settings` section
    #[serde(rename = "settings")]
    pub run: RunSettings,
    /// `credentials` section
    pub credentials: Credentials,
    /// `paths` section
    pub paths: Paths,
}

impl Settings {
    /// Resolve and load settings.
    ///
    /// Order: `path`, then [`CONFIG_ENV`], then [`DEFAULT_CONFIG_FILE`] if it
    /// exists, then built-in defaults. Environment overrides apply last.
    pub fn load(path: Option<&Path>) -> ProbeResult<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let settings = match explicit {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                tracing::debug!("no settings file found, using built-in defaults");
                Self::default()
            }
        };

        settings.with_overrides(|key| std::env::var(key).ok())
    }

    /// Load from a YAML file
    pub fn from_file(path: &Path) -> ProbeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProbeError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        let settings = Self::from_yaml_str(&content)?;
        tracing::info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Parse YAML text
    pub fn from_yaml_str(content: &str) -> ProbeResult<Self> {
        let settings: Self = serde_yaml_ng::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply `STOREPROBE_*` overrides through `lookup`
    pub fn with_overrides<F>(mut self, lookup: F) -> ProbeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.run.base_url = url;
        }
        if let Some(browser) = lookup(ENV_BROWSER) {
            self.run.browser = browser;
        }
        if let Some(headless) = lookup(ENV_HEADLESS) {
            self.run.headless = headless.trim().eq_ignore_ascii_case("true");
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject values no session could run with
    pub fn validate(&self) -> ProbeResult<()> {
        if self.run.base_url.trim().is_empty() {
            return Err(ProbeError::config("settings.base_url must not be empty"));
        }
        if !self.run.explicit_wait.is_finite() || self.run.explicit_wait <= 0.0 {
            return Err(ProbeError::config(
                "settings.explicit_wait must be a positive number of seconds",
            ));
        }
        if self.run.poll_interval_ms == 0 {
            return Err(ProbeError::config("settings.poll_interval_ms must be > 0"));
        }
        Ok(())
    }

    /// Storefront entry URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.run.base_url
    }

    /// Configured browser, checked against supported kinds
    pub fn browser(&self) -> ProbeResult<BrowserKind> {
        self.run.browser.parse()
    }

    /// Run headless
    #[must_use]
    pub const fn headless(&self) -> bool {
        self.run.headless
    }

    /// Driver-level request timeout
    #[must_use]
    pub const fn implicit_wait(&self) -> Duration {
        Duration::from_secs(self.run.implicit_wait)
    }

    /// The one timeout every explicit wait uses, to the millisecond
    #[must_use]
    pub fn explicit_wait(&self) -> Duration {
        Duration::from_millis((self.run.explicit_wait * 1000.0).round() as u64)
    }

    /// Polling interval for explicit waits
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.run.poll_interval_ms)
    }

    /// Whether the browser keeps its sandbox
    #[must_use]
    pub const fn sandbox(&self) -> bool {
        self.run.sandbox
    }

    /// Login credentials
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Failure screenshot directory
    #[must_use]
    pub fn screenshot_path(&self) -> &Path {
        &self.paths.screenshot_path
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.run.base_url = url.into();
        self
    }

    /// Set browser name
    #[must_use]
    pub fn with_browser(mut self, browser: impl Into<String>) -> Self {
        self.run.browser = browser.into();
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.run.headless = headless;
        self
    }

    /// Set sandboxing
    #[must_use]
    pub const fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.run.sandbox = sandbox;
        self
    }

    /// Set explicit wait timeout
    #[must_use]
    pub fn with_explicit_wait(mut self, timeout: Duration) -> Self {
        self.run.explicit_wait = timeout.as_secs_f64();
        self
    }

    /// Set polling interval
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.run.poll_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX).max(1);
        self
    }

    /// Set screenshot directory
    #[must_use]
    pub fn with_screenshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.screenshot_path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    mod browser_kind_tests {
        use super::*;

        #[test]
        fn test_parse_is_case_insensitive() {
            assert_eq!("Chrome".parse::<BrowserKind>().unwrap(), BrowserKind::Chrome);
            assert_eq!(" EDGE ".parse::<BrowserKind>().unwrap(), BrowserKind::Edge);
            assert_eq!(
                "chromium".parse::<BrowserKind>().unwrap(),
                BrowserKind::Chromium
            );
        }

        #[test]
        fn test_unknown_browser_is_rejected() {
            let err = "safari".parse::<BrowserKind>().unwrap_err();
            assert!(matches!(err, ProbeError::UnsupportedBrowser { ref name } if name == "safari"));
        }

        #[test]
        fn test_display_roundtrip() {
            for kind in [BrowserKind::Chrome, BrowserKind::Chromium, BrowserKind::Edge] {
                assert_eq!(kind.to_string().parse::<BrowserKind>().unwrap(), kind);
            }
        }
    }

    mod load_tests {
        use super::*;
        use std::io::Write;

        const SAMPLE: &str = r"
settings:
  base_url: http://localhost:3000/
  browser: Chromium
  headless: false
  implicit_wait: 3
  explicit_wait: 2.5
credentials:
  valid_username: standard_user
  valid_password: secret_sauce
  invalid_username: nobody
  invalid_password: nope
  locked_username: locked_out_user
paths:
  screenshot_path: target/shots
";

        #[test]
        fn test_from_yaml_str() {
            let settings = Settings::from_yaml_str(SAMPLE).unwrap();
            assert_eq!(settings.base_url(), "http://localhost:3000/");
            assert_eq!(settings.browser().unwrap(), BrowserKind::Chromium);
            assert!(!settings.headless());
            assert_eq!(settings.implicit_wait(), Duration::from_secs(3));
            assert_eq!(settings.explicit_wait(), Duration::from_millis(2500));
            assert_eq!(settings.poll_interval(), Duration::from_millis(500));
            assert_eq!(settings.credentials().invalid_username, "nobody");
            assert_eq!(settings.screenshot_path(), Path::new("target/shots"));
        }

        #[test]
        fn test_missing_sections_use_defaults() {
            let settings = Settings::from_yaml_str("settings:\n  browser: edge\n").unwrap();
            assert_eq!(settings.base_url(), "https://www.saucedemo.com/");
            assert_eq!(settings.credentials(), &Credentials::default());
        }

        #[test]
        fn test_unknown_browser_loads_but_fails_on_access() {
            let settings = Settings::from_yaml_str("settings:\n  browser: opera\n").unwrap();
            assert!(settings.browser().is_err());
        }

        #[test]
        fn test_invalid_values_rejected() {
            assert!(Settings::from_yaml_str("settings:\n  explicit_wait: 0\n").is_err());
            assert!(Settings::from_yaml_str("settings:\n  base_url: ''\n").is_err());
            assert!(Settings::from_yaml_str("settings:\n  poll_interval_ms: 0\n").is_err());
        }

        #[test]
        fn test_from_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(SAMPLE.as_bytes()).unwrap();
            let settings = Settings::from_file(file.path()).unwrap();
            assert_eq!(settings.base_url(), "http://localhost:3000/");
        }

        #[test]
        fn test_explicit_missing_file_is_error() {
            let result = Settings::load(Some(Path::new("/definitely/not/here.yaml")));
            assert!(matches!(result, Err(ProbeError::Config { .. })));
        }
    }

    mod override_tests {
        use super::*;

        #[test]
        fn test_overrides_apply() {
            let env: HashMap<&str, &str> = [
                ("STOREPROBE_BASE_URL", "http://shop.test/"),
                ("STOREPROBE_BROWSER", "edge"),
                ("STOREPROBE_HEADLESS", "FALSE"),
            ]
            .into_iter()
            .collect();

            let settings = Settings::default()
                .with_overrides(|k| env.get(k).map(|v| (*v).to_string()))
                .unwrap();

            assert_eq!(settings.base_url(), "http://shop.test/");
            assert_eq!(settings.browser().unwrap(), BrowserKind::Edge);
            assert!(!settings.headless());
        }

        #[test]
        fn test_no_overrides_is_identity() {
            let settings = Settings::default().with_overrides(|_| None).unwrap();
            assert_eq!(settings, Settings::default());
        }
    }

    mod builder_tests {
        use super::*;

        #[test]
        fn test_with_methods() {
            let settings = Settings::default()
                .with_base_url("http://x/")
                .with_browser("chromium")
                .with_headless(false)
                .with_explicit_wait(Duration::from_millis(250))
                .with_poll_interval(Duration::from_millis(5))
                .with_screenshot_path("shots");

            assert_eq!(settings.base_url(), "http://x/");
            assert_eq!(settings.explicit_wait(), Duration::from_millis(250));
            assert_eq!(settings.poll_interval(), Duration::from_millis(5));
            assert_eq!(settings.screenshot_path(), Path::new("shots"));
        }

        #[test]
        fn test_sandbox_off_by_default() {
            assert!(!Settings::default().sandbox());
            assert!(Settings::default().with_sandbox(true).sandbox());
            let settings = Settings::from_yaml_str("settings:\n  sandbox: true\n").unwrap();
            assert!(settings.sandbox());
        }

        #[test]
        fn test_browser_args_silence_password_prompts() {
            assert!(BROWSER_ARGS.contains(&"--disable-features=PasswordLeakDetection"));
            assert!(BROWSER_ARGS.contains(&"--disable-save-password-bubble"));
            assert!(BROWSER_ARGS.contains(&"--disable-notifications"));
            assert!(BROWSER_ARGS.iter().all(|arg| arg.starts_with("--")));
        }

        #[test]
        fn test_zero_poll_interval_clamps_to_one_ms() {
            let settings = Settings::default().with_poll_interval(Duration::ZERO);
            assert_eq!(settings.poll_interval(), Duration::from_millis(1));
        }
    }
}
