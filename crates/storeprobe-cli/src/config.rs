//! CLI configuration

use crate::commands::SettingsArgs;
use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use storeprobe::Settings;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - errors only
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - navigation and session lifecycle
    Verbose,
    /// Debug - every wait and poll
    Debug,
    /// Trace - storefront internals
    Trace,
}

impl Verbosity {
    /// Map `-q` / `-v` counts to a level
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// `tracing` filter used when `RUST_LOG` is unset
    #[must_use]
    pub const fn filter_directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "storeprobe=info,warn",
            Self::Debug => "storeprobe=debug,info",
            Self::Trace => "storeprobe=trace,debug",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::Term::stdout().features().colors_supported(),
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }
}

/// Load settings, then apply command-line overrides
pub fn resolve_settings(args: &SettingsArgs) -> CliResult<Settings> {
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(url) = &args.base_url {
        settings = settings.with_base_url(url.clone());
    }
    if let Some(browser) = &args.browser {
        settings = settings.with_browser(browser.clone());
    }
    if args.headless {
        settings = settings.with_headless(true);
    }
    if args.headed {
        settings = settings.with_headless(false);
    }
    if let Some(seconds) = args.explicit_wait {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(CliError::invalid_argument(format!(
                "--explicit-wait must be a positive number of seconds, got {seconds}"
            )));
        }
        settings = settings.with_explicit_wait(Duration::from_secs_f64(seconds));
    }
    settings.validate()?;
    tracing::debug!(
        base_url = settings.base_url(),
        browser = %settings.run.browser,
        explicit_wait_ms = settings.explicit_wait().as_millis() as u64,
        "resolved settings"
    );
    Ok(settings)
}
