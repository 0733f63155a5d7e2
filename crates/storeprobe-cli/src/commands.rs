//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// storeprobe: page-object browser tests for the Swag Labs storefront
#[derive(Parser, Debug)]
#[command(name = "storeprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Settings overrides
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags layered on top of the settings file
#[derive(Args, Debug, Default, Clone)]
pub struct SettingsArgs {
    /// Settings file (defaults to $STOREPROBE_CONFIG, then ./config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Storefront URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Browser to launch (chrome, chromium, edge)
    #[arg(long, global = true)]
    pub browser: Option<String>,

    /// Run the browser without a window
    #[arg(long, global = true, conflicts_with = "headed")]
    pub headless: bool,

    /// Run the browser with a window
    #[arg(long, global = true)]
    pub headed: bool,

    /// Explicit wait timeout in seconds
    #[arg(long, global = true)]
    pub explicit_wait: Option<f64>,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios
    Run(RunArgs),

    /// List scenarios
    List(ListArgs),

    /// Show resolved configuration
    Config(ConfigArgs),
}

/// Scenario selection shared by `run` and `list`
#[derive(Args, Debug, Default, Clone)]
pub struct SelectArgs {
    /// Only scenarios with this tag (repeatable, any-of)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Only scenarios whose name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Scenario selection
    #[command(flatten)]
    pub select: SelectArgs,

    /// Browser backend
    #[arg(short, long, default_value = "mock")]
    pub backend: BackendArg,

    /// Stop after the first failing scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Print the results as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Do not save screenshots of failing scenarios
    #[arg(long)]
    pub no_screenshots: bool,

    /// Mock backend: milliseconds each page stays blank after loading
    #[arg(long, default_value = "0")]
    pub render_delay_ms: u64,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Scenario selection
    #[command(flatten)]
    pub select: SelectArgs,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Output format
    #[arg(long, default_value = "yaml")]
    pub format: ConfigFormat,
}

/// Browser backend
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendArg {
    /// In-process storefront, no browser needed
    #[default]
    Mock,
    /// Real browser over CDP (needs the `browser` feature)
    Chromium,
}

/// Settings output format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    /// YAML, same shape as the settings file
    #[default]
    Yaml,
    /// JSON
    Json,
}

/// Color argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("storeprobe").chain(args.iter().copied())).unwrap()
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_run_defaults() {
            let cli = parse(&["run"]);
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.backend, BackendArg::Mock);
            assert!(args.select.tags.is_empty());
            assert!(!args.fail_fast);
            assert!(!args.json);
        }

        #[test]
        fn test_run_with_tags_and_filter() {
            let cli = parse(&["run", "-t", "smoke", "--tag", "cart", "-f", "badge", "--json"]);
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.select.tags, vec!["smoke", "cart"]);
            assert_eq!(args.select.filter.as_deref(), Some("badge"));
            assert!(args.json);
        }

        #[test]
        fn test_global_settings_after_subcommand() {
            let cli = parse(&["list", "--base-url", "http://localhost:8080/", "--headed"]);
            assert_eq!(
                cli.settings.base_url.as_deref(),
                Some("http://localhost:8080/")
            );
            assert!(cli.settings.headed);
        }

        #[test]
        fn test_headless_conflicts_with_headed() {
            assert!(Cli::try_parse_from(["storeprobe", "list", "--headless", "--headed"]).is_err());
        }

        #[test]
        fn test_verbose_count() {
            assert_eq!(parse(&["-vv", "config"]).verbose, 2);
        }

        #[test]
        fn test_subcommand_required() {
            assert!(Cli::try_parse_from(["storeprobe"]).is_err());
        }

        #[test]
        fn test_unknown_backend_rejected() {
            assert!(Cli::try_parse_from(["storeprobe", "run", "--backend", "selenium"]).is_err());
        }
    }
}
