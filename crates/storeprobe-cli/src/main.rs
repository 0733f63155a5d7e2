//! storeprobe: page-object browser tests for the Swag Labs storefront
//!
//! ## Usage
//!
//! ```bash
//! storeprobe run                         # Whole suite on the mock storefront
//! storeprobe run --tag smoke             # Smoke scenarios only
//! storeprobe run -b chromium --headed    # Real browser (needs --features browser)
//! storeprobe list --tag checkout         # Show matching scenarios
//! storeprobe config --format json        # Show resolved settings
//! ```

use clap::Parser;
use std::process::ExitCode;
use storeprobe_cli::{
    list, render_settings, resolve_settings, Cli, CliConfig, CliResult, ColorChoice, Commands,
    ScenarioRunner, Verbosity,
};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<bool> {
    let cli = Cli::parse();

    let config = build_config(&cli);
    init_tracing(config);

    match cli.command {
        Commands::Run(args) => {
            let settings = resolve_settings(&cli.settings)?;
            ScenarioRunner::new(config, settings, args).run()
        }
        Commands::List(args) => {
            list(&args.select);
            Ok(true)
        }
        Commands::Config(args) => {
            let settings = resolve_settings(&cli.settings)?;
            print!("{}", render_settings(&settings, &args)?);
            Ok(true)
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.into();

    console::set_colors_enabled(color.should_color());
    console::set_colors_enabled_stderr(color.should_color());

    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

fn init_tracing(config: CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.filter_directive()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(config.color.should_color())
        .with_target(false)
        .try_init();
}
