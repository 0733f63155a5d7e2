//! storeprobe CLI library
//!
//! Command-line front end for the storeprobe page-object suite: scenario
//! selection, backend choice, settings overrides and reporting.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{
    BackendArg, Cli, ColorArg, Commands, ConfigArgs, ConfigFormat, ListArgs, RunArgs, SelectArgs,
    SettingsArgs,
};
pub use config::{resolve_settings, CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{scenario_listing, summary_line, OutputFormat, ProgressReporter};
pub use runner::{factory, json_report, list, render_settings, select, ScenarioRunner};
