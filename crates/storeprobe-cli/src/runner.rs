//! Command handlers

use crate::commands::{BackendArg, ConfigArgs, ConfigFormat, RunArgs, SelectArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{scenario_listing, OutputFormat, ProgressReporter};
use std::sync::Arc;
use std::time::Duration;
use storeprobe::{
    scenarios, DriverFactory, MockLauncher, ScenarioFilter, SessionFixture, Settings,
    SuiteResults, TestHarness, TestSuite,
};

/// Scenarios matching `--tag` / `--filter`
#[must_use]
pub fn select(args: &SelectArgs) -> TestSuite {
    let mut filter = ScenarioFilter::new();
    for tag in &args.tags {
        filter = filter.with_tag(tag.clone());
    }
    if let Some(name) = &args.filter {
        filter = filter.with_name(name.clone());
    }
    scenarios::suite().filtered(&filter)
}

/// Driver factory for the chosen backend
pub fn factory(backend: BackendArg, render_delay_ms: u64) -> CliResult<Arc<dyn DriverFactory>> {
    match backend {
        BackendArg::Mock => Ok(Arc::new(
            MockLauncher::new().with_render_delay(Duration::from_millis(render_delay_ms)),
        )),
        #[cfg(feature = "browser")]
        BackendArg::Chromium => Ok(Arc::new(storeprobe::ChromiumLauncher::new())),
        #[cfg(not(feature = "browser"))]
        BackendArg::Chromium => Err(CliError::invalid_argument(
            "the chromium backend requires the `browser` feature. Rebuild with --features browser",
        )),
    }
}

/// Runs the selected scenarios
#[derive(Debug)]
pub struct ScenarioRunner {
    config: CliConfig,
    settings: Arc<Settings>,
    args: RunArgs,
}

impl ScenarioRunner {
    /// Create a runner for resolved settings
    #[must_use]
    pub fn new(config: CliConfig, settings: Settings, args: RunArgs) -> Self {
        Self {
            config,
            settings: Arc::new(settings),
            args,
        }
    }

    fn format(&self) -> OutputFormat {
        if self.args.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }

    fn fixture(&self) -> CliResult<SessionFixture> {
        let factory = factory(self.args.backend, self.args.render_delay_ms)?;
        let fixture = SessionFixture::new(Arc::clone(&self.settings), factory);
        Ok(if self.args.no_screenshots {
            fixture
        } else {
            fixture.with_screenshots()
        })
    }

    /// Run and report. Returns whether every scenario passed.
    pub fn run(&self) -> CliResult<bool> {
        let suite = select(&self.args.select);
        let fixture = self.fixture()?;
        let format = self.format();

        let mut reporter = ProgressReporter::new(
            self.config.color.should_color(),
            self.config.verbosity.is_quiet() || format == OutputFormat::Json,
        );

        if suite.scenario_count() == 0 {
            reporter.info("No scenarios match the selection");
        } else {
            reporter.header(&format!(
                "{} ({} scenarios, {} backend)",
                suite.name,
                suite.scenario_count(),
                fixture.backend()
            ));
        }

        tracing::info!(
            backend = fixture.backend(),
            base_url = self.settings.base_url(),
            browser = %self.settings.run.browser,
            headless = self.settings.headless(),
            scenarios = suite.scenario_count(),
            "starting run"
        );

        let harness = TestHarness {
            fail_fast: self.args.fail_fast,
        };
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        reporter.start_progress(suite.scenario_count() as u64, "running scenarios");
        let results = runtime.block_on(harness.run_with(&suite, &fixture, |result| {
            reporter.scenario(result);
        }));
        reporter.finish();
        tracing::info!(
            passed = results.passed_count(),
            failed = results.failed_count(),
            "run finished"
        );

        match format {
            OutputFormat::Json => println!("{}", json_report(&results)?),
            OutputFormat::Text => reporter.summary(&results),
        }

        Ok(results.all_passed())
    }
}

/// Pretty JSON for `run --json`
pub fn json_report(results: &SuiteResults) -> CliResult<String> {
    serde_json::to_string_pretty(results).map_err(|e| CliError::report_generation(e.to_string()))
}

/// `storeprobe list`
pub fn list(args: &SelectArgs) {
    let suite = select(args);
    for scenario in suite.scenarios() {
        println!("{}", scenario_listing(scenario));
    }
}

/// `storeprobe config`
pub fn render_settings(settings: &Settings, args: &ConfigArgs) -> CliResult<String> {
    match args.format {
        ConfigFormat::Yaml => serde_yaml_ng::to_string(settings)
            .map_err(|e| CliError::report_generation(e.to_string())),
        ConfigFormat::Json => serde_json::to_string_pretty(settings)
            .map_err(|e| CliError::report_generation(e.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{ColorChoice, Verbosity};

    fn run_args(tags: &[&str]) -> RunArgs {
        RunArgs {
            select: SelectArgs {
                tags: tags.iter().map(ToString::to_string).collect(),
                filter: None,
            },
            backend: BackendArg::Mock,
            fail_fast: false,
            json: true,
            no_screenshots: true,
            render_delay_ms: 0,
        }
    }

    fn fast_settings() -> Settings {
        Settings::default()
            .with_explicit_wait(Duration::from_secs(2))
            .with_poll_interval(Duration::from_millis(10))
    }

    fn quiet() -> CliConfig {
        CliConfig::new()
            .with_verbosity(Verbosity::Quiet)
            .with_color(ColorChoice::Never)
    }

    mod select_tests {
        use super::*;

        #[test]
        fn test_no_selection_is_whole_suite() {
            assert_eq!(
                select(&SelectArgs::default()).scenario_count(),
                scenarios::suite().scenario_count()
            );
        }

        #[test]
        fn test_tags_are_any_of() {
            let login = select(&SelectArgs {
                tags: vec!["login".to_string()],
                filter: None,
            });
            let both = select(&SelectArgs {
                tags: vec!["login".to_string(), "cart".to_string()],
                filter: None,
            });
            assert_eq!(login.scenario_count(), 8);
            assert_eq!(both.scenario_count(), 15);
        }

        #[test]
        fn test_filter_by_name() {
            let suite = select(&SelectArgs {
                tags: Vec::new(),
                filter: Some("e2e".to_string()),
            });
            assert!(suite.get("test_full_e2e_flow").is_some());
        }
    }

    mod factory_tests {
        use super::*;

        #[test]
        fn test_mock_factory() {
            assert_eq!(factory(BackendArg::Mock, 0).unwrap().name(), "mock");
        }

        #[cfg(not(feature = "browser"))]
        #[test]
        fn test_chromium_needs_feature() {
            let err = factory(BackendArg::Chromium, 0).unwrap_err();
            assert!(err.to_string().contains("browser"));
        }
    }

    mod run_tests {
        use super::*;

        #[test]
        fn test_login_scenarios_pass_on_mock() {
            let runner = ScenarioRunner::new(quiet(), fast_settings(), run_args(&["login"]));
            assert!(runner.run().unwrap());
        }

        #[test]
        fn test_unsupported_browser_fails_run() {
            let settings = fast_settings().with_browser("safari");
            let mut args = run_args(&["smoke"]);
            args.fail_fast = true;
            let runner = ScenarioRunner::new(quiet(), settings, args);
            assert!(!runner.run().unwrap());
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_yaml_uses_file_sections() {
            let text = render_settings(
                &Settings::default(),
                &ConfigArgs {
                    format: ConfigFormat::Yaml,
                },
            )
            .unwrap();
            assert!(text.contains("settings:"));
            assert!(text.contains("credentials:"));
            assert!(text.contains("base_url"));
        }

        #[test]
        fn test_json_parses() {
            let text = render_settings(
                &Settings::default(),
                &ConfigArgs {
                    format: ConfigFormat::Json,
                },
            )
            .unwrap();
            let value: serde_json::Value = serde_json::from_str(&text).unwrap();
            assert!(value["settings"]["base_url"].is_string());
        }
    }
}
