//! Scenario harness: named, tagged scenarios run one session each.

use crate::fixture::{Failure, SessionFixture};
use crate::result::ProbeResult;
use crate::session::Session;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

/// Body of a scenario
pub type ScenarioFn = fn(Session) -> BoxFuture<'static, ProbeResult<()>>;

/// A single browser scenario
#[derive(Clone)]
pub struct Scenario {
    /// Scenario name, also used for failure screenshots
    pub name: &'static str,
    /// Tags used for selection (`smoke`, `regression`, page names)
    pub tags: &'static [&'static str],
    /// One-line description
    pub description: &'static str,
    run: ScenarioFn,
}

impl Scenario {
    /// Create a scenario
    #[must_use]
    pub const fn new(
        name: &'static str,
        tags: &'static [&'static str],
        description: &'static str,
        run: ScenarioFn,
    ) -> Self {
        Self {
            name,
            tags,
            description,
            run,
        }
    }

    /// Whether the scenario carries `tag`
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Scenario body
    #[must_use]
    pub const fn body(&self) -> ScenarioFn {
        self.run
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

/// Selects scenarios by tag and name
#[derive(Debug, Clone, Default)]
pub struct ScenarioFilter {
    tags: Vec<String>,
    name: Option<String>,
}

impl ScenarioFilter {
    /// Filter that accepts everything
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require at least one of the given tags
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Require the name to contain `needle`
    #[must_use]
    pub fn with_name(mut self, needle: impl Into<String>) -> Self {
        self.name = Some(needle.into());
        self
    }

    /// Whether `scenario` passes this filter
    #[must_use]
    pub fn matches(&self, scenario: &Scenario) -> bool {
        let tag_ok = self.tags.is_empty() || self.tags.iter().any(|t| scenario.has_tag(t));
        let name_ok = self
            .name
            .as_deref()
            .map_or(true, |needle| scenario.name.contains(needle));
        tag_ok && name_ok
    }
}

/// An ordered collection of scenarios
#[derive(Debug, Clone)]
pub struct TestSuite {
    /// Suite name
    pub name: String,
    scenarios: Vec<Scenario>,
}

impl TestSuite {
    /// Create an empty suite
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scenarios: Vec::new(),
        }
    }

    /// Add a scenario
    pub fn add(&mut self, scenario: Scenario) {
        self.scenarios.push(scenario);
    }

    /// Builder form of [`Self::add`]
    #[must_use]
    pub fn with(mut self, scenario: Scenario) -> Self {
        self.add(scenario);
        self
    }

    /// Number of scenarios
    #[must_use]
    pub fn scenario_count(&self) -> usize {
        self.scenarios.len()
    }

    /// Scenarios in registration order
    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Look a scenario up by exact name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    /// Every tag in use, sorted
    #[must_use]
    pub fn tags(&self) -> Vec<&'static str> {
        let tags: BTreeSet<&'static str> = self
            .scenarios
            .iter()
            .flat_map(|s| s.tags.iter().copied())
            .collect();
        tags.into_iter().collect()
    }

    /// Copy of the suite holding only the scenarios `filter` accepts
    #[must_use]
    pub fn filtered(&self, filter: &ScenarioFilter) -> Self {
        Self {
            name: self.name.clone(),
            scenarios: self
                .scenarios
                .iter()
                .filter(|s| filter.matches(s))
                .cloned()
                .collect(),
        }
    }
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    /// Scenario name
    pub name: String,
    /// Whether the scenario passed
    pub passed: bool,
    /// Error message if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock duration
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

impl TestResult {
    /// Create a passing result
    #[must_use]
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            error: None,
            duration: Duration::ZERO,
        }
    }

    /// Create a failing result
    #[must_use]
    pub fn fail(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            error: Some(error.into()),
            duration: Duration::ZERO,
        }
    }

    /// Set duration
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Results from running a suite
#[derive(Debug, Clone, Serialize)]
pub struct SuiteResults {
    /// Suite name
    pub suite_name: String,
    /// Individual results, in run order
    pub results: Vec<TestResult>,
    /// Total duration
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

impl SuiteResults {
    /// Check if all scenarios passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    /// Scenarios that ran
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Failed results
    #[must_use]
    pub fn failures(&self) -> Vec<&TestResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }
}

fn as_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Runs suites sequentially, one fresh session per scenario
#[derive(Debug, Default)]
pub struct TestHarness {
    /// Whether to stop on first failure
    pub fail_fast: bool,
}

impl TestHarness {
    /// Create a new harness
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable fail-fast mode
    #[must_use]
    pub const fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Run every scenario in `suite`.
    ///
    /// Errors and panics inside a scenario become failed results; the
    /// remaining scenarios still run unless fail-fast is on.
    pub async fn run(&self, suite: &TestSuite, fixture: &SessionFixture) -> SuiteResults {
        self.run_with(suite, fixture, |_| {}).await
    }

    /// Like [`Self::run`], calling `on_result` as each scenario finishes
    pub async fn run_with<F>(
        &self,
        suite: &TestSuite,
        fixture: &SessionFixture,
        mut on_result: F,
    ) -> SuiteResults
    where
        F: FnMut(&TestResult) + Send,
    {
        let start = Instant::now();
        let mut results = Vec::with_capacity(suite.scenario_count());

        for scenario in suite.scenarios() {
            let result = Self::run_one(scenario, fixture).await;
            on_result(&result);
            let failed = !result.passed;
            results.push(result);
            if failed && self.fail_fast {
                tracing::warn!(scenario = scenario.name, "stopping after first failure");
                break;
            }
        }

        let results = SuiteResults {
            suite_name: suite.name.clone(),
            results,
            duration: start.elapsed(),
        };
        tracing::info!(
            suite = %results.suite_name,
            passed = results.passed_count(),
            failed = results.failed_count(),
            "suite finished"
        );
        results
    }

    async fn run_one(scenario: &Scenario, fixture: &SessionFixture) -> TestResult {
        tracing::info!(scenario = scenario.name, "running");
        let start = Instant::now();
        let outcome = AssertUnwindSafe(fixture.run_with_session(scenario.name, scenario.body()))
            .catch_unwind()
            .await;
        let result = match outcome {
            Ok(Ok(())) => TestResult::pass(scenario.name),
            Ok(Err(e)) => TestResult::fail(scenario.name, e.to_string()),
            Err(payload) => TestResult::fail(
                scenario.name,
                format!("panicked: {}", Failure::from_panic(&*payload).message()),
            ),
        };
        result.with_duration(start.elapsed())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::mock::{MockLauncher, Storefront};
    use crate::result::ProbeError;
    use std::sync::Arc;

    fn passing(_session: Session) -> BoxFuture<'static, ProbeResult<()>> {
        async { Ok::<(), ProbeError>(()) }.boxed()
    }

    fn failing(_session: Session) -> BoxFuture<'static, ProbeResult<()>> {
        async { Err::<(), _>(ProbeError::assertion("badge missing")) }.boxed()
    }

    fn panicking(_session: Session) -> BoxFuture<'static, ProbeResult<()>> {
        async {
            if true {
                panic!("index out of range");
            }
            Ok::<(), ProbeError>(())
        }
        .boxed()
    }

    fn suite() -> TestSuite {
        TestSuite::new("demo")
            .with(Scenario::new("test_ok", &["smoke", "login"], "passes", passing))
            .with(Scenario::new("test_bad", &["regression", "cart"], "fails", failing))
            .with(Scenario::new("test_boom", &["regression"], "panics", panicking))
    }

    fn fixture() -> SessionFixture {
        let settings = Settings::default()
            .with_base_url(Storefront::BASE_URL)
            .with_explicit_wait(Duration::from_millis(50))
            .with_poll_interval(Duration::from_millis(5));
        SessionFixture::new(Arc::new(settings), Arc::new(MockLauncher::new()))
    }

    mod filter_tests {
        use super::*;

        #[test]
        fn test_empty_filter_keeps_everything() {
            assert_eq!(suite().filtered(&ScenarioFilter::new()).scenario_count(), 3);
        }

        #[test]
        fn test_tag_filter_is_any_of() {
            let filter = ScenarioFilter::new().with_tag("smoke").with_tag("cart");
            let names: Vec<_> = suite()
                .filtered(&filter)
                .scenarios()
                .iter()
                .map(|s| s.name)
                .collect();
            assert_eq!(names, vec!["test_ok", "test_bad"]);
        }

        #[test]
        fn test_tag_match_ignores_case() {
            let filter = ScenarioFilter::new().with_tag("SMOKE");
            assert_eq!(suite().filtered(&filter).scenario_count(), 1);
        }

        #[test]
        fn test_tag_and_name_combine() {
            let filter = ScenarioFilter::new().with_tag("regression").with_name("boom");
            let filtered = suite().filtered(&filter);
            assert_eq!(filtered.scenario_count(), 1);
            assert!(filtered.get("test_boom").is_some());
        }

        #[test]
        fn test_tags_sorted_unique() {
            assert_eq!(suite().tags(), vec!["cart", "login", "regression", "smoke"]);
        }
    }

    mod run_tests {
        use super::*;

        #[tokio::test]
        async fn test_records_pass_error_and_panic() {
            let results = TestHarness::new().run(&suite(), &fixture()).await;
            assert_eq!(results.total(), 3);
            assert_eq!(results.passed_count(), 1);
            assert_eq!(results.failed_count(), 2);
            assert!(!results.all_passed());

            let failures = results.failures();
            assert!(failures[0].error.as_deref().unwrap().contains("badge missing"));
            assert_eq!(
                failures[1].error.as_deref(),
                Some("panicked: index out of range")
            );
        }

        #[tokio::test]
        async fn test_run_with_reports_in_order() {
            let mut seen = Vec::new();
            TestHarness::new()
                .run_with(&suite(), &fixture(), |r| seen.push((r.name.clone(), r.passed)))
                .await;
            assert_eq!(
                seen,
                vec![
                    ("test_ok".to_string(), true),
                    ("test_bad".to_string(), false),
                    ("test_boom".to_string(), false),
                ]
            );
        }

        #[tokio::test]
        async fn test_fail_fast_stops() {
            let results = TestHarness::new()
                .with_fail_fast()
                .run(&suite(), &fixture())
                .await;
            assert_eq!(results.total(), 2);
        }

        #[tokio::test]
        async fn test_setup_failure_is_a_failed_result() {
            let settings = Settings::default().with_browser("lynx");
            let fixture = SessionFixture::new(Arc::new(settings), Arc::new(MockLauncher::new()));
            let results = TestHarness::new().run(&suite(), &fixture).await;
            assert_eq!(results.failed_count(), 3);
            assert!(results.results[0]
                .error
                .as_deref()
                .unwrap()
                .contains("lynx"));
        }
    }

    mod report_tests {
        use super::*;

        #[test]
        fn test_json_shape() {
            let results = SuiteResults {
                suite_name: "demo".to_string(),
                results: vec![
                    TestResult::pass("a").with_duration(Duration::from_millis(12)),
                    TestResult::fail("b", "timed out"),
                ],
                duration: Duration::from_millis(30),
            };
            let json = serde_json::to_value(&results).unwrap();
            assert_eq!(json["duration_ms"], 30);
            assert_eq!(json["results"][0]["duration_ms"], 12);
            assert!(json["results"][0].get("error").is_none());
            assert_eq!(json["results"][1]["error"], "timed out");
        }
    }
}
