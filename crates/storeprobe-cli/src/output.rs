//! Output formatting and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use storeprobe::{Scenario, SuiteResults, TestResult};

/// Output format for run results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable lines on stderr
    #[default]
    Text,
    /// JSON report on stdout
    Json,
}

/// Progress reporter for scenario runs
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet || !self.term.is_term() {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    fn line(&self, text: &str) {
        match &self.progress_bar {
            Some(pb) => pb.println(text),
            None => {
                let _ = self.term.write_line(text);
            }
        }
    }

    /// Report one finished scenario and advance the bar
    pub fn scenario(&self, result: &TestResult) {
        let ms = result.duration.as_millis();
        if result.passed {
            self.success(&format!("{} ({ms}ms)", result.name));
        } else {
            let error = result.error.as_deref().unwrap_or("failed");
            self.failure(&format!("{} ({ms}ms)\n    {error}", result.name));
        }
        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        self.line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Failures print even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        self.line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        self.line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        self.line("");
        self.line(&styled);
    }

    /// Print the run summary
    pub fn summary(&self, results: &SuiteResults) {
        let failed = results.failed_count();
        if self.quiet && failed == 0 {
            return;
        }
        self.line("");
        self.line(&summary_line(
            results.passed_count(),
            failed,
            results.duration,
            self.use_color,
        ));
    }
}

/// `PASSED 36 scenarios in 1.20s (36 passed, 0 failed)`
#[must_use]
pub fn summary_line(passed: usize, failed: usize, duration: Duration, use_color: bool) -> String {
    let total = passed + failed;
    let secs = duration.as_secs_f64();

    if use_color {
        let passed_style = Style::new().green().bold();
        let failed_style = Style::new().red().bold();

        let status = if failed > 0 {
            failed_style.apply_to("FAILED")
        } else {
            passed_style.apply_to("PASSED")
        };

        format!(
            "{status} {total} scenarios in {secs:.2}s ({} passed, {} failed)",
            passed_style.apply_to(passed),
            if failed > 0 {
                failed_style.apply_to(failed).to_string()
            } else {
                failed.to_string()
            },
        )
    } else {
        let status = if failed > 0 { "FAILED" } else { "PASSED" };
        format!("{status} {total} scenarios in {secs:.2}s ({passed} passed, {failed} failed)")
    }
}

/// One line of `storeprobe list`
#[must_use]
pub fn scenario_listing(scenario: &Scenario) -> String {
    format!(
        "{:<42} [{}] {}",
        scenario.name,
        scenario.tags.join(", "),
        scenario.description
    )
}
