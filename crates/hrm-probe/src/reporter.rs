//! Scenario reporting.
//!
//! A [`SuiteReport`] collects one [`ScenarioResult`] per scenario and renders
//! three artifacts:
//!
//! - a plain-text list summary (one line per scenario, logged at the end of a run)
//! - `results.json` with every result serialized
//! - `report.html`, a self-contained page with failure screenshots inlined
//!
//! ```text
//! ScenarioRunner ──record──► SuiteReport ──write(dir)──► results.json
//!                                                      └► report.html
//! ```

use crate::result::ProbeResult;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// JSON artifact file name
pub const JSON_REPORT: &str = "results.json";
/// HTML artifact file name
pub const HTML_REPORT: &str = "report.html";

/// Outcome of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestStatus {
    /// Body completed without error
    Passed,
    /// Every attempt failed
    Failed,
    /// Filtered out, or a prerequisite was missing
    Skipped,
}

impl TestStatus {
    /// Check if status is passed
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failed
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    const fn marker(self) -> &'static str {
        match self {
            Self::Passed => "ok",
            Self::Failed => "FAILED",
            Self::Skipped => "skipped",
        }
    }

    const fn css_class(self) -> &'static str {
        match self {
            Self::Passed => "pass",
            Self::Failed => "fail",
            Self::Skipped => "skip",
        }
    }
}

/// Result of a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario name
    pub name: String,
    /// Tags such as `@smoke`
    pub tags: Vec<String>,
    /// Final status
    pub status: TestStatus,
    /// Duration of the last attempt
    pub duration: Duration,
    /// Attempts made, including the successful one
    pub attempts: u32,
    /// Error message of the last failed attempt, or the skip reason
    pub error: Option<String>,
    /// Screenshot captured on the last failure
    pub screenshot: Option<PathBuf>,
    /// When the scenario finished
    pub finished_at: DateTime<Utc>,
}

impl ScenarioResult {
    fn new(name: impl Into<String>, status: TestStatus, duration: Duration) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            status,
            duration,
            attempts: 1,
            error: None,
            screenshot: None,
            finished_at: Utc::now(),
        }
    }

    /// Create a passing result
    #[must_use]
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        Self::new(name, TestStatus::Passed, duration)
    }

    /// Create a failing result
    #[must_use]
    pub fn failed(name: impl Into<String>, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(name, TestStatus::Failed, duration)
        }
    }

    /// Create a skipped result with its reason
    #[must_use]
    pub fn skipped(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Self::new(name, TestStatus::Skipped, Duration::ZERO)
        }
    }

    #[must_use]
    pub fn with_tags(mut self, tags: &[String]) -> Self {
        self.tags = tags.to_vec();
        self
    }

    #[must_use]
    pub const fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_screenshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.screenshot = Some(path.into());
        self
    }
}

/// All results of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    name: String,
    started_at: DateTime<Utc>,
    results: Vec<ScenarioResult>,
}

impl Default for SuiteReport {
    fn default() -> Self {
        Self::new("OrangeHRM E2E")
    }
}

impl SuiteReport {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started_at: Utc::now(),
            results: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn record(&mut self, result: ScenarioResult) {
        self.results.push(result);
    }

    #[must_use]
    pub fn results(&self) -> &[ScenarioResult] {
        &self.results
    }

    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(TestStatus::Passed)
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(TestStatus::Failed)
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(TestStatus::Skipped)
    }

    fn count(&self, status: TestStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.results.len()
    }

    /// Passed over executed (skipped scenarios are not counted); 1.0 when
    /// nothing ran
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        let executed = self.passed_count() + self.failed_count();
        if executed == 0 {
            return 1.0;
        }
        self.passed_count() as f64 / executed as f64
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.results.iter().map(|r| r.duration).sum()
    }

    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioResult> {
        self.results.iter().filter(|r| r.status.is_failed()).collect()
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {} passed, {} failed, {} skipped ({:.1}% pass rate, {:.2}s)",
            self.name,
            self.passed_count(),
            self.failed_count(),
            self.skipped_count(),
            self.pass_rate() * 100.0,
            self.total_duration().as_secs_f64()
        )
    }

    /// Line-per-scenario listing followed by the summary
    #[must_use]
    pub fn render_list(&self) -> String {
        let mut out = String::new();
        for result in &self.results {
            out.push_str(&format!(
                "  {} {} ({:.2}s",
                result.status.marker(),
                result.name,
                result.duration.as_secs_f64()
            ));
            if result.attempts > 1 {
                out.push_str(&format!(", {} attempts", result.attempts));
            }
            out.push(')');
            if let Some(error) = &result.error {
                out.push_str(&format!("\n      {error}"));
            }
            out.push('\n');
        }
        out.push_str(&self.summary());
        out
    }

    pub fn render_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Self-contained HTML page; readable failure screenshots are inlined as
    /// data URIs, unreadable ones become links
    #[must_use]
    pub fn render_html(&self) -> String {
        let mut html = String::new();

        html.push_str(r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>OrangeHRM E2E Report</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 20px;
        }
        .summary { background: #f5f5f5; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
        .progress-bar { background: #ddd; height: 20px; border-radius: 10px; overflow: hidden; }
        .passed { background: #4caf50; height: 100%; }
        .test { padding: 10px; margin: 5px 0; border-radius: 4px; }
        .test.pass { background: #e8f5e9; border-left: 4px solid #4caf50; }
        .test.fail { background: #ffebee; border-left: 4px solid #f44336; }
        .test.skip { background: #fff3e0; border-left: 4px solid #ff9800; }
        .tag { color: #555; font-size: 0.85em; margin-left: 6px; }
        .error { color: #d32f2f; font-family: monospace; white-space: pre-wrap; }
        .screenshot img { max-width: 640px; border: 1px solid #ddd; margin-top: 8px; }
    </style>
</head>
<body>
"#);

        html.push_str(&format!(
            r#"<div class="summary">
    <h1>{}</h1>
    <p>Started {}</p>
    <h2>{} passed, {} failed, {} skipped</h2>
    <div class="progress-bar">
        <div class="passed" style="width: {:.1}%"></div>
    </div>
    <p>Duration: {:.2}s</p>
</div>
"#,
            escape_html(&self.name),
            self.started_at.to_rfc3339(),
            self.passed_count(),
            self.failed_count(),
            self.skipped_count(),
            self.pass_rate() * 100.0,
            self.total_duration().as_secs_f64()
        ));

        html.push_str("<h2>Scenarios</h2>\n");
        for result in &self.results {
            html.push_str(&format!(
                r#"<div class="test {}">
    <strong>{}</strong> - {:?} ({:.2}s, attempts: {})"#,
                result.status.css_class(),
                escape_html(&result.name),
                result.status,
                result.duration.as_secs_f64(),
                result.attempts
            ));
            for tag in &result.tags {
                html.push_str(&format!(r#"<span class="tag">{}</span>"#, escape_html(tag)));
            }
            html.push('\n');

            if let Some(error) = &result.error {
                html.push_str(&format!(
                    "    <div class=\"error\">{}</div>\n",
                    escape_html(error)
                ));
            }
            if let Some(path) = &result.screenshot {
                html.push_str(&format!(
                    "    <div class=\"screenshot\">{}</div>\n",
                    screenshot_tag(path)
                ));
            }

            html.push_str("</div>\n");
        }

        html.push_str(
            r#"
<footer>
    <p>Generated by hrm-probe</p>
</footer>
</body>
</html>
"#,
        );

        html
    }

    /// Write `results.json` and `report.html` into `dir`, creating it
    pub fn write(&self, dir: &Path) -> ProbeResult<()> {
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join(JSON_REPORT), self.render_json()?)?;
        std::fs::write(dir.join(HTML_REPORT), self.render_html())?;
        Ok(())
    }
}

fn screenshot_tag(path: &Path) -> String {
    let shown = escape_html(&path.display().to_string());
    match std::fs::read(path) {
        Ok(png) => format!(
            r#"<img alt="{shown}" src="data:image/png;base64,{}">"#,
            STANDARD.encode(png)
        ),
        Err(_) => format!(r#"<a href="{shown}">{shown}</a>"#),
    }
}

/// Escape HTML special characters
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
