//! Scenario harness: per-attempt sessions, the scenario time budget, CI
//! retries, failure screenshots and the authenticated fixture.
//!
//! ```ignore
//! let mut runner = ScenarioRunner::new(launcher, settings, Logger::new("e2e"));
//! runner
//!     .run(&Scenario::new("valid login").tagged(SMOKE), |session| async move {
//!         let (_login, dashboard) = authenticated(&session).await?;
//!         dashboard.verify_all_widgets().await
//!     })
//!     .await;
//! runner.finish()?;
//! ```

use crate::config::Settings;
use crate::logging::Logger;
use crate::pages::{DashboardPage, LoginOutcome, LoginPage};
use crate::reporter::{ScenarioResult, SuiteReport, TestStatus};
use crate::result::{ProbeError, ProbeResult};
use crate::session::{Session, SessionLauncher};
use chrono::Utc;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

pub const SMOKE: &str = "@smoke";
pub const REGRESSION: &str = "@regression";
pub const INTEGRATION: &str = "@integration";

/// A named, tagged scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    name: String,
    tags: Vec<String>,
}

impl Scenario {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn tagged(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// No filter selects everything
    #[must_use]
    pub fn matches(&self, filter: Option<&str>) -> bool {
        filter.map_or(true, |tag| self.tags.iter().any(|t| t == tag))
    }

    /// File-name-safe form of the name
    #[must_use]
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.name.len());
        for c in self.name.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.ends_with('_') {
                slug.push('_');
            }
        }
        slug.trim_matches('_').to_string()
    }
}

/// Runs scenarios and records their outcomes
#[derive(Debug)]
pub struct ScenarioRunner {
    launcher: Arc<dyn SessionLauncher>,
    settings: Arc<Settings>,
    logger: Logger,
    tag_filter: Option<String>,
    report: SuiteReport,
}

impl ScenarioRunner {
    #[must_use]
    pub fn new(
        launcher: Arc<dyn SessionLauncher>,
        settings: Arc<Settings>,
        logger: Logger,
    ) -> Self {
        Self {
            launcher,
            settings,
            logger,
            tag_filter: None,
            report: SuiteReport::default(),
        }
    }

    /// Only run scenarios carrying `tag`; the rest are recorded as skipped
    #[must_use]
    pub fn with_tag_filter(mut self, tag: impl Into<String>) -> Self {
        self.tag_filter = Some(tag.into());
        self
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub const fn report(&self) -> &SuiteReport {
        &self.report
    }

    /// Run `body` against a fresh session, retrying up to `settings.retries`
    /// extra times.
    ///
    /// Each attempt is bounded by `settings.test_timeout`. A failed attempt
    /// leaves a screenshot under `<results>/screenshots/`. A
    /// [`ProbeError::PrerequisiteMissing`] ends the scenario as skipped
    /// without retrying.
    pub async fn run<F, Fut>(&mut self, scenario: &Scenario, body: F) -> TestStatus
    where
        F: Fn(Session) -> Fut,
        Fut: Future<Output = ProbeResult<()>>,
    {
        let logger = self.logger.scoped(scenario.name());

        if !scenario.matches(self.tag_filter.as_deref()) {
            logger.info("Skipped by tag filter");
            let reason = format!("not tagged {}", self.tag_filter.as_deref().unwrap_or_default());
            self.report.record(
                ScenarioResult::skipped(scenario.name(), reason).with_tags(scenario.tags()),
            );
            return TestStatus::Skipped;
        }

        let max_attempts = self.settings.retries + 1;
        let mut failure = None;

        for attempt in 1..=max_attempts {
            logger.info(&format!("Starting attempt {attempt}/{max_attempts}"));
            let started = Instant::now();

            let session = match self.launcher.launch(self.settings.clone(), logger.clone()).await {
                Ok(session) => session,
                Err(err) => {
                    logger.failure("Session launch", &err);
                    failure = Some((err.to_string(), started.elapsed(), attempt, None));
                    continue;
                }
            };

            let timeout = self.settings.test_timeout;
            let outcome = match tokio::time::timeout(timeout, body(session.clone())).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ProbeError::ScenarioTimeout {
                    name: scenario.name().to_string(),
                    ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                }),
            };
            let duration = started.elapsed();

            let result = match outcome {
                Ok(()) => {
                    logger.info("Scenario passed");
                    Some(ScenarioResult::passed(scenario.name(), duration))
                }
                Err(err) if err.is_skip() => {
                    logger.warn(&format!("Scenario skipped: {err}"));
                    Some(ScenarioResult::skipped(scenario.name(), err.to_string()))
                }
                Err(err) => {
                    logger.failure(&format!("Attempt {attempt}"), &err);
                    let screenshot = self.capture_failure(&session, scenario, &logger).await;
                    failure = Some((err.to_string(), duration, attempt, screenshot));
                    None
                }
            };

            if let Err(err) = session.close().await {
                logger.warn(&format!("Session close failed: {err}"));
            }

            if let Some(result) = result {
                let status = result.status;
                self.report
                    .record(result.with_tags(scenario.tags()).with_attempts(attempt));
                return status;
            }
        }

        let (error, duration, attempts, screenshot) =
            failure.unwrap_or_else(|| ("no attempt made".to_string(), Duration::ZERO, 0, None));
        let result = ScenarioResult::failed(scenario.name(), duration, error)
            .with_tags(scenario.tags())
            .with_attempts(attempts);
        self.report.record(match screenshot {
            Some(path) => result.with_screenshot(path),
            None => result,
        });
        TestStatus::Failed
    }

    async fn capture_failure(
        &self,
        session: &Session,
        scenario: &Scenario,
        logger: &Logger,
    ) -> Option<PathBuf> {
        let dir = self.settings.results_dir.join("screenshots");
        let path = dir.join(format!(
            "{}_{}.png",
            scenario.slug(),
            Utc::now().format("%Y%m%dT%H%M%S%3f")
        ));

        let saved = async {
            let png = session.driver().screenshot().await?;
            tokio::fs::create_dir_all(&dir).await?;
            tokio::fs::write(&path, png).await?;
            Ok::<_, ProbeError>(())
        }
        .await;

        match saved {
            Ok(()) => {
                logger.info(&format!("Failure screenshot saved to {}", path.display()));
                Some(path)
            }
            Err(err) => {
                logger.failure("Failure screenshot", &err);
                None
            }
        }
    }

    /// Log the list summary and write `results.json` / `report.html` under
    /// the results directory
    pub fn finish(&self) -> ProbeResult<&SuiteReport> {
        self.logger.info(&format!("\n{}", self.report.render_list()));
        self.report.write(&self.settings.results_dir)?;
        Ok(&self.report)
    }
}

/// Log in with the configured credentials and wait for the dashboard
pub async fn authenticated(session: &Session) -> ProbeResult<(LoginPage, DashboardPage)> {
    let login = LoginPage::new(session);
    login.goto().await?;
    match login.login_with_defaults().await? {
        LoginOutcome::LoggedIn => {}
        other => {
            return Err(ProbeError::assertion(format!(
                "default credentials did not log in: {other:?}"
            )))
        }
    }
    let dashboard = DashboardPage::new(session);
    dashboard.verify_page_loaded().await?;
    session.logger().step("Authenticated session ready", None);
    Ok((login, dashboard))
}
