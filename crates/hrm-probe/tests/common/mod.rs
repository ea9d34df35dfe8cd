//! Shared setup for the live scenario suites.
//!
//! Browser suites build one [`ScenarioRunner`] over Chromium and run their
//! scenarios through it; reports land in `<RESULTS_DIR>/<suite>/`. When no
//! Chromium can be launched the suite is skipped. `TEST_TAG` (for example
//! `@smoke`) restricts a run to scenarios carrying that tag.
//!
//! HTTP checks need no browser, only a reachable application.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use hrm_probe::logging::{self, LogFormat};
use hrm_probe::pages::LOGIN_PATH;
use hrm_probe::{ApiClient, Logger, ProbeError, ProbeResult, RequestOptions, Settings};

#[cfg(feature = "browser")]
use hrm_probe::browser::{ChromiumDriver, ChromiumLauncher};
#[cfg(feature = "browser")]
use hrm_probe::{BrowserDriver, ScenarioRunner};
#[cfg(feature = "browser")]
use std::sync::Arc;

pub fn init_logging() {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let format = LogFormat::parse(&std::env::var("LOG_FORMAT").unwrap_or_default());
    logging::init(&level, format);
}

/// Settings from `.env` and the environment, reporting into `<results>/<suite>`
pub fn settings(suite: &str) -> Settings {
    init_logging();
    let mut settings = Settings::load().expect("configuration should resolve");
    settings.results_dir = settings.results_dir.join(suite);
    settings
}

#[cfg(feature = "browser")]
async fn chromium_available(settings: &Settings) -> bool {
    match ChromiumDriver::launch(settings).await {
        Ok(driver) => {
            let _ = driver.close().await;
            true
        }
        Err(err) => {
            eprintln!("Chromium unavailable, skipping live scenarios: {err}");
            false
        }
    }
}

/// Runner for `suite`, or `None` when no browser can be started
#[cfg(feature = "browser")]
pub async fn runner(suite: &str) -> Option<ScenarioRunner> {
    let settings = settings(suite);
    if !chromium_available(&settings).await {
        return None;
    }

    let runner = ScenarioRunner::new(
        Arc::new(ChromiumLauncher),
        Arc::new(settings),
        Logger::new(suite),
    );
    Some(match std::env::var("TEST_TAG") {
        Ok(tag) if !tag.is_empty() => runner.with_tag_filter(tag),
        _ => runner,
    })
}

/// Write the reports and fail the test when any scenario failed
#[cfg(feature = "browser")]
pub fn finish(runner: &ScenarioRunner) {
    let report = runner.finish().expect("reports should be written");
    assert!(report.all_passed(), "{}", report.render_list());
}

/// HTTP client for the configured application, or `None` when the login
/// page cannot be reached at all
pub async fn api_client(suite: &str) -> Option<(ApiClient, Logger)> {
    let settings = settings(suite);
    let logger = Logger::new(suite);
    let api = ApiClient::new(&settings, &logger).expect("HTTP client should build");
    match api.get(LOGIN_PATH, &RequestOptions::default()).await {
        Err(ProbeError::Http(err)) if err.is_connect() || err.is_timeout() => {
            eprintln!("{} unreachable, skipping HTTP checks: {err}", settings.base_url);
            None
        }
        _ => Some((api, logger)),
    }
}

/// Log an assertion marker and fail the scenario when it does not hold
pub fn check(logger: &Logger, description: &str, passed: bool) -> ProbeResult<()> {
    logger.assertion(description, passed);
    if passed {
        Ok(())
    } else {
        Err(ProbeError::assertion(description))
    }
}
