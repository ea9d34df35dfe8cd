//! Environment configuration.
//!
//! [`EnvConfig`] is an immutable snapshot of key/value pairs taken from the
//! process environment (after loading an optional `.env` file). [`Settings`]
//! is the typed view the rest of the crate consumes.

use crate::data::Credentials;
use crate::result::{ProbeError, ProbeResult};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Default application root
pub const DEFAULT_BASE_URL: &str = "https://opensource-demo.orangehrmlive.com/";
/// Default login name
pub const DEFAULT_USERNAME: &str = "Admin";
/// Default password
pub const DEFAULT_PASSWORD: &str = "admin123";
/// Action and navigation budget outside CI
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Action and navigation budget in CI
pub const CI_TIMEOUT_MS: u64 = 60_000;
/// Per-scenario budget
pub const DEFAULT_TEST_TIMEOUT_MS: u64 = 120_000;
/// Scenario retries when running in CI
pub const CI_RETRIES: u32 = 2;
/// Fixed viewport
pub const VIEWPORT: (u32, u32) = (1920, 1080);

/// Snapshot of configuration key/value pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    values: HashMap<String, String>,
}

impl EnvConfig {
    /// Load `.env` when present, then snapshot the process environment
    #[must_use]
    pub fn load() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }
        Self::from_env()
    }

    /// Snapshot the process environment as-is
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            values: std::env::vars().collect(),
        }
    }

    /// Build a snapshot from explicit pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    fn raw(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// String value, falling back to `default`; fails when both are absent
    pub fn get(&self, key: &str, default: Option<&str>) -> ProbeResult<String> {
        self.raw(key)
            .or(default)
            .map(str::to_string)
            .ok_or_else(|| ProbeError::ConfigMissing {
                key: key.to_string(),
            })
    }

    /// Optional string value
    #[must_use]
    pub fn get_opt(&self, key: &str) -> Option<String> {
        self.raw(key).map(str::to_string)
    }

    /// `"true"` and `"1"` (case-insensitive) are true, anything else is false
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.raw(key).map_or(default, |v| {
            let v = v.trim();
            v.eq_ignore_ascii_case("true") || v == "1"
        })
    }

    /// Unsigned integer value, falling back to `default`
    pub fn get_number(&self, key: &str, default: Option<u64>) -> ProbeResult<u64> {
        match self.raw(key) {
            Some(v) => v.trim().parse().map_err(|_| ProbeError::ConfigInvalid {
                key: key.to_string(),
                value: v.to_string(),
            }),
            None => default.ok_or_else(|| ProbeError::ConfigMissing {
                key: key.to_string(),
            }),
        }
    }
}

/// Resolved settings for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub ci: bool,
    pub headless: bool,
    pub action_timeout: Duration,
    pub navigation_timeout: Duration,
    pub test_timeout: Duration,
    /// Extra attempts per scenario after the first failure
    pub retries: u32,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub chromium_path: Option<String>,
    pub results_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            ci: false,
            headless: true,
            action_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            navigation_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            test_timeout: Duration::from_millis(DEFAULT_TEST_TIMEOUT_MS),
            retries: 0,
            viewport_width: VIEWPORT.0,
            viewport_height: VIEWPORT.1,
            chromium_path: None,
            results_dir: PathBuf::from("test-results"),
        }
    }
}

impl Settings {
    /// Resolve settings from a configuration snapshot
    pub fn from_config(config: &EnvConfig) -> ProbeResult<Self> {
        let ci = config.get_bool("CI", false);
        let budget = if ci { CI_TIMEOUT_MS } else { DEFAULT_TIMEOUT_MS };

        Ok(Self {
            base_url: config.get("BASE_URL", Some(DEFAULT_BASE_URL))?,
            username: config.get("DEFAULT_USERNAME", Some(DEFAULT_USERNAME))?,
            password: config.get("DEFAULT_PASSWORD", Some(DEFAULT_PASSWORD))?,
            ci,
            headless: config.get_bool("HEADLESS", true),
            action_timeout: Duration::from_millis(
                config.get_number("ACTION_TIMEOUT", Some(budget))?,
            ),
            navigation_timeout: Duration::from_millis(
                config.get_number("NAVIGATION_TIMEOUT", Some(budget))?,
            ),
            test_timeout: Duration::from_millis(
                config.get_number("PLAYWRIGHT_TEST_TIMEOUT", Some(DEFAULT_TEST_TIMEOUT_MS))?,
            ),
            retries: if ci { CI_RETRIES } else { 0 },
            viewport_width: VIEWPORT.0,
            viewport_height: VIEWPORT.1,
            chromium_path: config.get_opt("CHROMIUM_PATH"),
            results_dir: PathBuf::from(config.get("RESULTS_DIR", Some("test-results"))?),
        })
    }

    /// Load `.env` plus the process environment and resolve
    pub fn load() -> ProbeResult<Self> {
        Self::from_config(&EnvConfig::load())
    }

    /// Absolute URL for an application path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Configured default credentials
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password)
    }
}

/// Join a base URL and an endpoint with exactly one slash between them.
///
/// Absolute `http://` / `https://` endpoints are returned unchanged.
#[must_use]
pub fn join_url(base: &str, endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return endpoint.to_string();
    }
    if endpoint.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}
