//! hrm-probe: browser end-to-end suite for the OrangeHRM web application.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │   tests/*.rs ──► ScenarioRunner ──► Page Objects ──► BasePage    │
//! │   (scenarios)    (retries,          (Login, PIM,     (guarded    │
//! │                   screenshots)       Admin, ...)      actions)   │
//! │                                                          │       │
//! │                    wait / retry ◄────────────────────────┘       │
//! │                         │                                        │
//! │                         ▼                                        │
//! │                  dyn BrowserDriver ──► ChromiumDriver (CDP)      │
//! │                                    └─► MockDriver (unit tests)   │
//! │                                                                  │
//! │   ApiClient ──► reqwest ──► OrangeHRM REST/HTTP surface          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Settings come from the environment (and `.env`) through [`Settings::load`];
//! every component receives them together with a [`Logger`] instead of
//! reaching for globals.
//!
//! Live scenarios need the `browser` feature and a Chromium binary:
//!
//! ```text
//! cargo test -p hrm-probe --features browser
//! ```

// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod api;
#[cfg(feature = "browser")]
pub mod browser;
pub mod config;
pub mod data;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod driver;
pub mod harness;
pub mod locator;
pub mod logging;
pub mod page_object;
pub mod pages;
#[allow(clippy::format_push_string, clippy::needless_raw_string_hashes)]
pub mod reporter;
pub mod result;
pub mod retry;
pub mod session;
pub mod wait;

pub use api::{ApiClient, ApiResponse, RequestOptions};
#[cfg(feature = "browser")]
pub use browser::{ChromiumDriver, ChromiumLauncher};
pub use config::{EnvConfig, Settings};
pub use driver::{BrowserDriver, DocumentState, ElementState, MockDriver, SelectOption};
pub use harness::{authenticated, Scenario, ScenarioRunner};
pub use locator::{Locator, Selector};
pub use logging::{LogFormat, Logger};
pub use page_object::{BasePage, PageObject, Presence};
pub use reporter::{ScenarioResult, SuiteReport, TestStatus};
pub use result::{ProbeError, ProbeResult};
pub use retry::{retry, RetryPolicy};
pub use session::{Session, SessionLauncher};
pub use wait::{
    wait_for_condition, wait_for_load_state, wait_for_network_idle_or_load, wait_for_url,
    LoadState, Settled, UrlPattern, WaitOptions,
};
