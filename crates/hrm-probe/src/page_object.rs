//! Page Object Model support.
//!
//! Every page object owns a [`BasePage`], which wraps the session's driver
//! with guarded actions: each one waits for its target first, logs what it
//! did, and on failure logs the error with context before propagating it
//! unchanged.

use crate::config::Settings;
use crate::driver::{BrowserDriver, SelectOption};
use crate::locator::Locator;
use crate::logging::Logger;
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use crate::wait::{
    wait_for_condition, wait_for_load_state, wait_for_network_idle_or_load, LoadState, Settled,
    WaitResult, WaitState,
};
use std::future::Future;
use std::time::Duration;

/// Default timeout for visibility probes (5 seconds)
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;

/// Options of an opened `oxd-select` dropdown
const DROPDOWN_OPTION: &str = ".oxd-select-dropdown [role=\"option\"]";

/// Suggestions of an `oxd-autocomplete` input
const AUTOCOMPLETE_OPTION: &str = ".oxd-autocomplete-option";

/// Trait for page objects representing a page of the application
pub trait PageObject {
    /// Guarded-action helper the page is built on
    fn base(&self) -> &BasePage;

    /// Application path of the page (e.g. `/web/index.php/auth/login`)
    fn path(&self) -> &'static str;

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &'static str;

    /// Absolute URL of the page
    fn url(&self) -> String {
        self.base().settings().url(self.path())
    }

    /// Whether `url` points at this page
    fn is_current(&self, url: &str) -> bool {
        url.contains(self.path())
    }
}

/// Outcome of a boolean probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Found,
    NotFoundWithinTimeout,
}

impl Presence {
    #[must_use]
    pub const fn is_found(self) -> bool {
        matches!(self, Self::Found)
    }
}

/// What `type_with_validation` typed and what the field reported back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeOutcome {
    pub expected: String,
    pub actual: String,
}

impl TypeOutcome {
    #[must_use]
    pub fn matched(&self) -> bool {
        self.expected == self.actual
    }
}

/// Guarded actions shared by all page objects
#[derive(Debug, Clone)]
pub struct BasePage {
    session: Session,
    logger: Logger,
}

impl BasePage {
    #[must_use]
    pub fn new(session: &Session, page_name: &str) -> Self {
        Self {
            logger: session.logger().scoped(page_name),
            session: session.clone(),
        }
    }

    #[must_use]
    pub fn driver(&self) -> &dyn BrowserDriver {
        self.session.driver()
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        self.session.settings()
    }

    #[must_use]
    pub const fn logger(&self) -> &Logger {
        &self.logger
    }

    #[must_use]
    pub fn action_timeout(&self) -> Duration {
        self.settings().action_timeout
    }

    /// Run `fut`, logging `operation` as failed if it errors
    pub async fn guarded<T>(
        &self,
        operation: &str,
        fut: impl Future<Output = ProbeResult<T>>,
    ) -> ProbeResult<T> {
        let result = fut.await;
        if let Err(err) = &result {
            self.logger.failure(operation, err);
        }
        result
    }

    /// Wait for the element to be visible, then click it.
    ///
    /// Without `force` the driver refuses to click an element covered by
    /// another one.
    pub async fn click_with_safety(
        &self,
        locator: &Locator,
        timeout: Duration,
        force: bool,
    ) -> ProbeResult<()> {
        self.guarded(&format!("Click on {locator}"), async {
            wait_for_condition(self.driver(), locator, WaitState::Visible, timeout).await?;
            self.driver().click(locator, force).await?;
            self.logger.debug(&format!("Clicked element: {locator}"));
            Ok(())
        })
        .await
    }

    /// [`Self::click_with_safety`] with the action timeout and no force
    pub async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        self.click_with_safety(locator, self.action_timeout(), false)
            .await
    }

    /// Wait for the input, optionally clear it, fill `text` and read it back.
    ///
    /// A read-back mismatch (masked or auto-formatted inputs) is logged as a
    /// warning and reported in the outcome; it is not an error.
    pub async fn type_with_validation(
        &self,
        locator: &Locator,
        text: &str,
        timeout: Duration,
        clear: bool,
    ) -> ProbeResult<TypeOutcome> {
        self.guarded(&format!("Typing into {locator}"), async {
            wait_for_condition(self.driver(), locator, WaitState::Visible, timeout).await?;
            if clear {
                self.driver().clear(locator).await?;
            }
            self.driver().fill(locator, text).await?;

            let outcome = TypeOutcome {
                expected: text.to_string(),
                actual: self.driver().input_value(locator).await?,
            };
            if !outcome.matched() {
                self.logger.warn(&format!(
                    "Text mismatch. Expected: {}, Actual: {}",
                    outcome.expected, outcome.actual
                ));
            }
            self.logger.debug(&format!("Typed text into element: {locator}"));
            Ok(outcome)
        })
        .await
    }

    /// [`Self::type_with_validation`] with the action timeout, clearing first
    pub async fn type_text(&self, locator: &Locator, text: &str) -> ProbeResult<TypeOutcome> {
        self.type_with_validation(locator, text, self.action_timeout(), true)
            .await
    }

    pub async fn wait_for_visible(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> ProbeResult<WaitResult> {
        self.guarded(&format!("Waiting for {locator}"), async {
            let result =
                wait_for_condition(self.driver(), locator, WaitState::Visible, timeout).await?;
            self.logger.debug(&format!("Element visible: {locator}"));
            Ok(result)
        })
        .await
    }

    /// Select a dropdown option.
    ///
    /// Native `<select>` elements are set through the driver. The custom
    /// `oxd-select` widget is opened and the matching `[role="option"]`
    /// entry clicked; it has no option values, so `Value` matches labels.
    pub async fn safe_select(
        &self,
        locator: &Locator,
        option: &SelectOption,
        timeout: Duration,
    ) -> ProbeResult<()> {
        self.guarded(&format!("Selecting {option} in {locator}"), async {
            wait_for_condition(self.driver(), locator, WaitState::Visible, timeout).await?;

            if self.driver().tag_name(locator).await? == "select" {
                self.driver().select_native(locator, option).await?;
            } else {
                self.driver().click(locator, false).await?;
                let entry = match option {
                    SelectOption::Label(text) | SelectOption::Value(text) => {
                        Locator::new(DROPDOWN_OPTION).with_text(text.as_str())
                    }
                    SelectOption::Index(i) => Locator::new(DROPDOWN_OPTION).nth(*i),
                };
                self.click_with_safety(&entry, timeout, false).await?;
            }
            self.logger.debug(&format!("Selected option in dropdown: {locator}"));
            Ok(())
        })
        .await
    }

    /// Trimmed text content of a visible element
    pub async fn get_text(&self, locator: &Locator) -> ProbeResult<String> {
        self.guarded(&format!("Reading text of {locator}"), async {
            let timeout = self.action_timeout();
            wait_for_condition(self.driver(), locator, WaitState::Visible, timeout).await?;
            let text = self.driver().text_content(locator).await?;
            Ok(text.unwrap_or_default().trim().to_string())
        })
        .await
    }

    /// Whether the element becomes visible within `timeout`; a timeout is a
    /// normal `NotFoundWithinTimeout` outcome
    pub async fn probe_visible(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> ProbeResult<Presence> {
        match wait_for_condition(self.driver(), locator, WaitState::Visible, timeout).await {
            Ok(_) => Ok(Presence::Found),
            Err(ProbeError::WaitTimeout { .. }) => Ok(Presence::NotFoundWithinTimeout),
            Err(err) => Err(err),
        }
    }

    /// [`Self::probe_visible`] with the default 5 second probe timeout
    pub async fn is_visible(&self, locator: &Locator) -> ProbeResult<bool> {
        Ok(self
            .probe_visible(locator, Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS))
            .await?
            .is_found())
    }

    /// Number of elements the locator's selector matches right now
    pub async fn count(&self, locator: &Locator) -> ProbeResult<usize> {
        self.driver().count(locator).await
    }

    /// Navigate to an application path and wait for `DOMContentLoaded`
    pub async fn navigate_to(&self, path: &str) -> ProbeResult<()> {
        let url = self.settings().url(path);
        self.guarded(&format!("Navigation to {url}"), async {
            self.driver().goto(&url).await?;
            wait_for_load_state(
                self.driver(),
                LoadState::DomContentLoaded,
                self.settings().navigation_timeout,
            )
            .await?;
            self.logger.info(&format!("Navigated to: {url}"));
            Ok(())
        })
        .await
    }

    pub async fn wait_for_dom_ready(&self, timeout: Duration) -> ProbeResult<()> {
        wait_for_load_state(self.driver(), LoadState::DomContentLoaded, timeout).await?;
        Ok(())
    }

    pub async fn wait_for_network_idle(&self, timeout: Duration) -> ProbeResult<Settled> {
        wait_for_network_idle_or_load(self.driver(), timeout).await
    }

    /// Click the first autocomplete suggestion if one shows up in `timeout`
    pub async fn pick_first_suggestion(&self, timeout: Duration) -> ProbeResult<Presence> {
        let suggestion = Locator::new(AUTOCOMPLETE_OPTION).first();
        let presence = self.probe_visible(&suggestion, timeout).await?;
        if presence.is_found() {
            self.click(&suggestion).await?;
        } else {
            self.logger.warn("No autocomplete suggestion appeared");
        }
        Ok(presence)
    }

    pub async fn title(&self) -> ProbeResult<String> {
        self.driver().title().await
    }

    pub async fn current_url(&self) -> ProbeResult<String> {
        self.driver().current_url().await
    }
}
