//! `BrowserDriver` - abstract browser automation trait.
//!
//! Everything above this seam (waits, guarded actions, page objects, the
//! scenario harness) talks to a `dyn BrowserDriver`. Two implementations
//! exist:
//!
//! - `ChromiumDriver` (feature `browser`): chromiumoxide over CDP
//! - [`MockDriver`]: in-memory scripted document for unit tests
//!
//! Drivers take `&self` and use interior mutability so a session can hand
//! the same driver to several page objects through an `Arc`.

use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Observed element state at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementState {
    /// Element is in the document
    pub attached: bool,
    /// Element is rendered with a non-empty box
    pub visible: bool,
}

impl ElementState {
    /// State of an element that does not resolve
    pub const DETACHED: Self = Self {
        attached: false,
        visible: false,
    };
}

/// `document.readyState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentState {
    #[default]
    Loading,
    Interactive,
    Complete,
}

impl DocumentState {
    /// Parse a `readyState` string; unknown values count as loading
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "complete" => Self::Complete,
            "interactive" => Self::Interactive,
            _ => Self::Loading,
        }
    }

    /// `DOMContentLoaded` has fired
    #[must_use]
    pub const fn dom_ready(self) -> bool {
        matches!(self, Self::Interactive | Self::Complete)
    }
}

/// Option selection for dropdowns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOption {
    /// Visible option text
    Label(String),
    /// `value` attribute (custom dropdowns fall back to the label)
    Value(String),
    /// Zero-based option index
    Index(usize),
}

impl SelectOption {
    #[must_use]
    pub fn label(label: impl Into<String>) -> Self {
        Self::Label(label.into())
    }
}

impl fmt::Display for SelectOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(l) => write!(f, "label={l}"),
            Self::Value(v) => write!(f, "value={v}"),
            Self::Index(i) => write!(f, "index={i}"),
        }
    }
}

/// Abstract browser driver trait.
///
/// One driver owns one page. Element operations resolve their locator at call
/// time and fail with [`ProbeError::ActionFailure`] when nothing matches.
#[async_trait]
pub trait BrowserDriver: Send + Sync + fmt::Debug {
    /// Navigate to URL
    async fn goto(&self, url: &str) -> ProbeResult<()>;

    /// Reload the current page
    async fn reload(&self) -> ProbeResult<()>;

    /// Get current URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// Get document title
    async fn title(&self) -> ProbeResult<String>;

    /// Current `document.readyState`
    async fn ready_state(&self) -> ProbeResult<DocumentState>;

    /// Network requests the page has sent that have neither finished nor
    /// failed yet
    async fn inflight_requests(&self) -> ProbeResult<usize>;

    /// Attached/visible state of the located element
    async fn element_state(&self, locator: &Locator) -> ProbeResult<ElementState>;

    /// Number of elements the selector matches
    async fn count(&self, locator: &Locator) -> ProbeResult<usize>;

    /// Click the element; `force` skips the obscured-element check
    async fn click(&self, locator: &Locator, force: bool) -> ProbeResult<()>;

    /// Empty an input
    async fn clear(&self, locator: &Locator) -> ProbeResult<()>;

    /// Replace an input's value by typing `text`
    async fn fill(&self, locator: &Locator, text: &str) -> ProbeResult<()>;

    /// Current `value` of an input
    async fn input_value(&self, locator: &Locator) -> ProbeResult<String>;

    /// `textContent` of the element
    async fn text_content(&self, locator: &Locator) -> ProbeResult<Option<String>>;

    /// Lower-case tag name of the element
    async fn tag_name(&self, locator: &Locator) -> ProbeResult<String>;

    /// Select an option of a native `<select>`
    async fn select_native(&self, locator: &Locator, option: &SelectOption) -> ProbeResult<()>;

    /// Checked state of a checkbox or radio
    async fn is_checked(&self, locator: &Locator) -> ProbeResult<bool>;

    /// Arbitrary DOM property (e.g. `required`, `type`, `validationMessage`)
    async fn property(&self, locator: &Locator, name: &str) -> ProbeResult<serde_json::Value>;

    /// Press a key on the focused element
    async fn press(&self, key: &str) -> ProbeResult<()>;

    /// Take a PNG screenshot
    async fn screenshot(&self) -> ProbeResult<Vec<u8>>;

    /// Close the page and the browser behind it
    async fn close(&self) -> ProbeResult<()>;
}

// ============================================================================
// MockDriver
// ============================================================================

/// Side effect applied to a [`MockDriver`] when an element is clicked or a
/// key pressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEffect {
    /// Change the current URL
    Navigate(String),
    /// Make an element visible (inserting a bare one when absent)
    Show(Locator),
    /// Hide an element
    Hide(Locator),
    /// Detach an element
    Remove(Locator),
    /// Replace an element's text
    SetText(Locator, String),
    /// Flip a checkbox
    Toggle(Locator),
}

/// Scripted element for [`MockDriver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    pub attached: bool,
    pub visible: bool,
    pub tag: String,
    pub value: String,
    pub text: String,
    pub checked: bool,
    /// Another element covers this one; plain clicks fail
    pub obscured: bool,
    /// Value reported back by `input_value` regardless of what was typed
    pub echo: Option<String>,
    /// Becomes visible on the n-th state check
    pub reveal_after: Option<u32>,
    /// Matches reported by `count`
    pub matches: usize,
    /// Native `<select>` options as `(label, value)`
    pub options: Vec<(String, String)>,
    pub properties: HashMap<String, String>,
    pub on_click: Vec<MockEffect>,
    checks: u32,
}

impl Default for MockElement {
    fn default() -> Self {
        Self {
            attached: true,
            visible: true,
            tag: "div".to_string(),
            value: String::new(),
            text: String::new(),
            checked: false,
            obscured: false,
            echo: None,
            reveal_after: None,
            matches: 1,
            options: Vec::new(),
            properties: HashMap::new(),
            on_click: Vec::new(),
            checks: 0,
        }
    }
}

impl MockElement {
    /// Visible element with the given tag
    #[must_use]
    pub fn visible(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    /// Attached but hidden element
    #[must_use]
    pub fn hidden(tag: &str) -> Self {
        Self {
            visible: false,
            ..Self::visible(tag)
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    #[must_use]
    pub const fn with_matches(mut self, matches: usize) -> Self {
        self.matches = matches;
        self
    }

    #[must_use]
    pub const fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    #[must_use]
    pub const fn obscured(mut self) -> Self {
        self.obscured = true;
        self
    }

    #[must_use]
    pub fn echoing(mut self, echo: &str) -> Self {
        self.echo = Some(echo.to_string());
        self
    }

    /// Hidden until the n-th state check
    #[must_use]
    pub const fn revealed_after(mut self, checks: u32) -> Self {
        self.visible = false;
        self.reveal_after = Some(checks);
        self
    }

    #[must_use]
    pub fn with_option(mut self, label: &str, value: &str) -> Self {
        self.options.push((label.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn with_property(mut self, name: &str, value: &str) -> Self {
        self.properties.insert(name.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn on_click(mut self, effect: MockEffect) -> Self {
        self.on_click.push(effect);
        self
    }
}

#[derive(Debug, Default)]
struct MockState {
    url: String,
    title: String,
    ready_state: DocumentState,
    /// Open requests, each until its completion instant
    pending_requests: Vec<Instant>,
    /// Requests that never complete
    stuck_requests: usize,
    elements: HashMap<String, MockElement>,
    key_effects: HashMap<String, Vec<MockEffect>>,
    screenshot: Vec<u8>,
    history: Vec<String>,
    closed: bool,
}

impl MockState {
    fn apply(&mut self, effects: &[MockEffect]) {
        for effect in effects {
            match effect {
                MockEffect::Navigate(url) => url.clone_into(&mut self.url),
                MockEffect::Show(locator) => {
                    let el = self.elements.entry(locator.to_string()).or_default();
                    el.attached = true;
                    el.visible = true;
                }
                MockEffect::Hide(locator) => {
                    if let Some(el) = self.elements.get_mut(&locator.to_string()) {
                        el.visible = false;
                    }
                }
                MockEffect::Remove(locator) => {
                    self.elements.remove(&locator.to_string());
                }
                MockEffect::SetText(locator, text) => {
                    let el = self.elements.entry(locator.to_string()).or_default();
                    text.clone_into(&mut el.text);
                }
                MockEffect::Toggle(locator) => {
                    if let Some(el) = self.elements.get_mut(&locator.to_string()) {
                        el.checked = !el.checked;
                    }
                }
            }
        }
    }

    fn element(&mut self, action: &str, locator: &Locator) -> ProbeResult<&mut MockElement> {
        self.elements
            .get_mut(&locator.to_string())
            .filter(|el| el.attached)
            .ok_or_else(|| ProbeError::action(action, locator, "element not found"))
    }
}

/// Mock driver for unit testing
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create new mock driver on `about:blank` with a complete document
    #[must_use]
    pub fn new() -> Self {
        let driver = Self::default();
        {
            let mut state = driver.state();
            state.url = "about:blank".to_string();
            state.ready_state = DocumentState::Complete;
        }
        driver
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: String) -> MutexGuard<'_, MockState> {
        let mut state = self.state();
        state.history.push(call);
        state
    }

    /// Add or replace a scripted element
    pub fn insert(&self, locator: &Locator, element: MockElement) {
        self.state().elements.insert(locator.to_string(), element);
    }

    /// Snapshot of a scripted element
    #[must_use]
    pub fn element(&self, locator: &Locator) -> Option<MockElement> {
        self.state().elements.get(&locator.to_string()).cloned()
    }

    pub fn set_url(&self, url: &str) {
        url.clone_into(&mut self.state().url);
    }

    pub fn set_title(&self, title: &str) {
        title.clone_into(&mut self.state().title);
    }

    pub fn set_ready_state(&self, ready_state: DocumentState) {
        self.state().ready_state = ready_state;
    }

    /// Open a request that completes `duration` from now
    pub fn hold_request(&self, duration: Duration) {
        let mut state = self.state();
        match Instant::now().checked_add(duration) {
            Some(done) => state.pending_requests.push(done),
            None => state.stuck_requests += 1,
        }
    }

    /// Requests that stay open forever; non-zero simulates a page that never
    /// stops polling
    pub fn set_stuck_requests(&self, count: usize) {
        self.state().stuck_requests = count;
    }

    pub fn set_screenshot(&self, png: Vec<u8>) {
        self.state().screenshot = png;
    }

    /// Effects applied when `key` is pressed
    pub fn on_key(&self, key: &str, effects: Vec<MockEffect>) {
        self.state().key_effects.insert(key.to_string(), effects);
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().history.clone()
    }

    /// Check if a call starting with `prefix` was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.call_count(prefix) > 0
    }

    /// Number of calls starting with `prefix`
    #[must_use]
    pub fn call_count(&self, prefix: &str) -> usize {
        self.state()
            .history
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
}

#[async_trait]
impl BrowserDriver for MockDriver {
    async fn goto(&self, url: &str) -> ProbeResult<()> {
        let mut state = self.record(format!("goto:{url}"));
        url.clone_into(&mut state.url);
        Ok(())
    }

    async fn reload(&self) -> ProbeResult<()> {
        drop(self.record("reload".to_string()));
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.state().url.clone())
    }

    async fn title(&self) -> ProbeResult<String> {
        Ok(self.state().title.clone())
    }

    async fn ready_state(&self) -> ProbeResult<DocumentState> {
        Ok(self.record("ready_state".to_string()).ready_state)
    }

    async fn inflight_requests(&self) -> ProbeResult<usize> {
        let mut state = self.record("inflight_requests".to_string());
        let now = Instant::now();
        state.pending_requests.retain(|done| *done > now);
        Ok(state.pending_requests.len() + state.stuck_requests)
    }

    async fn element_state(&self, locator: &Locator) -> ProbeResult<ElementState> {
        let mut state = self.record(format!("element_state:{locator}"));
        let Some(el) = state.elements.get_mut(&locator.to_string()) else {
            return Ok(ElementState::DETACHED);
        };
        el.checks += 1;
        if el.reveal_after.is_some_and(|n| el.checks >= n) {
            el.visible = true;
        }
        Ok(ElementState {
            attached: el.attached,
            visible: el.attached && el.visible,
        })
    }

    async fn count(&self, locator: &Locator) -> ProbeResult<usize> {
        let state = self.record(format!("count:{locator}"));
        Ok(state
            .elements
            .get(&locator.to_string())
            .filter(|el| el.attached)
            .map_or(0, |el| el.matches))
    }

    async fn click(&self, locator: &Locator, force: bool) -> ProbeResult<()> {
        let mut state = self.record(format!("click:{locator}"));
        let el = state.element("click", locator)?;
        if el.obscured && !force {
            return Err(ProbeError::action(
                "click",
                locator,
                "element is obscured by another element",
            ));
        }
        let effects = el.on_click.clone();
        state.apply(&effects);
        Ok(())
    }

    async fn clear(&self, locator: &Locator) -> ProbeResult<()> {
        let mut state = self.record(format!("clear:{locator}"));
        state.element("clear", locator)?.value.clear();
        Ok(())
    }

    async fn fill(&self, locator: &Locator, text: &str) -> ProbeResult<()> {
        let mut state = self.record(format!("fill:{locator}"));
        text.clone_into(&mut state.element("fill", locator)?.value);
        Ok(())
    }

    async fn input_value(&self, locator: &Locator) -> ProbeResult<String> {
        let mut state = self.record(format!("input_value:{locator}"));
        let el = state.element("input_value", locator)?;
        Ok(el.echo.clone().unwrap_or_else(|| el.value.clone()))
    }

    async fn text_content(&self, locator: &Locator) -> ProbeResult<Option<String>> {
        let mut state = self.record(format!("text_content:{locator}"));
        Ok(Some(state.element("text_content", locator)?.text.clone()))
    }

    async fn tag_name(&self, locator: &Locator) -> ProbeResult<String> {
        let mut state = self.record(format!("tag_name:{locator}"));
        Ok(state.element("tag_name", locator)?.tag.clone())
    }

    async fn select_native(&self, locator: &Locator, option: &SelectOption) -> ProbeResult<()> {
        let mut state = self.record(format!("select_native:{locator}:{option}"));
        let el = state.element("select", locator)?;
        if el.tag != "select" {
            return Err(ProbeError::action("select", locator, "element is not a <select>"));
        }
        let picked = match option {
            SelectOption::Label(label) => el.options.iter().find(|(l, _)| l == label),
            SelectOption::Value(value) => el.options.iter().find(|(_, v)| v == value),
            SelectOption::Index(i) => el.options.get(*i),
        }
        .map(|(_, v)| v.clone())
        .ok_or_else(|| ProbeError::action("select", locator, format!("no option {option}")))?;
        el.value = picked;
        Ok(())
    }

    async fn is_checked(&self, locator: &Locator) -> ProbeResult<bool> {
        let mut state = self.record(format!("is_checked:{locator}"));
        Ok(state.element("is_checked", locator)?.checked)
    }

    async fn property(&self, locator: &Locator, name: &str) -> ProbeResult<serde_json::Value> {
        let mut state = self.record(format!("property:{locator}:{name}"));
        let el = state.element("property", locator)?;
        Ok(el.properties.get(name).map_or(serde_json::Value::Null, |raw| {
            serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.clone()))
        }))
    }

    async fn press(&self, key: &str) -> ProbeResult<()> {
        let mut state = self.record(format!("press:{key}"));
        let effects = state.key_effects.get(key).cloned().unwrap_or_default();
        state.apply(&effects);
        Ok(())
    }

    async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        Ok(self.record("screenshot".to_string()).screenshot.clone())
    }

    async fn close(&self) -> ProbeResult<()> {
        self.record("close".to_string()).closed = true;
        Ok(())
    }
}
