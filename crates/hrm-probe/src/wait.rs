//! Wait mechanisms.
//!
//! Every wait here is a bounded poll: observe, return if the condition
//! holds, otherwise sleep one poll interval (never past the deadline) and
//! observe again. The first observation happens before any sleep, so an
//! already-satisfied condition or a zero timeout costs exactly one probe.
//! Waits only observe; they never act on the page and never retry actions.

use crate::driver::{BrowserDriver, DocumentState, ElementState};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Network idle threshold (500ms with no request in flight)
pub const NETWORK_IDLE_THRESHOLD_MS: u64 = 500;

/// Longest time spent waiting for network idle before falling back to `load`
pub const NETWORK_IDLE_BUDGET_MS: u64 = 5_000;

// =============================================================================
// LOAD STATE
// =============================================================================

/// Page load states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadState {
    /// The `load` event has fired
    #[default]
    Load,
    /// `DOMContentLoaded` has fired
    DomContentLoaded,
    /// Document complete and no request in flight for 500ms
    NetworkIdle,
}

impl LoadState {
    /// Get the JavaScript event name for this load state
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::DomContentLoaded => "DOMContentLoaded",
            Self::NetworkIdle => "networkidle",
        }
    }

    /// Whether a `readyState` already implies this milestone
    #[must_use]
    pub const fn reached_by(&self, ready: DocumentState) -> bool {
        match self {
            Self::DomContentLoaded => ready.dom_ready(),
            Self::Load | Self::NetworkIdle => matches!(ready, DocumentState::Complete),
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

// =============================================================================
// ELEMENT WAIT STATE
// =============================================================================

/// Element condition to wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl WaitState {
    /// Whether an observed element state satisfies this condition
    #[must_use]
    pub const fn is_met(&self, state: ElementState) -> bool {
        match self {
            Self::Visible => state.attached && state.visible,
            Self::Hidden => !state.attached || !state.visible,
            Self::Attached => state.attached,
            Self::Detached => !state.attached,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Attached => "attached",
            Self::Detached => "detached",
        }
    }
}

impl std::fmt::Display for WaitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// URL PATTERN
// =============================================================================

/// URL pattern for navigation waits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Prefix match
    Prefix(String),
    /// Contains substring
    Contains(String),
    /// Regex match
    Regex(String),
    /// Match any URL
    Any,
}

impl UrlPattern {
    #[must_use]
    pub fn contains(fragment: impl Into<String>) -> Self {
        Self::Contains(fragment.into())
    }

    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Prefix(pattern) => url.starts_with(pattern.as_str()),
            Self::Contains(pattern) => url.contains(pattern.as_str()),
            Self::Regex(pattern) => regex::Regex::new(pattern).is_ok_and(|re| re.is_match(url)),
            Self::Any => true,
        }
    }
}

impl std::fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(p) => write!(f, "url == {p}"),
            Self::Prefix(p) => write!(f, "url starting with {p}"),
            Self::Contains(p) => write!(f, "url containing {p}"),
            Self::Regex(p) => write!(f, "url matching /{p}/"),
            Self::Any => f.write_str("any url"),
        }
    }
}

// =============================================================================
// WAIT OPTIONS / RESULT
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Overall deadline
    pub timeout: Duration,
    /// Sleep between observations
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl WaitOptions {
    /// Default poll interval with the given timeout
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Result of a successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
}

impl WaitResult {
    #[must_use]
    pub fn new(elapsed: Duration, waited_for: impl Into<String>) -> Self {
        Self {
            elapsed,
            waited_for: waited_for.into(),
        }
    }
}

/// Which signal ended [`wait_for_network_idle_or_load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    NetworkIdle,
    LoadFallback,
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll `probe` until it yields a value or the deadline passes.
///
/// Probe errors abort the wait immediately. On deadline the error is
/// [`ProbeError::WaitTimeout`] naming `target` and `condition`.
pub async fn poll<T, F, Fut>(
    options: WaitOptions,
    target: &str,
    condition: &str,
    mut probe: F,
) -> ProbeResult<(T, Duration)>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<Option<T>>>,
{
    let start = Instant::now();
    loop {
        if let Some(value) = probe().await? {
            return Ok((value, start.elapsed()));
        }
        let elapsed = start.elapsed();
        if elapsed >= options.timeout {
            return Err(ProbeError::WaitTimeout {
                target: target.to_string(),
                condition: condition.to_string(),
                elapsed_ms: millis(elapsed),
            });
        }
        sleep(options.poll_interval.min(options.timeout - elapsed)).await;
    }
}

/// Poll an async predicate until it returns `true`
pub async fn wait_until<F, Fut>(
    options: WaitOptions,
    description: &str,
    mut predicate: F,
) -> ProbeResult<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<bool>>,
{
    let fut = move || {
        let check = predicate();
        async move { Ok::<_, ProbeError>(check.await?.then_some(())) }
    };
    let ((), elapsed) = poll(options, description, "true", fut).await?;
    Ok(WaitResult::new(elapsed, description))
}

/// Wait until the located element reaches `state`
pub async fn wait_for_condition(
    driver: &dyn BrowserDriver,
    locator: &Locator,
    state: WaitState,
    timeout: Duration,
) -> ProbeResult<WaitResult> {
    let target = locator.to_string();
    let probe = move || async move {
        let observed = driver.element_state(locator).await?;
        Ok::<_, ProbeError>(state.is_met(observed).then_some(()))
    };
    let ((), elapsed) = poll(
        WaitOptions::with_timeout(timeout),
        &target,
        state.as_str(),
        probe,
    )
    .await?;
    Ok(WaitResult::new(elapsed, format!("{target} {state}")))
}

/// Wait until the current URL matches `pattern`
pub async fn wait_for_url(
    driver: &dyn BrowserDriver,
    pattern: &UrlPattern,
    timeout: Duration,
) -> ProbeResult<WaitResult> {
    let description = pattern.to_string();
    let probe = move || async move {
        let url = driver.current_url().await?;
        Ok::<_, ProbeError>(pattern.matches(&url).then_some(()))
    };
    let ((), elapsed) = poll(
        WaitOptions::with_timeout(timeout),
        "page",
        &description,
        probe,
    )
    .await?;
    Ok(WaitResult::new(elapsed, description))
}

/// Wait for a page load milestone
pub async fn wait_for_load_state(
    driver: &dyn BrowserDriver,
    state: LoadState,
    timeout: Duration,
) -> ProbeResult<WaitResult> {
    if state == LoadState::NetworkIdle {
        return wait_for_network_idle(driver, WaitOptions::with_timeout(timeout)).await;
    }
    let probe = move || async move {
        let ready = driver.ready_state().await?;
        Ok::<_, ProbeError>(state.reached_by(ready).then_some(()))
    };
    let ((), elapsed) = poll(
        WaitOptions::with_timeout(timeout),
        "page",
        state.event_name(),
        probe,
    )
    .await?;
    Ok(WaitResult::new(elapsed, state.event_name()))
}

/// Document complete and zero requests in flight for
/// [`NETWORK_IDLE_THRESHOLD_MS`].
///
/// Any observed in-flight request restarts the quiet window, so a slow
/// request that outlives the window still counts as activity.
async fn wait_for_network_idle(
    driver: &dyn BrowserDriver,
    options: WaitOptions,
) -> ProbeResult<WaitResult> {
    let quiet_window = Duration::from_millis(NETWORK_IDLE_THRESHOLD_MS);
    let start = Instant::now();
    let mut quiet_since: Option<Instant> = None;

    loop {
        let ready = driver.ready_state().await?;
        let inflight = driver.inflight_requests().await?;
        let now = Instant::now();
        if inflight > 0 {
            quiet_since = None;
        }
        let quiet_from = *quiet_since.get_or_insert(now);
        if inflight == 0
            && ready == DocumentState::Complete
            && now.duration_since(quiet_from) >= quiet_window
        {
            return Ok(WaitResult::new(start.elapsed(), "networkidle"));
        }

        let elapsed = start.elapsed();
        if elapsed >= options.timeout {
            return Err(ProbeError::WaitTimeout {
                target: "page".to_string(),
                condition: "networkidle".to_string(),
                elapsed_ms: millis(elapsed),
            });
        }
        sleep(options.poll_interval.min(options.timeout - elapsed)).await;
    }
}

/// Wait for network idle, falling back to `load` for whatever budget is left.
///
/// Idle is given at most `min(NETWORK_IDLE_BUDGET_MS, timeout)`. Pages that
/// poll the backend continuously never go idle; for those the `load`
/// milestone is accepted instead.
pub async fn wait_for_network_idle_or_load(
    driver: &dyn BrowserDriver,
    timeout: Duration,
) -> ProbeResult<Settled> {
    let start = Instant::now();
    let idle_budget = timeout.min(Duration::from_millis(NETWORK_IDLE_BUDGET_MS));

    match wait_for_load_state(driver, LoadState::NetworkIdle, idle_budget).await {
        Ok(_) => Ok(Settled::NetworkIdle),
        Err(ProbeError::WaitTimeout { .. }) => {
            tracing::debug!("network idle not reached, falling back to load");
            let remaining = timeout.saturating_sub(start.elapsed());
            wait_for_load_state(driver, LoadState::Load, remaining).await?;
            Ok(Settled::LoadFallback)
        }
        Err(err) => Err(err),
    }
}
