//! Real browser control over CDP.
//!
//! [`ChromiumDriver`] implements [`BrowserDriver`] with chromiumoxide. Element
//! reads run as JavaScript built from the locator's query; clicks and typing
//! go through CDP input events on an element handle, so the application sees
//! trusted events. In-flight requests are counted from the page's CDP
//! Network events.

use crate::config::Settings;
use crate::driver::{BrowserDriver, DocumentState, ElementState, SelectOption};
use crate::locator::Locator;
use crate::logging::Logger;
use crate::result::{ProbeError, ProbeResult};
use crate::session::{Session, SessionLauncher};
use async_trait::async_trait;
use base64::Engine as _;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::{stream, StreamExt};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, PoisonError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Attribute used to hand a JS-resolved element over to CDP; removed again
/// once the handle is resolved
const HANDLE_ATTR: &str = "data-hrm-probe";

fn handle_selector(id: &str) -> String {
    format!("[{HANDLE_ATTR}=\"{id}\"]")
}

fn release_handle_script(id: &str) -> String {
    format!(
        "(document.querySelector({:?})?.removeAttribute({HANDLE_ATTR:?}), true)",
        handle_selector(id)
    )
}

fn browser_err(err: impl fmt::Display) -> ProbeError {
    ProbeError::Browser {
        message: err.to_string(),
    }
}

/// Result of running a script against a located element
#[derive(Debug, Deserialize)]
struct Located {
    found: bool,
    #[serde(default)]
    value: serde_json::Value,
}

/// Wrap `body` (an expression over `el`) so it runs against the located
/// element and reports whether one was found
fn element_script(locator: &Locator, body: &str) -> String {
    format!(
        "((el) => el ? {{ found: true, value: ({body}) }} : {{ found: false }})({})",
        locator.to_element_query()
    )
}

const VISIBILITY: &str = "{ attached: true, visible: (() => { \
    const s = getComputedStyle(el); \
    return s.visibility !== 'hidden' && s.display !== 'none' && \
        !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length); })() }";

/// Scroll into view, then report the element covering the centre point when
/// it is not the target or one of its descendants
const OBSCURED_BY: &str = "(() => { \
    el.scrollIntoView({ block: 'center', inline: 'center' }); \
    const r = el.getBoundingClientRect(); \
    const hit = document.elementFromPoint(r.left + r.width / 2, r.top + r.height / 2); \
    if (!hit || hit === el || el.contains(hit) || hit.contains(el)) return null; \
    const classes = hit.className ? '.' + String(hit.className).split(' ').join('.') : ''; \
    return hit.tagName.toLowerCase() + classes; })()";

fn select_script(option: &SelectOption) -> String {
    let matcher = match option {
        SelectOption::Label(label) => {
            format!("o.label === {label:?} || o.text.trim() === {label:?}")
        }
        SelectOption::Value(value) => format!("o.value === {value:?}"),
        SelectOption::Index(index) => format!("i === {index}"),
    };
    format!(
        "(() => {{ const i0 = Array.from(el.options).findIndex((o, i) => {matcher}); \
         if (i0 < 0) return false; el.selectedIndex = i0; \
         el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
         el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true; }})()"
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NetworkEvent {
    Sent(String),
    Done(String),
}

/// Request ids sent but not yet finished or failed.
///
/// Redirects reuse the request id, so a redirected request stays a single
/// entry until its final response finishes.
#[derive(Debug, Default)]
struct InflightRequests(std::sync::Mutex<HashSet<String>>);

impl InflightRequests {
    fn apply(&self, event: NetworkEvent) {
        let mut ids = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        match event {
            NetworkEvent::Sent(id) => {
                ids.insert(id);
            }
            NetworkEvent::Done(id) => {
                ids.remove(&id);
            }
        }
    }

    fn count(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Feed the page's Network events into `inflight` until the page goes away
async fn track_requests(
    page: &Page,
    inflight: Arc<InflightRequests>,
) -> ProbeResult<JoinHandle<()>> {
    let sent = page
        .event_listener::<EventRequestWillBeSent>()
        .await
        .map_err(browser_err)?
        .map(|e| NetworkEvent::Sent(e.request_id.inner().clone()));
    let finished = page
        .event_listener::<EventLoadingFinished>()
        .await
        .map_err(browser_err)?
        .map(|e| NetworkEvent::Done(e.request_id.inner().clone()));
    let failed = page
        .event_listener::<EventLoadingFailed>()
        .await
        .map_err(browser_err)?
        .map(|e| NetworkEvent::Done(e.request_id.inner().clone()));

    let events = stream::select(sent, stream::select(finished, failed));
    Ok(tokio::spawn(async move {
        let mut events = std::pin::pin!(events);
        while let Some(event) = events.next().await {
            inflight.apply(event);
        }
    }))
}

/// Chromium page driven over CDP
pub struct ChromiumDriver {
    browser: Mutex<Browser>,
    page: Page,
    handler: JoinHandle<()>,
    inflight: Arc<InflightRequests>,
    network: JoinHandle<()>,
}

impl fmt::Debug for ChromiumDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromiumDriver")
            .field("handler_finished", &self.handler.is_finished())
            .field("inflight", &self.inflight.count())
            .finish()
    }
}

impl ChromiumDriver {
    /// Launch Chromium with the viewport, headless mode and executable from
    /// `settings`, and open a blank page
    pub async fn launch(settings: &Settings) -> ProbeResult<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(settings.viewport_width, settings.viewport_height);

        if !settings.headless {
            builder = builder.with_head();
        }

        if let Some(path) = &settings.chromium_path {
            builder = builder.chrome_executable(path);
        }

        let config = builder.build().map_err(browser_err)?;
        let (browser, mut handler) = Browser::launch(config).await.map_err(browser_err)?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(browser_err)?;
        let metrics = SetDeviceMetricsOverrideParams::builder()
            .width(i64::from(settings.viewport_width))
            .height(i64::from(settings.viewport_height))
            .device_scale_factor(1.0)
            .mobile(false)
            .build()
            .map_err(browser_err)?;
        page.execute(metrics).await.map_err(browser_err)?;

        let inflight = Arc::new(InflightRequests::default());
        let network = track_requests(&page, inflight.clone()).await?;

        tracing::debug!(
            headless = settings.headless,
            width = settings.viewport_width,
            height = settings.viewport_height,
            "chromium launched"
        );

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler,
            inflight,
            network,
        })
    }

    async fn evaluate<T: DeserializeOwned>(&self, expression: String) -> ProbeResult<T> {
        let params = EvaluateParams::builder()
            .expression(expression)
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(browser_err)?;
        let result = self
            .page
            .evaluate_expression(params)
            .await
            .map_err(browser_err)?;
        Ok(result.into_value()?)
    }

    /// Run `body` against the located element, failing `action` when the
    /// locator resolves to nothing
    async fn on_element<T: DeserializeOwned>(
        &self,
        action: &str,
        locator: &Locator,
        body: &str,
    ) -> ProbeResult<T> {
        let located: Located = self.evaluate(element_script(locator, body)).await?;
        if !located.found {
            return Err(ProbeError::action(action, locator, "element not found"));
        }
        Ok(serde_json::from_value(located.value)?)
    }

    /// CDP handle for the located element
    async fn handle(&self, action: &str, locator: &Locator) -> ProbeResult<Element> {
        let id = uuid::Uuid::new_v4().to_string();
        let _: bool = self
            .on_element(
                action,
                locator,
                &format!("(el.setAttribute({HANDLE_ATTR:?}, {id:?}), true)"),
            )
            .await?;
        let element = self.page.find_element(handle_selector(&id)).await;
        let _: bool = self.evaluate(release_handle_script(&id)).await?;
        element.map_err(|e| ProbeError::action(action, locator, e.to_string()))
    }
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn goto(&self, url: &str) -> ProbeResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ProbeError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn reload(&self) -> ProbeResult<()> {
        self.page.reload().await.map_err(browser_err)?;
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.page.url().await.map_err(browser_err)?.unwrap_or_default())
    }

    async fn title(&self) -> ProbeResult<String> {
        Ok(self
            .page
            .get_title()
            .await
            .map_err(browser_err)?
            .unwrap_or_default())
    }

    async fn ready_state(&self) -> ProbeResult<DocumentState> {
        let state: String = self.evaluate("document.readyState".to_string()).await?;
        Ok(DocumentState::parse(&state))
    }

    async fn inflight_requests(&self) -> ProbeResult<usize> {
        Ok(self.inflight.count())
    }

    async fn element_state(&self, locator: &Locator) -> ProbeResult<ElementState> {
        let located: Located = self.evaluate(element_script(locator, VISIBILITY)).await?;
        if !located.found {
            return Ok(ElementState::DETACHED);
        }
        Ok(serde_json::from_value(located.value)?)
    }

    async fn count(&self, locator: &Locator) -> ProbeResult<usize> {
        self.evaluate(locator.to_count_query()).await
    }

    async fn click(&self, locator: &Locator, force: bool) -> ProbeResult<()> {
        if force {
            let _: bool = self.on_element("click", locator, "(el.click(), true)").await?;
            return Ok(());
        }

        let obscured: Option<String> = self.on_element("click", locator, OBSCURED_BY).await?;
        if let Some(cover) = obscured {
            return Err(ProbeError::action(
                "click",
                locator,
                format!("element is obscured by {cover}"),
            ));
        }
        let element = self.handle("click", locator).await?;
        element
            .click()
            .await
            .map_err(|e| ProbeError::action("click", locator, e.to_string()))?;
        Ok(())
    }

    async fn clear(&self, locator: &Locator) -> ProbeResult<()> {
        let element = self.handle("clear", locator).await?;
        let _: bool = self
            .on_element("clear", locator, "(el.focus(), el.select && el.select(), true)")
            .await?;
        element
            .press_key("Backspace")
            .await
            .map_err(|e| ProbeError::action("clear", locator, e.to_string()))?;
        Ok(())
    }

    async fn fill(&self, locator: &Locator, text: &str) -> ProbeResult<()> {
        self.clear(locator).await?;
        let element = self.handle("fill", locator).await?;
        element
            .focus()
            .await
            .map_err(|e| ProbeError::action("fill", locator, e.to_string()))?
            .type_str(text)
            .await
            .map_err(|e| ProbeError::action("fill", locator, e.to_string()))?;
        Ok(())
    }

    async fn input_value(&self, locator: &Locator) -> ProbeResult<String> {
        self.on_element("input_value", locator, "el.value ?? ''").await
    }

    async fn text_content(&self, locator: &Locator) -> ProbeResult<Option<String>> {
        self.on_element("text_content", locator, "el.textContent").await
    }

    async fn tag_name(&self, locator: &Locator) -> ProbeResult<String> {
        self.on_element("tag_name", locator, "el.tagName.toLowerCase()")
            .await
    }

    async fn select_native(&self, locator: &Locator, option: &SelectOption) -> ProbeResult<()> {
        let selected: bool = self
            .on_element("select", locator, &select_script(option))
            .await?;
        if !selected {
            return Err(ProbeError::action(
                "select",
                locator,
                format!("no option matching {option}"),
            ));
        }
        Ok(())
    }

    async fn is_checked(&self, locator: &Locator) -> ProbeResult<bool> {
        self.on_element("is_checked", locator, "!!el.checked").await
    }

    async fn property(&self, locator: &Locator, name: &str) -> ProbeResult<serde_json::Value> {
        self.on_element("property", locator, &format!("el[{name:?}] ?? null"))
            .await
    }

    async fn press(&self, key: &str) -> ProbeResult<()> {
        let target = match self.page.find_element(":focus").await {
            Ok(element) => element,
            Err(_) => self.page.find_element("body").await.map_err(browser_err)?,
        };
        target
            .press_key(key)
            .await
            .map_err(|e| ProbeError::action("press", key, e.to_string()))?;
        Ok(())
    }

    async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let screenshot = self.page.execute(params).await.map_err(browser_err)?;
        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(browser_err)
    }

    async fn close(&self) -> ProbeResult<()> {
        let mut browser = self.browser.lock().await;
        let closed = browser.close().await.map_err(browser_err);
        let _ = browser.wait().await;
        self.network.abort();
        self.handler.abort();
        closed.map(|_| ())
    }
}

/// Launches one Chromium per session
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromiumLauncher;

#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    async fn launch(&self, settings: Arc<Settings>, logger: Logger) -> ProbeResult<Session> {
        let driver = ChromiumDriver::launch(&settings).await?;
        logger.debug("browser session started");
        Ok(Session::new(Arc::new(driver), settings, logger))
    }
}
