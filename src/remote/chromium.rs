//! Chrome DevTools Protocol driver.
//!
//! Each session gets its own browser context so project storage, cookies and
//! downloads never leak between sessions. Downloads are routed into a
//! per-context directory and collected when `Browser.downloadProgress`
//! reports completion.

use crate::config::{RemoteConfig, Timings};
use crate::error::{ApiError, UiError};
use crate::remote::driver::{BrowserLauncher, BrowserProcess, UiPage};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::browser::{
    BrowserContextId, CloseParams, DownloadProgressState, EventDownloadProgress,
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const NETWORK_POLL_INTERVAL: Duration = Duration::from_millis(250);

static NEXT_CONTEXT_DIR: AtomicU64 = AtomicU64::new(1);

/// Launches local Chromium processes.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    headless: bool,
    chrome_executable: Option<PathBuf>,
    window_width: u32,
    window_height: u32,
    element_timeout: Duration,
}

impl ChromiumLauncher {
    pub fn new(remote: &RemoteConfig, timings: &Timings) -> Self {
        Self {
            headless: remote.headless,
            chrome_executable: remote.chrome_executable.clone(),
            window_width: remote.window_width,
            window_height: remote.window_height,
            element_timeout: timings.element_timeout(),
        }
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserProcess>, ApiError> {
        let mut builder = BrowserConfig::builder()
            .window_size(self.window_width, self.window_height)
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run");
        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &self.chrome_executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(ApiError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ApiError::BrowserLaunch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    trace!(error = %e, "CDP handler event error");
                }
            }
        });

        debug!(headless = self.headless, "Chromium launched");
        Ok(Box::new(ChromiumProcess {
            browser: Arc::new(browser),
            handler_task,
            element_timeout: self.element_timeout,
        }))
    }
}

struct ChromiumProcess {
    browser: Arc<Browser>,
    handler_task: JoinHandle<()>,
    element_timeout: Duration,
}

#[async_trait]
impl BrowserProcess for ChromiumProcess {
    async fn open_page(&self) -> Result<Box<dyn UiPage>, UiError> {
        let context_id = self
            .browser
            .execute(CreateBrowserContextParams::default())
            .await
            .map_err(map_cdp)?
            .result
            .browser_context_id;

        let download_dir = std::env::temp_dir().join(format!(
            "shotforge-{}-{}",
            std::process::id(),
            NEXT_CONTEXT_DIR.fetch_add(1, Ordering::Relaxed)
        ));
        tokio::fs::create_dir_all(&download_dir).await?;

        self.browser
            .execute(download_behavior(&context_id, &download_dir))
            .await
            .map_err(map_cdp)?;

        let mut target = CreateTargetParams::new("about:blank");
        target.browser_context_id = Some(context_id.clone());
        let page = self.browser.new_page(target).await.map_err(map_cdp)?;

        Ok(Box::new(ChromiumPage {
            browser: Arc::clone(&self.browser),
            page,
            context_id,
            download_dir,
            element_timeout: self.element_timeout,
        }))
    }

    async fn close(&mut self) -> Result<(), UiError> {
        let result = self.browser.execute(CloseParams::default()).await;
        self.handler_task.abort();
        result.map(|_| ()).map_err(map_cdp)
    }
}

/// Name downloads by guid inside `dir` and report their progress, for one context only.
fn download_behavior(context_id: &BrowserContextId, dir: &Path) -> SetDownloadBehaviorParams {
    let mut params = SetDownloadBehaviorParams::new(SetDownloadBehaviorBehavior::AllowAndName);
    params.browser_context_id = Some(context_id.clone());
    params.download_path = Some(dir.to_string_lossy().into_owned());
    params.events_enabled = Some(true);
    params
}

struct ChromiumPage {
    browser: Arc<Browser>,
    page: Page,
    context_id: BrowserContextId,
    download_dir: PathBuf,
    element_timeout: Duration,
}

impl ChromiumPage {
    async fn eval<T: DeserializeOwned>(&self, script: String) -> Result<T, UiError> {
        self.page
            .evaluate(script)
            .await
            .map_err(map_cdp)?
            .into_value::<T>()
            .map_err(|e| UiError::Script(e.to_string()))
    }

    /// Poll for an element until the element timeout elapses.
    async fn element(&self, selector: &str) -> Result<Element, UiError> {
        let deadline = Instant::now() + self.element_timeout;
        loop {
            match self.page.find_element(selector).await.map_err(map_cdp) {
                Ok(element) => return Ok(element),
                Err(e @ UiError::ConnectionLost(_)) => return Err(e),
                Err(_) if Instant::now() < deadline => sleep(POLL_INTERVAL).await,
                Err(_) => return Err(UiError::ElementNotFound(selector.to_string())),
            }
        }
    }

    /// Run a script that returns `true` once it acted, retrying until the element timeout.
    async fn act(&self, selector: &str, script: String) -> Result<(), UiError> {
        let deadline = Instant::now() + self.element_timeout;
        loop {
            if self.eval::<bool>(script.clone()).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(UiError::ElementNotFound(selector.to_string()));
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl UiPage for ChromiumPage {
    async fn goto(&self, url: &str) -> Result<(), UiError> {
        self.page.goto(url).await.map_err(map_cdp)?;
        Ok(())
    }

    async fn reload(&self) -> Result<(), UiError> {
        self.page.reload().await.map_err(map_cdp)?;
        Ok(())
    }

    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<(), UiError> {
        let deadline = Instant::now() + timeout;
        let mut last = -1i64;
        let mut stable_polls = 0;
        while Instant::now() < deadline {
            let entries: i64 = self.eval(scripts::resource_count()).await?;
            if entries >= 0 && entries == last {
                stable_polls += 1;
                if stable_polls >= 2 {
                    return Ok(());
                }
            } else {
                stable_polls = 0;
            }
            last = entries;
            sleep(NETWORK_POLL_INTERVAL).await;
        }
        debug!(?timeout, "Network did not go idle; continuing");
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool, UiError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.count(selector).await? > 0 {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn count(&self, selector: &str) -> Result<usize, UiError> {
        self.eval(scripts::count(selector)).await
    }

    async fn click(&self, selector: &str) -> Result<(), UiError> {
        let element = self.element(selector).await?;
        element.click().await.map_err(map_cdp)?;
        Ok(())
    }

    async fn click_text(&self, selector: &str, text: &str) -> Result<(), UiError> {
        self.act(selector, scripts::click_text(selector, text)).await
    }

    async fn context_click(&self, selector: &str) -> Result<(), UiError> {
        self.act(selector, scripts::context_click(selector)).await
    }

    async fn is_active(&self, selector: &str) -> Result<bool, UiError> {
        self.element(selector).await?;
        let state: Option<bool> = self.eval(scripts::is_active(selector)).await?;
        state.ok_or_else(|| UiError::ElementNotFound(selector.to_string()))
    }

    async fn set_value(&self, selector: &str, value: &str) -> Result<(), UiError> {
        self.act(selector, scripts::set_value(selector, value)).await
    }

    async fn set_input_file(&self, selector: &str, path: &Path) -> Result<(), UiError> {
        let element = self.element(selector).await?;
        let mut params = SetFileInputFilesParams::new(vec![path.to_string_lossy().into_owned()]);
        params.backend_node_id = Some(element.backend_node_id);
        self.page.execute(params).await.map_err(map_cdp)?;
        Ok(())
    }

    async fn canvas_is_blank(&self, selector: &str) -> Result<bool, UiError> {
        let blank: Option<bool> = self.eval(scripts::canvas_is_blank(selector)).await?;
        blank.ok_or_else(|| UiError::ElementNotFound(selector.to_string()))
    }

    async fn download(&self, trigger: &str, timeout: Duration) -> Result<Vec<u8>, UiError> {
        let mut progress = self
            .browser
            .event_listener::<EventDownloadProgress>()
            .await
            .map_err(map_cdp)?;

        self.click(trigger).await?;

        let completed = tokio::time::timeout(timeout, async {
            while let Some(event) = progress.next().await {
                match event.state {
                    DownloadProgressState::Completed => return Ok(event.guid.clone()),
                    DownloadProgressState::Canceled => {
                        return Err(UiError::Script(format!("download {} was canceled", event.guid)))
                    }
                    _ => {}
                }
            }
            Err(UiError::ConnectionLost("download event stream closed".to_string()))
        })
        .await
        .map_err(|_| UiError::DownloadTimeout(timeout))?;

        let guid = completed?;
        let path = self.download_dir.join(&guid);
        let bytes = tokio::fs::read(&path).await?;
        if let Err(e) = tokio::fs::remove_file(&path).await {
            trace!(path = %path.display(), error = %e, "Failed to remove downloaded file");
        }
        Ok(bytes)
    }

    async fn close(&self) -> Result<(), UiError> {
        let closed = self.page.clone().close().await.map_err(map_cdp);
        let disposed = self
            .browser
            .execute(DisposeBrowserContextParams::new(self.context_id.clone()))
            .await
            .map_err(map_cdp);
        if let Err(e) = tokio::fs::remove_dir_all(&self.download_dir).await {
            trace!(dir = %self.download_dir.display(), error = %e, "Failed to remove download directory");
        }
        closed?;
        disposed?;
        Ok(())
    }
}

/// Collapse CDP errors into the driver taxonomy; transport failures mean the session is gone.
fn map_cdp(err: CdpError) -> UiError {
    match err {
        CdpError::Ws(e) => UiError::ConnectionLost(e.to_string()),
        CdpError::ChannelSendError(e) => UiError::ConnectionLost(e.to_string()),
        CdpError::NoResponse => UiError::ConnectionLost("browser stopped responding".to_string()),
        CdpError::Timeout => UiError::InteractionTimeout("CDP request timed out".to_string()),
        CdpError::NotFound => UiError::ElementNotFound("node".to_string()),
        other => UiError::Script(other.to_string()),
    }
}

/// In-page scripts. Every selector and value is embedded as a JSON string literal.
mod scripts {
    fn literal(s: &str) -> String {
        serde_json::Value::String(s.to_string()).to_string()
    }

    pub fn resource_count() -> String {
        "document.readyState === 'complete' ? performance.getEntriesByType('resource').length : -1"
            .to_string()
    }

    pub fn count(selector: &str) -> String {
        format!("document.querySelectorAll({}).length", literal(selector))
    }

    pub fn click_text(selector: &str, text: &str) -> String {
        format!(
            "(() => {{ const el = Array.from(document.querySelectorAll({})).find(e => e.textContent.trim() === {}); \
             if (!el) return false; el.click(); return true; }})()",
            literal(selector),
            literal(text)
        )
    }

    pub fn context_click(selector: &str) -> String {
        format!(
            "(() => {{ const el = document.querySelector({}); if (!el) return false; \
             const r = el.getBoundingClientRect(); \
             el.dispatchEvent(new MouseEvent('contextmenu', {{ bubbles: true, cancelable: true, button: 2, \
             clientX: r.left + r.width / 2, clientY: r.top + r.height / 2 }})); return true; }})()",
            literal(selector)
        )
    }

    pub fn is_active(selector: &str) -> String {
        format!(
            "(() => {{ const el = document.querySelector({}); if (!el) return null; \
             return el.classList.contains('active') || el.checked === true \
             || el.getAttribute('aria-checked') === 'true' || el.getAttribute('aria-pressed') === 'true'; }})()",
            literal(selector)
        )
    }

    /// Native value setter so framework-managed inputs see the change.
    pub fn set_value(selector: &str, value: &str) -> String {
        format!(
            "(() => {{ const el = document.querySelector({}); if (!el) return false; \
             const proto = el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype \
             : el instanceof HTMLSelectElement ? HTMLSelectElement.prototype : HTMLInputElement.prototype; \
             Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, {}); \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true; }})()",
            literal(selector),
            literal(value)
        )
    }

    /// Downscale the canvas into a 64x64 scratch canvas and look for any non-zero alpha.
    pub fn canvas_is_blank(selector: &str) -> String {
        format!(
            "(() => {{ const c = document.querySelector({}); if (!c) return null; \
             const s = document.createElement('canvas'); s.width = 64; s.height = 64; \
             const ctx = s.getContext('2d'); ctx.drawImage(c, 0, 0, 64, 64); \
             const d = ctx.getImageData(0, 0, 64, 64).data; \
             for (let i = 3; i < d.length; i += 4) {{ if (d[i] !== 0) return false; }} return true; }})()",
            literal(selector)
        )
    }
}
