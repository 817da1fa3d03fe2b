//! Session lifecycle: one browser process per manager, one isolated page per session.

use crate::config::Timings;
use crate::error::ApiError;
use crate::model::SizeSpec;
use crate::remote::driver::{BrowserLauncher, BrowserProcess, UiPage};
use crate::ui::select_size;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// A navigated page with the size already selected.
pub struct Session {
    id: u64,
    page: Box<dyn UiPage>,
    tasks_processed_since_refresh: usize,
}

impl Session {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn page(&self) -> &dyn UiPage {
        self.page.as_ref()
    }

    pub fn tasks_processed(&self) -> usize {
        self.tasks_processed_since_refresh
    }

    pub fn record_task(&mut self) {
        self.tasks_processed_since_refresh += 1;
    }

    /// True once the session has processed `interval` tasks.
    pub fn needs_refresh(&self, interval: usize) -> bool {
        self.tasks_processed_since_refresh >= interval
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("tasks_processed_since_refresh", &self.tasks_processed_since_refresh)
            .finish()
    }
}

/// Owns the browser process for one size and hands out sessions on it.
pub struct SessionManager {
    launcher: Arc<dyn BrowserLauncher>,
    process: Option<Box<dyn BrowserProcess>>,
    navigation_target: String,
    timings: Timings,
}

impl SessionManager {
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        navigation_target: impl Into<String>,
        timings: Timings,
    ) -> Self {
        Self {
            launcher,
            process: None,
            navigation_target: navigation_target.into(),
            timings,
        }
    }

    pub fn navigation_target(&self) -> &str {
        &self.navigation_target
    }

    /// Start the browser process. Replaces any process already held.
    pub async fn launch_process(&mut self) -> Result<(), ApiError> {
        self.close_process().await;
        let process = self.launcher.launch().await?;
        info!(target_url = %self.navigation_target, "Browser process launched");
        self.process = Some(process);
        Ok(())
    }

    /// Open a fresh session for `size`.
    ///
    /// On failure the process is relaunched and creation retried once.
    pub async fn create_session(&mut self, size: &SizeSpec) -> Result<Session, ApiError> {
        match self.try_create_session(size).await {
            Ok(session) => Ok(session),
            Err(first) => {
                warn!(
                    size = %size.label,
                    error = %first,
                    "Session creation failed; relaunching browser and retrying once"
                );
                self.launch_process().await?;
                self.try_create_session(size).await
            }
        }
    }

    async fn try_create_session(&self, size: &SizeSpec) -> Result<Session, ApiError> {
        let process = self
            .process
            .as_ref()
            .ok_or_else(|| ApiError::SessionFatal("browser process is not running".to_string()))?;

        let page = process.open_page().await?;
        if let Err(e) = self.prepare_page(page.as_ref(), size).await {
            if let Err(close_err) = page.close().await {
                debug!(error = %close_err, "Failed to close page after session setup error");
            }
            return Err(e);
        }

        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        debug!(session_id = id, size = %size.label, "Session created");
        Ok(Session {
            id,
            page,
            tasks_processed_since_refresh: 0,
        })
    }

    async fn prepare_page(&self, page: &dyn UiPage, size: &SizeSpec) -> Result<(), ApiError> {
        page.goto(&self.navigation_target).await?;
        page.wait_for_network_idle(self.timings.network_idle_timeout())
            .await?;
        sleep(self.timings.navigation_settle()).await;
        select_size(page, size, &self.timings).await?;
        Ok(())
    }

    /// Close the session's page and context. Never fails.
    pub async fn destroy_session(&self, session: Session) {
        let id = session.id;
        match session.page.close().await {
            Ok(()) => debug!(session_id = id, "Session destroyed"),
            Err(e) => debug!(session_id = id, error = %e, "Session teardown failed; ignoring"),
        }
    }

    /// Best-effort shutdown of the browser process.
    pub async fn close_process(&mut self) {
        if let Some(mut process) = self.process.take() {
            if let Err(e) = process.close().await {
                debug!(error = %e, "Browser shutdown failed; ignoring");
            }
        }
    }
}
