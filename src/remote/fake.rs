//! Scripted in-memory design tool for exercising the orchestrator without a browser.
//!
//! The fake models what matters to the orchestration: project items that
//! survive reloads, flip-only toggles (optionally swallowing a click), a
//! context menu, canvas blank readings and downloads. Failures are injected by
//! decrementing counters in [`FakeScript`].

use crate::error::{ApiError, UiError};
use crate::remote::driver::{BrowserLauncher, BrowserProcess, UiPage};
use crate::ui::controls;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Failure injection knobs; counters are consumed as failures fire.
#[derive(Debug, Default, Clone)]
pub struct FakeScript {
    pub launch_failures: usize,
    pub navigation_failures: usize,
    /// Transient download failures; these fire before any `fatal_exports`
    pub export_failures: usize,
    pub fatal_exports: usize,
    pub blank_canvas_reads: usize,
    pub close_failures: usize,
    /// Time every download takes before it resolves
    pub download_delay: Duration,
    /// Toggles whose next click is swallowed
    pub sticky_toggles: HashSet<String>,
    /// Selectors that never appear
    pub missing_controls: HashSet<String>,
}

/// What the fake saw.
#[derive(Debug, Default, Clone)]
pub struct FakeObservations {
    pub launches: usize,
    pub processes_closed: usize,
    pub pages_opened: usize,
    pub pages_closed: usize,
    pub navigations: usize,
    pub reloads: usize,
    pub uploads: Vec<PathBuf>,
    pub downloads: usize,
    pub canvas_reads: usize,
    /// `page#<n> <verb> <selector>` lines in call order
    pub events: Vec<String>,
}

impl FakeObservations {
    pub fn count_events(&self, needle: &str) -> usize {
        self.events.iter().filter(|e| e.contains(needle)).count()
    }
}

#[derive(Debug, Default)]
struct FakeState {
    script: FakeScript,
    observed: FakeObservations,
    project_items: usize,
    menu_open: bool,
    toggles: HashMap<String, bool>,
    values: HashMap<String, String>,
}

/// Handle to one fake design tool backend, shared by every process and page it creates.
#[derive(Clone, Default)]
pub struct FakeUi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(self, script: FakeScript) -> Self {
        self.state.lock().script = script;
        self
    }

    /// Project items already persisted before the run starts.
    pub fn with_project_items(self, items: usize) -> Self {
        self.state.lock().project_items = items;
        self
    }

    pub fn with_toggle(self, selector: &str, active: bool) -> Self {
        self.state.lock().toggles.insert(selector.to_string(), active);
        self
    }

    pub fn script_mut<R>(&self, f: impl FnOnce(&mut FakeScript) -> R) -> R {
        f(&mut self.state.lock().script)
    }

    pub fn launcher(&self) -> Arc<dyn BrowserLauncher> {
        Arc::new(FakeLauncher { ui: self.clone() })
    }

    /// Open a page directly, bypassing process launch.
    pub fn open_page(&self) -> FakePage {
        let mut state = self.state.lock();
        state.observed.pages_opened += 1;
        FakePage {
            id: state.observed.pages_opened,
            ui: self.clone(),
        }
    }

    pub fn observed(&self) -> FakeObservations {
        self.state.lock().observed.clone()
    }

    pub fn project_items(&self) -> usize {
        self.state.lock().project_items
    }

    pub fn toggle(&self, selector: &str) -> bool {
        self.state.lock().toggles.get(selector).copied().unwrap_or(false)
    }

    pub fn value(&self, selector: &str) -> Option<String> {
        self.state.lock().values.get(selector).cloned()
    }
}

fn is_toggle(selector: &str) -> bool {
    [
        controls::FRAME_TOGGLE,
        controls::HEADLINE_TOGGLE,
        controls::SUBHEADLINE_TOGGLE,
    ]
    .contains(&selector)
}

struct FakeLauncher {
    ui: FakeUi,
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserProcess>, ApiError> {
        let mut state = self.ui.state.lock();
        if state.script.launch_failures > 0 {
            state.script.launch_failures -= 1;
            return Err(ApiError::BrowserLaunch("scripted launch failure".to_string()));
        }
        state.observed.launches += 1;
        Ok(Box::new(FakeProcess {
            ui: self.ui.clone(),
        }))
    }
}

struct FakeProcess {
    ui: FakeUi,
}

#[async_trait]
impl BrowserProcess for FakeProcess {
    async fn open_page(&self) -> Result<Box<dyn UiPage>, UiError> {
        Ok(Box::new(self.ui.open_page()))
    }

    async fn close(&mut self) -> Result<(), UiError> {
        self.ui.state.lock().observed.processes_closed += 1;
        Ok(())
    }
}

/// A page of the fake tool.
pub struct FakePage {
    id: usize,
    ui: FakeUi,
}

impl FakePage {
    fn record(&self, state: &mut FakeState, verb: &str, selector: &str) {
        state
            .observed
            .events
            .push(format!("page#{} {} {}", self.id, verb, selector));
    }

    fn require(&self, state: &FakeState, selector: &str) -> Result<(), UiError> {
        if state.script.missing_controls.contains(selector) {
            return Err(UiError::ElementNotFound(selector.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UiPage for FakePage {
    async fn goto(&self, url: &str) -> Result<(), UiError> {
        let mut state = self.ui.state.lock();
        self.record(&mut state, "goto", url);
        if state.script.navigation_failures > 0 {
            state.script.navigation_failures -= 1;
            return Err(UiError::ConnectionLost("scripted navigation failure".to_string()));
        }
        state.observed.navigations += 1;
        Ok(())
    }

    async fn reload(&self) -> Result<(), UiError> {
        let mut state = self.ui.state.lock();
        self.record(&mut state, "reload", "");
        state.observed.reloads += 1;
        state.menu_open = false;
        Ok(())
    }

    async fn wait_for_network_idle(&self, _timeout: Duration) -> Result<(), UiError> {
        Ok(())
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<bool, UiError> {
        let state = self.ui.state.lock();
        if state.script.missing_controls.contains(selector) {
            return Ok(false);
        }
        Ok(match selector {
            controls::ITEM_CONTEXT_MENU => state.menu_open,
            controls::PROJECT_ITEMS | controls::LATEST_PROJECT_ITEM => state.project_items > 0,
            _ => true,
        })
    }

    async fn count(&self, selector: &str) -> Result<usize, UiError> {
        let state = self.ui.state.lock();
        if state.script.missing_controls.contains(selector) {
            return Ok(0);
        }
        Ok(match selector {
            controls::PROJECT_ITEMS => state.project_items,
            _ => 1,
        })
    }

    async fn click(&self, selector: &str) -> Result<(), UiError> {
        let mut state = self.ui.state.lock();
        self.require(&state, selector)?;
        self.record(&mut state, "click", selector);
        if selector == controls::ITEM_MENU_DELETE {
            if !state.menu_open {
                return Err(UiError::ElementNotFound(selector.to_string()));
            }
            state.project_items = state.project_items.saturating_sub(1);
            state.menu_open = false;
        } else if is_toggle(selector) {
            if !state.script.sticky_toggles.remove(selector) {
                let current = state.toggles.get(selector).copied().unwrap_or(false);
                state.toggles.insert(selector.to_string(), !current);
            }
        }
        Ok(())
    }

    async fn click_text(&self, selector: &str, text: &str) -> Result<(), UiError> {
        let mut state = self.ui.state.lock();
        self.require(&state, selector)?;
        self.record(&mut state, "click_text", &format!("{} {}", selector, text));
        Ok(())
    }

    async fn context_click(&self, selector: &str) -> Result<(), UiError> {
        let mut state = self.ui.state.lock();
        self.record(&mut state, "context_click", selector);
        if selector == controls::PROJECT_ITEMS && state.project_items > 0 {
            state.menu_open = true;
        }
        Ok(())
    }

    async fn is_active(&self, selector: &str) -> Result<bool, UiError> {
        let state = self.ui.state.lock();
        self.require(&state, selector)?;
        Ok(state.toggles.get(selector).copied().unwrap_or(false))
    }

    async fn set_value(&self, selector: &str, value: &str) -> Result<(), UiError> {
        let mut state = self.ui.state.lock();
        self.require(&state, selector)?;
        self.record(&mut state, "set_value", selector);
        state.values.insert(selector.to_string(), value.to_string());
        Ok(())
    }

    async fn set_input_file(&self, selector: &str, path: &Path) -> Result<(), UiError> {
        let mut state = self.ui.state.lock();
        self.require(&state, selector)?;
        self.record(&mut state, "upload", &path.display().to_string());
        state.observed.uploads.push(path.to_path_buf());
        state.project_items += 1;
        Ok(())
    }

    async fn canvas_is_blank(&self, selector: &str) -> Result<bool, UiError> {
        let mut state = self.ui.state.lock();
        self.require(&state, selector)?;
        state.observed.canvas_reads += 1;
        if state.script.blank_canvas_reads > 0 {
            state.script.blank_canvas_reads -= 1;
            return Ok(true);
        }
        Ok(false)
    }

    async fn download(&self, trigger: &str, timeout: Duration) -> Result<Vec<u8>, UiError> {
        let delay = self.ui.state.lock().script.download_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.ui.state.lock();
        self.require(&state, trigger)?;
        self.record(&mut state, "download", trigger);
        if state.script.export_failures > 0 {
            state.script.export_failures -= 1;
            return Err(UiError::DownloadTimeout(timeout));
        }
        if state.script.fatal_exports > 0 {
            state.script.fatal_exports -= 1;
            return Err(UiError::ConnectionLost("scripted target crash".to_string()));
        }
        state.observed.downloads += 1;
        Ok(format!("\u{89}PNG fake page#{}", self.id).into_bytes())
    }

    async fn close(&self) -> Result<(), UiError> {
        let mut state = self.ui.state.lock();
        state.observed.pages_closed += 1;
        if state.script.close_failures > 0 {
            state.script.close_failures -= 1;
            return Err(UiError::ConnectionLost("scripted close failure".to_string()));
        }
        Ok(())
    }
}
