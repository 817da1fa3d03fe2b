//! Size scheduler: runs every task of one size sequentially on a recycled session.
//!
//! Each size owns its browser process. Sessions are recycled after a
//! wave-dependent number of tasks, and recreated whenever the generator
//! reports the session as lost. Nothing escapes a size: every task ends in a
//! [`TaskRecord`].

use crate::config::GeneratorConfig;
use crate::error::ApiError;
use crate::generation::executor::{ArtifactGenerator, SessionLost, TaskReport};
use crate::model::{SizeSpec, Wave};
use crate::remote::driver::BrowserLauncher;
use crate::remote::session::{Session, SessionManager};
use crate::task::{missing_sources, tasks_for_size, GenerationTask, Outcome, TaskRecord};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Results for one size.
#[derive(Debug, Clone, Serialize)]
pub struct SizeReport {
    pub size_label: String,
    pub wave: Wave,
    pub sessions_created: usize,
    pub records: Vec<TaskRecord>,
}

impl SizeReport {
    fn new(size: &SizeSpec, wave: Wave) -> Self {
        Self {
            size_label: size.label.clone(),
            wave,
            sessions_created: 0,
            records: Vec::new(),
        }
    }

    pub fn successes(&self) -> usize {
        self.records.iter().filter(|r| r.is_success()).count()
    }

    pub fn failures(&self) -> usize {
        self.records.len() - self.successes()
    }
}

/// What a size would do, computed without touching the design tool.
#[derive(Debug, Clone, Serialize)]
pub struct SizePlan {
    pub size_label: String,
    pub wave: Wave,
    pub wave_inferred: bool,
    pub refresh_interval: usize,
    pub tasks: usize,
    pub missing_sources: Vec<PathBuf>,
}

impl SizePlan {
    pub fn for_size(config: &GeneratorConfig, size: &SizeSpec) -> Self {
        let wave = size.wave();
        Self {
            size_label: size.label.clone(),
            wave,
            wave_inferred: size.wave.is_none(),
            refresh_interval: config.timings.refresh_interval_for(wave),
            tasks: tasks_for_size(config, size).count(),
            missing_sources: missing_sources(config, size),
        }
    }
}

pub struct SizeScheduler<'a> {
    config: &'a GeneratorConfig,
    launcher: Arc<dyn BrowserLauncher>,
    navigation_target: &'a str,
}

impl<'a> SizeScheduler<'a> {
    pub fn new(
        config: &'a GeneratorConfig,
        launcher: Arc<dyn BrowserLauncher>,
        navigation_target: &'a str,
    ) -> Self {
        Self {
            config,
            launcher,
            navigation_target,
        }
    }

    pub async fn run_size(&self, size: &SizeSpec) -> SizeReport {
        let wave = size.wave();
        if size.wave.is_none() {
            debug!(size = %size.label, wave = wave.as_str(), "Wave inferred from size label");
        }
        let refresh_interval = self.config.timings.refresh_interval_for(wave);
        let mut report = SizeReport::new(size, wave);

        info!(
            size = %size.label,
            wave = wave.as_str(),
            refresh_interval,
            "Starting size"
        );

        let mut manager = SessionManager::new(
            Arc::clone(&self.launcher),
            self.navigation_target,
            self.config.timings.clone(),
        );
        if let Err(e) = manager.launch_process().await {
            error!(size = %size.label, error = %e, "Browser launch failed; failing every task of this size");
            let message = e.to_string();
            report.records = tasks_for_size(self.config, size)
                .map(|task| {
                    TaskRecord::new(&task, Outcome::Failure, 0).with_error(Some(message.clone()))
                })
                .collect();
            return report;
        }

        let generator = ArtifactGenerator::new(&self.config.design, &self.config.timings);
        let mut run = SizeRun {
            manager,
            session: None,
            size,
            sessions_created: 0,
        };

        for task in tasks_for_size(self.config, size) {
            if run
                .session
                .as_ref()
                .map_or(false, |s| s.needs_refresh(refresh_interval))
            {
                run.drop_session().await;
                debug!(size = %size.label, refresh_interval, "Session recycled");
            }

            let record = match run.ensure_session().await {
                Ok(()) => run.run_task(&generator, &task).await,
                Err(e) => {
                    error!(
                        artifact = %task.artifact.id,
                        locale = task.locale,
                        size = %size.label,
                        error = %e,
                        "No session available for task"
                    );
                    TaskRecord::new(&task, Outcome::Failure, 0).with_error(Some(e.to_string()))
                }
            };
            report.records.push(record);
        }

        run.drop_session().await;
        run.manager.close_process().await;
        report.sessions_created = run.sessions_created;

        info!(
            size = %size.label,
            succeeded = report.successes(),
            failed = report.failures(),
            sessions = report.sessions_created,
            "Size finished"
        );
        report
    }
}

/// Mutable state of one size while its tasks run.
struct SizeRun<'s> {
    manager: SessionManager,
    session: Option<Session>,
    size: &'s SizeSpec,
    sessions_created: usize,
}

impl SizeRun<'_> {
    async fn ensure_session(&mut self) -> Result<(), ApiError> {
        if self.session.is_none() {
            let session = self.manager.create_session(self.size).await?;
            self.sessions_created += 1;
            self.session = Some(session);
        }
        Ok(())
    }

    async fn drop_session(&mut self) {
        if let Some(session) = self.session.take() {
            self.manager.destroy_session(session).await;
        }
    }

    /// Run one task; on a lost session, recreate it and run the task once more.
    async fn run_task(
        &mut self,
        generator: &ArtifactGenerator<'_>,
        task: &GenerationTask<'_>,
    ) -> TaskRecord {
        let first = match self.generate_on_session(generator, task).await {
            Some(result) => result,
            None => return self.no_session(task, 0),
        };
        let lost = match first {
            Ok((report, session_id)) => return record(task, &report, report.attempts, session_id),
            Err(lost) => lost,
        };

        warn!(
            artifact = %task.artifact.id,
            locale = task.locale,
            size = %self.size.label,
            attempts = lost.attempts,
            error = %lost.error,
            "Session lost; recreating and retrying task once"
        );
        self.drop_session().await;
        if let Err(e) = self.ensure_session().await {
            return TaskRecord::new(task, Outcome::Failure, lost.attempts)
                .with_error(Some(e.to_string()));
        }

        // Attempts on the lost session count toward the record.
        match self.generate_on_session(generator, task).await {
            Some(Ok((report, session_id))) => {
                record(task, &report, lost.attempts + report.attempts, session_id)
            }
            Some(Err(second)) => {
                let session_id = self.session.as_ref().map(Session::id);
                self.drop_session().await;
                TaskRecord::new(task, Outcome::Failure, lost.attempts + second.attempts)
                    .with_session(session_id)
                    .with_error(Some(second.error.to_string()))
            }
            None => self.no_session(task, lost.attempts),
        }
    }

    async fn generate_on_session(
        &mut self,
        generator: &ArtifactGenerator<'_>,
        task: &GenerationTask<'_>,
    ) -> Option<Result<(TaskReport, u64), SessionLost>> {
        let session = self.session.as_mut()?;
        let result = generator.generate(session.page(), task).await;
        session.record_task();
        Some(result.map(|report| (report, session.id())))
    }

    fn no_session(&self, task: &GenerationTask<'_>, attempts: u32) -> TaskRecord {
        TaskRecord::new(task, Outcome::Failure, attempts)
            .with_error(Some("no session available".to_string()))
    }
}

fn record(task: &GenerationTask<'_>, report: &TaskReport, attempts: u32, session_id: u64) -> TaskRecord {
    TaskRecord::new(task, report.outcome, attempts)
        .with_session(Some(session_id))
        .with_error(report.last_error.clone())
}
