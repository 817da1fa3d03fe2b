//! Artifact generator: drives one task through the UI with retries and a per-attempt deadline.
//!
//! Every attempt starts from a reloaded page and an empty project, so an
//! attempt never depends on what the previous one left behind.

use crate::config::Timings;
use crate::error::{ApiError, FailureKind};
use crate::generation::attempt::{AttemptEvent, AttemptState};
use crate::model::DesignSpec;
use crate::remote::driver::UiPage;
use crate::task::{GenerationTask, Outcome};
use crate::ui::{
    apply_background, apply_device, apply_text, export_artifact, reset_project_state,
    select_size, upload_source, wait_for_render,
};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// What happened to one task inside its session.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub outcome: Outcome,
    /// Attempts started, at least 1
    pub attempts: u32,
    pub history: Vec<AttemptState>,
    /// Error of the last failed attempt; cleared on success
    pub last_error: Option<String>,
}

impl TaskReport {
    fn precondition_failure(error: ApiError) -> Self {
        Self {
            outcome: Outcome::Failure,
            attempts: 1,
            history: vec![AttemptState::Failed],
            last_error: Some(error.to_string()),
        }
    }
}

/// A session-fatal failure, with the attempts the task had used on the lost session.
#[derive(Debug, Error)]
#[error("{error} (after {attempts} attempt(s))")]
pub struct SessionLost {
    pub attempts: u32,
    #[source]
    pub error: ApiError,
}

/// Generates artifacts with a shared design.
pub struct ArtifactGenerator<'a> {
    design: &'a DesignSpec,
    timings: &'a Timings,
}

impl<'a> ArtifactGenerator<'a> {
    pub fn new(design: &'a DesignSpec, timings: &'a Timings) -> Self {
        Self { design, timings }
    }

    /// Run `task` to a terminal state on `page`.
    ///
    /// Returns `Err` only for session-fatal failures; the caller must recreate
    /// the session before trying again. Every other failure ends in a report.
    pub async fn generate(
        &self,
        page: &dyn UiPage,
        task: &GenerationTask<'_>,
    ) -> Result<TaskReport, SessionLost> {
        let source_present = tokio::fs::metadata(&task.source_path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !source_present {
            let error = ApiError::MissingSource(task.source_path.clone());
            warn!(
                artifact = %task.artifact.id,
                locale = task.locale,
                size = %task.size.label,
                error = %error,
                "Skipping task"
            );
            return Ok(TaskReport::precondition_failure(error));
        }

        let mut state = AttemptState::initial();
        let mut history = vec![state];
        let mut attempts = 0;
        let mut last_error = None;

        while let AttemptState::Attempting(attempt) = state {
            attempts = attempt;
            let event = match self.run_attempt(page, task, attempt).await {
                Ok(()) => AttemptEvent::Succeeded,
                Err(error) if error.kind() == FailureKind::SessionFatal => {
                    return Err(SessionLost {
                        attempts: attempt,
                        error,
                    })
                }
                Err(e) => {
                    let retryable = e.is_retryable();
                    warn!(
                        artifact = %task.artifact.id,
                        locale = task.locale,
                        size = %task.size.label,
                        attempt,
                        retryable,
                        error = %e,
                        "Attempt failed"
                    );
                    last_error = Some(e.to_string());
                    AttemptEvent::Failed { retryable }
                }
            };
            state = state.advance(event, self.timings.max_retries);
            history.push(state);
        }

        let outcome = if state == AttemptState::Succeeded {
            info!(
                artifact = %task.artifact.id,
                locale = task.locale,
                size = %task.size.label,
                attempts,
                "Artifact generated"
            );
            last_error = None;
            Outcome::Success
        } else {
            Outcome::Failure
        };

        Ok(TaskReport {
            outcome,
            attempts,
            history,
            last_error,
        })
    }

    async fn run_attempt(
        &self,
        page: &dyn UiPage,
        task: &GenerationTask<'_>,
        attempt: u32,
    ) -> Result<(), ApiError> {
        let limit = self.timings.task_timeout();
        match tokio::time::timeout(limit, self.attempt_steps(page, task, attempt)).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::TaskTimeout(limit)),
        }
    }

    async fn attempt_steps(
        &self,
        page: &dyn UiPage,
        task: &GenerationTask<'_>,
        attempt: u32,
    ) -> Result<(), ApiError> {
        let timings = self.timings;

        page.reload().await?;
        sleep(timings.reload_settle(attempt)).await;

        let cleared = reset_project_state(page, timings).await?;
        debug!(attempt, cleared, "Project reset");
        select_size(page, task.size, timings).await?;
        upload_source(page, &task.source_path, timings).await?;

        apply_background(page, &self.design.background, timings).await?;
        apply_device(page, &self.design.device, task.size, timings).await?;
        apply_text(page, &self.design.text, task.title, timings).await?;

        wait_for_render(page, timings).await?;
        export_artifact(page, &task.output_path, timings.download_timeout()).await?;
        Ok(())
    }
}
