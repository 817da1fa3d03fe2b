//! Artifact generation: per-task retry, per-size scheduling and the run-level waves.
//! The executor owns one task; the scheduler owns one size; the coordinator owns the run.

pub mod attempt;
pub mod executor;
pub mod run;
pub mod scheduler;
pub mod summary;

pub use attempt::{AttemptEvent, AttemptState};
pub use executor::{ArtifactGenerator, SessionLost, TaskReport};
pub use run::{resolve_base_url, RunCoordinator};
pub use scheduler::{SizePlan, SizeReport, SizeScheduler};
pub use summary::{Counts, RunSummary};
