//! Generation tasks: one (artifact, locale, size) triple and its file paths.
//!
//! Tasks are derived lazily from the configuration and never stored; the
//! paths they carry are pure functions of the triple.

use crate::config::GeneratorConfig;
use crate::model::{ArtifactSpec, SizeSpec};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Replace quote and whitespace characters so a size label is usable as a directory name.
pub fn sanitize_size_label(label: &str) -> String {
    label
        .chars()
        .map(|c| match c {
            '"' | '\'' | '\u{201C}' | '\u{201D}' | '\u{2018}' | '\u{2019}' | '\u{2033}' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

/// Whether `value` names exactly one plain path segment.
///
/// Artifact ids, locale codes and sanitized size labels become file and
/// directory names; anything that `Path` would split, normalize away or resolve
/// upward is rejected.
pub fn is_plain_segment(value: &str) -> bool {
    if value.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(value).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(segment)), None) if segment == value
    )
}

/// `{source_dir}/{locale}/{artifact_id}.png`
pub fn source_path(source_dir: &Path, locale: &str, artifact_id: &str) -> PathBuf {
    source_dir.join(locale).join(format!("{}.png", artifact_id))
}

/// `{output_root}/{locale}/{sanitized_label}/{artifact_id}.png`
pub fn output_path(output_root: &Path, locale: &str, size_label: &str, artifact_id: &str) -> PathBuf {
    output_root
        .join(locale)
        .join(sanitize_size_label(size_label))
        .join(format!("{}.png", artifact_id))
}

/// One unit of generation work.
#[derive(Debug, Clone)]
pub struct GenerationTask<'a> {
    pub artifact: &'a ArtifactSpec,
    pub locale: &'a str,
    pub title: &'a str,
    pub size: &'a SizeSpec,
    pub source_path: PathBuf,
    pub output_path: PathBuf,
}

impl<'a> GenerationTask<'a> {
    pub fn new(
        config: &GeneratorConfig,
        artifact: &'a ArtifactSpec,
        locale: &'a str,
        title: &'a str,
        size: &'a SizeSpec,
    ) -> Self {
        Self {
            artifact,
            locale,
            title,
            size,
            source_path: source_path(&config.source_dir_for(size), locale, &artifact.id),
            output_path: output_path(&config.output_root, locale, &size.label, &artifact.id),
        }
    }
}

/// Every task for one size, artifacts in configured order and locales sorted.
pub fn tasks_for_size<'a>(
    config: &'a GeneratorConfig,
    size: &'a SizeSpec,
) -> impl Iterator<Item = GenerationTask<'a>> + 'a {
    config.artifacts.iter().flat_map(move |artifact| {
        artifact.titles.iter().map(move |(locale, title)| {
            GenerationTask::new(config, artifact, locale.as_str(), title.as_str(), size)
        })
    })
}

/// Source files referenced by the configuration that do not exist.
pub fn missing_sources(config: &GeneratorConfig, size: &SizeSpec) -> Vec<PathBuf> {
    tasks_for_size(config, size)
        .map(|task| task.source_path)
        .filter(|path| !path.is_file())
        .collect()
}

/// Terminal result of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

/// What happened to one task, as recorded by the size scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub artifact_id: String,
    pub locale: String,
    pub size_label: String,
    pub outcome: Outcome,
    pub attempts: u32,
    /// Session the final attempt ran in, if one was available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<u64>,
    pub output_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskRecord {
    pub fn new(task: &GenerationTask<'_>, outcome: Outcome, attempts: u32) -> Self {
        Self {
            artifact_id: task.artifact.id.clone(),
            locale: task.locale.to_string(),
            size_label: task.size.label.clone(),
            outcome,
            attempts,
            session_id: None,
            output_path: task.output_path.clone(),
            error: None,
        }
    }

    pub fn with_session(mut self, session_id: Option<u64>) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn with_error(mut self, error: Option<String>) -> Self {
        self.error = error;
        self
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}
