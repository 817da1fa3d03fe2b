//! Run coordinator: resolves the design tool address and schedules sizes in two waves.
//!
//! Parallel-wave sizes run concurrently, each with its own browser process.
//! Sequential-wave sizes then run one at a time to bound peak memory.

use crate::config::{GeneratorConfig, RemoteConfig};
use crate::generation::scheduler::{SizeReport, SizeScheduler};
use crate::generation::summary::RunSummary;
use crate::model::Wave;
use crate::remote::driver::BrowserLauncher;
use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Pick the design tool address: explicit override, then a reachable local instance, then the public fallback.
pub async fn resolve_base_url(remote: &RemoteConfig, override_url: Option<&str>) -> String {
    if let Some(url) = override_url.or(remote.base_url.as_deref()) {
        info!(base_url = url, "Using configured design tool address");
        return url.to_string();
    }

    if probe(&remote.local_url, remote.probe_timeout()).await {
        info!(base_url = %remote.local_url, "Local design tool instance reachable");
        return remote.local_url.clone();
    }

    info!(
        local_url = %remote.local_url,
        base_url = %remote.fallback_url,
        "Local instance unreachable; using public fallback"
    );
    remote.fallback_url.clone()
}

async fn probe(url: &str, timeout: Duration) -> bool {
    let client = match Client::builder()
        .no_proxy()
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            debug!(error = %e, "Failed to build probe client");
            return false;
        }
    };

    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            debug!(url, %status, "Probe answered");
            status.is_success() || status.is_redirection()
        }
        Err(e) => {
            debug!(url, error = %e, "Probe failed");
            false
        }
    }
}

pub struct RunCoordinator<'a> {
    config: &'a GeneratorConfig,
    launcher: Arc<dyn BrowserLauncher>,
    base_url: String,
}

impl<'a> RunCoordinator<'a> {
    pub fn new(
        config: &'a GeneratorConfig,
        launcher: Arc<dyn BrowserLauncher>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            config,
            launcher,
            base_url: base_url.into(),
        }
    }

    pub async fn run(&self) -> RunSummary {
        let total_expected = self.config.total_expected();
        let mut summary = RunSummary::new(self.base_url.clone(), total_expected);
        let scheduler = SizeScheduler::new(self.config, Arc::clone(&self.launcher), &self.base_url);

        let (parallel, sequential): (Vec<_>, Vec<_>) = self
            .config
            .sizes
            .iter()
            .enumerate()
            .partition(|(_, size)| size.wave() == Wave::Parallel);

        info!(
            total_expected,
            artifacts = self.config.artifacts.len(),
            locales = self.config.locales().len(),
            parallel_sizes = parallel.len(),
            sequential_sizes = sequential.len(),
            base_url = %self.base_url,
            "Starting generation run"
        );

        let mut reports: Vec<Option<SizeReport>> = vec![None; self.config.sizes.len()];

        let mut wave = parallel
            .iter()
            .map(|(index, size)| {
                let scheduler = &scheduler;
                async move { (*index, scheduler.run_size(size).await) }
            })
            .collect::<FuturesUnordered<_>>();
        while let Some((index, report)) = wave.next().await {
            reports[index] = Some(report);
        }

        for (index, size) in sequential {
            reports[index] = Some(scheduler.run_size(size).await);
        }

        for report in reports.into_iter().flatten() {
            summary.absorb(report);
        }
        summary.finish();

        if !summary.is_consistent() {
            error!(
                total_expected,
                succeeded = summary.success_count,
                failed = summary.failure_count,
                "Task accounting mismatch: outcomes do not add up to the expected total"
            );
        }
        info!(
            succeeded = summary.success_count,
            failed = summary.failure_count,
            total_expected,
            "Generation run finished"
        );
        summary
    }
}
