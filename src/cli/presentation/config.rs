//! Validate and plan presentation.

use crate::cli::presentation::shared::table;
use crate::config::GeneratorConfig;
use crate::generation::SizePlan;

pub fn format_validation(config: &GeneratorConfig) -> String {
    format!(
        "Configuration valid:\n  Artifacts: {}\n  Locales: {}\n  Sizes: {}\n  Tasks: {}",
        config.artifacts.len(),
        config.locales().join(", "),
        config.sizes.len(),
        config.total_expected()
    )
}

pub fn format_plan(plans: &[SizePlan]) -> String {
    let mut sizes = table(vec!["Size", "Wave", "Refresh every", "Tasks", "Missing sources"]);
    for plan in plans {
        let wave = if plan.wave_inferred {
            format!("{} (inferred)", plan.wave.as_str())
        } else {
            plan.wave.as_str().to_string()
        };
        sizes.add_row(vec![
            plan.size_label.clone(),
            wave,
            plan.refresh_interval.to_string(),
            plan.tasks.to_string(),
            plan.missing_sources.len().to_string(),
        ]);
    }

    let total: usize = plans.iter().map(|p| p.tasks).sum();
    let mut out = format!("{}\n  Total tasks: {}", sizes, total);

    let missing: Vec<_> = plans.iter().flat_map(|p| &p.missing_sources).collect();
    if !missing.is_empty() {
        out.push_str(&format!("\n\nMissing source files ({}):", missing.len()));
        for path in missing {
            out.push_str(&format!("\n  - {}", path.display()));
        }
    }
    out
}
