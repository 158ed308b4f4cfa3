//! JSON persistence for cohort summaries.

use std::path::Path;

use anyhow::{Context, Result};

use scheinpass_core::summary::CohortSummary;

/// Saves a cohort summary as pretty-printed JSON, creating parent
/// directories as needed.
pub fn save_cohort_json(summary: &CohortSummary, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("failed to serialize summary")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write summary to {}", path.display()))?;
    Ok(())
}

/// Loads a cohort summary from a JSON file.
pub fn load_cohort_json(path: &Path) -> Result<CohortSummary> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read summary from {}", path.display()))?;
    serde_json::from_str(&content).context("failed to parse summary JSON")
}
