use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Context;
use predict_fanout::RunSummary;

/// File the run summary is written to inside the working directory.
pub const SUMMARY_FILE: &str = "inference_summary.json";

/// Writes `summary` as pretty JSON into `work_dir`, creating the directory
/// if needed, and returns the file's path.
pub fn write_summary(work_dir: &Path, summary: &RunSummary) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(work_dir)
        .with_context(|| format!("failed to create {}", work_dir.display()))?;

    let path = work_dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(summary).context("failed to serialize run summary")?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
