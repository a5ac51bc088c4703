//! Writing the launcher config behind the zero-failure gate.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::assembler::DesktopConfigAssembler;
use crate::pipeline::RunReport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Written(PathBuf),
    /// Left untouched because the run did not fully succeed
    Skipped { failed: usize, pending: usize },
}

/// Write the assembled config to `path` when `report` has no failed and no
/// pending repositories. Otherwise the existing file is not touched.
pub fn publish_desktop_config(
    report: &RunReport,
    assembler: &DesktopConfigAssembler<'_>,
    path: &Path,
) -> anyhow::Result<PublishOutcome> {
    if !report.is_publishable() {
        tracing::warn!(
            "Not updating {}: {} failed, {} pending",
            path.display(),
            report.failed.len(),
            report.pending.len()
        );
        return Ok(PublishOutcome::Skipped {
            failed: report.failed.len(),
            pending: report.pending.len(),
        });
    }

    let config = assembler.assemble(&report.installed)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let json = config
        .to_json_pretty()
        .context("Failed to serialize desktop config")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write desktop config: {}", path.display()))?;

    tracing::info!(
        "Wrote {} servers to {}",
        config.mcp_servers.len(),
        path.display()
    );
    Ok(PublishOutcome::Written(path.to_path_buf()))
}
