//! Clone-if-absent repository fetcher.

use std::path::Path;

use anyhow::Context;

use crate::error::SetupError;
use crate::process::{CommandRunner, CommandSpec};

/// Marker git prints when the clone target is already populated.
const ALREADY_EXISTS: &str = "already exists";

/// How a fetch succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Target existed before the clone; its contents were not inspected
    AlreadyPresent,
    /// Fresh clone
    Cloned,
    /// Clone failed because the target appeared in the meantime
    RaceAlreadyExists,
}

/// Clones repositories through the git CLI.
pub struct RepositoryFetcher<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> RepositoryFetcher<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Make sure `target` holds a checkout of `url`.
    ///
    /// An existing target counts as success without verifying that it is a
    /// checkout of `url`.
    pub async fn fetch(&self, url: &str, target: &Path) -> anyhow::Result<FetchOutcome> {
        if target.exists() {
            tracing::info!(
                "Directory {} already exists, skipping clone",
                target.display()
            );
            return Ok(FetchOutcome::AlreadyPresent);
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create base directory: {}", parent.display())
            })?;
        }

        let target_str = target
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid clone target: {}", target.display()))?;
        let spec = CommandSpec::new("git").args(["clone", url, target_str]);

        tracing::info!("Cloning {} into {}", url, target.display());
        let output = self.runner.run(&spec).await?;

        if output.success {
            return Ok(FetchOutcome::Cloned);
        }

        let message = output.diagnostics();
        if message.contains(ALREADY_EXISTS) {
            tracing::info!("Repository already exists at {}", target.display());
            return Ok(FetchOutcome::RaceAlreadyExists);
        }

        Err(SetupError::CloneFailed {
            url: url.to_string(),
            message,
        }
        .into())
    }
}
