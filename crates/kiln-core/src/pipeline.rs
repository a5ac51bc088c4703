//! The per-repository setup loop.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::{BootstrapConfig, RepositoryDescriptor};
use crate::desktop::prefetch_packages;
use crate::error::SetupError;
use crate::git::{FetchOutcome, RepositoryFetcher};
use crate::mcp::{SetupContext, SetupHandler, SetupOutcome, classify};
use crate::process::{CommandRunner, CommandSpec, LivenessProbe, npm_program, python_program};

/// What happened to one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryOutcome {
    /// The target directory already existed; nothing was done
    AlreadyConfigured,
    Installed { notes: Vec<String> },
    PendingManualStep { instructions: Vec<String> },
    Failed { error: String },
}

/// Outcomes of a run, each list in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Already-configured and freshly installed repository names
    pub installed: Vec<String>,
    /// `(name, operator instructions)`
    pub pending: Vec<(String, Vec<String>)>,
    /// `(name, error message)`
    pub failed: Vec<(String, String)>,
    /// `(name, post-install notes)` for installs that have follow-ups
    pub notes: Vec<(String, Vec<String>)>,
}

impl RunReport {
    pub fn record(&mut self, name: &str, outcome: RepositoryOutcome) {
        let name = name.to_string();
        match outcome {
            RepositoryOutcome::AlreadyConfigured => self.installed.push(name),
            RepositoryOutcome::Installed { notes } => {
                if !notes.is_empty() {
                    self.notes.push((name.clone(), notes));
                }
                self.installed.push(name);
            }
            RepositoryOutcome::PendingManualStep { instructions } => {
                self.pending.push((name, instructions))
            }
            RepositoryOutcome::Failed { error } => self.failed.push((name, error)),
        }
    }

    /// True when the desktop config may be written.
    pub fn is_publishable(&self) -> bool {
        self.failed.is_empty() && self.pending.is_empty()
    }
}

/// Directory a repository's server lives in: `base/name`, or `base/name/name`
/// when the clone contains a same-named subfolder.
pub fn install_dir(base: &Path, name: &str) -> PathBuf {
    let target = base.join(name);
    let nested = target.join(name);
    if nested.is_dir() { nested } else { target }
}

/// Runs setup for every declared repository.
pub struct SetupPipeline<'a> {
    config: &'a BootstrapConfig,
    base_path: &'a Path,
    runner: &'a dyn CommandRunner,
    probe: &'a dyn LivenessProbe,
    python: &'a str,
}

impl<'a> SetupPipeline<'a> {
    pub fn new(
        config: &'a BootstrapConfig,
        base_path: &'a Path,
        runner: &'a dyn CommandRunner,
        probe: &'a dyn LivenessProbe,
    ) -> Self {
        Self {
            config,
            base_path,
            runner,
            probe,
            python: python_program(),
        }
    }

    /// Override the interpreter used for virtualenvs.
    pub fn with_python(mut self, python: &'a str) -> Self {
        self.python = python;
        self
    }

    /// Set up each repository in order. Per-repository errors are recorded
    /// and never stop the loop.
    pub async fn run(&self) -> anyhow::Result<RunReport> {
        std::fs::create_dir_all(self.base_path).with_context(|| {
            format!("Failed to create base directory: {}", self.base_path.display())
        })?;

        let mut report = RunReport::default();
        for repo in &self.config.repositories {
            let outcome = match self.setup_repository(repo).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::warn!("Failed to set up {}: {:#}", repo.name, err);
                    RepositoryOutcome::Failed {
                        error: format!("{:#}", err),
                    }
                }
            };
            report.record(&repo.name, outcome);
        }
        Ok(report)
    }

    async fn setup_repository(
        &self,
        repo: &RepositoryDescriptor,
    ) -> anyhow::Result<RepositoryOutcome> {
        let target = self.base_path.join(&repo.name);
        if target.exists() {
            tracing::info!("{} is already configured, skipping", repo.name);
            return Ok(RepositoryOutcome::AlreadyConfigured);
        }

        tracing::info!("Setting up {} in {}", repo.name, target.display());
        match RepositoryFetcher::new(self.runner).fetch(&repo.url, &target).await? {
            FetchOutcome::Cloned => tracing::info!("Cloned {}", repo.url),
            FetchOutcome::AlreadyPresent | FetchOutcome::RaceAlreadyExists => {
                tracing::info!("{} already present at {}", repo.name, target.display())
            }
        }

        let dir = install_dir(self.base_path, &repo.name);
        if dir != target {
            tracing::info!("Using nested subfolder {}", dir.display());
        }

        let kind = classify(&repo.name).ok_or_else(|| SetupError::Unclassified(repo.name.clone()))?;
        if kind.expected_runtime() != repo.runtime {
            tracing::warn!(
                "{} is declared as {} but {} servers run on {}",
                repo.name,
                repo.runtime,
                kind,
                kind.expected_runtime()
            );
        }

        let ctx = SetupContext {
            runner: self.runner,
            probe: self.probe,
            properties: &self.config.properties,
            python: self.python,
        };
        let outcome = match SetupHandler::for_kind(kind)
            .setup(&ctx, &dir, &repo.env())
            .await?
        {
            SetupOutcome::Installed { notes } => RepositoryOutcome::Installed { notes },
            SetupOutcome::PendingManualStep { instructions } => {
                RepositoryOutcome::PendingManualStep { instructions }
            }
        };
        Ok(outcome)
    }
}

/// Install prefetch-flagged catalog packages into `home`. Failures are
/// logged and ignored.
pub async fn prefetch_on_demand(runner: &dyn CommandRunner, home: &Path) {
    for package in prefetch_packages() {
        tracing::info!("Prefetching {} into {}", package, home.display());
        let spec = CommandSpec::new(npm_program())
            .args(["install", package])
            .current_dir(home);
        match runner.run(&spec).await {
            Ok(output) if output.success => tracing::info!("Installed {}", package),
            Ok(output) => tracing::warn!("Failed to prefetch {}: {}", package, output.diagnostics()),
            Err(err) => tracing::warn!("Failed to prefetch {}: {:#}", package, err),
        }
    }
}
