//! Resolved paths and services for one invocation.

use std::path::{Path, PathBuf};

use crate::config::{BootstrapConfig, ConfigLoader, properties::REPOSITORIES_BASE_PATH};
use crate::desktop::DESKTOP_CONFIG_FILE;
use crate::process::{DelayProbe, SystemRunner};

/// Where inputs are read from and outputs go.
///
/// Frontends build this once from their flags and pass it down.
#[derive(Debug, Clone)]
pub struct BootstrapContext {
    config_dir: PathBuf,
    output_path: PathBuf,
    home_dir: PathBuf,
    probe: DelayProbe,
}

impl BootstrapContext {
    pub fn new(config_dir: PathBuf, output_path: PathBuf) -> Self {
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::with_home_dir(config_dir, output_path, home_dir)
    }

    /// Context with an explicit home directory (for testing).
    pub fn with_home_dir(config_dir: PathBuf, output_path: PathBuf, home_dir: PathBuf) -> Self {
        Self {
            config_dir,
            output_path,
            home_dir,
            probe: DelayProbe::default(),
        }
    }

    /// `./config` and `./claude_desktop_config.json`.
    pub fn from_cwd() -> Self {
        Self::new(PathBuf::from("config"), PathBuf::from(DESKTOP_CONFIG_FILE))
    }

    pub fn with_probe(mut self, probe: DelayProbe) -> Self {
        self.probe = probe;
        self
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    pub fn probe(&self) -> &DelayProbe {
        &self.probe
    }

    pub fn config_loader(&self) -> ConfigLoader {
        ConfigLoader::from_dir(&self.config_dir)
    }

    pub fn runner(&self) -> SystemRunner {
        SystemRunner::new()
    }

    /// Directory repositories are cloned into.
    pub fn base_path(&self, config: &BootstrapConfig) -> anyhow::Result<PathBuf> {
        match config.base_path {
            Some(ref path) => Ok(path.clone()),
            None => anyhow::bail!(
                "No repositories base path: set {} in {} or base_path in the repository list",
                REPOSITORIES_BASE_PATH,
                self.config_dir.display()
            ),
        }
    }
}
