//! Loads the repository list, properties and `.env` into one record.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;

use super::descriptor::RepositoryDescriptor;
use super::env_file::load_env_file;
use super::properties::Properties;
use super::schema::RepositoryList;
use super::{ENV_FILE, PROPERTIES_FILE, REPOSITORIES_FILE};

/// Normalized configuration for one run.
#[derive(Debug, Clone, Default)]
pub struct BootstrapConfig {
    pub base_path: Option<PathBuf>,
    pub repositories: Vec<RepositoryDescriptor>,
    pub properties: Properties,
    /// Raw `.env` values, also used for catalog server secrets
    pub env_file: BTreeMap<String, String>,
}

impl BootstrapConfig {
    /// True when there is nothing to set up.
    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    pub fn repository(&self, name: &str) -> Option<&RepositoryDescriptor> {
        self.repositories.iter().find(|repo| repo.name == name)
    }
}

/// Reads the three config inputs.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    repositories_path: PathBuf,
    properties_path: PathBuf,
    env_path: PathBuf,
}

impl ConfigLoader {
    /// Loader for the standard file names inside `config_dir`.
    pub fn from_dir(config_dir: &Path) -> Self {
        Self::from_paths(
            config_dir.join(REPOSITORIES_FILE),
            config_dir.join(PROPERTIES_FILE),
            config_dir.join(ENV_FILE),
        )
    }

    pub fn from_paths(repositories_path: PathBuf, properties_path: PathBuf, env_path: PathBuf) -> Self {
        Self {
            repositories_path,
            properties_path,
            env_path,
        }
    }

    pub fn repositories_path(&self) -> &Path {
        &self.repositories_path
    }

    /// Load the configuration, returning an empty one on any error.
    ///
    /// An empty repository list means "nothing to do", not a fatal error.
    pub fn load(&self) -> BootstrapConfig {
        match self.try_load() {
            Ok(config) => config,
            Err(err) => {
                tracing::error!("Failed to load configuration: {:#}", err);
                BootstrapConfig::default()
            }
        }
    }

    /// Load the configuration, propagating the first error.
    pub fn try_load(&self) -> anyhow::Result<BootstrapConfig> {
        let properties = Properties::load(&self.properties_path)?;

        let content = std::fs::read_to_string(&self.repositories_path).with_context(|| {
            format!(
                "Failed to read repository list: {}",
                self.repositories_path.display()
            )
        })?;
        let list: RepositoryList = serde_json::from_str(&content).with_context(|| {
            format!(
                "Failed to parse repository list: {}",
                self.repositories_path.display()
            )
        })?;

        let env_file = load_env_file(&self.env_path)?;

        let base_path = properties
            .base_path()
            .or_else(|| list.base_path.filter(|p| !p.is_empty()).map(PathBuf::from));

        let repositories = list
            .repositories
            .into_iter()
            .map(|entry| RepositoryDescriptor::from_entry(entry, &env_file))
            .collect::<anyhow::Result<Vec<_>>>()?;

        tracing::debug!(
            "Loaded {} repositories from {}",
            repositories.len(),
            self.repositories_path.display()
        );

        Ok(BootstrapConfig {
            base_path,
            repositories,
            properties,
            env_file,
        })
    }
}
