//! Builds the launcher config from the catalog and installed servers.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::catalog::{FETCH_SERVER, ON_DEMAND_SERVERS};
use super::schema::{DesktopConfig, DesktopEntry};
use crate::config::BootstrapConfig;
use crate::mcp::{SetupHandler, classify};
use crate::pipeline::install_dir;

/// Assembles a [`DesktopConfig`] for one run.
#[derive(Debug, Clone, Copy)]
pub struct DesktopConfigAssembler<'a> {
    config: &'a BootstrapConfig,
    base_path: &'a Path,
    home_dir: &'a Path,
}

impl<'a> DesktopConfigAssembler<'a> {
    pub fn new(
        config: &'a BootstrapConfig,
        base_path: &'a Path,
        home_dir: &'a Path,
    ) -> Self {
        Self {
            config,
            base_path,
            home_dir,
        }
    }

    /// Catalog servers, the fetch server, then every installed repository
    /// keyed by its kind tag.
    pub fn assemble(&self, installed: &[String]) -> anyhow::Result<DesktopConfig> {
        let mut config = DesktopConfig::default();

        for server in ON_DEMAND_SERVERS {
            config.mcp_servers.insert(
                server.name.to_string(),
                server
                    .entry(self.home_dir, &self.config.env_file)
                    .with_forward_slashes(),
            );
        }

        let (name, command, args) = FETCH_SERVER;
        config.mcp_servers.insert(
            name.to_string(),
            DesktopEntry {
                command: command.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
                env: None,
            }
            .with_forward_slashes(),
        );

        for repo_name in installed {
            let Some(kind) = classify(repo_name) else {
                tracing::warn!("Skipping {}: unknown MCP type", repo_name);
                continue;
            };
            let dir = self.install_dir(repo_name);
            let env_vars = self
                .config
                .repository(repo_name)
                .and_then(|repo| repo.env_vars.as_ref());
            let entry = SetupHandler::for_kind(kind)
                .desktop_entry(&dir, env_vars, &self.config.properties)
                .with_context(|| format!("Failed to build launcher entry for {repo_name}"))?;
            config
                .mcp_servers
                .insert(kind.id().to_string(), entry.with_forward_slashes());
        }

        Ok(config)
    }

    fn install_dir(&self, repo_name: &str) -> PathBuf {
        install_dir(self.base_path, repo_name)
    }
}
