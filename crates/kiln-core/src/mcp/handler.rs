//! Shared setup steps driven by a [`KindProfile`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;

use super::credentials::{validate_required, write_credential_file};
use super::kind::McpKind;
use super::manifest::patch_manifest;
use super::patch::{PatchResult, PreamblePatch, patch_file};
use super::profile::{InstallPlan, KindProfile, ProbePlan, TemplateArg, TemplateCommand};
use crate::config::Properties;
use crate::desktop::DesktopEntry;
use crate::error::SetupError;
use crate::process::{CommandRunner, CommandSpec, LivenessProbe, npm_program, require_success};

/// Collaborators a setup needs.
#[derive(Clone, Copy)]
pub struct SetupContext<'a> {
    pub runner: &'a dyn CommandRunner,
    pub probe: &'a dyn LivenessProbe,
    pub properties: &'a Properties,
    /// Interpreter used to create virtualenvs
    pub python: &'a str,
}

/// Successful end state of a setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupOutcome {
    /// Built and probed; `notes` are operator follow-ups
    Installed { notes: Vec<String> },
    /// Installed but waiting on the operator before it can be built
    PendingManualStep { instructions: Vec<String> },
}

/// Runs the setup steps for one kind.
#[derive(Debug, Clone, Copy)]
pub struct SetupHandler {
    profile: &'static KindProfile,
}

impl SetupHandler {
    pub fn for_kind(kind: McpKind) -> Self {
        Self {
            profile: KindProfile::for_kind(kind),
        }
    }

    pub fn kind(&self) -> McpKind {
        self.profile.kind
    }

    pub fn profile(&self) -> &'static KindProfile {
        self.profile
    }

    /// Bring a cloned repository to a runnable state.
    ///
    /// Steps run in order and the first failure aborts the rest.
    pub async fn setup(
        &self,
        ctx: &SetupContext<'_>,
        path: &Path,
        env: &BTreeMap<String, String>,
    ) -> anyhow::Result<SetupOutcome> {
        let profile = self.profile;
        tracing::info!("Setting up {} server in {}", profile.kind, path.display());

        validate_required(env, profile.required_vars)?;
        let tool = match profile.required_tool {
            Some(property) => Some(require_tool(ctx.properties, property)?),
            None => None,
        };

        if profile.writes_credentials {
            let initial = match profile.pending_until {
                Some(_) => subset(env, profile.required_vars),
                None => env.clone(),
            };
            write_credential_file(path, &initial)?;
        }

        if let Some(patch) = profile.manifest_patch {
            patch_manifest(path, patch)?;
        }

        self.install(ctx, path).await?;

        if let Some(gate) = profile.pending_until {
            if env.get(gate).is_none_or(|v| v.trim().is_empty()) {
                tracing::info!("{} is waiting for {}", profile.kind, gate);
                return Ok(SetupOutcome::PendingManualStep {
                    instructions: lines(profile.pending_instructions),
                });
            }
            validate_required(env, profile.full_vars)?;
            write_credential_file(path, env)?;
        }

        apply_patches(path, profile.source_patches)?;

        if profile.build {
            require_success(
                ctx.runner,
                &CommandSpec::new(npm_program())
                    .args(["run", "build"])
                    .current_dir(path),
            )
            .await?;
        }

        apply_patches(path, profile.artifact_patches)?;

        let probe_cmd = match profile.probe {
            ProbePlan::NpmStart => CommandSpec::new(npm_program()).arg("start").current_dir(path),
            ProbePlan::UvRun { server_dir } => {
                let uv = tool.context("uv probe requires a tool path")?;
                CommandSpec::new(uv).args([
                    "--directory".to_string(),
                    path.join(server_dir).to_string_lossy().into_owned(),
                    "run".to_string(),
                    "main.py".to_string(),
                ])
            }
        };
        let report = ctx.probe.check(&probe_cmd).await?;
        if !report.healthy {
            return Err(SetupError::ProbeFailed {
                stderr: report.stderr,
            }
            .into());
        }

        tracing::info!("{} server is ready", profile.kind);
        Ok(SetupOutcome::Installed {
            notes: lines(profile.post_install_notes),
        })
    }

    async fn install(&self, ctx: &SetupContext<'_>, path: &Path) -> anyhow::Result<()> {
        match self.profile.install {
            InstallPlan::Npm { extra_packages } => {
                for package in extra_packages.iter().copied() {
                    require_success(
                        ctx.runner,
                        &CommandSpec::new(npm_program())
                            .args(["install", package])
                            .current_dir(path),
                    )
                    .await?;
                }
                require_success(
                    ctx.runner,
                    &CommandSpec::new(npm_program()).arg("install").current_dir(path),
                )
                .await?;
            }
            InstallPlan::PythonVenv {
                server_dir,
                packages,
            } => {
                let server = path.join(server_dir);
                let venv = server.join(".venv");
                require_success(
                    ctx.runner,
                    &CommandSpec::new(ctx.python)
                        .args(["-m", "venv"])
                        .arg(venv.to_string_lossy())
                        .current_dir(&server),
                )
                .await?;
                require_success(
                    ctx.runner,
                    &CommandSpec::new(venv_python(&venv).to_string_lossy())
                        .args(["-m", "pip", "install"])
                        .args(packages.iter().copied())
                        .current_dir(&server),
                )
                .await?;
            }
        }
        Ok(())
    }

    /// Launcher entry for a server installed in `install_dir`.
    ///
    /// Template env keys start empty and are overlaid by `env_vars`. The env
    /// block is omitted only when the template has no keys and the repository
    /// declares none.
    pub fn desktop_entry(
        &self,
        install_dir: &Path,
        env_vars: Option<&BTreeMap<String, String>>,
        properties: &Properties,
    ) -> anyhow::Result<DesktopEntry> {
        let template = &self.profile.desktop;
        let command = match template.command {
            TemplateCommand::Literal(cmd) => cmd.to_string(),
            TemplateCommand::Property(key) => properties
                .get(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Property {key} is not set"))?
                .to_string(),
        };
        let args = template
            .args
            .iter()
            .map(|arg| match arg {
                TemplateArg::Literal(s) => s.to_string(),
                TemplateArg::InstallPath(rel) => install_dir.join(rel).to_string_lossy().into_owned(),
            })
            .collect();
        let env = match (template.env_keys, env_vars) {
            (None, None) => None,
            (keys, vars) => {
                let mut env: BTreeMap<String, String> = keys
                    .unwrap_or_default()
                    .iter()
                    .map(|k| (k.to_string(), String::new()))
                    .collect();
                if let Some(vars) = vars {
                    env.extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                Some(env)
            }
        };
        Ok(DesktopEntry { command, args, env })
    }
}

fn require_tool(properties: &Properties, property: &str) -> Result<String, SetupError> {
    let value = properties.get(property).unwrap_or_default().trim();
    if value.is_empty() || !Path::new(value).is_file() {
        return Err(SetupError::ToolNotFound {
            property: property.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value.to_string())
}

fn subset(env: &BTreeMap<String, String>, keys: &[&str]) -> BTreeMap<String, String> {
    env.iter()
        .filter(|(key, _)| keys.contains(&key.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn apply_patches(root: &Path, patches: &[PreamblePatch]) -> anyhow::Result<()> {
    for patch in patches {
        if patch_file(root, patch)? == PatchResult::AlreadyPresent {
            tracing::debug!("{} already loads its env file", patch.relative_path);
        }
    }
    Ok(())
}

fn venv_python(venv: &Path) -> PathBuf {
    if cfg!(windows) {
        venv.join("Scripts").join("python.exe")
    } else {
        venv.join("bin").join("python")
    }
}

fn lines(src: &[&str]) -> Vec<String> {
    src.iter().map(|s| s.to_string()).collect()
}
