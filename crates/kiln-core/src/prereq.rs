//! External tool availability.

use crate::error::SetupError;
use crate::process::{CommandRunner, CommandSpec, npm_program, python_program};

/// A tool that was found, with its `--version` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolVersion {
    pub name: &'static str,
    pub version: String,
}

fn required_tools() -> [&'static str; 4] {
    ["git", "node", npm_program(), python_program()]
}

/// Run `<tool> --version` for each required tool.
///
/// Fails with [`SetupError::MissingPrerequisites`] naming every tool that
/// could not be run or exited non-zero.
pub async fn check_prerequisites(runner: &dyn CommandRunner) -> anyhow::Result<Vec<ToolVersion>> {
    let mut found = Vec::new();
    let mut missing = Vec::new();

    for name in required_tools() {
        match runner.run(&CommandSpec::new(name).arg("--version")).await {
            Ok(output) if output.success => {
                // Python 2 prints its version on stderr
                let text = if output.stdout.trim().is_empty() {
                    output.stderr.trim()
                } else {
                    output.stdout.trim()
                };
                tracing::debug!("{} {}", name, text);
                found.push(ToolVersion {
                    name,
                    version: text.to_string(),
                });
            }
            Ok(_) | Err(_) => {
                tracing::warn!("{} is not available", name);
                missing.push(name.to_string());
            }
        }
    }

    if !missing.is_empty() {
        return Err(SetupError::MissingPrerequisites(missing).into());
    }
    Ok(found)
}
