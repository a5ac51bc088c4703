//! Spawn-and-wait command execution.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::Context;
use async_trait::async_trait;

use crate::error::SetupError;

/// A command line plus where and how to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Human-readable command line for logs and errors.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn to_tokio(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref dir) = self.cwd {
            cmd.current_dir(dir);
        }
        cmd.envs(&self.env);
        cmd
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code was zero
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// The most useful output for a failure message: stderr, else stdout.
    pub fn diagnostics(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// Executes external commands.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion.
    ///
    /// A non-zero exit is reported through `CommandOutput::success`; only
    /// failures to spawn are errors.
    async fn run(&self, spec: &CommandSpec) -> anyhow::Result<CommandOutput>;
}

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, spec: &CommandSpec) -> anyhow::Result<CommandOutput> {
        tracing::debug!("Running `{}`", spec.display());

        let output = spec
            .to_tokio()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to run `{}`", spec.display()))?;

        let result = CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if result.success {
            let stdout = result.stdout.trim();
            if !stdout.is_empty() {
                tracing::debug!("{}", stdout);
            }
        } else {
            tracing::warn!(
                "`{}` exited with {:?}: {}",
                spec.display(),
                result.code,
                result.diagnostics()
            );
        }

        Ok(result)
    }
}

/// Run a command and turn a non-zero exit into `SetupError::CommandFailed`.
pub async fn require_success(
    runner: &dyn CommandRunner,
    spec: &CommandSpec,
) -> anyhow::Result<CommandOutput> {
    let output = runner.run(spec).await?;
    if !output.success {
        return Err(SetupError::CommandFailed {
            command: spec.display(),
            output: output.diagnostics(),
        }
        .into());
    }
    Ok(output)
}

/// Name of the npm executable on this platform.
pub fn npm_program() -> &'static str {
    if cfg!(windows) { "npm.cmd" } else { "npm" }
}

/// Name of the Python interpreter on this platform.
pub fn python_program() -> &'static str {
    if cfg!(windows) { "python" } else { "python3" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_args() {
        let spec = CommandSpec::new("git").args(["clone", "https://x/y.git", "/tmp/y"]);
        assert_eq!(spec.display(), "git clone https://x/y.git /tmp/y");
    }

    #[test]
    fn diagnostics_prefers_stderr() {
        let output = CommandOutput {
            success: false,
            code: Some(1),
            stdout: "some output".to_string(),
            stderr: "  npm ERR! missing script  \n".to_string(),
        };
        assert_eq!(output.diagnostics(), "npm ERR! missing script");

        let quiet = CommandOutput::failed(2, "");
        assert_eq!(quiet.diagnostics(), "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_runner_reports_exit_status() {
        let runner = SystemRunner::new();

        let ok = runner
            .run(&CommandSpec::new("sh").args(["-c", "echo hello"]))
            .await
            .unwrap();
        assert!(ok.success);
        assert_eq!(ok.stdout.trim(), "hello");

        let failed = runner
            .run(&CommandSpec::new("sh").args(["-c", "echo nope >&2; exit 4"]))
            .await
            .unwrap();
        assert!(!failed.success);
        assert_eq!(failed.code, Some(4));
        assert_eq!(failed.stderr.trim(), "nope");
    }

    #[tokio::test]
    async fn system_runner_errors_on_missing_program() {
        let runner = SystemRunner::new();
        let result = runner
            .run(&CommandSpec::new("kiln-definitely-not-a-real-program"))
            .await;
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn require_success_maps_failure() {
        let runner = SystemRunner::new();
        let err = require_success(&runner, &CommandSpec::new("sh").args(["-c", "exit 1"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SetupError>(),
            Some(SetupError::CommandFailed { .. })
        ));
    }
}
