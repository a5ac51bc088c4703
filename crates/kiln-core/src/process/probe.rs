//! Liveness probing of freshly built servers.
//!
//! A server counts as healthy when it is still running after a startup
//! window. This is a heuristic: a crash just after the window is reported
//! healthy, and a slow start that exits early is reported failed. The
//! [`LivenessProbe`] trait is the seam for a readiness-based replacement.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::Child;
use tokio::time::sleep;

#[cfg(unix)]
use tokio::time::timeout;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

use super::runner::CommandSpec;

/// Result of probing a server command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub healthy: bool,
    /// Captured stderr when the process exited early
    pub stderr: String,
}

impl ProbeReport {
    pub fn healthy() -> Self {
        Self {
            healthy: true,
            stderr: String::new(),
        }
    }

    pub fn exited(stderr: impl Into<String>) -> Self {
        Self {
            healthy: false,
            stderr: stderr.into(),
        }
    }
}

/// Decides whether a server command starts and keeps running.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn check(&self, spec: &CommandSpec) -> anyhow::Result<ProbeReport>;
}

/// Start, wait a fixed delay, check the process is still alive, stop it.
#[derive(Debug, Clone, Copy)]
pub struct DelayProbe {
    startup_delay: Duration,
    grace_period: Duration,
}

impl Default for DelayProbe {
    fn default() -> Self {
        Self {
            startup_delay: Duration::from_secs(2),
            grace_period: Duration::from_secs(1),
        }
    }
}

impl DelayProbe {
    pub fn new(startup_delay: Duration, grace_period: Duration) -> Self {
        Self {
            startup_delay,
            grace_period,
        }
    }

    pub fn startup_delay(&self) -> Duration {
        self.startup_delay
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }
}

#[async_trait]
impl LivenessProbe for DelayProbe {
    async fn check(&self, spec: &CommandSpec) -> anyhow::Result<ProbeReport> {
        tracing::info!("Starting `{}` for a liveness check", spec.display());

        // stdin stays open for the whole window; stdio servers exit on EOF.
        let mut child = spec
            .to_tokio()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start `{}`", spec.display()))?;

        sleep(self.startup_delay).await;

        match child.try_wait().context("Failed to poll server process")? {
            None => {
                tracing::info!("Server is still running after {:?}", self.startup_delay);
                if let Err(err) = terminate(&mut child, self.grace_period).await {
                    tracing::warn!("Failed to stop probed server: {}", err);
                }
                Ok(ProbeReport::healthy())
            }
            Some(status) => {
                let stderr = read_stderr(&mut child).await;
                tracing::warn!("Server exited early with {}: {}", status, stderr.trim());
                Ok(ProbeReport::exited(stderr.trim()))
            }
        }
    }
}

async fn read_stderr(child: &mut Child) -> String {
    let mut buf = Vec::new();
    if let Some(mut stderr) = child.stderr.take() {
        let _ = stderr.read_to_end(&mut buf).await;
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// SIGTERM, wait up to `grace`, then SIGKILL and reap.
async fn terminate(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            match signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                Ok(()) => {}
                // Already gone
                Err(nix::errno::Errno::ESRCH) => return child.wait().await,
                Err(e) => return Err(io::Error::other(e)),
            }
            if let Ok(result) = timeout(grace, child.wait()).await {
                return result;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Ok(Some(status)) = child.try_wait() {
            return Ok(status);
        }
        let _ = grace;
    }

    child.kill().await?;
    child.wait().await
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn quick_probe() -> DelayProbe {
        DelayProbe::new(Duration::from_millis(300), Duration::from_millis(200))
    }

    #[tokio::test]
    async fn long_running_process_is_healthy() {
        let report = quick_probe()
            .check(&CommandSpec::new("sleep").arg("30"))
            .await
            .unwrap();
        assert!(report.healthy);
    }

    #[tokio::test]
    async fn early_exit_surfaces_stderr() {
        let report = quick_probe()
            .check(&CommandSpec::new("sh").args(["-c", "echo boom >&2; exit 3"]))
            .await
            .unwrap();
        assert!(!report.healthy);
        assert_eq!(report.stderr, "boom");
    }

    #[tokio::test]
    async fn process_ignoring_sigterm_is_killed() {
        let report = quick_probe()
            .check(&CommandSpec::new("sh").args(["-c", "trap '' TERM; sleep 30"]))
            .await
            .unwrap();
        assert!(report.healthy);
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let result = quick_probe()
            .check(&CommandSpec::new("kiln-definitely-not-a-real-program"))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn default_timings() {
        let probe = DelayProbe::default();
        assert_eq!(probe.startup_delay(), Duration::from_secs(2));
        assert_eq!(probe.grace_period(), Duration::from_secs(1));
    }
}
