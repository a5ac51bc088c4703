#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use kiln_core::process::{CommandOutput, CommandRunner, CommandSpec, LivenessProbe, ProbeReport};

/// Records every command and succeeds. `git clone` creates the target
/// directory, plus a same-named subfolder when `nested` is set.
#[derive(Default)]
pub struct FakeRunner {
    pub nested: bool,
    calls: Mutex<Vec<CommandSpec>>,
}

impl FakeRunner {
    pub fn nested() -> Self {
        Self {
            nested: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Commands other than `git clone`.
    pub fn setup_calls(&self) -> Vec<CommandSpec> {
        self.calls()
            .into_iter()
            .filter(|spec| spec.program != "git")
            .collect()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, spec: &CommandSpec) -> anyhow::Result<CommandOutput> {
        self.calls.lock().unwrap().push(spec.clone());
        if spec.program == "git" && spec.args.first().map(String::as_str) == Some("clone") {
            let target = PathBuf::from(&spec.args[2]);
            std::fs::create_dir_all(&target)?;
            if self.nested
                && let Some(name) = target.file_name()
            {
                std::fs::create_dir_all(target.join(name))?;
            }
        }
        Ok(CommandOutput::ok(""))
    }
}

/// Reports every server as healthy.
pub struct AlwaysUp;

#[async_trait]
impl LivenessProbe for AlwaysUp {
    async fn check(&self, _spec: &CommandSpec) -> anyhow::Result<ProbeReport> {
        Ok(ProbeReport::healthy())
    }
}
