//! Kiln Core Library
//!
//! Domain logic for bootstrapping a local set of MCP servers: loading the
//! repository list, cloning, per-kind setup (credentials, install, build,
//! patching, liveness probing) and assembling the desktop launcher config.

pub mod config;
pub mod context;
pub mod desktop;
pub mod error;
pub mod git;
pub mod mcp;
pub mod pipeline;
pub mod prereq;
pub mod process;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{BootstrapConfig, ConfigLoader, RepositoryDescriptor, RuntimeTag};

    // Context
    pub use crate::context::BootstrapContext;

    // MCP
    pub use crate::mcp::{McpKind, SetupHandler, SetupOutcome, classify};

    // Process
    pub use crate::process::{CommandOutput, CommandRunner, CommandSpec, DelayProbe, LivenessProbe};

    // Git
    pub use crate::git::{FetchOutcome, RepositoryFetcher};

    // Desktop
    pub use crate::desktop::{DesktopConfig, DesktopConfigAssembler, DesktopEntry, PublishOutcome};

    // Pipeline
    pub use crate::pipeline::{RepositoryOutcome, RunReport, SetupPipeline};

    // Errors
    pub use crate::error::SetupError;
}
