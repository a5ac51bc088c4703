//! Per-repository failure taxonomy.

use std::path::PathBuf;

use thiserror::Error;

/// Reasons a repository (or the run as a whole) could not be set up.
///
/// Everything else flows through `anyhow` with context; these variants exist
/// so callers and tests can tell the failure classes apart.
#[derive(Error, Debug)]
pub enum SetupError {
    /// Required external tools are not invocable
    #[error("Missing prerequisites: {}", .0.join(", "))]
    MissingPrerequisites(Vec<String>),

    /// Required credential keys are absent from the declared env vars
    #[error("Missing environment variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),

    /// Required credential keys are declared but blank
    #[error("Empty environment variables: {}", .0.join(", "))]
    EmptyVariables(Vec<String>),

    /// `git clone` failed for a reason other than an existing target
    #[error("Failed to clone {url}: {message}")]
    CloneFailed { url: String, message: String },

    /// An install or build command exited non-zero
    #[error("Command `{command}` failed: {output}")]
    CommandFailed { command: String, output: String },

    /// The server exited before the probe window elapsed
    #[error("Server did not stay up: {stderr}")]
    ProbeFailed { stderr: String },

    /// The repository name matches no known MCP kind
    #[error("Could not determine MCP type for '{0}'")]
    Unclassified(String),

    /// A file that must be patched was not produced by the build
    #[error("Expected file not found: {}", .0.display())]
    MissingArtifact(PathBuf),

    /// A tool path from the properties file is unset or does not exist
    #[error("Tool not found for property {property}: '{value}'")]
    ToolNotFound { property: String, value: String },
}
