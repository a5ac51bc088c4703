//! MCP server kinds and their setup.
//!
//! The set of kinds is closed. Each kind is described by a static
//! [`KindProfile`] (required variables, install plan, patches, probe,
//! desktop template) and executed by one shared [`SetupHandler`].

pub mod credentials;
pub mod handler;
pub mod kind;
pub mod manifest;
pub mod patch;
pub mod profile;

pub use credentials::{CREDENTIAL_FILE, render_credentials, validate_required, write_credential_file};
pub use handler::{SetupContext, SetupHandler, SetupOutcome};
pub use kind::{McpKind, classify};
pub use manifest::{ManifestPatch, apply_manifest_patch, patch_manifest};
pub use patch::{PatchResult, Placement, PreamblePatch, apply_preamble, patch_file};
pub use profile::{DesktopTemplate, InstallPlan, KindProfile, ProbePlan, TemplateArg, TemplateCommand};
