//! Credential validation and the per-repository `.env` file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::error::SetupError;

/// Credential file name written into each repository.
pub const CREDENTIAL_FILE: &str = ".env";

/// Check that every required key is present and non-blank.
///
/// Missing keys are reported before blank ones.
pub fn validate_required(
    env: &BTreeMap<String, String>,
    required: &[&str],
) -> Result<(), SetupError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|key| !env.contains_key(**key))
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SetupError::MissingVariables(missing));
    }

    let empty: Vec<String> = required
        .iter()
        .filter(|key| env.get(**key).is_some_and(|v| v.trim().is_empty()))
        .map(|key| key.to_string())
        .collect();
    if !empty.is_empty() {
        return Err(SetupError::EmptyVariables(empty));
    }

    Ok(())
}

/// One `KEY="value"` line per variable.
pub fn render_credentials(env: &BTreeMap<String, String>) -> String {
    env.iter()
        .map(|(key, value)| format!("{key}=\"{value}\"\n"))
        .collect()
}

/// Write (overwrite) the credential file in `dir`.
pub fn write_credential_file(dir: &Path, env: &BTreeMap<String, String>) -> anyhow::Result<PathBuf> {
    let path = dir.join(CREDENTIAL_FILE);
    std::fs::write(&path, render_credentials(env))
        .with_context(|| format!("Failed to write credential file: {}", path.display()))?;
    tracing::info!("Wrote credential file {}", path.display());
    Ok(path)
}
