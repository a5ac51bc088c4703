//! package.json adjustments applied before installing.

use std::path::Path;

use anyhow::Context;
use serde_json::{Map, Value};

/// Pinned dotenv version added to manifests that lack it.
pub const DOTENV_VERSION: &str = "^16.5.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestPatch {
    /// Replace an existing `build` script with plain `tsc`
    BuildWithTsc,
    /// Replace all scripts with `tsc` build and `node build/index.js`
    /// start, and depend on dotenv
    TscScriptsWithDotenv,
}

/// Apply a patch to a parsed manifest. Returns whether anything changed.
pub fn apply_manifest_patch(manifest: &mut Value, patch: ManifestPatch) -> anyhow::Result<bool> {
    let root = manifest
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("package.json root is not an object"))?;

    match patch {
        ManifestPatch::BuildWithTsc => {
            let Some(build) = root
                .get_mut("scripts")
                .and_then(Value::as_object_mut)
                .and_then(|scripts| scripts.get_mut("build"))
            else {
                return Ok(false);
            };
            let changed = build.as_str() != Some("tsc");
            *build = Value::String("tsc".to_string());
            Ok(changed)
        }
        ManifestPatch::TscScriptsWithDotenv => {
            let mut scripts = Map::new();
            scripts.insert("build".to_string(), Value::String("tsc".to_string()));
            scripts.insert(
                "start".to_string(),
                Value::String("node build/index.js".to_string()),
            );
            let scripts = Value::Object(scripts);
            let mut changed = root.get("scripts") != Some(&scripts);
            root.insert("scripts".to_string(), scripts);

            let deps = root
                .entry("dependencies")
                .or_insert_with(|| Value::Object(Map::new()))
                .as_object_mut()
                .ok_or_else(|| anyhow::anyhow!("package.json dependencies is not an object"))?;
            if !deps.contains_key("dotenv") {
                deps.insert(
                    "dotenv".to_string(),
                    Value::String(DOTENV_VERSION.to_string()),
                );
                changed = true;
            }
            Ok(changed)
        }
    }
}

/// Patch `dir/package.json` in place. Returns whether the file was rewritten;
/// false when there is no manifest or it already matches.
pub fn patch_manifest(dir: &Path, patch: ManifestPatch) -> anyhow::Result<bool> {
    let path = dir.join("package.json");
    if !path.exists() {
        tracing::warn!("No package.json in {}, skipping manifest patch", dir.display());
        return Ok(false);
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut manifest: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    if !apply_manifest_patch(&mut manifest, patch)? {
        tracing::debug!("{} already patched", path.display());
        return Ok(false);
    }

    let mut out =
        serde_json::to_string_pretty(&manifest).context("Failed to serialize package.json")?;
    out.push('\n');
    std::fs::write(&path, out).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Updated {}", path.display());
    Ok(true)
}
