//! `.env` loading for placeholder resolution.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;

/// Load a `.env` file into a map without touching the process environment.
///
/// A missing file yields an empty map. dotenvy handles quoting; values are
/// only trimmed of surrounding whitespace.
pub fn load_env_file(path: &Path) -> anyhow::Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to open env file: {}", path.display()))?;

    let mut values = BTreeMap::new();
    for item in iter {
        let (key, value) =
            item.with_context(|| format!("Failed to parse env file: {}", path.display()))?;
        values.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(values)
}
