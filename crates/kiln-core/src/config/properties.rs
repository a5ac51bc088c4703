//! Parser for default.properties (`KEY=value` lines, `#` comments).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;

/// Property naming the directory repositories are cloned into
pub const REPOSITORIES_BASE_PATH: &str = "REPOSITORIES_BASE_PATH";
/// Property naming the uv executable used by the WhatsApp server
pub const UV_PATH: &str = "UV_PATH";

/// Flat key/value properties
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    values: BTreeMap<String, String>,
}

impl Properties {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    /// Read and parse a properties file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read properties file: {}", path.display()))?;
        Ok(parse_properties_str(&content))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn base_path(&self) -> Option<PathBuf> {
        self.get(REPOSITORIES_BASE_PATH)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    pub fn uv_path(&self) -> Option<&str> {
        self.get(UV_PATH).filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parse properties content.
///
/// Blank lines, `#` comments and lines without `=` are skipped. The line is
/// split on the first `=`, and both halves are trimmed.
pub fn parse_properties_str(content: &str) -> Properties {
    let values = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();
    Properties { values }
}
