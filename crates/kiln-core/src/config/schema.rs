//! Schema for repositories.json

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root of repositories.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryList {
    /// Directory the repositories are cloned into (overridden by
    /// `REPOSITORIES_BASE_PATH` from the properties file)
    #[serde(default)]
    pub base_path: Option<String>,

    /// Repositories in setup order
    #[serde(default)]
    pub repositories: Vec<RepositoryEntry>,
}

/// One declared repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryEntry {
    /// Clone URL
    pub url: String,

    /// Ecosystem of the repository: node or python
    #[serde(rename = "type", default)]
    pub runtime: RuntimeTag,

    /// Credential values, literal or `%KEY%` placeholders
    #[serde(default)]
    pub env_vars: Option<BTreeMap<String, String>>,
}

/// Ecosystem tag declared for a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeTag {
    #[default]
    Node,
    Python,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for RuntimeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeTag::Node => write!(f, "node"),
            RuntimeTag::Python => write!(f, "python"),
            RuntimeTag::Other => write!(f, "other"),
        }
    }
}
