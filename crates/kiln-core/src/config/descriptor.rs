//! Normalized repository descriptors.

use std::collections::BTreeMap;

use super::schema::{RepositoryEntry, RuntimeTag};
use crate::git::repo_name_from_url;

/// A declared repository with its placeholders resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    pub url: String,
    /// URL basename without the `.git` suffix; also the clone directory name
    pub name: String,
    pub runtime: RuntimeTag,
    /// `None` when the repository declares no `env_vars` block at all
    pub env_vars: Option<BTreeMap<String, String>>,
}

impl RepositoryDescriptor {
    pub fn from_entry(
        entry: RepositoryEntry,
        env_file: &BTreeMap<String, String>,
    ) -> anyhow::Result<Self> {
        let name = repo_name_from_url(&entry.url)?;
        let env_vars = entry
            .env_vars
            .map(|vars| resolve_placeholders(vars, env_file));
        Ok(Self {
            url: entry.url,
            name,
            runtime: entry.runtime,
            env_vars,
        })
    }

    /// Declared env vars, empty when none were declared.
    pub fn env(&self) -> BTreeMap<String, String> {
        self.env_vars.clone().unwrap_or_default()
    }
}

/// Replace `%KEY%` values with the matching `.env` entry.
///
/// Placeholders without a matching key are kept verbatim.
pub fn resolve_placeholders(
    vars: BTreeMap<String, String>,
    env_file: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    vars.into_iter()
        .map(|(key, value)| {
            let resolved = placeholder_key(&value)
                .and_then(|lookup| env_file.get(lookup))
                .cloned()
                .unwrap_or(value);
            (key, resolved)
        })
        .collect()
}

fn placeholder_key(value: &str) -> Option<&str> {
    value
        .strip_prefix('%')
        .and_then(|rest| rest.strip_suffix('%'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_file() -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();
        env.insert("TRELLO_TOKEN".to_string(), "secret-token".to_string());
        env
    }

    #[test]
    fn resolves_known_placeholder() {
        let mut vars = BTreeMap::new();
        vars.insert("TRELLO_TOKEN".to_string(), "%TRELLO_TOKEN%".to_string());
        vars.insert("TRELLO_BOARD_ID".to_string(), "board-1".to_string());

        let resolved = resolve_placeholders(vars, &env_file());

        assert_eq!(resolved["TRELLO_TOKEN"], "secret-token");
        assert_eq!(resolved["TRELLO_BOARD_ID"], "board-1");
    }

    #[test]
    fn unknown_placeholder_is_left_untouched() {
        let mut vars = BTreeMap::new();
        vars.insert("APIFY_TOKEN".to_string(), "%APIFY_TOKEN%".to_string());

        let resolved = resolve_placeholders(vars, &env_file());

        assert_eq!(resolved["APIFY_TOKEN"], "%APIFY_TOKEN%");
    }

    #[test]
    fn single_percent_is_not_a_placeholder() {
        let mut vars = BTreeMap::new();
        vars.insert("X".to_string(), "%".to_string());

        let resolved = resolve_placeholders(vars, &env_file());

        assert_eq!(resolved["X"], "%");
    }

    #[test]
    fn descriptor_derives_name_from_url() {
        let entry = RepositoryEntry {
            url: "https://github.com/org/gmail-mcp.git".to_string(),
            runtime: RuntimeTag::Node,
            env_vars: None,
        };

        let descriptor = RepositoryDescriptor::from_entry(entry, &env_file()).unwrap();

        assert_eq!(descriptor.name, "gmail-mcp");
        assert!(descriptor.env_vars.is_none());
        assert!(descriptor.env().is_empty());
    }
}
