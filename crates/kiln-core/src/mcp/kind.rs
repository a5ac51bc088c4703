//! Closed registry of MCP kinds.

use serde::{Deserialize, Serialize};

use crate::config::RuntimeTag;

/// Integration implemented by an MCP server repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum McpKind {
    Trello,
    GoogleCalendar,
    Gmail,
    LinkedinExtract,
    Whatsapp,
}

impl McpKind {
    /// All kinds in classification priority order.
    pub const ALL: [McpKind; 5] = [
        McpKind::Trello,
        McpKind::GoogleCalendar,
        McpKind::Gmail,
        McpKind::LinkedinExtract,
        McpKind::Whatsapp,
    ];

    /// Stable tag, also the server name in the desktop config.
    pub fn id(self) -> &'static str {
        match self {
            McpKind::Trello => "trello",
            McpKind::GoogleCalendar => "google-calendar",
            McpKind::Gmail => "gmail",
            McpKind::LinkedinExtract => "linkedin-extract",
            McpKind::Whatsapp => "whatsapp",
        }
    }

    /// Substring that identifies this kind in a repository name.
    pub fn fragment(self) -> &'static str {
        self.id()
    }

    pub fn expected_runtime(self) -> RuntimeTag {
        match self {
            McpKind::Whatsapp => RuntimeTag::Python,
            _ => RuntimeTag::Node,
        }
    }
}

impl std::fmt::Display for McpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Map a repository name to its kind.
///
/// Case-insensitive substring match in [`McpKind::ALL`] order; the first
/// match wins.
pub fn classify(repo_name: &str) -> Option<McpKind> {
    let lower = repo_name.to_lowercase();
    McpKind::ALL
        .into_iter()
        .find(|kind| lower.contains(kind.fragment()))
}
