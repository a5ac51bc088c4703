//! Serialized shape of the launcher config.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One launchable server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesktopEntry {
    pub command: String,
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
}

impl DesktopEntry {
    /// Rewrite `\` to `/` in the command and every argument.
    pub fn with_forward_slashes(mut self) -> Self {
        self.command = self.command.replace('\\', "/");
        for arg in &mut self.args {
            *arg = arg.replace('\\', "/");
        }
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesktopConfig {
    #[serde(rename = "mcpServers")]
    pub mcp_servers: BTreeMap<String, DesktopEntry>,
}

impl DesktopConfig {
    pub fn to_json_pretty(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
