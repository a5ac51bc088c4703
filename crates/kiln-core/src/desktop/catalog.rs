//! Servers that are launched on demand rather than installed.

use std::collections::BTreeMap;
use std::path::Path;

use super::schema::DesktopEntry;

/// An `npx -y <package>` server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogServer {
    pub name: &'static str,
    pub package: &'static str,
    /// Directories under the home directory passed as arguments
    pub home_dirs: &'static [&'static str],
    /// Env keys, filled from the config `.env` when present
    pub env_keys: &'static [&'static str],
    /// Installed up front by `kiln setup --prefetch`
    pub prefetch: bool,
}

pub const ON_DEMAND_SERVERS: &[CatalogServer] = &[
    CatalogServer {
        name: "brave-search",
        package: "@modelcontextprotocol/server-brave-search",
        home_dirs: &[],
        env_keys: &["BRAVE_API_KEY"],
        prefetch: true,
    },
    CatalogServer {
        name: "filesystem",
        package: "@modelcontextprotocol/server-filesystem",
        home_dirs: &["Desktop", "Downloads"],
        env_keys: &[],
        prefetch: false,
    },
    CatalogServer {
        name: "memory",
        package: "@modelcontextprotocol/server-memory",
        home_dirs: &[],
        env_keys: &[],
        prefetch: false,
    },
    CatalogServer {
        name: "puppeteer",
        package: "@modelcontextprotocol/server-puppeteer",
        home_dirs: &[],
        env_keys: &[],
        prefetch: false,
    },
];

/// `(name, command, args)` of the uvx-launched fetch server.
pub const FETCH_SERVER: (&str, &str, &[&str]) = ("fetch", "uvx", &["mcp-server-fetch"]);

impl CatalogServer {
    pub fn entry(&self, home: &Path, env_file: &BTreeMap<String, String>) -> DesktopEntry {
        let mut args = vec!["-y".to_string(), self.package.to_string()];
        args.extend(
            self.home_dirs
                .iter()
                .map(|dir| home.join(dir).to_string_lossy().into_owned()),
        );
        let env = (!self.env_keys.is_empty()).then(|| {
            self.env_keys
                .iter()
                .map(|key| {
                    let value = env_file.get(*key).cloned().unwrap_or_default();
                    (key.to_string(), value)
                })
                .collect()
        });
        DesktopEntry {
            command: "npx".to_string(),
            args,
            env,
        }
    }
}

/// Packages `kiln setup --prefetch` installs into the home directory.
pub fn prefetch_packages() -> impl Iterator<Item = &'static str> {
    ON_DEMAND_SERVERS
        .iter()
        .filter(|server| server.prefetch)
        .map(|server| server.package)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(name: &str) -> &'static CatalogServer {
        ON_DEMAND_SERVERS.iter().find(|s| s.name == name).unwrap()
    }

    #[test]
    fn filesystem_gets_home_directories() {
        let entry = server("filesystem").entry(Path::new("/home/dev"), &BTreeMap::new());
        assert_eq!(
            entry.args,
            vec![
                "-y",
                "@modelcontextprotocol/server-filesystem",
                "/home/dev/Desktop",
                "/home/dev/Downloads"
            ]
        );
        assert!(entry.env.is_none());
    }

    #[test]
    fn brave_key_comes_from_env_file() {
        let mut env_file = BTreeMap::new();
        env_file.insert("BRAVE_API_KEY".to_string(), "secret".to_string());

        let entry = server("brave-search").entry(Path::new("/home/dev"), &env_file);
        assert_eq!(entry.env.unwrap()["BRAVE_API_KEY"], "secret");

        let empty = server("brave-search").entry(Path::new("/home/dev"), &BTreeMap::new());
        assert_eq!(empty.env.unwrap()["BRAVE_API_KEY"], "");
    }

    #[test]
    fn only_brave_is_prefetched() {
        let packages: Vec<_> = prefetch_packages().collect();
        assert_eq!(packages, vec!["@modelcontextprotocol/server-brave-search"]);
    }
}
