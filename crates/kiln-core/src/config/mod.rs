//! Bootstrap configuration
//!
//! Three inputs live side by side in one config directory:
//! - `repositories.json`: the declared repositories and their env vars
//! - `default.properties`: machine-specific paths (base path, tool paths)
//! - `.env` (optional): secret values referenced as `%KEY%` placeholders

pub mod descriptor;
pub mod env_file;
pub mod loader;
pub mod properties;
pub mod schema;

pub use descriptor::{RepositoryDescriptor, resolve_placeholders};
pub use env_file::load_env_file;
pub use loader::{BootstrapConfig, ConfigLoader};
pub use properties::{Properties, parse_properties_str};
pub use schema::{RepositoryEntry, RepositoryList, RuntimeTag};

/// File name of the repository list inside the config directory
pub const REPOSITORIES_FILE: &str = "repositories.json";
/// File name of the properties file inside the config directory
pub const PROPERTIES_FILE: &str = "default.properties";
/// File name of the placeholder source inside the config directory
pub const ENV_FILE: &str = ".env";
