//! Desktop launcher configuration (`claude_desktop_config.json`).

pub mod assembler;
pub mod catalog;
pub mod publish;
pub mod schema;

pub use assembler::DesktopConfigAssembler;
pub use catalog::{CatalogServer, FETCH_SERVER, ON_DEMAND_SERVERS, prefetch_packages};
pub use publish::{PublishOutcome, publish_desktop_config};
pub use schema::{DesktopConfig, DesktopEntry};

/// Default output file name.
pub const DESKTOP_CONFIG_FILE: &str = "claude_desktop_config.json";
