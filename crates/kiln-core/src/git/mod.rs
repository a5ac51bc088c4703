//! Git operations for fetching MCP server repositories.
//!
//! - Deriving the clone directory name from a repository URL
//! - Clone-if-absent, tolerating a target that appears mid-clone

mod fetcher;
mod name;

pub use fetcher::{FetchOutcome, RepositoryFetcher};
pub use name::repo_name_from_url;
