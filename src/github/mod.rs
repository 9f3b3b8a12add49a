//! GitHub API operations using octocrab.

pub mod auth;
pub mod files;

pub use auth::get_github_token;
pub use files::{FetchOutcome, OctocrabFilesClient, PrFile, PrFilesClient, fetch_pr_files};
