//! relscope - release notes and branch divergence from git history.
//!
//! # Overview
//!
//! relscope walks the merges in a commit range, recovers the pull request
//! behind each one, classifies it by deployment environment and change type
//! (from its message or the files it touched), and writes the result as
//! grouped Markdown release notes. A second tool ranks branches by how far
//! and how long they have drifted from the main branch.

pub mod changelog;
pub mod classify;
pub mod config;
pub mod divergence;
pub mod error;
pub mod git;
pub mod github;

// Re-export commonly used types
pub use changelog::{Aggregator, ChangelogEntry, ChangelogObject};
pub use classify::ChangeClassification;
pub use config::Config;
pub use divergence::DivergenceRow;
pub use error::{ConfigError, GitError, GitHubError, ReportError};
pub use git::{PrInfo, RepoSlug};
pub use github::{FetchOutcome, PrFile, PrFilesClient};
