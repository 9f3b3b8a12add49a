//! Git operations using git2-rs and the git CLI.

pub mod history;
pub mod pr_info;
pub mod remote;

pub use history::{CommitSource, GitCli, changed_paths, directories_of, first_parent_count};
pub use pr_info::{PrInfo, extract_pr_info};
pub use remote::{RepoSlug, origin_slug, parse_remote_url};
