//! Error types for relscope modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading the release-notes configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Error, there doesn't exist a configuration file at {}.\n\
         Place a config file in said path or specify a custom path via setting {env_var}.",
        path.display()
    )]
    NotFound { path: PathBuf, env_var: &'static str },

    #[error("Could not determine the home directory; set {0} to the config file path")]
    NoHomeDir(&'static str),

    #[error("Failed to read config file {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    ParseFailed(#[source] serde_json::Error),

    #[error("Invalid regex for '{key}' ({pattern}): {source}")]
    InvalidPattern {
        key: String,
        pattern: String,
        #[source]
        source: regex_lite::Error,
    },

    #[error("Environment names must be distinct, '{0}' is used more than once")]
    DuplicateEnvironment(String),

    #[error("repo_url '{0}' has no host")]
    InvalidRepoUrl(String),
}

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to find reference '{0}': {1}")]
    ReferenceNotFound(String, #[source] git2::Error),

    #[error("Failed to parse commit: {0}")]
    ParseCommit(#[source] git2::Error),

    #[error("Failed to walk commit history: {0}")]
    RevwalkError(#[source] git2::Error),

    #[error("Failed to diff trees: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("No '{0}' remote found")]
    RemoteNotFound(String),

    #[error("Could not parse owner and repository from remote URL '{0}'")]
    InvalidRemoteUrl(String),

    #[error("git {operation} failed: {stderr}")]
    CommandFailed { operation: String, stderr: String },

    #[error("Failed to run git {operation}: {source}")]
    SpawnFailed {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from GitHub API operations.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error(
        "FATAL: Env variable GITHUB_TOKEN is not set. Set GITHUB_TOKEN (or GH_TOKEN) to a token with read access to pull requests"
    )]
    AuthenticationFailed,

    #[error("Failed to build GitHub client: {0}")]
    ClientBuild(#[source] Box<octocrab::Error>),

    #[error("Failed to fetch files for PR #{pr_number}: {source}")]
    FetchFiles {
        pr_number: String,
        #[source]
        source: Box<octocrab::Error>,
    },

    #[error("Request for PR #{pr_number} files timed out after {millis} ms")]
    Timeout { pr_number: String, millis: u128 },
}

/// Errors from writing the release-notes report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to create temporary report file: {0}")]
    TempFileFailed(#[source] std::io::Error),

    #[error("Failed to write report: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Failed to replace {}: {source}", path.display())]
    PersistFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
