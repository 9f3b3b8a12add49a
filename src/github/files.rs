//! Changed-file listing for a pull request via octocrab.

use std::time::Duration;

use async_trait::async_trait;
use octocrab::Octocrab;
use octocrab::service::middleware::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GitHubError;

/// Page size requested from the files endpoint. A shorter page is the last one.
pub const PAGE_SIZE: usize = 100;

/// Per-request timeout for the files endpoint.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// One changed file in a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrFile {
    pub filename: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

/// Result of listing a pull request's files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Every page was fetched. May be empty if the PR changed nothing.
    Complete(Vec<PrFile>),
    /// A request failed; anything fetched before it was discarded.
    Degraded { reason: String },
}

impl FetchOutcome {
    /// Files to classify. A degraded fetch yields none.
    pub fn files(&self) -> &[PrFile] {
        match self {
            Self::Complete(files) => files,
            Self::Degraded { .. } => &[],
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Source of PR file pages.
///
/// This abstraction allows mocking the GitHub API in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PrFilesClient: Send + Sync {
    /// Fetch one page (1-based) of at most [`PAGE_SIZE`] files.
    async fn fetch_page(
        &self,
        owner: &str,
        repo: &str,
        pr_number: &str,
        page: u32,
    ) -> Result<Vec<PrFile>, GitHubError>;
}

#[derive(Serialize)]
struct PageParams {
    per_page: usize,
    page: u32,
}

/// [`PrFilesClient`] backed by the GitHub REST API.
pub struct OctocrabFilesClient {
    client: Octocrab,
    timeout: Duration,
}

impl OctocrabFilesClient {
    /// Build a client authenticating with a bearer token.
    pub fn new(token: &str) -> Result<Self, GitHubError> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .add_retry_config(RetryConfig::None)
            .build()
            .map_err(|e| GitHubError::ClientBuild(Box::new(e)))?;

        Ok(Self::with_client(client))
    }

    /// Use a pre-configured octocrab client.
    ///
    /// This allows dependency injection for testing with mock servers.
    pub fn with_client(client: Octocrab) -> Self {
        Self {
            client,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl PrFilesClient for OctocrabFilesClient {
    async fn fetch_page(
        &self,
        owner: &str,
        repo: &str,
        pr_number: &str,
        page: u32,
    ) -> Result<Vec<PrFile>, GitHubError> {
        let route = format!("/repos/{owner}/{repo}/pulls/{pr_number}/files");
        let params = PageParams {
            per_page: PAGE_SIZE,
            page,
        };

        let request = self.client.get::<Vec<PrFile>, _, _>(route, Some(&params));
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(files)) => Ok(files),
            Ok(Err(e)) => Err(GitHubError::FetchFiles {
                pr_number: pr_number.to_string(),
                source: Box::new(e),
            }),
            Err(_) => Err(GitHubError::Timeout {
                pr_number: pr_number.to_string(),
                millis: self.timeout.as_millis(),
            }),
        }
    }
}

/// List every changed file of a pull request.
///
/// Pages are requested until one comes back shorter than [`PAGE_SIZE`].
/// The first failed request ends pagination and the whole listing degrades
/// to an empty result. A missing PR number yields an empty listing without
/// touching the API.
pub async fn fetch_pr_files<C: PrFilesClient + ?Sized>(
    client: &C,
    owner: &str,
    repo: &str,
    pr_number: Option<&str>,
) -> FetchOutcome {
    let Some(pr_number) = pr_number else {
        debug!("No PR number, skipping changed-file lookup");
        return FetchOutcome::Complete(Vec::new());
    };

    let mut files = Vec::new();
    let mut page = 1u32;

    loop {
        match client.fetch_page(owner, repo, pr_number, page).await {
            Ok(batch) => {
                let len = batch.len();
                files.extend(batch);
                if len < PAGE_SIZE {
                    break;
                }
                page += 1;
            }
            Err(e) => {
                warn!(
                    "Error getting files from PR #{} (page {}): {}. Did you pass in the right values? Or are you authenticated?",
                    pr_number, page, e
                );
                return FetchOutcome::Degraded {
                    reason: e.to_string(),
                };
            }
        }
    }

    debug!(pr = pr_number, count = files.len(), pages = page, "Fetched PR files");
    FetchOutcome::Complete(files)
}
