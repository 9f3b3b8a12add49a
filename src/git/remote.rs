//! Owner and repository name from the `origin` remote.

use git2::Repository;

use crate::error::GitError;

/// `owner/name` of a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

/// Read the owner and repository name from the `origin` remote.
pub fn origin_slug(repo: &Repository) -> Result<RepoSlug, GitError> {
    let remote = repo
        .find_remote("origin")
        .map_err(|_| GitError::RemoteNotFound("origin".to_string()))?;

    let url = remote
        .url()
        .ok_or_else(|| GitError::InvalidRemoteUrl("<non-utf8>".to_string()))?;

    parse_remote_url(url)
}

/// Extract owner and repo from a git remote URL on any host.
///
/// Handles `git@host:owner/repo.git`, `ssh://git@host/owner/repo.git` and
/// `https://host/owner/repo(.git)`.
pub fn parse_remote_url(url: &str) -> Result<RepoSlug, GitError> {
    let invalid = || GitError::InvalidRemoteUrl(url.to_string());

    let path = if let Some((_, rest)) = url.split_once("://") {
        rest.split_once('/').map(|(_, path)| path).ok_or_else(invalid)?
    } else if let Some((_, path)) = url.split_once(':') {
        path
    } else {
        return Err(invalid());
    };

    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut parts = path.rsplit('/');

    match (parts.next(), parts.next()) {
        (Some(name), Some(owner)) if !name.is_empty() && !owner.is_empty() => Ok(RepoSlug {
            owner: owner.to_string(),
            name: name.to_string(),
        }),
        _ => Err(invalid()),
    }
}
