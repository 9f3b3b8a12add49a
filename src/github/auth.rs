//! GitHub token lookup.
//!
//! The token is read once at startup:
//! 1. `GITHUB_TOKEN` environment variable
//! 2. `GH_TOKEN` environment variable

use std::env;

use crate::error::GitHubError;

/// Get the bearer token used for the pull request API.
pub fn get_github_token() -> Result<String, GitHubError> {
    for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
        if let Ok(token) = env::var(var) {
            let token = token.trim();
            if !token.is_empty() {
                return Ok(token.to_string());
            }
        }
    }

    Err(GitHubError::AuthenticationFailed)
}
