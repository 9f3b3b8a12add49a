//! PR number and title extraction from merge-commit lines.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static PR_NUMBER_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#[0-9]+$").unwrap());

/// PR metadata recovered from a merge commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrInfo {
    pub pr_number: Option<String>,
    pub pr_title: String,
}

/// Extract the PR number and title from a merge-commit line.
///
/// The title is everything after the last `delimiter`, with `#` characters
/// removed and whitespace trimmed. The number is the first whitespace
/// separated token that is exactly `#<digits>`. Either may be missing
/// independently of the other.
pub fn extract_pr_info(commit_message: &str, delimiter: &str) -> PrInfo {
    let raw_title = if delimiter.is_empty() {
        commit_message
    } else {
        commit_message
            .rsplit(delimiter)
            .next()
            .unwrap_or(commit_message)
    };
    let pr_title = raw_title.replace('#', "").trim().to_string();

    let pr_number = commit_message
        .split_whitespace()
        .find(|token| PR_NUMBER_TOKEN.is_match(token))
        .map(|token| token.trim_start_matches('#').to_string());

    PrInfo {
        pr_number,
        pr_title,
    }
}
