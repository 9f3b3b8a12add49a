//! Environment and change-type classification.

use std::sync::LazyLock;

use regex_lite::Regex;

pub mod environment;
pub mod pr_type;

pub use environment::{add_environment, classify_environment};
pub use pr_type::{ChangeClassification, classify_pr_type, classify_paths, root_of};

/// Annotation `git cherry-pick -x` appends to a commit message.
#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
pub static CHERRY_PICK_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(cherry picked from commit \w+\)").unwrap());

/// Whether `line` begins with a cherry-pick annotation.
pub fn starts_with_cherry_pick(line: &str) -> bool {
    CHERRY_PICK_MARKER
        .find(line)
        .is_some_and(|m| m.start() == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cherry_pick_marker_anywhere() {
        assert!(CHERRY_PICK_MARKER.is_match("fix thing (cherry picked from commit 1a2b3c)"));
        assert!(!CHERRY_PICK_MARKER.is_match("cherry picked from commit 1a2b3c"));
    }

    #[test]
    fn test_starts_with_cherry_pick() {
        assert!(starts_with_cherry_pick("(cherry picked from commit 1a2b3c)"));
        assert!(!starts_with_cherry_pick("Merge (cherry picked from commit 1a2b3c)"));
    }

    #[test]
    fn test_starts_with_cherry_pick_is_case_sensitive() {
        assert!(!starts_with_cherry_pick("(Cherry Picked From Commit 1a2b3c)"));
    }
}
