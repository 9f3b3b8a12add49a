//! Change-type classification for a merged pull request.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::github::{PrFilesClient, fetch_pr_files};

use super::CHERRY_PICK_MARKER;
use super::environment::add_environment;

/// Type assigned to cherry-picked merges.
pub const CHERRY_TYPE: &str = "cherry";

/// Type assigned to merges whose message matches a bug-fix pattern.
pub const BUG_TYPE: &str = "bug";

/// Environments a PR touched and the type of change it made.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeClassification {
    pub pr_envs: BTreeSet<String>,
    pub pr_type: String,
}

impl ChangeClassification {
    fn catch_all(config: &Config, pr_type: &str) -> Self {
        Self {
            pr_envs: BTreeSet::from([config.misc_env_name.clone()]),
            pr_type: pr_type.to_string(),
        }
    }

    /// True when nothing could be classified (e.g. the file listing failed).
    pub fn is_empty(&self) -> bool {
        self.pr_envs.is_empty() && self.pr_type.is_empty()
    }
}

/// Classify a PR by its message and, failing that, by the files it changed.
///
/// Cherry-picks and bug fixes are recognized from the lowercased message
/// alone and never hit the API. Otherwise each changed file votes for its root
/// directory and the heaviest root becomes the type.
pub async fn classify_pr_type<C: PrFilesClient + ?Sized>(
    config: &Config,
    client: &C,
    owner: &str,
    repo: &str,
    pr_number: Option<&str>,
    commit_message: &str,
) -> ChangeClassification {
    let message = commit_message.to_lowercase();
    if CHERRY_PICK_MARKER.is_match(&message) {
        return ChangeClassification::catch_all(config, CHERRY_TYPE);
    }

    if config
        .bug_fix_patterns()
        .iter()
        .any(|pattern| pattern.is_match(&message))
    {
        return ChangeClassification::catch_all(config, BUG_TYPE);
    }

    let outcome = fetch_pr_files(client, owner, repo, pr_number).await;
    if outcome.is_degraded() {
        debug!(pr = ?pr_number, "File listing degraded, leaving PR unclassified");
    }

    classify_paths(config, outcome.files().iter().map(|f| f.filename.as_str()))
}

/// Classify a set of changed paths.
pub fn classify_paths<'a, I>(config: &Config, paths: I) -> ChangeClassification
where
    I: IntoIterator<Item = &'a str>,
{
    let mut pr_envs = BTreeSet::new();
    let mut tally = RootTally::default();

    for path in paths {
        add_environment(config, &mut pr_envs, path);
        let root = root_of(config, path);
        let weight = config.weight_for(root);
        tally.record(root, weight);
    }

    ChangeClassification {
        pr_envs,
        pr_type: tally.winner().unwrap_or_default().to_string(),
    }
}

/// Root label of a changed path.
///
/// Paths under the root environment directory (`env/<tier>/<root>/...`) use
/// their third segment; everything else uses the first. A root-marked path
/// with fewer than three segments falls back to its first segment.
pub fn root_of<'a>(config: &Config, path: &'a str) -> &'a str {
    let mut segments = path.split('/');
    let first = segments.next().unwrap_or(path);

    if config.is_root_env_path(path) {
        if let Some(third) = segments.nth(1) {
            return third;
        }
    }

    first
}

/// Weighted votes per root, in first-seen order.
#[derive(Debug, Default)]
struct RootTally<'a> {
    scores: Vec<(&'a str, i64)>,
}

impl<'a> RootTally<'a> {
    /// First sighting scores 1; every repeat adds the root's weight.
    fn record(&mut self, root: &'a str, weight: i64) {
        match self.scores.iter_mut().find(|(name, _)| *name == root) {
            Some((_, score)) => *score += weight,
            None => self.scores.push((root, 1)),
        }
    }

    /// Root with the strictly greatest positive score; ties go to the earliest.
    fn winner(&self) -> Option<&'a str> {
        let mut best: Option<(&'a str, i64)> = None;
        for &(root, score) in &self.scores {
            if score > best.map_or(0, |(_, top)| top) {
                best = Some((root, score));
            }
        }
        best.map(|(root, _)| root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::error::GitHubError;
    use crate::github::PrFile;
    use crate::github::files::MockPrFilesClient;

    fn pr_file(name: &str) -> PrFile {
        PrFile {
            filename: name.to_string(),
            status: None,
            additions: 0,
            deletions: 0,
        }
    }

    #[test]
    fn test_root_of_plain_and_root_marked_paths() {
        let config = test_config();
        assert_eq!(root_of(&config, "packer/base.json"), "packer");
        assert_eq!(root_of(&config, "env/dev/terraform/main.tf"), "terraform");
        assert_eq!(root_of(&config, "README.md"), "README.md");
        assert_eq!(root_of(&config, "env/dev"), "env");
    }

    #[test]
    fn test_weighted_tally_repeat_root_wins() {
        let config = test_config();
        // terraform weight is 5: 1 + 5 = 6 against docs 1.
        let result = classify_paths(
            &config,
            [
                "env/dev/terraform/a.tf",
                "env/dev/terraform/b.tf",
                "docs/readme.md",
            ],
        );
        assert_eq!(result.pr_type, "terraform");
    }

    #[test]
    fn test_weight_only_applies_to_repeats() {
        let config = test_config();
        // packer (weight 20) touched once stays at 1; scripts twice reaches 2.
        let result = classify_paths(
            &config,
            ["packer/base.json", "scripts/a.sh", "scripts/b.sh"],
        );
        assert_eq!(result.pr_type, "scripts");
    }

    #[test]
    fn test_tie_keeps_first_root() {
        let config = test_config();
        let result = classify_paths(&config, ["docs/a.md", "scripts/a.sh"]);
        assert_eq!(result.pr_type, "docs");
    }

    #[test]
    fn test_non_positive_tally_never_wins() {
        let json = crate::config::TEST_CONFIG_JSON.replace(r#""env": 2"#, r#""docs": -5, "env": 2"#);
        let config = Config::from_json(&json).unwrap();

        // docs: 1 - 5 = -4, below the zero baseline.
        let result = classify_paths(&config, ["docs/a.md", "docs/b.md"]);
        assert_eq!(result.pr_type, "");
        assert_eq!(result.pr_envs, BTreeSet::from(["general".to_string()]));

        let result = classify_paths(&config, ["docs/a.md", "docs/b.md", "scripts/a.sh"]);
        assert_eq!(result.pr_type, "scripts");
    }

    #[tokio::test]
    async fn test_bug_patterns_match_lowercased_message() {
        let json = crate::config::TEST_CONFIG_JSON
            .replace(r#"["^fix", "hotfix", "bug"]"#, r#"["HOTFIX"]"#);
        let config = Config::from_json(&json).unwrap();
        let mut mock = MockPrFilesClient::new();
        mock.expect_fetch_page()
            .times(1)
            .returning(|_, _, _, _| Ok(vec![pr_file("scripts/login.sh")]));

        let result =
            classify_pr_type(&config, &mock, "acme", "widgets", Some("9"), "HOTFIX login page").await;

        assert_eq!(result.pr_type, "scripts");
    }

    #[test]
    fn test_single_root_wins_with_baseline() {
        let config = test_config();
        let result = classify_paths(&config, ["packer/base.json"]);
        assert_eq!(result.pr_type, "packer");
        assert_eq!(result.pr_envs, BTreeSet::from(["general".to_string()]));
    }

    #[test]
    fn test_no_paths_is_empty() {
        let config = test_config();
        let result = classify_paths(&config, std::iter::empty());
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_cherry_pick_short_circuits_without_fetch() {
        let config = test_config();
        let mut mock = MockPrFilesClient::new();
        mock.expect_fetch_page().times(0);

        let result = classify_pr_type(
            &config,
            &mock,
            "acme",
            "widgets",
            Some("9"),
            "Patch prod (Cherry picked from commit abc123)",
        )
        .await;

        assert_eq!(result.pr_type, CHERRY_TYPE);
        assert_eq!(result.pr_envs, BTreeSet::from(["general".to_string()]));
    }

    #[tokio::test]
    async fn test_bug_fix_short_circuits_without_fetch() {
        let config = test_config();
        let mut mock = MockPrFilesClient::new();
        mock.expect_fetch_page().times(0);

        let result =
            classify_pr_type(&config, &mock, "acme", "widgets", Some("9"), "HOTFIX login page").await;

        assert_eq!(result.pr_type, BUG_TYPE);
        assert_eq!(result.pr_envs, BTreeSet::from(["general".to_string()]));
    }

    #[tokio::test]
    async fn test_classifies_from_fetched_files() {
        let config = test_config();
        let mut mock = MockPrFilesClient::new();
        mock.expect_fetch_page().times(1).returning(|_, _, _, _| {
            Ok(vec![
                pr_file("env/stg/terraform/main.tf"),
                pr_file("env/prod/terraform/main.tf"),
                pr_file("docs/runbook.md"),
            ])
        });

        let result =
            classify_pr_type(&config, &mock, "acme", "widgets", Some("4"), "Add cache tier").await;

        assert_eq!(result.pr_type, "terraform");
        assert_eq!(
            result.pr_envs,
            BTreeSet::from(["prod".to_string(), "stg".to_string()])
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_yields_empty_classification() {
        let config = test_config();
        let mut mock = MockPrFilesClient::new();
        mock.expect_fetch_page().times(1).returning(|_, _, pr, _| {
            Err(GitHubError::Timeout {
                pr_number: pr.to_string(),
                millis: 2000,
            })
        });

        let result =
            classify_pr_type(&config, &mock, "acme", "widgets", Some("4"), "Add cache tier").await;

        assert_eq!(result, ChangeClassification::default());
    }
}
