//! Changelog aggregation over a commit range.

use git2::Repository;
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use crate::classify::{classify_pr_type, starts_with_cherry_pick};
use crate::config::Config;
use crate::error::GitError;
use crate::git::{
    CommitSource, RepoSlug, changed_paths, directories_of, extract_pr_info, first_parent_count,
};
use crate::github::PrFilesClient;

use super::object::ChangelogObject;

/// Log lines starting with this are merge commits.
const MERGE_MARKER: &str = "Merge";

/// Builds a [`ChangelogObject`] from the merges in a commit range.
pub struct Aggregator<'a> {
    config: &'a Config,
    slug: &'a RepoSlug,
    source: &'a dyn CommitSource,
    client: &'a dyn PrFilesClient,
    progress: ProgressBar,
}

impl<'a> Aggregator<'a> {
    pub fn new(
        config: &'a Config,
        slug: &'a RepoSlug,
        source: &'a dyn CommitSource,
        client: &'a dyn PrFilesClient,
    ) -> Self {
        Self {
            config,
            slug,
            source,
            client,
            progress: ProgressBar::hidden(),
        }
    }

    /// Tick `progress` once per log line while building.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Group every merged PR between `start` and `end` by environment and type.
    ///
    /// PRs are processed one at a time in log order, so groups and their
    /// entries keep first-seen order and reruns over the same range produce
    /// the same object.
    pub async fn build_changelog(&self, start: &str, end: &str) -> Result<ChangelogObject, GitError> {
        let lines = self.source.range_log(start, end)?;
        let mut changelog = ChangelogObject::new(self.config.environments());

        self.progress
            .set_message("Currently parsing changes in repository, please wait.");

        for (index, line) in lines.iter().enumerate() {
            self.progress.tick();

            if !line.starts_with(MERGE_MARKER) {
                continue;
            }

            // The cherry-pick annotation can carry the PR reference the
            // merge summary lacks.
            let message = match lines.get(index + 1) {
                Some(next) if starts_with_cherry_pick(next) => format!("{line} {next}"),
                _ => line.clone(),
            };

            let pr = extract_pr_info(&message, &self.config.pr_body_prefix);
            let classification = classify_pr_type(
                self.config,
                self.client,
                &self.slug.owner,
                &self.slug.name,
                pr.pr_number.as_deref(),
                &pr.pr_title,
            )
            .await;

            if classification.is_empty() {
                debug!(pr = ?pr.pr_number, title = %pr.pr_title, "PR left unclassified");
                continue;
            }

            let rendered = render_change_line(
                &pr.pr_title,
                pr.pr_number.as_deref(),
                &self.config.url_host,
                self.slug,
            );

            for env in &classification.pr_envs {
                if !changelog.push_change(env, &classification.pr_type, rendered.clone()) {
                    warn!(environment = %env, "Classification produced an unknown environment");
                }
            }
        }

        self.progress
            .finish_with_message("Successfully obtained changelog object!");
        info!(
            range = %format!("{start}..{end}"),
            changes = changelog.total_changes(),
            "Built changelog"
        );

        Ok(changelog)
    }
}

/// One changelog line: `<title> [#<n>](<host>/<owner>/<repo>/pull/<n>)`.
///
/// Without a PR number there is nothing to link, so only the title is kept.
pub fn render_change_line(
    title: &str,
    pr_number: Option<&str>,
    host: &str,
    slug: &RepoSlug,
) -> String {
    match pr_number {
        Some(number) => format!(
            "{title} [#{number}]({host}/{owner}/{repo}/pull/{number})",
            owner = slug.owner,
            repo = slug.name,
        ),
        None => title.to_string(),
    }
}

/// Directories touched on `end_branch` since it left `main`.
///
/// Counts the first-parent commits in `main..end_branch`, then diffs
/// `HEAD~<count>` against `end_branch`.
pub fn changed_directories(
    repo: &Repository,
    main: &str,
    end_branch: &str,
) -> Result<Vec<String>, GitError> {
    let count = first_parent_count(repo, main, end_branch)?;
    let base = if count == 0 {
        "HEAD".to_string()
    } else {
        format!("HEAD~{count}")
    };

    let paths = changed_paths(repo, &base, end_branch)?;
    debug!(base = %base, branch = end_branch, files = paths.len(), "Diffed release branch");

    Ok(directories_of(paths))
}
