//! Per-branch divergence from the main branch.

use chrono::{DateTime, TimeZone, Utc};
use git2::{Commit, Oid, Repository};
use regex_lite::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::GitError;
use crate::git::history::{commits_not_in, resolve_commit};

/// Refs skipped by default: release-candidate branches and four-part version tags.
pub const DEFAULT_BRANCH_FILTER: &str = r"(.*RC/.*)|([0-9]+\.[0-9]+\.[0-9]+\.[0-9]+)";

/// Divergence figures for one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DivergenceRow {
    pub branch: String,
    pub ahead: usize,
    pub behind: usize,
    pub days_since_last_commit: i64,
    pub days_since_branch_point: i64,
    pub divergence_score: i64,
}

/// Grows for branches that split off long ago and have gone quiet since.
pub fn divergence_score(days_since_branch_point: i64, days_since_last_commit: i64) -> i64 {
    days_since_branch_point * (days_since_branch_point - days_since_last_commit)
}

/// Compile a branch exclusion pattern, anchored at the start of the name.
pub fn branch_filter(pattern: &str) -> Result<Regex, regex_lite::Error> {
    Regex::new(&format!("^(?:{pattern})"))
}

/// Drop branches with nothing ahead of main and order by score, highest first.
pub fn rank_rows(rows: impl IntoIterator<Item = DivergenceRow>) -> Vec<DivergenceRow> {
    let mut rows: Vec<DivergenceRow> = rows.into_iter().filter(|row| row.ahead > 0).collect();
    rows.sort_by(|a, b| b.divergence_score.cmp(&a.divergence_score));
    rows
}

/// Build the ranked report for every ref not excluded by `filter`.
///
/// Ahead/behind counts are taken against `<main>@{u}`; when main has no
/// upstream the local main branch is used instead.
pub fn divergence_report(
    repo: &Repository,
    main: &str,
    filter: &Regex,
    now: DateTime<Utc>,
) -> Result<Vec<DivergenceRow>, GitError> {
    let main_oid = resolve_commit(repo, main)?;
    let upstream_ref = format!("{main}@{{u}}");
    let upstream_oid = match resolve_commit(repo, &upstream_ref) {
        Ok(oid) => oid,
        Err(e) => {
            warn!("{}; comparing against local {} instead", e, main);
            main_oid
        }
    };

    let mut rows = Vec::new();
    let references = repo
        .references()
        .map_err(|e| GitError::ReferenceNotFound("refs/*".to_string(), e))?;

    for reference in references {
        let reference = match reference {
            Ok(reference) => reference,
            Err(e) => {
                warn!("Skipping unreadable reference: {}", e);
                continue;
            }
        };

        let Some(name) = reference.shorthand().map(str::to_string) else {
            continue;
        };
        if filter.is_match(&name) {
            debug!(branch = %name, "Excluded by branch filter");
            continue;
        }

        let tip = match reference.peel_to_commit() {
            Ok(commit) => commit,
            Err(e) => {
                debug!(branch = %name, error = %e, "Reference does not point at a commit");
                continue;
            }
        };

        if let Some(row) = divergence_by_branch(repo, &name, &tip, main_oid, upstream_oid, now)? {
            rows.push(row);
        }
    }

    Ok(rank_rows(rows))
}

/// Divergence of a single branch tip, or `None` when it is not ahead.
fn divergence_by_branch(
    repo: &Repository,
    name: &str,
    tip: &Commit<'_>,
    main_oid: Oid,
    upstream_oid: Oid,
    now: DateTime<Utc>,
) -> Result<Option<DivergenceRow>, GitError> {
    let (ahead, behind) = repo
        .graph_ahead_behind(tip.id(), upstream_oid)
        .map_err(GitError::RevwalkError)?;

    if ahead == 0 {
        return Ok(None);
    }

    let days_since_last_commit = days_between(authored_at(tip), now);

    // Earliest commit on the branch that main cannot reach.
    let branch_point = match commits_not_in(repo, tip.id(), main_oid)?.first() {
        Some(oid) => repo.find_commit(*oid).map_err(GitError::ParseCommit)?,
        None => tip.clone(),
    };
    let days_since_branch_point = days_between(authored_at(&branch_point), now);

    Ok(Some(DivergenceRow {
        branch: name.to_string(),
        ahead,
        behind,
        days_since_last_commit,
        days_since_branch_point,
        divergence_score: divergence_score(days_since_branch_point, days_since_last_commit),
    }))
}

fn authored_at(commit: &Commit<'_>) -> DateTime<Utc> {
    Utc.timestamp_opt(commit.author().when().seconds(), 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn days_between(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - then).num_days()
}
