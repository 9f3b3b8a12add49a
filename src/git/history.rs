//! Commit-range traversal and branch diffs.
//!
//! The cherry-pick aware log shells out to the system `git` binary, since
//! libgit2 has no patch-id equivalence. Everything else uses git2-rs.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use git2::{Oid, Repository, Sort};
use tracing::debug;

use crate::error::GitError;

/// Source of the one-line-per-entry commit log for a range.
pub trait CommitSource {
    /// Lines of `git log <start>..<end> --cherry-pick --first-parent
    /// --format="%s %b"`, with empty lines removed.
    fn range_log(&self, start: &str, end: &str) -> Result<Vec<String>, GitError>;
}

/// [`CommitSource`] that runs the system `git` binary in a working tree.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_dir: PathBuf,
}

impl GitCli {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }
}

impl CommitSource for GitCli {
    fn range_log(&self, start: &str, end: &str) -> Result<Vec<String>, GitError> {
        let range = format!("{start}..{end}");
        let stdout = run_git(
            &self.repo_dir,
            &[
                "log",
                &range,
                "--cherry-pick",
                "--first-parent",
                "--format=%s %b",
            ],
            "log",
        )?;

        let lines: Vec<String> = stdout
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        debug!(range = %range, lines = lines.len(), "Read commit range log");
        Ok(lines)
    }
}

/// Run a git command and return its stdout or a descriptive error.
fn run_git(repo_dir: &Path, args: &[&str], operation: &str) -> Result<String, GitError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_dir)
        .args(args)
        .output()
        .map_err(|source| GitError::SpawnFailed {
            operation: operation.to_string(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitError::CommandFailed {
            operation: operation.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Resolve a reference (branch, tag, revspec or commit hash) to a commit OID.
pub fn resolve_commit(repo: &Repository, reference: &str) -> Result<Oid, GitError> {
    let obj = repo
        .revparse_single(reference)
        .map_err(|e| GitError::ReferenceNotFound(reference.to_string(), e))?;

    Ok(obj.peel_to_commit().map_err(GitError::ParseCommit)?.id())
}

/// Number of first-parent commits on `branch` that are not on `main`.
pub fn first_parent_count(repo: &Repository, main: &str, branch: &str) -> Result<usize, GitError> {
    let main_oid = resolve_commit(repo, main)?;
    let branch_oid = resolve_commit(repo, branch)?;

    let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;
    revwalk.simplify_first_parent().map_err(GitError::RevwalkError)?;
    revwalk.push(branch_oid).map_err(GitError::RevwalkError)?;
    revwalk.hide(main_oid).map_err(GitError::RevwalkError)?;

    let mut count = 0;
    for oid in revwalk {
        oid.map_err(GitError::RevwalkError)?;
        count += 1;
    }

    Ok(count)
}

/// Paths that differ between two revisions, in diff order.
pub fn changed_paths(repo: &Repository, from: &str, to: &str) -> Result<Vec<String>, GitError> {
    let from_tree = repo
        .find_commit(resolve_commit(repo, from)?)
        .and_then(|c| c.tree())
        .map_err(GitError::ParseCommit)?;
    let to_tree = repo
        .find_commit(resolve_commit(repo, to)?)
        .and_then(|c| c.tree())
        .map_err(GitError::ParseCommit)?;

    let diff = repo
        .diff_tree_to_tree(Some(&from_tree), Some(&to_tree), None)
        .map_err(GitError::DiffFailed)?;

    let paths = diff
        .deltas()
        .filter_map(|delta| {
            delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .and_then(Path::to_str)
                .map(str::to_string)
        })
        .collect();

    Ok(paths)
}

/// Commits reachable from `tip` but not from `hidden`, oldest first.
pub fn commits_not_in(repo: &Repository, tip: Oid, hidden: Oid) -> Result<Vec<Oid>, GitError> {
    let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;
    revwalk
        .set_sorting(Sort::TOPOLOGICAL | Sort::TIME | Sort::REVERSE)
        .map_err(GitError::RevwalkError)?;
    revwalk.push(tip).map_err(GitError::RevwalkError)?;
    revwalk.hide(hidden).map_err(GitError::RevwalkError)?;

    revwalk
        .map(|oid| oid.map_err(GitError::RevwalkError))
        .collect()
}

/// Directory prefix of each path (through the final `/`), or the bare file
/// name for top-level files. Deduplicated and sorted.
pub fn directories_of<I, S>(paths: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    paths
        .into_iter()
        .map(|path| {
            let path = path.as_ref();
            match path.rfind('/') {
                Some(index) => path[..=index].to_string(),
                None => path.to_string(),
            }
        })
        .filter(|dir| !dir.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
