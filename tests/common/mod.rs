//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use git2::{Oid, Repository, RepositoryInitOptions, Signature, Time};

use relscope::config::Config;
use relscope::error::GitHubError;
use relscope::github::{PrFile, PrFilesClient};

/// Config document shared by the integration tests.
pub const TEST_CONFIG_JSON: &str = r#"{
    "main_branch_name": "main",
    "dev_env_name": "dev",
    "stg_env_name": "stg",
    "prd_env_name": "prod",
    "misc_env_name": "general",
    "root_env_dir_name": "env/",
    "repo_url": "https://github.com/acme/widgets",
    "pr_body_prefix": "PR:",
    "output_file_name": "gen_output.md",
    "weight_scale": { "env": 2, "packer": 20, "terraform": 5 },
    "tag_regex": "[0-9]+.[0-9]+.[0-9]+$",
    "rc_regex": "RC/[0-9]+.[0-9]+$",
    "bug_fix_regex": ["^fix", "hotfix", "bug"]
}"#;

pub fn test_config() -> Config {
    Config::from_json(TEST_CONFIG_JSON).expect("test config should parse")
}

/// Build a changed-file entry.
pub fn pr_file(name: &str) -> PrFile {
    PrFile {
        filename: name.to_string(),
        status: Some("modified".to_string()),
        additions: 1,
        deletions: 0,
    }
}

/// In-memory [`PrFilesClient`] serving canned file lists by PR number.
///
/// PRs without canned files fail like a transport error.
#[derive(Default)]
pub struct FakeFilesClient {
    files: HashMap<String, Vec<PrFile>>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl FakeFilesClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files(mut self, pr_number: &str, paths: &[&str]) -> Self {
        self.files.insert(
            pr_number.to_string(),
            paths.iter().map(|p| pr_file(p)).collect(),
        );
        self
    }

    /// `(pr_number, page)` of every request made so far.
    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }
}

#[async_trait]
impl PrFilesClient for FakeFilesClient {
    async fn fetch_page(
        &self,
        _owner: &str,
        _repo: &str,
        pr_number: &str,
        page: u32,
    ) -> Result<Vec<PrFile>, GitHubError> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push((pr_number.to_string(), page));

        match self.files.get(pr_number) {
            Some(files) => {
                let start = (page as usize - 1) * 100;
                Ok(files.iter().skip(start).take(100).cloned().collect())
            }
            None => Err(GitHubError::Timeout {
                pr_number: pr_number.to_string(),
                millis: 2000,
            }),
        }
    }
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository whose first branch is `main`.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &opts).expect("Failed to init git repo");
        Self { dir, repo }
    }

    /// Create a commit touching `files` on the current branch, authored at `time`
    /// (unix seconds) or now.
    pub fn commit_files(&self, message: &str, files: &[(&str, &str)], time: Option<i64>) -> Oid {
        let sig = match time {
            Some(seconds) => Signature::new("Test User", "test@example.com", &Time::new(seconds, 0)),
            None => Signature::now("Test User", "test@example.com"),
        }
        .expect("Failed to create signature");

        let mut index = self.repo.index().expect("Failed to get index");
        for (path, content) in files {
            let full_path = self.dir.path().join(path);
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent).expect("Failed to create directories");
            }
            std::fs::write(&full_path, content).expect("Failed to write test file");
            index.add_path(Path::new(path)).expect("Failed to add file");
        }
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create a commit with the given message. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        let content = format!(
            "{}\n{}",
            message,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        );
        self.commit_files(message, &[("test.txt", &content)], None)
    }

    /// Create a lightweight tag pointing to the given OID.
    pub fn tag_lightweight(&self, name: &str, oid: Oid) {
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo
            .tag_lightweight(name, &obj, false)
            .expect("Failed to create lightweight tag");
    }

    /// Create a branch pointing to the given OID.
    pub fn branch(&self, name: &str, oid: Oid) {
        let commit = self.repo.find_commit(oid).expect("Failed to find commit");
        self.repo
            .branch(name, &commit, false)
            .expect("Failed to create branch");
    }

    /// Create a branch at HEAD and make it the current branch.
    pub fn checkout_new_branch(&self, name: &str) {
        let head = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("Failed to resolve HEAD");
        self.branch(name, head.id());
        self.switch_to(name);
    }

    /// Point HEAD at an existing local branch and reset the index to it.
    pub fn switch_to(&self, name: &str) {
        self.repo
            .set_head(&format!("refs/heads/{name}"))
            .expect("Failed to set HEAD");
        self.repo
            .checkout_head(Some(git2::build::CheckoutBuilder::new().force()))
            .expect("Failed to check out HEAD");
    }

    /// Add an `origin` remote with a tracking ref for `branch` at its current tip,
    /// and make it the branch's upstream.
    pub fn track_origin(&self, url: &str, branch: &str) {
        if self.repo.find_remote("origin").is_err() {
            self.repo.remote("origin", url).expect("Failed to add remote");
        }
        let tip = self
            .repo
            .revparse_single(branch)
            .and_then(|o| o.peel_to_commit())
            .expect("Failed to resolve branch");
        self.repo
            .reference(
                &format!("refs/remotes/origin/{branch}"),
                tip.id(),
                true,
                "test upstream",
            )
            .expect("Failed to create remote-tracking ref");
        let mut local = self
            .repo
            .find_branch(branch, git2::BranchType::Local)
            .expect("Failed to find branch");
        local
            .set_upstream(Some(&format!("origin/{branch}")))
            .expect("Failed to set upstream");
    }
}
