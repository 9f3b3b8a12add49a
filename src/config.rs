//! Release-notes configuration.
//!
//! The config file is JSON and is loaded once at startup. Every pattern is
//! compiled here so the rest of the crate only ever sees an immutable
//! [`Config`].

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use regex_lite::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV_VAR: &str = "CONFIG_LOC";

/// Config file name under the user's `~/.config` directory.
const DEFAULT_CONFIG_FILE: &str = ".gen_release.config";

/// Raw settings as they appear in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub main_branch_name: String,
    pub dev_env_name: String,
    pub stg_env_name: String,
    pub prd_env_name: String,
    pub misc_env_name: String,
    pub root_env_dir_name: String,
    pub repo_url: String,
    pub pr_body_prefix: String,
    pub output_file_name: String,
    pub weight_scale: HashMap<String, i64>,
    pub tag_regex: String,
    pub rc_regex: String,
    pub bug_fix_regex: Vec<String>,
}

/// What a release ref or URL resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentLabel {
    /// One of the configured environment names.
    Environment(String),
    /// The text points at the repository host.
    Url,
}

/// Immutable, validated configuration.
#[derive(Debug)]
pub struct Config {
    pub main_branch_name: String,
    pub dev_env_name: String,
    pub stg_env_name: String,
    pub prd_env_name: String,
    pub misc_env_name: String,
    pub repo_url: String,
    pub pr_body_prefix: String,
    pub output_file_name: String,
    /// Host part of `repo_url`, e.g. `github.com`.
    pub url_host: String,
    weight_scale: HashMap<String, i64>,
    root_marker: Regex,
    /// Anchored rules evaluated in order by `classify_environment`.
    environment_rules: Vec<(Regex, EnvironmentLabel)>,
    /// Unanchored patterns for dev, stg and prd, in that order.
    environment_patterns: Vec<(Regex, String)>,
    bug_fix_patterns: Vec<Regex>,
}

impl Config {
    /// Load the config from `CONFIG_LOC` or `~/.config/.gen_release.config`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;
        Self::from_path(&path)
    }

    /// Load the config from an explicit path.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
                env_var: CONFIG_PATH_ENV_VAR,
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "Loaded release notes config");
        Self::from_json(&content)
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(content).map_err(ConfigError::ParseFailed)?;
        Self::from_settings(settings)
    }

    /// Validate raw settings and compile every pattern.
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let names = [
            &settings.misc_env_name,
            &settings.dev_env_name,
            &settings.stg_env_name,
            &settings.prd_env_name,
        ];
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(ConfigError::DuplicateEnvironment((*name).clone()));
            }
        }

        let url_host = url_host(&settings.repo_url)
            .ok_or_else(|| ConfigError::InvalidRepoUrl(settings.repo_url.clone()))?;

        // Config authors write `RC/[0-9]+.[0-9]+` and mean literal dots.
        let tag_regex = compile("tag_regex", &anchored(&escape_dots(&settings.tag_regex)))?;
        let rc_regex = compile("rc_regex", &anchored(&escape_dots(&settings.rc_regex)))?;
        let url_regex = compile("repo_url", &format!("^{}", regex_lite::escape(&url_host)))?;

        let environment_rules = vec![
            (
                tag_regex,
                EnvironmentLabel::Environment(settings.prd_env_name.clone()),
            ),
            (
                rc_regex,
                EnvironmentLabel::Environment(settings.stg_env_name.clone()),
            ),
            (url_regex, EnvironmentLabel::Url),
        ];

        let environment_patterns = [
            ("dev_env_name", &settings.dev_env_name),
            ("stg_env_name", &settings.stg_env_name),
            ("prd_env_name", &settings.prd_env_name),
        ]
        .into_iter()
        .map(|(key, name)| -> Result<(Regex, String), ConfigError> {
            Ok((compile(key, name)?, name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

        let bug_fix_patterns = settings
            .bug_fix_regex
            .iter()
            .map(|pattern| compile("bug_fix_regex", pattern))
            .collect::<Result<Vec<_>, _>>()?;

        let root_marker = compile("root_env_dir_name", &settings.root_env_dir_name)?;

        Ok(Self {
            main_branch_name: settings.main_branch_name,
            dev_env_name: settings.dev_env_name,
            stg_env_name: settings.stg_env_name,
            prd_env_name: settings.prd_env_name,
            misc_env_name: settings.misc_env_name,
            repo_url: settings.repo_url,
            pr_body_prefix: settings.pr_body_prefix,
            output_file_name: settings.output_file_name,
            url_host,
            weight_scale: settings.weight_scale,
            root_marker,
            environment_rules,
            environment_patterns,
            bug_fix_patterns,
        })
    }

    /// All recognized environments in report order: misc, dev, stg, prd.
    pub fn environments(&self) -> [&str; 4] {
        [
            self.misc_env_name.as_str(),
            self.dev_env_name.as_str(),
            self.stg_env_name.as_str(),
            self.prd_env_name.as_str(),
        ]
    }

    /// Weight added for each repeat appearance of `type_change`. Defaults to 1.
    pub fn weight_for(&self, type_change: &str) -> i64 {
        self.weight_scale.get(type_change).copied().unwrap_or(1)
    }

    /// Whether a path lives under the root environment directory.
    pub fn is_root_env_path(&self, path: &str) -> bool {
        self.root_marker.is_match(path)
    }

    pub fn environment_rules(&self) -> &[(Regex, EnvironmentLabel)] {
        &self.environment_rules
    }

    pub fn environment_patterns(&self) -> &[(Regex, String)] {
        &self.environment_patterns
    }

    pub fn bug_fix_patterns(&self) -> &[Regex] {
        &self.bug_fix_patterns
    }
}

/// Resolve the config path from `CONFIG_LOC`, falling back to the home directory.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    dirs::home_dir()
        .map(|home| home.join(".config").join(DEFAULT_CONFIG_FILE))
        .ok_or(ConfigError::NoHomeDir(CONFIG_PATH_ENV_VAR))
}

/// Host of a repository URL: `https://github.com/acme/widgets` -> `github.com`.
fn url_host(repo_url: &str) -> Option<String> {
    let without_scheme = repo_url
        .split_once("://")
        .map_or(repo_url, |(_, rest)| rest);
    let host = without_scheme.split('/').next()?;
    (!host.is_empty()).then(|| host.to_string())
}

fn escape_dots(pattern: &str) -> String {
    pattern.replace('.', r"\.")
}

fn anchored(pattern: &str) -> String {
    format!("^(?:{pattern})")
}

fn compile(key: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        key: key.to_string(),
        pattern: pattern.to_string(),
        source,
    })
}

/// A config document used by unit tests across the crate.
#[cfg(test)]
pub(crate) const TEST_CONFIG_JSON: &str = r#"{
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

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config::from_json(TEST_CONFIG_JSON).expect("test config should parse")
}
