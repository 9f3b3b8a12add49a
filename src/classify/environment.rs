//! Environment detection for release refs and changed paths.

use std::collections::BTreeSet;

use crate::config::{Config, EnvironmentLabel};

/// Resolve a ref or URL to an environment.
///
/// Rules are anchored at the start of `text` and tried in order: release tag
/// (production), release-candidate branch (staging), repository host (`Url`).
pub fn classify_environment(config: &Config, text: &str) -> Option<EnvironmentLabel> {
    config
        .environment_rules()
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .map(|(_, label)| label.clone())
}

/// Record the environment a changed path belongs to.
///
/// The first concrete environment name found anywhere in `path` is added and
/// the catch-all is dropped. A path with no concrete environment only adds
/// the catch-all while no concrete environment has been recorded yet.
/// Returns whether the set was touched.
pub fn add_environment(config: &Config, envs: &mut BTreeSet<String>, path: &str) -> bool {
    let misc = &config.misc_env_name;

    if let Some((_, name)) = config
        .environment_patterns()
        .iter()
        .find(|(pattern, _)| pattern.is_match(path))
    {
        envs.remove(misc);
        envs.insert(name.clone());
        return true;
    }

    let has_concrete = envs.iter().any(|env| {
        env != misc
            && config
                .environment_patterns()
                .iter()
                .any(|(_, name)| name == env)
    });
    if !has_concrete {
        envs.insert(misc.clone());
        return true;
    }

    false
}
