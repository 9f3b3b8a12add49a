//! Grouped changelog structure: environment -> change type -> entries.

use serde::Serialize;

/// All entries of one change type within an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogEntry {
    pub type_change: String,
    pub change_entries: Vec<String>,
}

/// One environment and its change-type groups, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentSection {
    pub environment: String,
    pub entries: Vec<ChangelogEntry>,
}

/// Ordered mapping from environment name to its change-type groups.
///
/// Every environment passed to [`ChangelogObject::new`] is always present,
/// even when empty. Groups keep insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogObject {
    sections: Vec<EnvironmentSection>,
}

impl ChangelogObject {
    pub fn new<I, S>(environments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sections = environments
            .into_iter()
            .map(|environment| EnvironmentSection {
                environment: environment.into(),
                entries: Vec::new(),
            })
            .collect();

        Self { sections }
    }

    /// The group for `type_change` in `environment`, appended if missing.
    ///
    /// Returns `None` for an environment this object was not built with.
    pub fn find_or_create(
        &mut self,
        environment: &str,
        type_change: &str,
    ) -> Option<&mut ChangelogEntry> {
        let section = self
            .sections
            .iter_mut()
            .find(|s| s.environment == environment)?;

        let index = match section
            .entries
            .iter()
            .position(|e| e.type_change == type_change)
        {
            Some(index) => index,
            None => {
                section.entries.push(ChangelogEntry {
                    type_change: type_change.to_string(),
                    change_entries: Vec::new(),
                });
                section.entries.len() - 1
            }
        };

        section.entries.get_mut(index)
    }

    /// Append a rendered line under `environment` / `type_change`.
    pub fn push_change(&mut self, environment: &str, type_change: &str, line: String) -> bool {
        match self.find_or_create(environment, type_change) {
            Some(entry) => {
                entry.change_entries.push(line);
                true
            }
            None => false,
        }
    }

    /// Groups recorded for an environment; empty for unknown environments.
    pub fn entries(&self, environment: &str) -> &[ChangelogEntry] {
        self.sections
            .iter()
            .find(|s| s.environment == environment)
            .map(|s| s.entries.as_slice())
            .unwrap_or_default()
    }

    pub fn sections(&self) -> &[EnvironmentSection] {
        &self.sections
    }

    /// Number of rendered lines per environment, in section order.
    pub fn count_by_environment(&self) -> Vec<(&str, usize)> {
        self.sections
            .iter()
            .map(|s| {
                let count = s.entries.iter().map(|e| e.change_entries.len()).sum();
                (s.environment.as_str(), count)
            })
            .collect()
    }

    pub fn total_changes(&self) -> usize {
        self.count_by_environment().iter().map(|(_, n)| n).sum()
    }
}
