//! Markdown release notes.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::ReportError;

use super::object::ChangelogObject;

/// Values shown in the banner and closing sections.
#[derive(Debug, Clone)]
pub struct ReportParams<'a> {
    pub last_release: &'a str,
    pub next_release: &'a str,
    pub changes_branch: &'a str,
    pub sprint_number: &'a str,
    /// Environment the next release ref targets, if it looks like a tag or RC.
    pub target_environment: Option<String>,
}

/// Render the full release-notes document.
pub fn render_report(
    params: &ReportParams<'_>,
    changed_dirs: &[String],
    changelog: &ChangelogObject,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("# Release Notes: {}\n\n", params.next_release));
    out.push_str(&format!("- Sprint: {}\n", params.sprint_number));
    out.push_str(&format!("- Previous release: `{}`\n", params.last_release));
    out.push_str(&format!("- Release branch: `{}`\n", params.changes_branch));
    if let Some(env) = &params.target_environment {
        out.push_str(&format!("- Target environment: {env}\n"));
    }
    out.push_str("\n\n");

    out.push_str("## Changed Roots\n\n");
    for dir in changed_dirs {
        out.push_str(&format!("- `{dir}`\n"));
    }

    out.push_str("\n## Changes\n");
    for section in changelog.sections() {
        out.push_str(&format!("\n### {}\n\n", section.environment));
        for group in &section.entries {
            out.push_str(&format!("- {}\n", group.type_change));
            for line in &group.change_entries {
                out.push_str(&format!("    - {line}\n"));
            }
        }
    }

    out.push_str(&format!(
        "\n## Sign-off\n\nRelease `{}` is ready for review. Tracking anchor: `{}`\n",
        params.next_release,
        sanitize_branch_name(params.next_release)
    ));

    out
}

/// Branch name with `/` and `.` removed, e.g. `release/1.2` -> `release12`.
pub fn sanitize_branch_name(name: &str) -> String {
    name.chars().filter(|c| *c != '/' && *c != '.').collect()
}

/// Mode of the written report. Temp files start out owner-only.
#[cfg(unix)]
const REPORT_MODE: u32 = 0o644;

/// Write the report to `path`, replacing any existing file atomically.
pub fn write_report(path: &Path, content: &str) -> Result<(), ReportError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(ReportError::TempFileFailed)?;
    file.write_all(content.as_bytes())
        .map_err(ReportError::WriteFailed)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(REPORT_MODE))
            .map_err(ReportError::WriteFailed)?;
    }

    file.persist(path).map_err(|e| ReportError::PersistFailed {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}

/// Generate a summary message for the user.
pub fn generate_summary(changelog: &ChangelogObject, path: &Path) -> String {
    let total = changelog.total_changes();
    let details: Vec<String> = changelog
        .count_by_environment()
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(env, count)| format!("{env}: {count}"))
        .collect();

    let entry_word = if total == 1 { "entry" } else { "entries" };

    if details.is_empty() {
        format!(
            "Successfully generated changelog file at {} (no changes found)!",
            path.display()
        )
    } else {
        format!(
            "Successfully generated changelog file at {}! {} {} ({})",
            path.display(),
            total,
            entry_word,
            details.join(", ")
        )
    }
}
