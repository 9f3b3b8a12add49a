//! Text output for the divergence report.

use git2::Repository;

use super::report::DivergenceRow;

/// Fixed-width table; the branch column is as wide as the longest branch name.
pub fn render_table(rows: &[DivergenceRow]) -> String {
    let width = rows.iter().map(|r| r.branch.len()).max().unwrap_or(0);
    let mut out = format!(
        "{:<width$} {:^8} {:^8} {:^4} {:<4} {:<8}\n",
        "Branch", "Behind", "Ahead", "DSB", "DSLC", "DIVERGENCE"
    );

    for row in rows {
        out.push_str(&format!(
            "{:<width$} {:^8} {:^8} {:^4} {:>4} {:>8}\n",
            row.branch,
            row.behind,
            row.ahead,
            row.days_since_branch_point,
            row.days_since_last_commit,
            row.divergence_score
        ));
    }

    out
}

/// Repository description and remotes, printed ahead of the table.
pub fn describe_repository(repo: &Repository) -> String {
    let description = std::fs::read_to_string(repo.path().join("description"))
        .map(|d| d.trim().to_string())
        .unwrap_or_default();

    let mut out = format!("Repo description: {description}\n");

    if let Ok(remotes) = repo.remotes() {
        for name in remotes.iter().flatten() {
            let url = repo
                .find_remote(name)
                .ok()
                .and_then(|r| r.url().map(str::to_string))
                .unwrap_or_default();
            out.push_str(&format!("Remote named \"{name}\" with URL \"{url}\"\n"));
        }
    }

    out
}
