//! gen-release-notes - CLI entry point.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use git2::Repository;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use relscope::changelog::render::generate_summary;
use relscope::changelog::{Aggregator, ReportParams, changed_directories, render_report, write_report};
use relscope::classify::classify_environment;
use relscope::config::{Config, EnvironmentLabel};
use relscope::git::{GitCli, origin_slug};
use relscope::github::{OctocrabFilesClient, get_github_token};

/// Generate release notes grouped by environment and change type.
#[derive(Parser, Debug)]
#[command(name = "gen-release-notes")]
#[command(about = "Generate release notes grouped by environment and change type")]
#[command(version)]
struct Cli {
    /// Tag or branch name of the starting point to check for changes
    last_release_tag_branch: String,

    /// Tag or branch name of the ending point to stop checking for changes
    next_release_tag_branch: String,

    /// Branch used to determine the changed directories for a release
    release_changes_branch: String,

    /// Current sprint number these notes are generated for
    sprint_number: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    // Both startup preconditions are fatal before any work begins.
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });
    let token = get_github_token().unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    let repo = Repository::discover(".")
        .context("Not a git repository. Run gen-release-notes from within a git repository.")?;
    let repo_dir = repo
        .workdir()
        .map(PathBuf::from)
        .context("Repository has no working directory")?;
    let slug = origin_slug(&repo).context("Could not determine repository owner and name")?;

    let changed_dirs =
        changed_directories(&repo, &config.main_branch_name, &cli.release_changes_branch)
            .context("Failed to compute changed directories")?;

    let client = OctocrabFilesClient::new(&token).context("Failed to create GitHub client")?;
    let source = GitCli::new(repo_dir);

    let spinner = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
    spinner.set_style(
        ProgressStyle::with_template("{msg} {spinner}")
            .context("Invalid spinner template")?
            .tick_chars("|/-\\ "),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));

    let changelog = Aggregator::new(&config, &slug, &source, &client)
        .with_progress(spinner)
        .build_changelog(&cli.last_release_tag_branch, &cli.next_release_tag_branch)
        .await
        .context("Failed to build changelog")?;

    let target_environment = match classify_environment(&config, &cli.next_release_tag_branch) {
        Some(EnvironmentLabel::Environment(env)) => Some(env),
        _ => None,
    };

    let params = ReportParams {
        last_release: &cli.last_release_tag_branch,
        next_release: &cli.next_release_tag_branch,
        changes_branch: &cli.release_changes_branch,
        sprint_number: &cli.sprint_number,
        target_environment,
    };

    let output = PathBuf::from(&config.output_file_name);
    let report = render_report(&params, &changed_dirs, &changelog);
    write_report(&output, &report).context("Failed to write release notes")?;

    println!("{}", generate_summary(&changelog, &output));

    Ok(())
}
