//! git-divergence - rank branches by how far they have drifted from main.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use git2::Repository;

use relscope::divergence::{
    DEFAULT_BRANCH_FILTER, branch_filter, describe_repository, divergence_report, render_table,
};

/// Print a ranked divergence table for every branch ahead of main.
#[derive(Parser, Debug)]
#[command(name = "git-divergence")]
#[command(about = "Rank branches by divergence from the main branch")]
#[command(version)]
struct Cli {
    /// Regex for branches to leave out of the report
    #[arg(short, long, default_value = DEFAULT_BRANCH_FILTER)]
    pattern: String,

    /// Repository to inspect
    #[arg(long, env = "GIT_REPO_PATH", default_value = ".")]
    repo_path: PathBuf,

    /// Branch whose upstream the other branches are compared against
    #[arg(long, env = "GIT_AUTH_BRANCH", default_value = "master")]
    main_branch: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if cli.main_branch != "master" {
        println!(
            "GIT_AUTH_BRANCH has been set, using {} instead of master...",
            cli.main_branch
        );
    }

    let filter = branch_filter(&cli.pattern)
        .with_context(|| format!("Invalid branch filter pattern '{}'", cli.pattern))?;

    let repo = Repository::open(&cli.repo_path).with_context(|| {
        format!("Could not load repository at {} :(", cli.repo_path.display())
    })?;
    println!("Repo at {} successfully loaded.", cli.repo_path.display());
    print!("{}", describe_repository(&repo));

    let rows = divergence_report(&repo, &cli.main_branch, &filter, Utc::now())
        .context("Failed to compute divergence report")?;

    print!("{}", render_table(&rows));

    Ok(())
}
