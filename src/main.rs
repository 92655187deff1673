//! Command-line entry point for qualdiff.
//! Records analysis snapshots and creates comparisons and explanations.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use qualdiff::application::compare::ComparisonService;
use qualdiff::application::explain::ExplanationService;
use qualdiff::application::ingest::SnapshotService;
use qualdiff::domain::RawIssue;
use qualdiff::infra::agent::NoopAgent;
use qualdiff::infra::db::Database;

#[derive(Parser)]
#[command(name = "qualdiff", about = "Deterministic code-quality comparison engine")]
struct Cli {
    /// Database file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record the analysis snapshot for a version from a JSON issue list
    Record {
        version_id: String,
        /// JSON file containing the issue list delivered by the analyzer
        #[arg(value_name = "FILE")]
        issues: PathBuf,
    },
    /// Create (or fetch) the comparison between two versions
    Compare {
        from_version: String,
        to_version: String,
    },
    /// Print the explanation for the comparison between two versions
    Explain {
        from_version: String,
        to_version: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let db = match cli.db {
        Some(path) => Database::open_at(path)?,
        None => Database::open()?,
    };

    match cli.command {
        Command::Record { version_id, issues } => {
            let text = std::fs::read_to_string(&issues)
                .with_context(|| format!("reading {}", issues.display()))?;
            let raw: Vec<RawIssue> =
                serde_json::from_str(&text).context("parsing issue list JSON")?;
            let snapshot =
                SnapshotService::new(db.snapshot_repo()).record_snapshot(&version_id, &raw)?;
            println!(
                "recorded snapshot for version {} ({} issue(s))",
                snapshot.version_id,
                snapshot.issues.len()
            );
        }
        Command::Compare {
            from_version,
            to_version,
        } => {
            let service = ComparisonService::new(db.snapshot_repo(), db.comparison_repo());
            let comparison = service.create_or_fetch(&from_version, &to_version)?;
            println!("{}", serde_json::to_string_pretty(&comparison)?);
        }
        Command::Explain {
            from_version,
            to_version,
        } => {
            let comparisons = ComparisonService::new(db.snapshot_repo(), db.comparison_repo());
            let comparison = comparisons.create_or_fetch(&from_version, &to_version)?;
            let explanations = ExplanationService::new(
                db.comparison_repo(),
                db.explanation_repo(),
                Arc::new(NoopAgent),
            );
            let explanation = qualdiff::block_on(explanations.explain(&comparison.id))?;
            println!("{}", explanation.content);
        }
    }

    Ok(())
}
