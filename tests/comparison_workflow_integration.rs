//! Integration tests for the full comparison workflow
//! These tests verify that ingestion, comparison, and persistence work together correctly

use qualdiff::application::compare::ComparisonService;
use qualdiff::application::ingest::SnapshotService;
use qualdiff::domain::{ChangeType, ComparisonError, IssueCode, RawIssue, Severity};
use qualdiff::infra::db::Database;

fn raw_issue(code: &str, severity: &str, complexity: &str) -> RawIssue {
    RawIssue {
        issue_code: code.to_string(),
        severity: severity.to_string(),
        complexity: complexity.to_string(),
        function_name: None,
        start_line: None,
        end_line: None,
        snippet: None,
    }
}

fn raw_issue_in(
    code: &str,
    severity: &str,
    complexity: &str,
    function_name: &str,
    start_line: u32,
) -> RawIssue {
    RawIssue {
        function_name: Some(function_name.to_string()),
        start_line: Some(start_line),
        ..raw_issue(code, severity, complexity)
    }
}

#[test]
fn test_full_comparison_workflow() -> anyhow::Result<()> {
    let db = Database::open_in_memory()?;
    let snapshots = SnapshotService::new(db.snapshot_repo());

    // First upload: two real issues plus one the analyzer mislabeled.
    snapshots.record_snapshot(
        "v1",
        &[
            raw_issue_in("NESTED_LOOP", "high", "O_n2", "load_accounts", 40),
            raw_issue_in("LONG_FUNCTION", "medium", "O_n", "render_page", 200),
            raw_issue("NESTED_LOOP", "catastrophic", "O_n2"),
        ],
    )?;

    // Second upload: the nested loop got better, a magic number appeared.
    snapshots.record_snapshot(
        "v2",
        &[
            raw_issue_in("NESTED_LOOP", "low", "O_n", "load_accounts", 40),
            raw_issue_in("LONG_FUNCTION", "medium", "O_n", "render_page", 205),
            raw_issue("MAGIC_NUMBER", "low", "O_1"),
        ],
    )?;

    // The mislabeled issue was excluded at ingestion.
    assert_eq!(snapshots.fetch("v1")?.issues.len(), 2);

    let comparisons = ComparisonService::new(db.snapshot_repo(), db.comparison_repo());
    let comparison = comparisons.create_or_fetch(&"v1".to_string(), &"v2".to_string())?;

    assert_eq!(comparison.entries.len(), 3);
    let verdict_for = |code: IssueCode| {
        comparison
            .entries
            .iter()
            .find(|e| e.issue_code == code)
            .map(|e| e.change_type)
    };
    assert_eq!(verdict_for(IssueCode::NestedLoop), Some(ChangeType::Improved));
    assert_eq!(
        verdict_for(IssueCode::LongFunction),
        Some(ChangeType::Unchanged)
    );
    assert_eq!(
        verdict_for(IssueCode::MagicNumber),
        Some(ChangeType::Worsened)
    );

    let nested = comparison
        .entries
        .iter()
        .find(|e| e.issue_code == IssueCode::NestedLoop)
        .unwrap();
    assert_eq!(nested.before_severity, Some(Severity::High));
    assert_eq!(nested.after_severity, Some(Severity::Low));

    Ok(())
}

#[test]
fn test_second_create_returns_stored_record() -> anyhow::Result<()> {
    let db = Database::open_in_memory()?;
    let snapshots = SnapshotService::new(db.snapshot_repo());
    snapshots.record_snapshot("v1", &[raw_issue("DUPLICATE_CODE", "medium", "O_n")])?;
    snapshots.record_snapshot("v2", &[])?;

    let comparisons = ComparisonService::new(db.snapshot_repo(), db.comparison_repo());
    let first = comparisons.create_or_fetch(&"v1".to_string(), &"v2".to_string())?;
    let second = comparisons.create_or_fetch(&"v1".to_string(), &"v2".to_string())?;

    assert_eq!(first.id, second.id);
    assert_eq!(first.created_at, second.created_at);
    assert_eq!(first.entries, second.entries);

    // Fetch from a fresh repository handle sees the same single record.
    let fetched = comparisons.fetch(&"v1".to_string(), &"v2".to_string())?;
    assert_eq!(fetched.id, first.id);
    Ok(())
}

#[test]
fn test_preconditions_fail_fast() -> anyhow::Result<()> {
    let db = Database::open_in_memory()?;
    let snapshots = SnapshotService::new(db.snapshot_repo());
    snapshots.record_snapshot("v1", &[])?;

    let comparisons = ComparisonService::new(db.snapshot_repo(), db.comparison_repo());

    let same = comparisons.create_or_fetch(&"v1".to_string(), &"v1".to_string());
    assert!(matches!(same, Err(ComparisonError::SameVersion(_))));

    let missing = comparisons.create_or_fetch(&"v1".to_string(), &"v9".to_string());
    assert!(matches!(missing, Err(ComparisonError::MissingSnapshot(_))));

    // Neither failed attempt persisted anything.
    assert!(matches!(
        comparisons.fetch(&"v1".to_string(), &"v9".to_string()),
        Err(ComparisonError::NotFound { .. })
    ));
    Ok(())
}

#[test]
fn test_workflow_on_disk_database() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("qualdiff.sqlite");

    {
        let db = Database::open_at(path.clone())?;
        let snapshots = SnapshotService::new(db.snapshot_repo());
        snapshots.record_snapshot("v1", &[raw_issue("UNUSED_VARIABLE", "low", "O_1")])?;
        snapshots.record_snapshot("v2", &[])?;
        ComparisonService::new(db.snapshot_repo(), db.comparison_repo())
            .create_or_fetch(&"v1".to_string(), &"v2".to_string())?;
    }

    // Reopen: the comparison survives and is served, not recomputed anew.
    let db = Database::open_at(path)?;
    let comparisons = ComparisonService::new(db.snapshot_repo(), db.comparison_repo());
    let stored = comparisons.fetch(&"v1".to_string(), &"v2".to_string())?;
    assert_eq!(stored.entries.len(), 1);
    assert_eq!(stored.entries[0].change_type, ChangeType::Improved);
    Ok(())
}
