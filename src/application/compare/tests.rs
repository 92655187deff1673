use super::*;
use crate::application::ingest::SnapshotService;
use crate::domain::{ChangeType, Complexity, IssueCode, RawIssue, Severity};
use crate::infra::db::Database;

fn issue(code: IssueCode, severity: Severity, complexity: Complexity) -> IssueOccurrence {
    IssueOccurrence {
        issue_code: code,
        severity,
        complexity,
        function_name: None,
        start_line: None,
        end_line: None,
        snippet: None,
    }
}

fn raw(code: &str, severity: &str, complexity: &str) -> RawIssue {
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

#[test]
fn test_scenario_resolved_issue() {
    let before = vec![issue(IssueCode::NestedLoop, Severity::High, Complexity::ON2)];
    let after = vec![];

    let entries = compute_entries(&before, &after);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].change_type, ChangeType::Improved);
    assert_eq!(entries[0].after_severity, None);
    assert_eq!(entries[0].after_complexity, None);
}

#[test]
fn test_scenario_new_issue() {
    let before = vec![];
    let after = vec![issue(IssueCode::MagicNumber, Severity::Low, Complexity::O1)];

    let entries = compute_entries(&before, &after);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].change_type, ChangeType::Worsened);
    assert_eq!(entries[0].before_severity, None);
    assert_eq!(entries[0].before_complexity, None);
}

#[test]
fn test_scenario_identical_issue_unchanged() {
    let before = vec![issue(
        IssueCode::UnusedVariable,
        Severity::Medium,
        Complexity::O1,
    )];
    let after = vec![issue(
        IssueCode::UnusedVariable,
        Severity::Medium,
        Complexity::O1,
    )];

    let entries = compute_entries(&before, &after);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].change_type, ChangeType::Unchanged);
}

#[test]
fn test_scenario_severity_dominates_complexity() {
    let before = vec![issue(IssueCode::LongFunction, Severity::High, Complexity::ON)];
    let after = vec![issue(IssueCode::LongFunction, Severity::Low, Complexity::ON2)];

    let entries = compute_entries(&before, &after);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].change_type, ChangeType::Improved);
}

#[test]
fn test_coverage_one_entry_per_distinct_key() {
    let before = vec![
        issue(IssueCode::NestedLoop, Severity::High, Complexity::ON2),
        issue(IssueCode::MagicNumber, Severity::Low, Complexity::O1),
    ];
    let after = vec![
        issue(IssueCode::MagicNumber, Severity::Low, Complexity::O1),
        issue(IssueCode::DuplicateCode, Severity::Medium, Complexity::ON),
    ];

    let entries = compute_entries(&before, &after);
    // Three distinct keys across both lists, no duplicates.
    assert_eq!(entries.len(), 3);
    let mut codes: Vec<String> = entries.iter().map(|e| e.issue_code.to_string()).collect();
    codes.sort();
    assert_eq!(codes, ["DUPLICATE_CODE", "MAGIC_NUMBER", "NESTED_LOOP"]);
}

#[test]
fn test_compute_entries_idempotent() {
    let before = vec![
        issue(IssueCode::NestedLoop, Severity::High, Complexity::ON2),
        issue(IssueCode::NestedLoop, Severity::Low, Complexity::ON),
        issue(IssueCode::UnusedVariable, Severity::Medium, Complexity::O1),
    ];
    let after = vec![
        issue(IssueCode::NestedLoop, Severity::Medium, Complexity::ON),
        issue(IssueCode::MagicNumber, Severity::Low, Complexity::O1),
    ];

    assert_eq!(compute_entries(&before, &after), compute_entries(&before, &after));
}

#[test]
fn test_same_version_rejected() -> anyhow::Result<()> {
    let db = Database::open_in_memory()?;
    let service = ComparisonService::new(db.snapshot_repo(), db.comparison_repo());

    let result = service.create_or_fetch(&"v1".to_string(), &"v1".to_string());
    assert!(matches!(result, Err(ComparisonError::SameVersion(_))));
    Ok(())
}

#[test]
fn test_missing_snapshot_rejected() -> anyhow::Result<()> {
    let db = Database::open_in_memory()?;
    let snapshots = SnapshotService::new(db.snapshot_repo());
    snapshots.record_snapshot("v1", &[raw("NESTED_LOOP", "high", "O_n2")])?;

    let service = ComparisonService::new(db.snapshot_repo(), db.comparison_repo());
    let result = service.create_or_fetch(&"v1".to_string(), &"v2".to_string());
    assert!(
        matches!(result, Err(ComparisonError::MissingSnapshot(ref v)) if v == "v2"),
        "expected MissingSnapshot for v2"
    );
    Ok(())
}

#[test]
fn test_create_or_fetch_is_idempotent() -> anyhow::Result<()> {
    let db = Database::open_in_memory()?;
    let snapshots = SnapshotService::new(db.snapshot_repo());
    snapshots.record_snapshot("v1", &[raw("NESTED_LOOP", "high", "O_n2")])?;
    snapshots.record_snapshot("v2", &[raw("NESTED_LOOP", "low", "O_n")])?;

    let service = ComparisonService::new(db.snapshot_repo(), db.comparison_repo());
    let first = service.create_or_fetch(&"v1".to_string(), &"v2".to_string())?;
    let second = service.create_or_fetch(&"v1".to_string(), &"v2".to_string())?;

    assert_eq!(first.id, second.id);
    assert_eq!(first.entries, second.entries);
    Ok(())
}

#[test]
fn test_opposite_order_is_a_distinct_comparison() -> anyhow::Result<()> {
    let db = Database::open_in_memory()?;
    let snapshots = SnapshotService::new(db.snapshot_repo());
    snapshots.record_snapshot("v1", &[raw("MAGIC_NUMBER", "low", "O_1")])?;
    snapshots.record_snapshot("v2", &[])?;

    let service = ComparisonService::new(db.snapshot_repo(), db.comparison_repo());
    let forward = service.create_or_fetch(&"v1".to_string(), &"v2".to_string())?;
    let backward = service.create_or_fetch(&"v2".to_string(), &"v1".to_string())?;

    assert_ne!(forward.id, backward.id);
    assert_eq!(forward.entries[0].change_type, ChangeType::Improved);
    assert_eq!(backward.entries[0].change_type, ChangeType::Worsened);
    Ok(())
}

#[test]
fn test_fetch_missing_comparison() -> anyhow::Result<()> {
    let db = Database::open_in_memory()?;
    let service = ComparisonService::new(db.snapshot_repo(), db.comparison_repo());

    let result = service.fetch(&"v1".to_string(), &"v2".to_string());
    assert!(matches!(result, Err(ComparisonError::NotFound { .. })));
    Ok(())
}
