//! Snapshot ingestion: the trust boundary with the analysis agent.
//!
//! The agent is non-deterministic and untrusted; every enum-valued field
//! of a delivered issue is validated against its closed domain here. An
//! out-of-domain issue is excluded and logged rather than failing the
//! whole snapshot, since one agent anomaly should not block the rest.

use crate::domain::{AnalysisSnapshot, IssueOccurrence, RawIssue, SnapshotError};
use crate::infra::db::repository::SnapshotRepository;

/// Validate one raw issue against the closed enum domains.
pub fn validate_issue(raw: &RawIssue) -> Result<IssueOccurrence, String> {
    let issue_code = raw.issue_code.parse()?;
    let severity = raw.severity.parse()?;
    let complexity = raw.complexity.parse()?;
    Ok(IssueOccurrence {
        issue_code,
        severity,
        complexity,
        function_name: raw.function_name.clone(),
        start_line: raw.start_line,
        end_line: raw.end_line,
        snippet: raw.snippet.clone(),
    })
}

/// Records analysis snapshots as immutable, append-only history.
pub struct SnapshotService {
    snapshots: SnapshotRepository,
}

impl SnapshotService {
    pub fn new(snapshots: SnapshotRepository) -> Self {
        Self { snapshots }
    }

    /// Validate and persist the issue list delivered for a version.
    ///
    /// A version's snapshot is created exactly once; recording a version
    /// that already has one is rejected, never overwritten. Issues that
    /// fail validation are excluded and logged; the remainder is stored
    /// in delivery order.
    pub fn record_snapshot(
        &self,
        version_id: &str,
        raw_issues: &[RawIssue],
    ) -> Result<AnalysisSnapshot, SnapshotError> {
        if self.snapshots.exists(version_id)? {
            return Err(SnapshotError::AlreadyRecorded(version_id.to_string()));
        }

        let mut issues = Vec::with_capacity(raw_issues.len());
        for (index, raw) in raw_issues.iter().enumerate() {
            match validate_issue(raw) {
                Ok(issue) => issues.push(issue),
                Err(reason) => {
                    log::warn!(
                        "excluding issue {index} from snapshot for version {version_id}: {reason}"
                    );
                }
            }
        }

        let snapshot = AnalysisSnapshot {
            version_id: version_id.to_string(),
            issues,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        self.snapshots.save(&snapshot)?;
        Ok(snapshot)
    }

    /// Fetch the stored snapshot for a version.
    pub fn fetch(&self, version_id: &str) -> Result<AnalysisSnapshot, SnapshotError> {
        self.snapshots
            .find_by_version(version_id)?
            .ok_or_else(|| SnapshotError::NotFound(version_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Complexity, IssueCode, Severity};
    use crate::infra::db::Database;

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
    fn test_validate_issue_accepts_in_domain_values() {
        let issue = validate_issue(&raw("NESTED_LOOP", "high", "O_n2")).unwrap();
        assert_eq!(issue.issue_code, IssueCode::NestedLoop);
        assert_eq!(issue.severity, Severity::High);
        assert_eq!(issue.complexity, Complexity::ON2);
    }

    #[test]
    fn test_validate_issue_rejects_unknown_values() {
        assert!(validate_issue(&raw("BAD_CODE", "high", "O_1")).is_err());
        assert!(validate_issue(&raw("NESTED_LOOP", "fatal", "O_1")).is_err());
        assert!(validate_issue(&raw("NESTED_LOOP", "high", "O_exp")).is_err());
    }

    #[test]
    fn test_record_excludes_invalid_issues() -> anyhow::Result<()> {
        let db = Database::open_in_memory()?;
        let service = SnapshotService::new(db.snapshot_repo());

        let snapshot = service.record_snapshot(
            "v1",
            &[
                raw("MAGIC_NUMBER", "low", "O_1"),
                raw("MAGIC_NUMBER", "unknown", "O_1"),
                raw("LONG_FUNCTION", "medium", "O_n"),
            ],
        )?;

        assert_eq!(snapshot.issues.len(), 2);
        assert_eq!(snapshot.issues[0].issue_code, IssueCode::MagicNumber);
        assert_eq!(snapshot.issues[1].issue_code, IssueCode::LongFunction);
        Ok(())
    }

    #[test]
    fn test_record_twice_rejected() -> anyhow::Result<()> {
        let db = Database::open_in_memory()?;
        let service = SnapshotService::new(db.snapshot_repo());

        service.record_snapshot("v1", &[raw("MAGIC_NUMBER", "low", "O_1")])?;
        let second = service.record_snapshot("v1", &[]);
        assert!(matches!(second, Err(SnapshotError::AlreadyRecorded(_))));

        // The original snapshot is untouched.
        let stored = service.fetch("v1")?;
        assert_eq!(stored.issues.len(), 1);
        Ok(())
    }

    #[test]
    fn test_empty_snapshot_is_legal() -> anyhow::Result<()> {
        let db = Database::open_in_memory()?;
        let service = SnapshotService::new(db.snapshot_repo());

        let snapshot = service.record_snapshot("v-empty", &[])?;
        assert!(snapshot.issues.is_empty());
        assert!(service.fetch("v-empty")?.issues.is_empty());
        Ok(())
    }
}
