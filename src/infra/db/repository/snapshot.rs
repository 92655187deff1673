//! Repository for analysis snapshot persistence.

use crate::domain::{AnalysisSnapshot, IssueOccurrence, SnippetPair};
use anyhow::{Context, Result};
use rusqlite::{Row, params};

use super::{DbConn, Repository, parse_stored};

pub struct SnapshotRepository {
    conn: DbConn,
}

impl Repository for SnapshotRepository {}

impl SnapshotRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    /// Persist a snapshot and its ordered issue rows.
    ///
    /// Snapshots are insert-only: a second save for the same version id
    /// fails on the primary key, leaving the stored history untouched.
    pub fn save(&self, snapshot: &AnalysisSnapshot) -> Result<()> {
        let mut conn = self.conn.lock().expect("Failed to acquire database lock");
        let tx = conn.transaction().context("begin snapshot insert")?;

        tx.execute(
            "INSERT INTO snapshots (version_id, created_at) VALUES (?1, ?2)",
            params![snapshot.version_id, snapshot.created_at],
        )
        .context("save snapshot")?;

        for (position, issue) in snapshot.issues.iter().enumerate() {
            let (snippet_before, snippet_after) = match &issue.snippet {
                Some(pair) => (Some(pair.before.as_str()), Some(pair.after.as_str())),
                None => (None, None),
            };
            tx.execute(
                r#"
                INSERT INTO snapshot_issues
                    (snapshot_version_id, position, issue_code, severity, complexity,
                     function_name, start_line, end_line, snippet_before, snippet_after)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
                params![
                    snapshot.version_id,
                    position as i64,
                    issue.issue_code.to_string(),
                    issue.severity.to_string(),
                    issue.complexity.to_string(),
                    issue.function_name,
                    issue.start_line.map(|n| n as i64),
                    issue.end_line.map(|n| n as i64),
                    snippet_before,
                    snippet_after,
                ],
            )
            .context("save snapshot issue")?;
        }

        tx.commit().context("commit snapshot insert")?;
        Ok(())
    }

    /// Whether a snapshot has been recorded for a version.
    pub fn exists(&self, version_id: &str) -> Result<bool> {
        let conn = self.conn.lock().expect("Failed to acquire database lock");
        let mut stmt = conn.prepare("SELECT 1 FROM snapshots WHERE version_id = ?1")?;
        let found = stmt.exists([version_id]).context("check snapshot exists")?;
        Ok(found)
    }

    /// Load a snapshot with its issues in stored order.
    pub fn find_by_version(&self, version_id: &str) -> Result<Option<AnalysisSnapshot>> {
        let conn = self.conn.lock().expect("Failed to acquire database lock");

        let mut stmt = conn.prepare("SELECT created_at FROM snapshots WHERE version_id = ?1")?;
        let mut rows = stmt.query([version_id])?;
        let created_at: String = match rows.next()? {
            Some(row) => row.get(0)?,
            None => return Ok(None),
        };

        let mut stmt = conn.prepare(
            r#"
            SELECT issue_code, severity, complexity, function_name,
                   start_line, end_line, snippet_before, snippet_after
            FROM snapshot_issues
            WHERE snapshot_version_id = ?1
            ORDER BY position ASC
            "#,
        )?;
        let rows = stmt.query_map([version_id], row_to_issue)?;
        let mut issues = Vec::new();
        for row in rows {
            issues.push(row.context("load snapshot issue")?);
        }

        Ok(Some(AnalysisSnapshot {
            version_id: version_id.to_string(),
            issues,
            created_at,
        }))
    }
}

fn row_to_issue(row: &Row<'_>) -> rusqlite::Result<IssueOccurrence> {
    let issue_code = parse_stored(0, row.get::<_, String>(0)?)?;
    let severity = parse_stored(1, row.get::<_, String>(1)?)?;
    let complexity = parse_stored(2, row.get::<_, String>(2)?)?;
    let start_line: Option<i64> = row.get(4)?;
    let end_line: Option<i64> = row.get(5)?;
    let snippet_before: Option<String> = row.get(6)?;
    let snippet_after: Option<String> = row.get(7)?;

    let snippet = match (snippet_before, snippet_after) {
        (Some(before), Some(after)) => Some(SnippetPair { before, after }),
        _ => None,
    };

    Ok(IssueOccurrence {
        issue_code,
        severity,
        complexity,
        function_name: row.get(3)?,
        start_line: start_line.map(|n| n as u32),
        end_line: end_line.map(|n| n as u32),
        snippet,
    })
}
