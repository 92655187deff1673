//! Repository for comparison persistence.
//!
//! The `UNIQUE (from_version_id, to_version_id)` constraint is the
//! storage-level guard that makes comparison creation idempotent;
//! concurrent creators for the same ordered pair converge on one record.

use crate::domain::{Comparison, ComparisonEntry};
use anyhow::{Context, Result};
use rusqlite::{Connection, Row, params};

use super::{DbConn, Repository, parse_stored};

pub struct ComparisonRepository {
    conn: DbConn,
}

impl Repository for ComparisonRepository {}

impl ComparisonRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    /// Insert a comparison and its entries in one transaction.
    ///
    /// Fails with a uniqueness violation when a record for the same
    /// ordered pair already exists; callers resolve that by fetching the
    /// stored record (see `unique_violation`).
    pub fn insert(&self, comparison: &Comparison) -> Result<()> {
        let mut conn = self.conn.lock().expect("Failed to acquire database lock");
        let tx = conn.transaction().context("begin comparison insert")?;

        tx.execute(
            r#"
            INSERT INTO comparisons (id, from_version_id, to_version_id, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                comparison.id,
                comparison.from_version_id,
                comparison.to_version_id,
                comparison.created_at,
            ],
        )
        .context("save comparison")?;

        for (position, entry) in comparison.entries.iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO comparison_entries
                    (comparison_id, position, issue_code, change_type,
                     before_severity, after_severity, before_complexity, after_complexity)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    comparison.id,
                    position as i64,
                    entry.issue_code.to_string(),
                    entry.change_type.to_string(),
                    entry.before_severity.map(|s| s.to_string()),
                    entry.after_severity.map(|s| s.to_string()),
                    entry.before_complexity.map(|c| c.to_string()),
                    entry.after_complexity.map(|c| c.to_string()),
                ],
            )
            .context("save comparison entry")?;
        }

        tx.commit().context("commit comparison insert")?;
        Ok(())
    }

    /// Find the comparison for an ordered version pair.
    pub fn find_by_pair(
        &self,
        from_version_id: &str,
        to_version_id: &str,
    ) -> Result<Option<Comparison>> {
        let conn = self.conn.lock().expect("Failed to acquire database lock");
        let mut stmt = conn.prepare(
            r#"
            SELECT id, from_version_id, to_version_id, created_at
            FROM comparisons
            WHERE from_version_id = ?1 AND to_version_id = ?2
            "#,
        )?;
        let mut rows = stmt.query([from_version_id, to_version_id])?;
        match rows.next()? {
            Some(row) => {
                let comparison = row_to_comparison(row)?;
                Ok(Some(load_entries(&conn, comparison)?))
            }
            None => Ok(None),
        }
    }

    /// Find a comparison by its id.
    pub fn find_by_id(&self, id: &str) -> Result<Option<Comparison>> {
        let conn = self.conn.lock().expect("Failed to acquire database lock");
        let mut stmt = conn.prepare(
            r#"
            SELECT id, from_version_id, to_version_id, created_at
            FROM comparisons
            WHERE id = ?1
            "#,
        )?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => {
                let comparison = row_to_comparison(row)?;
                Ok(Some(load_entries(&conn, comparison)?))
            }
            None => Ok(None),
        }
    }
}

fn row_to_comparison(row: &Row<'_>) -> rusqlite::Result<Comparison> {
    Ok(Comparison {
        id: row.get(0)?,
        from_version_id: row.get(1)?,
        to_version_id: row.get(2)?,
        entries: Vec::new(),
        created_at: row.get(3)?,
    })
}

fn load_entries(conn: &Connection, mut comparison: Comparison) -> Result<Comparison> {
    let mut stmt = conn.prepare(
        r#"
        SELECT issue_code, change_type, before_severity, after_severity,
               before_complexity, after_complexity
        FROM comparison_entries
        WHERE comparison_id = ?1
        ORDER BY position ASC
        "#,
    )?;
    let rows = stmt.query_map([comparison.id.as_str()], row_to_entry)?;
    for row in rows {
        comparison.entries.push(row.context("load comparison entry")?);
    }
    Ok(comparison)
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<ComparisonEntry> {
    let before_severity = row
        .get::<_, Option<String>>(2)?
        .map(|value| parse_stored(2, value))
        .transpose()?;
    let after_severity = row
        .get::<_, Option<String>>(3)?
        .map(|value| parse_stored(3, value))
        .transpose()?;
    let before_complexity = row
        .get::<_, Option<String>>(4)?
        .map(|value| parse_stored(4, value))
        .transpose()?;
    let after_complexity = row
        .get::<_, Option<String>>(5)?
        .map(|value| parse_stored(5, value))
        .transpose()?;

    Ok(ComparisonEntry {
        issue_code: parse_stored(0, row.get::<_, String>(0)?)?,
        change_type: parse_stored(1, row.get::<_, String>(1)?)?,
        before_severity,
        after_severity,
        before_complexity,
        after_complexity,
    })
}
