//! Repository for cached explanations.

use crate::domain::Explanation;
use anyhow::{Context, Result};
use rusqlite::{Row, params};

use super::{DbConn, Repository};

pub struct ExplanationRepository {
    conn: DbConn,
}

impl Repository for ExplanationRepository {}

impl ExplanationRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    /// Insert an explanation. The `UNIQUE (comparison_id)` constraint
    /// enforces at-most-once generation per comparison.
    pub fn insert(&self, explanation: &Explanation) -> Result<()> {
        let conn = self.conn.lock().expect("Failed to acquire database lock");
        conn.execute(
            r#"
            INSERT INTO explanations (id, comparison_id, content, polished, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                explanation.id,
                explanation.comparison_id,
                explanation.content,
                explanation.polished as i32,
                explanation.created_at,
            ],
        )
        .context("save explanation")?;
        Ok(())
    }

    /// Find the cached explanation for a comparison.
    pub fn find_by_comparison(&self, comparison_id: &str) -> Result<Option<Explanation>> {
        let conn = self.conn.lock().expect("Failed to acquire database lock");
        let mut stmt = conn.prepare(
            r#"
            SELECT id, comparison_id, content, polished, created_at
            FROM explanations
            WHERE comparison_id = ?1
            "#,
        )?;
        let mut rows = stmt.query_map([comparison_id], row_to_explanation)?;
        match rows.next() {
            Some(row) => Ok(Some(row.context("load explanation")?)),
            None => Ok(None),
        }
    }
}

fn row_to_explanation(row: &Row<'_>) -> rusqlite::Result<Explanation> {
    let polished: i32 = row.get(3)?;
    Ok(Explanation {
        id: row.get(0)?,
        comparison_id: row.get(1)?,
        content: row.get(2)?,
        polished: polished != 0,
        created_at: row.get(4)?,
    })
}
