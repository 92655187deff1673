//! SQLite database setup and connection management for qualdiff.
//! Handles database initialization, schema creation, and connection management.

use anyhow::Result;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Database wrapper that manages SQLite connections
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Create or open the database at the default location
    pub fn open() -> Result<Self> {
        let path = Self::default_path();
        Self::open_at(path)
    }

    /// Create an in-memory database (useful for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init()?;
        Ok(db)
    }

    /// Create or open the database at a specific path
    pub fn open_at(path: PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init()?;
        Ok(db)
    }

    /// Get the default database path
    fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("QUALDIFF_DB_PATH") {
            return PathBuf::from(path);
        }

        #[cfg(target_os = "macos")]
        {
            if let Some(home) = home::home_dir() {
                return home
                    .join("Library")
                    .join("Application Support")
                    .join("qualdiff")
                    .join("db.sqlite");
            }
        }

        #[cfg(target_os = "windows")]
        {
            if let Some(appdata) = std::env::var_os("APPDATA") {
                return PathBuf::from(appdata).join("qualdiff").join("db.sqlite");
            }
        }

        #[cfg(target_os = "linux")]
        {
            if let Some(xdg) = std::env::var_os("XDG_DATA_HOME") {
                return PathBuf::from(xdg).join("qualdiff").join("db.sqlite");
            }
            if let Some(home) = home::home_dir() {
                return home
                    .join(".local")
                    .join("share")
                    .join("qualdiff")
                    .join("db.sqlite");
            }
        }

        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".qualdiff")
            .join("db.sqlite")
    }

    /// Initialize database schema
    fn init(&self) -> Result<()> {
        let conn = self.conn.lock().expect("Failed to acquire database lock");
        const SCHEMA_VERSION: i32 = 1;

        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let existing_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        if existing_version < SCHEMA_VERSION {
            Self::create_schema(&conn)?;
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }

        Ok(())
    }

    fn create_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS snapshots (
                version_id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS snapshot_issues (
                snapshot_version_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                issue_code TEXT NOT NULL,
                severity TEXT NOT NULL,
                complexity TEXT NOT NULL,
                function_name TEXT,
                start_line INTEGER,
                end_line INTEGER,
                snippet_before TEXT,
                snippet_after TEXT,
                PRIMARY KEY (snapshot_version_id, position),
                FOREIGN KEY (snapshot_version_id) REFERENCES snapshots(version_id)
            );

            CREATE TABLE IF NOT EXISTS comparisons (
                id TEXT PRIMARY KEY,
                from_version_id TEXT NOT NULL,
                to_version_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (from_version_id, to_version_id),
                FOREIGN KEY (from_version_id) REFERENCES snapshots(version_id),
                FOREIGN KEY (to_version_id) REFERENCES snapshots(version_id)
            );

            CREATE TABLE IF NOT EXISTS comparison_entries (
                comparison_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                issue_code TEXT NOT NULL,
                change_type TEXT NOT NULL,
                before_severity TEXT,
                after_severity TEXT,
                before_complexity TEXT,
                after_complexity TEXT,
                PRIMARY KEY (comparison_id, position),
                FOREIGN KEY (comparison_id) REFERENCES comparisons(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS explanations (
                id TEXT PRIMARY KEY,
                comparison_id TEXT NOT NULL UNIQUE,
                content TEXT NOT NULL,
                polished INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY (comparison_id) REFERENCES comparisons(id)
            );
            "#,
        )?;
        Ok(())
    }

    /// Get a reference to the connection
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    pub fn snapshot_repo(&self) -> crate::infra::db::repository::SnapshotRepository {
        crate::infra::db::repository::SnapshotRepository::new(self.connection())
    }

    pub fn comparison_repo(&self) -> crate::infra::db::repository::ComparisonRepository {
        crate::infra::db::repository::ComparisonRepository::new(self.connection())
    }

    pub fn explanation_repo(&self) -> crate::infra::db::repository::ExplanationRepository {
        crate::infra::db::repository::ExplanationRepository::new(self.connection())
    }
}
