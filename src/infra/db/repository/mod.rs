//! Repository implementations for data access in qualdiff.
//!
//! Provides database operations for snapshots, comparisons, and
//! explanations.

mod comparison;
mod explanation;
mod snapshot;

pub use comparison::ComparisonRepository;
pub use explanation::ExplanationRepository;
pub use snapshot::SnapshotRepository;

use rusqlite::Connection;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

pub(super) type DbConn = Arc<Mutex<Connection>>;

/// Marker trait for repository types.
///
/// Documents that a type follows the common repository pattern of being
/// constructed with a `DbConn`.
pub trait Repository {}

/// True when an error is a SQLite uniqueness-constraint violation.
///
/// Uniqueness violations on insert are not failures: the record already
/// exists (or a concurrent creator won the race) and callers resolve them
/// by fetching the stored record.
pub fn unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(inner, _))
            if inner.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Decode an enum column we wrote ourselves. A value outside the domain
/// means the store is corrupt, so this is a hard conversion error rather
/// than a silent default.
pub(crate) fn parse_stored<T>(column: usize, value: String) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    T::from_str(&value).map_err(|reason| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            rusqlite::types::Type::Text,
            reason.into(),
        )
    })
}
