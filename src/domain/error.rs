//! Domain error types for qualdiff.
//!
//! These errors represent domain-level failures that can occur during
//! snapshot ingestion, comparison, and explanation. They are more specific
//! than infrastructure errors and can be handled appropriately at the
//! application layer.

use thiserror::Error;

/// Domain errors related to snapshot ingestion.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("No analysis snapshot recorded for version: {0}")]
    NotFound(String),

    #[error("Analysis snapshot already recorded for version: {0}")]
    AlreadyRecorded(String),

    #[error("Snapshot operation failed: {0}")]
    OperationFailed(#[from] anyhow::Error),
}

/// Domain errors related to comparison creation.
#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error("Cannot compare a version with itself: {0}")]
    SameVersion(String),

    #[error("No analysis snapshot recorded for version: {0}")]
    MissingSnapshot(String),

    #[error("Comparison not found: {from} -> {to}")]
    NotFound { from: String, to: String },

    #[error("Comparison operation failed: {0}")]
    OperationFailed(#[from] anyhow::Error),
}

/// Domain errors related to explanation generation.
#[derive(Debug, Error)]
pub enum ExplanationError {
    #[error("Comparison not found: {0}")]
    ComparisonNotFound(String),

    #[error("Explanation operation failed: {0}")]
    OperationFailed(#[from] anyhow::Error),
}

/// Unified domain error type for application-level error handling.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Comparison error: {0}")]
    Comparison(#[from] ComparisonError),

    #[error("Explanation error: {0}")]
    Explanation(#[from] ExplanationError),
}
