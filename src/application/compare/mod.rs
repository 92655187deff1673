//! Comparison pipeline: matcher, classifier, and the aggregating service.

pub mod classifier;
pub mod matcher;

#[cfg(test)]
mod tests;

use crate::domain::{Comparison, ComparisonEntry, ComparisonError, IssueOccurrence, VersionId};
use crate::infra::db::repository::{ComparisonRepository, SnapshotRepository, unique_violation};
use anyhow::anyhow;

/// Compute the full result entry list for two issue sequences.
///
/// Pure function of its inputs: recomputing for the same sequences yields a
/// bit-for-bit identical list.
pub fn compute_entries(
    before: &[IssueOccurrence],
    after: &[IssueOccurrence],
) -> Vec<ComparisonEntry> {
    matcher::match_issues(before, after)
        .iter()
        .map(classifier::entry_for)
        .collect()
}

/// Creates and fetches persisted comparisons.
///
/// The persisted uniqueness constraint on the ordered version pair plus the
/// check-then-create-or-fetch flow below guarantee that concurrent creation
/// requests for the same pair converge to exactly one stored record.
pub struct ComparisonService {
    snapshots: SnapshotRepository,
    comparisons: ComparisonRepository,
}

impl ComparisonService {
    pub fn new(snapshots: SnapshotRepository, comparisons: ComparisonRepository) -> Self {
        Self {
            snapshots,
            comparisons,
        }
    }

    /// Create the comparison for the ordered pair `(from, to)`, or return
    /// the stored record if one already exists.
    ///
    /// The caller supplies the version ids already ordered by upload time,
    /// `from` strictly earlier. Both versions must have a recorded
    /// snapshot and must differ; violations fail before any computation.
    pub fn create_or_fetch(
        &self,
        from_version_id: &VersionId,
        to_version_id: &VersionId,
    ) -> Result<Comparison, ComparisonError> {
        if from_version_id == to_version_id {
            return Err(ComparisonError::SameVersion(from_version_id.clone()));
        }

        if let Some(existing) = self
            .comparisons
            .find_by_pair(from_version_id, to_version_id)?
        {
            return Ok(existing);
        }

        let before = self
            .snapshots
            .find_by_version(from_version_id)?
            .ok_or_else(|| ComparisonError::MissingSnapshot(from_version_id.clone()))?;
        let after = self
            .snapshots
            .find_by_version(to_version_id)?
            .ok_or_else(|| ComparisonError::MissingSnapshot(to_version_id.clone()))?;

        let comparison = Comparison {
            id: uuid::Uuid::new_v4().to_string(),
            from_version_id: from_version_id.clone(),
            to_version_id: to_version_id.clone(),
            entries: compute_entries(&before.issues, &after.issues),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        match self.comparisons.insert(&comparison) {
            Ok(()) => Ok(comparison),
            Err(err) if unique_violation(&err) => {
                // Lost a creation race: read back the winner's record.
                log::debug!(
                    "comparison ({from_version_id}, {to_version_id}) was created concurrently"
                );
                self.comparisons
                    .find_by_pair(from_version_id, to_version_id)?
                    .ok_or_else(|| {
                        ComparisonError::OperationFailed(anyhow!(
                            "comparison vanished after constraint conflict"
                        ))
                    })
            }
            Err(err) => Err(ComparisonError::OperationFailed(err)),
        }
    }

    /// Fetch a stored comparison without creating one.
    pub fn fetch(
        &self,
        from_version_id: &VersionId,
        to_version_id: &VersionId,
    ) -> Result<Comparison, ComparisonError> {
        self.comparisons
            .find_by_pair(from_version_id, to_version_id)?
            .ok_or_else(|| ComparisonError::NotFound {
                from: from_version_id.clone(),
                to: to_version_id.clone(),
            })
    }
}
