//! Change verdicts for matched issue pairs.
//!
//! Severity strictly dominates complexity: complexity is consulted only
//! when the severity rank is unchanged. This precedence determines the
//! only facts the explanation layer is allowed to state.

use super::matcher::MatchedPair;
use crate::domain::{ChangeType, ComparisonEntry};

/// Assign the verdict for one matched pair. Total over valid pairs, no
/// side effects.
pub fn classify(pair: &MatchedPair<'_>) -> ChangeType {
    match pair {
        // Issue present before and gone after: resolved.
        MatchedPair::BeforeOnly(_) => ChangeType::Improved,
        // Issue absent before and present after: newly introduced.
        MatchedPair::AfterOnly(_) => ChangeType::Worsened,
        MatchedPair::Both(before, after) => {
            let severity_delta = after.severity.rank() as i8 - before.severity.rank() as i8;
            if severity_delta < 0 {
                return ChangeType::Improved;
            }
            if severity_delta > 0 {
                return ChangeType::Worsened;
            }
            // Equal severity: complexity is the tiebreak.
            let complexity_delta = after.complexity.rank() as i8 - before.complexity.rank() as i8;
            if complexity_delta < 0 {
                ChangeType::Improved
            } else if complexity_delta > 0 {
                ChangeType::Worsened
            } else {
                ChangeType::Unchanged
            }
        }
    }
}

/// Build the persisted result entry for one matched pair.
pub fn entry_for(pair: &MatchedPair<'_>) -> ComparisonEntry {
    let change_type = classify(pair);
    match pair {
        MatchedPair::Both(before, after) => ComparisonEntry {
            issue_code: before.issue_code,
            change_type,
            before_severity: Some(before.severity),
            after_severity: Some(after.severity),
            before_complexity: Some(before.complexity),
            after_complexity: Some(after.complexity),
        },
        MatchedPair::BeforeOnly(before) => ComparisonEntry {
            issue_code: before.issue_code,
            change_type,
            before_severity: Some(before.severity),
            after_severity: None,
            before_complexity: Some(before.complexity),
            after_complexity: None,
        },
        MatchedPair::AfterOnly(after) => ComparisonEntry {
            issue_code: after.issue_code,
            change_type,
            before_severity: None,
            after_severity: Some(after.severity),
            before_complexity: None,
            after_complexity: Some(after.complexity),
        },
    }
}
