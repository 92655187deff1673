//! Best-effort pairing of issue occurrences across two snapshots.
//!
//! The analysis agent assigns no stable cross-version identifiers, so
//! occurrences are matched on `(issue_code, function_name)` when a function
//! name is present, falling back to the issue code alone otherwise. Within
//! a key group both sides are paired positionally in ascending start-line
//! order. This is a heuristic, not a guaranteed semantic match; it lives
//! behind this module's boundary so a stronger strategy (e.g. snippet
//! similarity) can replace it without touching the classifier or the
//! comparison service.

use crate::domain::{IssueCode, IssueOccurrence};
use std::collections::BTreeMap;

/// One pairing produced by the matcher. At least one side is always
/// populated; a one-sided pair means the issue exists in only one of the
/// two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedPair<'a> {
    /// The key matched an occurrence on both sides.
    Both(&'a IssueOccurrence, &'a IssueOccurrence),
    /// Present only in the earlier snapshot (resolved).
    BeforeOnly(&'a IssueOccurrence),
    /// Present only in the later snapshot (newly introduced).
    AfterOnly(&'a IssueOccurrence),
}

/// Matching key: occurrences naming a function only group with occurrences
/// of the same code naming the same function; the `None` bucket is the
/// code-only fallback for occurrences without one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct MatchKey {
    code: IssueCode,
    function: Option<String>,
}

fn key_of(issue: &IssueOccurrence) -> MatchKey {
    MatchKey {
        code: issue.issue_code,
        function: issue.function_name.clone(),
    }
}

/// Sort a key group for positional pairing: ascending start line,
/// occurrences without a line after those with one, original list order as
/// the final tie-break (the sort is stable and the group is built in list
/// order).
fn sort_group(group: &mut [&IssueOccurrence]) {
    group.sort_by_key(|issue| (issue.start_line.is_none(), issue.start_line.unwrap_or(0)));
}

/// Pair every occurrence of `before` and `after` exactly once.
///
/// Occurrences are grouped by matching key; within each group both sides
/// are paired positionally and any excess on either side is emitted as a
/// one-sided pair. Key groups are visited in key order, so identical
/// inputs always produce an identical pair list.
pub fn match_issues<'a>(
    before: &'a [IssueOccurrence],
    after: &'a [IssueOccurrence],
) -> Vec<MatchedPair<'a>> {
    type Group<'a> = (Vec<&'a IssueOccurrence>, Vec<&'a IssueOccurrence>);
    let mut groups: BTreeMap<MatchKey, Group<'a>> = BTreeMap::new();

    for issue in before {
        groups.entry(key_of(issue)).or_default().0.push(issue);
    }
    for issue in after {
        groups.entry(key_of(issue)).or_default().1.push(issue);
    }

    let mut pairs = Vec::with_capacity(before.len().max(after.len()));
    for (_, (mut before_group, mut after_group)) in groups {
        sort_group(&mut before_group);
        sort_group(&mut after_group);

        let mut before_iter = before_group.into_iter();
        let mut after_iter = after_group.into_iter();
        loop {
            match (before_iter.next(), after_iter.next()) {
                (Some(b), Some(a)) => pairs.push(MatchedPair::Both(b, a)),
                (Some(b), None) => pairs.push(MatchedPair::BeforeOnly(b)),
                (None, Some(a)) => pairs.push(MatchedPair::AfterOnly(a)),
                (None, None) => break,
            }
        }
    }
    pairs
}
