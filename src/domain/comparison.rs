//! Comparison and explanation domain types.

use super::issue::{Complexity, IssueCode, Severity, VersionId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a persisted comparison.
pub type ComparisonId = String;

/// Verdict assigned to one matched issue pair across two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    Improved,
    Unchanged,
    Worsened,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Improved => write!(f, "IMPROVED"),
            Self::Unchanged => write!(f, "UNCHANGED"),
            Self::Worsened => write!(f, "WORSENED"),
        }
    }
}

impl FromStr for ChangeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "IMPROVED" => Ok(Self::Improved),
            "UNCHANGED" => Ok(Self::Unchanged),
            "WORSENED" => Ok(Self::Worsened),
            other => Err(format!("invalid change type: {other}")),
        }
    }
}

/// One per matched pair: the verdict plus the severity/complexity values
/// on each side. Before-side fields are absent for newly introduced
/// issues, after-side fields for resolved ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub issue_code: IssueCode,
    pub change_type: ChangeType,
    #[serde(default)]
    pub before_severity: Option<Severity>,
    #[serde(default)]
    pub after_severity: Option<Severity>,
    #[serde(default)]
    pub before_complexity: Option<Complexity>,
    #[serde(default)]
    pub after_complexity: Option<Complexity>,
}

/// Persisted comparison of two analysis snapshots.
///
/// Identified by the ordered `(from, to)` version pair, where `from` is
/// the chronologically earlier version. Created at most once per ordered
/// pair; the entry list is immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    /// Unique identifier for the comparison record.
    pub id: ComparisonId,
    /// Earlier version of the pair.
    pub from_version_id: VersionId,
    /// Later version of the pair.
    pub to_version_id: VersionId,
    /// One entry per matched pair, in deterministic matcher order.
    pub entries: Vec<ComparisonEntry>,
    /// Creation timestamp in RFC3339 format.
    pub created_at: String,
}

/// Cached human-readable summary of one comparison.
///
/// Created lazily, at most once per comparison, immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    /// Unique identifier for the explanation record.
    pub id: String,
    /// Comparison this explanation summarizes.
    pub comparison_id: ComparisonId,
    /// Summary text served to the user.
    pub content: String,
    /// Whether the generative collaborator polished the text. When false
    /// the content is the deterministic factual skeleton verbatim.
    pub polished: bool,
    /// Creation timestamp in RFC3339 format.
    pub created_at: String,
}
