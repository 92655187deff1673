//! Issue occurrence domain types.
//!
//! An issue occurrence is one code-quality finding produced by the analysis
//! agent for a single uploaded version. Occurrences are immutable and owned
//! by exactly one analysis snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for an uploaded source version.
pub type VersionId = String;

/// Closed set of issue codes the analysis agent may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    NestedLoop,
    UnusedVariable,
    MagicNumber,
    LongFunction,
    DuplicateCode,
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NestedLoop => write!(f, "NESTED_LOOP"),
            Self::UnusedVariable => write!(f, "UNUSED_VARIABLE"),
            Self::MagicNumber => write!(f, "MAGIC_NUMBER"),
            Self::LongFunction => write!(f, "LONG_FUNCTION"),
            Self::DuplicateCode => write!(f, "DUPLICATE_CODE"),
        }
    }
}

impl FromStr for IssueCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NESTED_LOOP" => Ok(Self::NestedLoop),
            "UNUSED_VARIABLE" => Ok(Self::UnusedVariable),
            "MAGIC_NUMBER" => Ok(Self::MagicNumber),
            "LONG_FUNCTION" => Ok(Self::LongFunction),
            "DUPLICATE_CODE" => Ok(Self::DuplicateCode),
            other => Err(format!("unknown issue code: {other}")),
        }
    }
}

/// Severity of an issue occurrence, ordered low < medium < high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Fixed rank in the severity total order: low=0, medium=1, high=2.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("invalid severity: {other}")),
        }
    }
}

/// Complexity class of an issue occurrence, ordered O_1 < O_n < O_n2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Complexity {
    #[serde(rename = "O_1")]
    O1,
    #[serde(rename = "O_n")]
    ON,
    #[serde(rename = "O_n2")]
    ON2,
}

impl Complexity {
    /// Fixed rank in the complexity total order: O_1=0, O_n=1, O_n2=2.
    pub fn rank(&self) -> u8 {
        match self {
            Self::O1 => 0,
            Self::ON => 1,
            Self::ON2 => 2,
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::O1 => write!(f, "O_1"),
            Self::ON => write!(f, "O_n"),
            Self::ON2 => write!(f, "O_n2"),
        }
    }
}

impl FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "O_1" => Ok(Self::O1),
            "O_N" => Ok(Self::ON),
            "O_N2" => Ok(Self::ON2),
            other => Err(format!("invalid complexity class: {other}")),
        }
    }
}

/// Before/after code snippet pair attached to an occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetPair {
    /// Offending code as it appeared in the analyzed version.
    pub before: String,
    /// Suggested replacement code.
    pub after: String,
}

/// One detected code-quality finding within a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueOccurrence {
    /// Which kind of issue was detected.
    pub issue_code: IssueCode,
    /// Severity assigned by the analysis agent.
    pub severity: Severity,
    /// Complexity class assigned by the analysis agent.
    pub complexity: Complexity,
    /// Enclosing function, when the agent could name one.
    #[serde(default)]
    pub function_name: Option<String>,
    /// First line of the flagged region.
    #[serde(default)]
    pub start_line: Option<u32>,
    /// Last line of the flagged region.
    #[serde(default)]
    pub end_line: Option<u32>,
    /// Optional before/after snippet pair.
    #[serde(default)]
    pub snippet: Option<SnippetPair>,
}

/// Immutable set of issue occurrences produced for one uploaded version.
///
/// Created once when analysis completes and never mutated afterwards;
/// history is append-only, not edit-in-place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    /// Version this snapshot belongs to.
    pub version_id: VersionId,
    /// Ordered issue occurrences as delivered by the analysis agent.
    pub issues: Vec<IssueOccurrence>,
    /// Creation timestamp in RFC3339 format.
    pub created_at: String,
}

/// Untrusted issue row as delivered by the analysis agent.
///
/// Enum-valued fields arrive as plain strings and are validated against
/// the closed domains at ingestion; see `application::ingest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIssue {
    pub issue_code: String,
    pub severity: String,
    pub complexity: String,
    #[serde(default)]
    pub function_name: Option<String>,
    #[serde(default)]
    pub start_line: Option<u32>,
    #[serde(default)]
    pub end_line: Option<u32>,
    #[serde(default)]
    pub snippet: Option<SnippetPair>,
}
