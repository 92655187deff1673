//! The generative-collaborator seam.
//!
//! The generative model sits behind this narrow trait so the pipeline can
//! be exercised with deterministic fakes and the matching/classification
//! logic stays independent of any live external call. The model produces
//! issue lists and polishes prose; it never decides comparison outcomes.

use crate::domain::RawIssue;
use anyhow::Result;
use async_trait::async_trait;

/// Capability interface for the external generative model.
#[async_trait]
pub trait GenerativeAgent: Send + Sync {
    /// Analyze source code and return detected quality issues. The rows
    /// are untrusted; `application::ingest` validates them.
    async fn produce_issues(&self, source_code: &str) -> Result<Vec<RawIssue>>;

    /// Rephrase a factual summary into prose. The prompt carries the
    /// full instruction; the reply replaces the summary text only when
    /// the call succeeds.
    async fn polish_prose(&self, prompt: &str) -> Result<String>;
}

/// Stand-in used when no live agent is configured. Produces nothing and
/// declines to polish, so callers fall back to their local output.
pub struct NoopAgent;

#[async_trait]
impl GenerativeAgent for NoopAgent {
    async fn produce_issues(&self, _source_code: &str) -> Result<Vec<RawIssue>> {
        Ok(Vec::new())
    }

    async fn polish_prose(&self, _prompt: &str) -> Result<String> {
        anyhow::bail!("no generative agent configured")
    }
}

/// Deterministic agent returning fixed responses, for tests and demos.
pub struct ScriptedAgent {
    issues: Vec<RawIssue>,
    prose: String,
}

impl ScriptedAgent {
    pub fn new(issues: Vec<RawIssue>, prose: impl Into<String>) -> Self {
        Self {
            issues,
            prose: prose.into(),
        }
    }

    pub fn with_prose(prose: impl Into<String>) -> Self {
        Self::new(Vec::new(), prose)
    }
}

#[async_trait]
impl GenerativeAgent for ScriptedAgent {
    async fn produce_issues(&self, _source_code: &str) -> Result<Vec<RawIssue>> {
        Ok(self.issues.clone())
    }

    async fn polish_prose(&self, _prompt: &str) -> Result<String> {
        Ok(self.prose.clone())
    }
}
