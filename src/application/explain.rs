//! Explanation synthesis for persisted comparisons.
//!
//! The factual skeleton is computed locally and is the only permissible
//! factual content of an explanation. The generative collaborator may
//! rephrase the skeleton into prose; it never contributes facts, and its
//! failure or timeout degrades to serving the skeleton verbatim.

use crate::domain::{ChangeType, Comparison, ComparisonEntry, Explanation, ExplanationError};
use crate::infra::agent::GenerativeAgent;
use crate::infra::db::repository::{
    ComparisonRepository, ExplanationRepository, unique_violation,
};
use crate::prompts;
use anyhow::{Context, anyhow};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Default upper bound for one prose-polish call.
const DEFAULT_POLISH_TIMEOUT: Duration = Duration::from_secs(20);

/// One deterministic fact line for a result entry.
///
/// Facts are derived from the stored entry alone so a re-render of the
/// same comparison always states the same thing.
pub fn fact_line(entry: &ComparisonEntry) -> String {
    match entry.change_type {
        ChangeType::Improved => match (entry.before_severity, entry.after_severity) {
            (Some(before), Some(after)) if before != after => {
                format!("severity reduced from {before} to {after}")
            }
            (Some(_), Some(_)) => match (entry.before_complexity, entry.after_complexity) {
                (Some(before), Some(after)) => {
                    format!("complexity reduced from {before} to {after}")
                }
                _ => "issue improved".to_string(),
            },
            _ => "issue resolved".to_string(),
        },
        ChangeType::Worsened => match (entry.before_severity, entry.after_severity) {
            (Some(before), Some(after)) if before != after => {
                format!("severity increased from {before} to {after}")
            }
            (Some(_), Some(_)) => match (entry.before_complexity, entry.after_complexity) {
                (Some(before), Some(after)) => {
                    format!("complexity increased from {before} to {after}")
                }
                _ => "issue worsened".to_string(),
            },
            _ => "new issue introduced".to_string(),
        },
        ChangeType::Unchanged => "no change".to_string(),
    }
}

/// Render the deterministic factual skeleton for a comparison.
///
/// Grouping order is fixed: improved results first, then worsened, then
/// unchanged; within a group, entries keep their result-list order.
pub fn fact_skeleton(comparison: &Comparison) -> String {
    let mut out = format!(
        "Quality comparison of version {} against version {}: {} issue(s) tracked.\n",
        comparison.to_version_id,
        comparison.from_version_id,
        comparison.entries.len()
    );

    if comparison.entries.is_empty() {
        out.push_str("\nNo issues were detected in either version.\n");
        return out;
    }

    let groups = [
        ("Improved", ChangeType::Improved),
        ("Worsened", ChangeType::Worsened),
        ("Unchanged", ChangeType::Unchanged),
    ];
    for (label, change_type) in groups {
        let entries: Vec<&ComparisonEntry> = comparison
            .entries
            .iter()
            .filter(|entry| entry.change_type == change_type)
            .collect();
        if entries.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{label}:\n"));
        for entry in entries {
            out.push_str(&format!("- {}: {}\n", entry.issue_code, fact_line(entry)));
        }
    }
    out
}

/// Generates and caches explanations, at most one per comparison.
pub struct ExplanationService {
    comparisons: ComparisonRepository,
    explanations: ExplanationRepository,
    agent: Arc<dyn GenerativeAgent>,
    polish_timeout: Duration,
}

impl ExplanationService {
    pub fn new(
        comparisons: ComparisonRepository,
        explanations: ExplanationRepository,
        agent: Arc<dyn GenerativeAgent>,
    ) -> Self {
        Self {
            comparisons,
            explanations,
            agent,
            polish_timeout: DEFAULT_POLISH_TIMEOUT,
        }
    }

    /// Override the prose-polish timeout.
    pub fn with_polish_timeout(mut self, timeout: Duration) -> Self {
        self.polish_timeout = timeout;
        self
    }

    /// Return the cached explanation for a comparison, generating it on
    /// the first request.
    ///
    /// A second request for the same comparison returns the stored
    /// content unchanged; a concurrent first request converges on one
    /// record through the uniqueness guard on the comparison id.
    pub async fn explain(&self, comparison_id: &str) -> Result<Explanation, ExplanationError> {
        if let Some(existing) = self.explanations.find_by_comparison(comparison_id)? {
            return Ok(existing);
        }

        let comparison = self
            .comparisons
            .find_by_id(comparison_id)?
            .ok_or_else(|| ExplanationError::ComparisonNotFound(comparison_id.to_string()))?;

        let skeleton = fact_skeleton(&comparison);
        let (content, polished) = match self.polish(&skeleton).await {
            Ok(prose) => (prose, true),
            Err(err) => {
                log::warn!("prose polish unavailable, serving factual summary: {err:#}");
                (skeleton, false)
            }
        };

        let explanation = Explanation {
            id: uuid::Uuid::new_v4().to_string(),
            comparison_id: comparison_id.to_string(),
            content,
            polished,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        match self.explanations.insert(&explanation) {
            Ok(()) => Ok(explanation),
            Err(err) if unique_violation(&err) => {
                log::debug!("explanation for comparison {comparison_id} was created concurrently");
                self.explanations
                    .find_by_comparison(comparison_id)?
                    .ok_or_else(|| {
                        ExplanationError::OperationFailed(anyhow!(
                            "explanation vanished after constraint conflict"
                        ))
                    })
            }
            Err(err) => Err(ExplanationError::OperationFailed(err)),
        }
    }

    /// Ask the collaborator to rephrase the skeleton, bounded by the
    /// configured timeout. Facts never come from here.
    async fn polish(&self, skeleton: &str) -> anyhow::Result<String> {
        let prompt = prompts::render("polish_explanation", &json!({ "skeleton": skeleton }))?;
        let prose = tokio::time::timeout(self.polish_timeout, self.agent.polish_prose(&prompt))
            .await
            .context("prose polish timed out")?
            .context("prose polish failed")?;
        if prose.trim().is_empty() {
            anyhow::bail!("agent returned empty prose");
        }
        Ok(prose)
    }
}
