use std::ops::RangeInclusive;

use crate::SearchTask;

/// Valid relevance scores produced by the scoring collaborator.
pub const SCORE_RANGE: RangeInclusive<u8> = 1..=10;

/// A deduplicated, allowlisted posting waiting for (or done with) scoring.
/// `source_url` is the identity key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub source_url: String,
    pub country: String,
    pub tier: String,
}

impl JobRecord {
    /// Builds a record for a posting discovered while running `task`.
    pub fn discovered(
        task: &SearchTask,
        title: impl Into<String>,
        company: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            source_url: source_url.into(),
            country: task.country.clone(),
            tier: task.tier.clone(),
        }
    }
}

/// The judge's verdict for one job title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub is_match: bool,
    pub score: u8,
    pub reason: String,
    pub matched_keywords: Vec<String>,
}

impl AnalysisResult {
    /// Keywords in the single-cell form used by the output sinks.
    pub fn keywords_joined(&self) -> String {
        self.matched_keywords.join(", ")
    }
}

/// Terminal outcome of analyzing one record. Failures are never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Scored(AnalysisResult),
    Failed { detail: String },
}

impl AnalysisOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, AnalysisOutcome::Scored(result) if result.is_match)
    }
}
