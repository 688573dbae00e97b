use crate::{PipelineEvent, ProgressCounters, WorkerStatus};

/// Point-in-time copy of the progress state, taken under the store lock and
/// rendered without it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub scrapers: Vec<WorkerStatus>,
    pub analyzers: Vec<WorkerStatus>,
    pub counters: ProgressCounters,
    /// Newest first.
    pub events: Vec<PipelineEvent>,
}

/// One dashboard row: slot name, status text and the (possibly truncated) label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerRowView {
    pub slot: String,
    pub status: String,
    pub label: String,
}

impl WorkerRowView {
    pub fn from_status(status: &WorkerStatus, max_label: usize) -> Self {
        Self {
            slot: status.id.to_string(),
            status: status.phase.to_string(),
            label: status.label.chars().take(max_label).collect(),
        }
    }
}

impl ProgressSnapshot {
    pub fn scraper_rows(&self, max_label: usize) -> Vec<WorkerRowView> {
        self.scrapers
            .iter()
            .map(|s| WorkerRowView::from_status(s, max_label))
            .collect()
    }

    pub fn analyzer_rows(&self, max_label: usize) -> Vec<WorkerRowView> {
        self.analyzers
            .iter()
            .map(|s| WorkerRowView::from_status(s, max_label))
            .collect()
    }

    /// True once every worker slot reports `Finished`.
    pub fn all_finished(&self) -> bool {
        self.scrapers
            .iter()
            .chain(&self.analyzers)
            .all(|w| w.phase == crate::WorkerPhase::Finished)
    }
}
