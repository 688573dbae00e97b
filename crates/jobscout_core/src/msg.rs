use crate::{WorkerId, WorkerPhase};

/// Outcome of one analysis as far as progress reporting is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Match { score: u8 },
    NoMatch { score: u8 },
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMsg {
    /// A worker moved to a new phase; `label` replaces its current label.
    WorkerPhase {
        id: WorkerId,
        phase: WorkerPhase,
        label: String,
    },
    /// Current pending counts of both queues.
    QueueLevels { tasks: usize, backlog: usize },
    /// A scraper pushed a new record into the analysis queue.
    JobFound {
        scraper: WorkerId,
        title: String,
        backlog: usize,
    },
    /// An analyzer finished a record.
    Analyzed { title: String, verdict: Verdict },
    /// The scoring collaborator raised an error (reported before `Analyzed`).
    ScoringError { detail: String },
    /// A scraper abandoned its task after a transport failure.
    TransportFailure { scraper: WorkerId, host: String },
    /// Free-form operator notice.
    Notice(String),
}
