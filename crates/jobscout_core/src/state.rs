use std::collections::VecDeque;
use std::fmt;

use chrono::NaiveTime;

use crate::view_model::ProgressSnapshot;

/// Recent-event ring capacity used when none is configured.
pub const DEFAULT_EVENT_CAPACITY: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerKind {
    Scraper,
    Analyzer,
}

/// A worker slot. `index` is 1-based, matching what the operator sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId {
    pub kind: WorkerKind,
    pub index: usize,
}

impl WorkerId {
    pub fn scraper(index: usize) -> Self {
        Self {
            kind: WorkerKind::Scraper,
            index,
        }
    }

    pub fn analyzer(index: usize) -> Self {
        Self {
            kind: WorkerKind::Analyzer,
            index,
        }
    }

    /// Name given to the worker's OS thread and used as its log label.
    pub fn thread_name(&self) -> String {
        match self.kind {
            WorkerKind::Scraper => format!("scraper-{}", self.index),
            WorkerKind::Analyzer => format!("analyzer-{}", self.index),
        }
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WorkerKind::Scraper => write!(f, "Tab-{}", self.index),
            WorkerKind::Analyzer => write!(f, "LLM-{}", self.index),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    Initializing,
    Starting,
    Idle,
    Searching,
    FoundJob { backlog: usize },
    Analyzing,
    Finished,
}

impl fmt::Display for WorkerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerPhase::Initializing => write!(f, "Initializing"),
            WorkerPhase::Starting => write!(f, "Starting..."),
            WorkerPhase::Idle => write!(f, "Idle"),
            WorkerPhase::Searching => write!(f, "Searching..."),
            WorkerPhase::FoundJob { backlog } => write!(f, "Found Job ({backlog})"),
            WorkerPhase::Analyzing => write!(f, "Analyzing Job"),
            WorkerPhase::Finished => write!(f, "Finished"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerStatus {
    pub id: WorkerId,
    pub phase: WorkerPhase,
    /// Query (scrapers) or job title (analyzers) the worker is busy with.
    pub label: String,
}

impl WorkerStatus {
    fn initializing(id: WorkerId) -> Self {
        Self {
            id,
            phase: WorkerPhase::Initializing,
            label: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressCounters {
    pub tasks_remaining: usize,
    pub analysis_backlog: usize,
    pub jobs_scraped: u64,
    pub matches_found: u64,
    pub scoring_failures: u64,
    pub transport_failures: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Found,
    Match { score: u8 },
    NoMatch { score: u8 },
    AnalysisFailed,
    ScoringError,
    TransportFailure,
    Notice,
}

/// One line of the recent-events ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineEvent {
    pub at: NaiveTime,
    pub kind: EventKind,
    pub text: String,
}

impl PipelineEvent {
    /// Tag shown before the event text, e.g. `[+] Found:`.
    pub fn tag(&self) -> String {
        match self.kind {
            EventKind::Found => "[+] Found:".to_string(),
            EventKind::Match { score } => format!("[\u{2713}] Match (Score: {score}/10):"),
            EventKind::NoMatch { score } => format!("[-] No Match (Score: {score}/10):"),
            EventKind::AnalysisFailed => "[!] LLM Analysis Failed:".to_string(),
            EventKind::ScoringError => "[!] LLM processing error:".to_string(),
            EventKind::TransportFailure | EventKind::Notice => "[!]".to_string(),
        }
    }
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.at.format("%H:%M:%S"), self.tag(), self.text)
    }
}

/// Live progress of a run: per-worker statuses, counters and the recent-events ring.
///
/// Mutated only through [`crate::update`]; read through [`ProgressState::view`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    scrapers: Vec<WorkerStatus>,
    analyzers: Vec<WorkerStatus>,
    counters: ProgressCounters,
    events: VecDeque<PipelineEvent>,
    event_capacity: usize,
}

impl ProgressState {
    pub fn new(scrapers: usize, analyzers: usize) -> Self {
        Self::with_event_capacity(scrapers, analyzers, DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_event_capacity(scrapers: usize, analyzers: usize, event_capacity: usize) -> Self {
        Self {
            scrapers: (1..=scrapers)
                .map(|i| WorkerStatus::initializing(WorkerId::scraper(i)))
                .collect(),
            analyzers: (1..=analyzers)
                .map(|i| WorkerStatus::initializing(WorkerId::analyzer(i)))
                .collect(),
            counters: ProgressCounters::default(),
            events: VecDeque::with_capacity(event_capacity),
            event_capacity,
        }
    }

    pub fn view(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            scrapers: self.scrapers.clone(),
            analyzers: self.analyzers.clone(),
            counters: self.counters,
            events: self.events.iter().cloned().collect(),
        }
    }

    pub fn counters(&self) -> &ProgressCounters {
        &self.counters
    }

    pub(crate) fn counters_mut(&mut self) -> &mut ProgressCounters {
        &mut self.counters
    }

    pub(crate) fn worker_mut(&mut self, id: WorkerId) -> Option<&mut WorkerStatus> {
        let slots = match id.kind {
            WorkerKind::Scraper => &mut self.scrapers,
            WorkerKind::Analyzer => &mut self.analyzers,
        };
        id.index.checked_sub(1).and_then(|i| slots.get_mut(i))
    }

    /// Pushes an event at the front, evicting the oldest once full.
    pub(crate) fn push_event(&mut self, event: PipelineEvent) {
        if self.event_capacity == 0 {
            return;
        }
        while self.events.len() >= self.event_capacity {
            self.events.pop_back();
        }
        self.events.push_front(event);
    }
}
