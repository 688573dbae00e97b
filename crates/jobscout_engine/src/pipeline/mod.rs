//! The two-stage discovery pipeline: a scraper pool feeding an analyzer pool
//! through two work queues, a live status reporter and the shutdown coordinator.
mod analyzer;
mod reporter;
mod scraper;
mod shutdown;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use jobscout_core::{
    Drain, JobRecord, ProgressState, SearchTask, SharedStore, SiteFilter, StatusMsg, StopSignal,
    WorkQueue, WorkerId, DEFAULT_EVENT_CAPACITY,
};
use pipeline_logging::{pipeline_error, pipeline_info, pipeline_warn};

pub use reporter::StatusRenderer;
pub use shutdown::ShutdownHandle;

use crate::sink::{OutputPaths, OutputSinks};
use crate::{Browser, BrowserSession, PipelineError, ResultsParser, Scorer};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub scraper_tabs: usize,
    pub analyzer_workers: usize,
    pub max_pages_per_query: usize,
    /// Search backends; each task picks one at random.
    pub search_endpoints: Vec<String>,
    pub site_filter: SiteFilter,
    /// How long a results page may take to show its results.
    pub page_wait: Duration,
    /// Random pause between result pages, inclusive bounds.
    pub page_backoff: (Duration, Duration),
    /// Timed-dequeue timeout of the analyzers.
    pub analysis_poll: Duration,
    pub refresh_interval: Duration,
    /// How long shutdown waits for the reporter's final render.
    pub reporter_grace: Duration,
    pub event_capacity: usize,
    /// `None` leaves the analysis queue unbounded.
    pub analysis_queue_capacity: Option<usize>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            scraper_tabs: 8,
            analyzer_workers: 2,
            max_pages_per_query: 10,
            search_endpoints: Vec::new(),
            site_filter: SiteFilter::default(),
            page_wait: Duration::from_secs(15),
            page_backoff: (Duration::from_millis(2000), Duration::from_millis(4000)),
            analysis_poll: Duration::from_secs(1),
            refresh_interval: Duration::from_secs(1),
            reporter_grace: Duration::from_secs(2),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            analysis_queue_capacity: None,
        }
    }
}

impl PipelineSettings {
    pub fn validate(&self) -> Result<(), PipelineError> {
        let invalid = |msg: &str| Err(PipelineError::InvalidSettings(msg.to_string()));
        if self.scraper_tabs == 0 {
            return invalid("at least one scraper tab is required");
        }
        if self.analyzer_workers == 0 {
            return invalid("at least one analyzer worker is required");
        }
        if self.max_pages_per_query == 0 {
            return invalid("max_pages_per_query must be at least 1");
        }
        if self.search_endpoints.is_empty() {
            return invalid("no search endpoints configured");
        }
        if self.page_backoff.0 > self.page_backoff.1 {
            return invalid("page backoff minimum exceeds its maximum");
        }
        if self.analysis_poll.is_zero() || self.refresh_interval.is_zero() {
            return invalid("poll and refresh intervals must be non-zero");
        }
        if self.analysis_queue_capacity == Some(0) {
            return invalid("analysis queue capacity must be at least 1");
        }
        Ok(())
    }
}

/// Everything the pipeline talks to outside its own threads.
pub struct Collaborators {
    pub browser: Arc<dyn Browser>,
    pub parser: Arc<dyn ResultsParser>,
    pub scorer: Arc<dyn Scorer>,
    pub renderer: Box<dyn StatusRenderer>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub jobs_scraped: u64,
    pub matches_found: u64,
    pub scoring_failures: u64,
    pub transport_failures: u64,
    /// Search tasks that were configured for the run.
    pub tasks_total: usize,
    /// Records left in the analysis queue by an interrupt.
    pub unanalyzed: usize,
    pub interrupted: bool,
    pub outputs: OutputPaths,
}

/// State shared by every worker thread of one run.
struct WorkerContext {
    settings: PipelineSettings,
    profile: String,
    store: SharedStore,
    tasks: Arc<WorkQueue<SearchTask>>,
    jobs: Arc<WorkQueue<JobRecord>>,
    stop: StopSignal,
    sinks: OutputSinks,
    parser: Arc<dyn ResultsParser>,
    scorer: Arc<dyn Scorer>,
}

impl WorkerContext {
    fn report(&self, msg: StatusMsg) {
        self.store.report(msg);
    }

    fn report_levels(&self) {
        self.store.report(StatusMsg::QueueLevels {
            tasks: self.tasks.pending_count(),
            backlog: self.jobs.pending_count(),
        });
    }
}

pub struct Pipeline {
    settings: PipelineSettings,
    profile: String,
    tasks: Arc<WorkQueue<SearchTask>>,
    jobs: Arc<WorkQueue<JobRecord>>,
    stop: StopSignal,
    interrupted: Arc<AtomicBool>,
}

impl Pipeline {
    /// Validates `settings`; `profile` is the candidate text handed to the scorer.
    pub fn new(settings: PipelineSettings, profile: impl Into<String>) -> Result<Self, PipelineError> {
        settings.validate()?;
        let jobs = WorkQueue::with_capacity(settings.analysis_queue_capacity);
        Ok(Self {
            settings,
            profile: profile.into(),
            tasks: Arc::new(WorkQueue::new()),
            jobs: Arc::new(jobs),
            stop: StopSignal::new(),
            interrupted: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Handle for an operator interrupt. Valid before and during [`Pipeline::run`].
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle::new(
            self.stop.clone(),
            self.tasks.clone(),
            self.jobs.clone(),
            self.interrupted.clone(),
        )
    }

    /// Runs `tasks` to completion (or interrupt) and returns the final counters.
    ///
    /// The scorer, browser and sinks are checked before any worker starts; a failure
    /// there aborts the run with nothing enqueued.
    pub fn run(
        self,
        tasks: Vec<SearchTask>,
        collaborators: Collaborators,
        outputs: &OutputPaths,
    ) -> Result<RunSummary, PipelineError> {
        let Collaborators {
            browser,
            parser,
            scorer,
            renderer,
        } = collaborators;

        scorer
            .health_check()
            .map_err(PipelineError::ScorerUnreachable)?;
        let sessions = open_sessions(browser.as_ref(), self.settings.scraper_tabs)?;
        let sinks = OutputSinks::prepare(outputs)?;

        let tasks_total = tasks.len();
        for task in tasks {
            if self.tasks.enqueue(task).is_err() {
                pipeline_warn!("Task queue closed before all tasks were enqueued");
                break;
            }
        }
        pipeline_info!(
            "Starting {} scrapers and {} analyzers for {} search tasks",
            self.settings.scraper_tabs,
            self.settings.analyzer_workers,
            tasks_total
        );

        let progress = ProgressState::with_event_capacity(
            self.settings.scraper_tabs,
            self.settings.analyzer_workers,
            self.settings.event_capacity,
        );
        let ctx = Arc::new(WorkerContext {
            settings: self.settings.clone(),
            profile: self.profile.clone(),
            store: SharedStore::new(progress),
            tasks: self.tasks.clone(),
            jobs: self.jobs.clone(),
            stop: self.stop.clone(),
            sinks,
            parser,
            scorer,
        });
        ctx.report_levels();

        let reporter_stop = StopSignal::new();
        let (done_tx, done_rx) = mpsc::channel();
        let reporter = spawn_named("status-reporter".to_string(), {
            let ctx = ctx.clone();
            let reporter_stop = reporter_stop.clone();
            move || reporter::run_reporter(&ctx, renderer, &reporter_stop, done_tx)
        });
        let reporter = match reporter {
            Ok(handle) => handle,
            Err(err) => {
                self.abort(Vec::new());
                return Err(err);
            }
        };

        let workers = match self.spawn_workers(&ctx, sessions) {
            Ok(workers) => workers,
            Err((err, started)) => {
                self.abort(started);
                reporter_stop.set();
                let _ = reporter.join();
                return Err(err);
            }
        };

        if self.tasks.await_drain_and_complete() == Drain::Complete {
            pipeline_info!("Search task queue drained");
        }
        if self.jobs.await_drain_and_complete() == Drain::Complete {
            pipeline_info!("Analysis queue drained");
        }

        self.stop.set();
        join_workers(workers);
        pipeline_info!("All workers joined");

        reporter_stop.set();
        match done_rx.recv_timeout(self.settings.reporter_grace) {
            Err(mpsc::RecvTimeoutError::Timeout) => {
                pipeline_warn!("Status reporter did not finish within the grace period");
            }
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                if reporter.join().is_err() {
                    pipeline_error!("Status reporter panicked");
                }
            }
        }

        let counters = ctx.store.snapshot().counters;
        let interrupted = self.interrupted.load(Ordering::Acquire);
        let summary = RunSummary {
            jobs_scraped: counters.jobs_scraped,
            matches_found: counters.matches_found,
            scoring_failures: counters.scoring_failures,
            transport_failures: counters.transport_failures,
            tasks_total,
            unanalyzed: self.jobs.pending_count(),
            interrupted,
            outputs: outputs.clone(),
        };
        pipeline_info!("Run finished: {summary:?}");
        Ok(summary)
    }

    fn spawn_workers(
        &self,
        ctx: &Arc<WorkerContext>,
        sessions: Vec<Box<dyn BrowserSession>>,
    ) -> Result<Vec<JoinHandle<()>>, (PipelineError, Vec<JoinHandle<()>>)> {
        let mut handles = Vec::with_capacity(sessions.len() + self.settings.analyzer_workers);
        for (slot, session) in sessions.into_iter().enumerate() {
            let id = WorkerId::scraper(slot + 1);
            let ctx = ctx.clone();
            match spawn_named(id.thread_name(), move || scraper::run_scraper(&ctx, id, session)) {
                Ok(handle) => handles.push(handle),
                Err(err) => return Err((err, handles)),
            }
        }
        for slot in 1..=self.settings.analyzer_workers {
            let id = WorkerId::analyzer(slot);
            let ctx = ctx.clone();
            match spawn_named(id.thread_name(), move || analyzer::run_analyzer(&ctx, id)) {
                Ok(handle) => handles.push(handle),
                Err(err) => return Err((err, handles)),
            }
        }
        Ok(handles)
    }

    /// Stops everything already started after a failed spawn.
    fn abort(&self, started: Vec<JoinHandle<()>>) {
        self.stop.set();
        self.tasks.close();
        self.jobs.close();
        join_workers(started);
    }
}

fn open_sessions(
    browser: &dyn Browser,
    count: usize,
) -> Result<Vec<Box<dyn BrowserSession>>, PipelineError> {
    let mut sessions: Vec<Box<dyn BrowserSession>> = Vec::with_capacity(count);
    for _ in 0..count {
        match browser.open_tab() {
            Ok(session) => sessions.push(session),
            Err(err) => {
                for session in &mut sessions {
                    session.close();
                }
                return Err(PipelineError::BrowserUnavailable(err));
            }
        }
    }
    Ok(sessions)
}

fn spawn_named<F>(name: String, body: F) -> Result<JoinHandle<()>, PipelineError>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(name.clone())
        .spawn(body)
        .map_err(|source| PipelineError::Spawn { name, source })
}

fn join_workers(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        let name = handle.thread().name().unwrap_or("worker").to_string();
        if handle.join().is_err() {
            pipeline_error!("Worker {name} panicked");
        }
    }
}
