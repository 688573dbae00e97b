//! Jobscout core: domain types, work queues and the shared pipeline state.
//!
//! Nothing in this crate performs IO. The engine crate drives these types from
//! its worker threads; everything here is safe to share across threads.
mod company;
mod filter;
mod job;
mod msg;
mod queue;
mod state;
mod stop;
mod store;
mod task;
mod update;
mod view_model;

pub use company::{extract_company_name, title_case};
pub use filter::SiteFilter;
pub use job::{AnalysisOutcome, AnalysisResult, JobRecord, SCORE_RANGE};
pub use msg::{StatusMsg, Verdict};
pub use queue::{Dequeue, Drain, QueueClosed, TaskGuard, WorkQueue};
pub use state::{
    EventKind, PipelineEvent, ProgressCounters, ProgressState, WorkerId, WorkerKind, WorkerPhase,
    WorkerStatus, DEFAULT_EVENT_CAPACITY,
};
pub use stop::StopSignal;
pub use store::SharedStore;
pub use task::{expand_tasks, search_query, SearchTask, TitleTier};
pub use update::update;
pub use view_model::{ProgressSnapshot, WorkerRowView};
