use chrono::NaiveTime;

use crate::msg::Verdict;
use crate::{EventKind, PipelineEvent, ProgressState, StatusMsg, WorkerPhase};

/// Pure update function: applies one status message to the progress state.
///
/// `now` stamps any event the message produces. Messages naming an unknown worker
/// slot still update counters and events.
pub fn update(state: &mut ProgressState, msg: StatusMsg, now: NaiveTime) {
    let event = |kind: EventKind, text: String| PipelineEvent { at: now, kind, text };
    match msg {
        StatusMsg::WorkerPhase { id, phase, label } => {
            if let Some(worker) = state.worker_mut(id) {
                worker.phase = phase;
                worker.label = label;
            }
        }
        StatusMsg::QueueLevels { tasks, backlog } => {
            let counters = state.counters_mut();
            counters.tasks_remaining = tasks;
            counters.analysis_backlog = backlog;
        }
        StatusMsg::JobFound {
            scraper,
            title,
            backlog,
        } => {
            let counters = state.counters_mut();
            counters.jobs_scraped += 1;
            counters.analysis_backlog = backlog;
            if let Some(worker) = state.worker_mut(scraper) {
                worker.phase = WorkerPhase::FoundJob { backlog };
                worker.label = title.clone();
            }
            state.push_event(event(EventKind::Found, title));
        }
        StatusMsg::Analyzed { title, verdict } => {
            let kind = match verdict {
                Verdict::Match { score } => {
                    state.counters_mut().matches_found += 1;
                    EventKind::Match { score }
                }
                Verdict::NoMatch { score } => EventKind::NoMatch { score },
                Verdict::Failed => {
                    state.counters_mut().scoring_failures += 1;
                    EventKind::AnalysisFailed
                }
            };
            state.push_event(event(kind, title));
        }
        StatusMsg::ScoringError { detail } => {
            state.push_event(event(EventKind::ScoringError, detail));
        }
        StatusMsg::TransportFailure { scraper, host } => {
            state.counters_mut().transport_failures += 1;
            state.push_event(event(
                EventKind::TransportFailure,
                format!("{scraper} failed on {host}."),
            ));
        }
        StatusMsg::Notice(text) => state.push_event(event(EventKind::Notice, text)),
    }
}
