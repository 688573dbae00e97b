use jobscout_core::{AnalysisOutcome, Dequeue, JobRecord, StatusMsg, Verdict, WorkerId, WorkerPhase};
use pipeline_logging::{
    clear_worker_label, pipeline_debug, pipeline_error, pipeline_info, pipeline_warn,
    set_worker_label,
};

use super::WorkerContext;

/// Analyzer loop: timed dequeue from the analysis queue until the whole
/// pipeline is out of work or stopped.
pub(super) fn run_analyzer(ctx: &WorkerContext, id: WorkerId) {
    set_worker_label(id.thread_name());
    set_phase(ctx, id, WorkerPhase::Idle, "");

    while !ctx.stop.is_set() {
        match ctx.jobs.dequeue_timeout(ctx.settings.analysis_poll) {
            Dequeue::Item(job) => {
                let _done = ctx.jobs.task_guard();
                analyze(ctx, id, &job);
            }
            Dequeue::TimedOut => {
                // Tasks first: a scraper still holding a task may enqueue more jobs.
                if ctx.tasks.is_complete() && ctx.jobs.pending_count() == 0 {
                    pipeline_debug!("No search tasks left and analysis queue empty");
                    break;
                }
            }
            Dequeue::Closed => break,
        }
    }

    set_phase(ctx, id, WorkerPhase::Finished, "");
    pipeline_info!("Analyzer finished");
    clear_worker_label();
}

/// Scores one record and writes exactly one audit row for it.
fn analyze(ctx: &WorkerContext, id: WorkerId, job: &JobRecord) {
    set_phase(ctx, id, WorkerPhase::Analyzing, &job.title);

    let outcome = match ctx.scorer.evaluate(&ctx.profile, &job.title) {
        Ok(result) => AnalysisOutcome::Scored(result),
        Err(err) => {
            pipeline_warn!("Scoring failed for {}: {err}", job.source_url);
            ctx.report(StatusMsg::ScoringError {
                detail: err.to_string(),
            });
            AnalysisOutcome::Failed {
                detail: err.to_string(),
            }
        }
    };

    if let Err(err) = ctx.sinks.record_audit(job, &outcome) {
        pipeline_error!("Failed to write audit row for {}: {err}", job.source_url);
    }
    if outcome.is_match() {
        if let Err(err) = ctx.sinks.record_match(job, &outcome) {
            pipeline_error!("Failed to write match row for {}: {err}", job.source_url);
        }
    }

    let verdict = match &outcome {
        AnalysisOutcome::Scored(result) if result.is_match => Verdict::Match {
            score: result.score,
        },
        AnalysisOutcome::Scored(result) => Verdict::NoMatch {
            score: result.score,
        },
        AnalysisOutcome::Failed { .. } => Verdict::Failed,
    };
    ctx.report(StatusMsg::Analyzed {
        title: job.title.clone(),
        verdict,
    });
    set_phase(ctx, id, WorkerPhase::Idle, "");
}

fn set_phase(ctx: &WorkerContext, id: WorkerId, phase: WorkerPhase, label: &str) {
    ctx.report(StatusMsg::WorkerPhase {
        id,
        phase,
        label: label.to_string(),
    });
}
