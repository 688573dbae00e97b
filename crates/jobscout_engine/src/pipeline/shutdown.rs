use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jobscout_core::{JobRecord, SearchTask, StopSignal, WorkQueue};
use pipeline_logging::pipeline_warn;

/// Operator interrupt for a running pipeline. Cheap to clone and safe to call
/// from a signal-handling thread.
#[derive(Clone)]
pub struct ShutdownHandle {
    stop: StopSignal,
    tasks: Arc<WorkQueue<SearchTask>>,
    jobs: Arc<WorkQueue<JobRecord>>,
    interrupted: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub(super) fn new(
        stop: StopSignal,
        tasks: Arc<WorkQueue<SearchTask>>,
        jobs: Arc<WorkQueue<JobRecord>>,
        interrupted: Arc<AtomicBool>,
    ) -> Self {
        Self {
            stop,
            tasks,
            jobs,
            interrupted,
        }
    }

    /// Raises stop and closes both queues. Work still queued is abandoned; records
    /// already being scored finish and get their audit row.
    pub fn interrupt(&self) {
        if self.interrupted.swap(true, Ordering::AcqRel) {
            return;
        }
        pipeline_warn!("Interrupt received; abandoning queued work");
        self.stop.set();
        self.tasks.close();
        self.jobs.close();
    }
}
