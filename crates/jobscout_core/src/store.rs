use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{Local, NaiveTime};

use crate::{update, ProgressSnapshot, ProgressState, StatusMsg};

/// Owner of all state shared between workers: the seen-URL set and the
/// progress model, behind one lock.
///
/// Each method holds the lock only for its own read-modify-write; callers never see
/// the raw containers and must not call into the store while doing IO.
#[derive(Debug)]
pub struct SharedStore {
    inner: Mutex<StoreState>,
}

#[derive(Debug)]
struct StoreState {
    seen_urls: HashSet<String>,
    progress: ProgressState,
}

impl SharedStore {
    pub fn new(progress: ProgressState) -> Self {
        Self {
            inner: Mutex::new(StoreState {
                seen_urls: HashSet::new(),
                progress,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically records `url` as seen. Returns `true` only for the first caller.
    pub fn try_claim_url(&self, url: &str) -> bool {
        let mut state = self.lock();
        if state.seen_urls.contains(url) {
            return false;
        }
        state.seen_urls.insert(url.to_string())
    }

    pub fn seen_count(&self) -> usize {
        self.lock().seen_urls.len()
    }

    /// Applies a status message stamped with the local wall-clock time.
    pub fn report(&self, msg: StatusMsg) {
        self.report_at(msg, Local::now().time());
    }

    pub fn report_at(&self, msg: StatusMsg, now: NaiveTime) {
        update(&mut self.lock().progress, msg, now);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.lock().progress.view()
    }
}
