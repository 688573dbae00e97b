use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

/// Global, cooperative stop flag shared by every pipeline thread.
///
/// Reads are a single atomic load so loop heads can check it freely. Sleepers
/// parked in [`StopSignal::sleep`] wake as soon as the flag is raised.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<StopInner>,
}

#[derive(Debug, Default)]
struct StopInner {
    raised: AtomicBool,
    lock: Mutex<()>,
    wake: Condvar,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.inner.raised.load(Ordering::Acquire)
    }

    pub fn set(&self) {
        let _guard = self.inner.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.inner.raised.store(true, Ordering::Release);
        self.inner.wake.notify_all();
    }

    /// Sleeps for `duration` unless stop is raised first.
    /// Returns `true` when woken by stop.
    pub fn sleep(&self, duration: Duration) -> bool {
        let guard = self.inner.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (_guard, _) = self
            .inner
            .wake
            .wait_timeout_while(guard, duration, |_| !self.is_set())
            .unwrap_or_else(PoisonError::into_inner);
        self.is_set()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::{Duration, Instant};

    use super::StopSignal;

    #[test]
    fn sleep_runs_full_duration_without_stop() {
        let stop = StopSignal::new();
        let started = Instant::now();
        assert!(!stop.sleep(Duration::from_millis(30)));
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn set_wakes_sleepers_early() {
        let stop = StopSignal::new();
        let sleeper = {
            let stop = stop.clone();
            thread::spawn(move || {
                let started = Instant::now();
                let woke = stop.sleep(Duration::from_secs(30));
                (woke, started.elapsed())
            })
        };
        thread::sleep(Duration::from_millis(20));
        stop.set();
        let (woke, elapsed) = sleeper.join().unwrap();
        assert!(woke);
        assert!(elapsed < Duration::from_secs(5));
    }
}
