use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Returned by [`WorkQueue::enqueue`] once the queue has been closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("work queue is closed")]
pub struct QueueClosed;

/// Result of a timed dequeue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dequeue<T> {
    Item(T),
    TimedOut,
    Closed,
}

/// How [`WorkQueue::await_drain_and_complete`] was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drain {
    /// Every enqueued item was dequeued and marked done.
    Complete,
    /// The queue was closed before that happened.
    Closed,
}

/// FIFO work queue with join semantics.
///
/// Every successful `enqueue` must be balanced by one `task_done` after the
/// dequeued item is fully processed; the queue is drain-and-complete when no items
/// are pending and none are in flight. Closing wakes every waiter and makes further
/// dequeues report `Closed`, leaving pending items unprocessed.
#[derive(Debug)]
pub struct WorkQueue<T> {
    state: Mutex<QueueState<T>>,
    capacity: Option<usize>,
    available: Condvar,
    space: Condvar,
    settled: Condvar,
}

#[derive(Debug)]
struct QueueState<T> {
    items: VecDeque<T>,
    unfinished: usize,
    closed: bool,
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        Self::with_capacity(None)
    }

    /// Queue whose `enqueue` blocks while `capacity` items are pending.
    pub fn bounded(capacity: usize) -> Self {
        Self::with_capacity(Some(capacity.max(1)))
    }

    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                unfinished: 0,
                closed: false,
            }),
            capacity,
            available: Condvar::new(),
            space: Condvar::new(),
            settled: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn enqueue(&self, item: T) -> Result<(), QueueClosed> {
        let mut state = self.lock();
        while !state.closed && self.is_full(&state) {
            state = self.space.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        if state.closed {
            return Err(QueueClosed);
        }
        state.items.push_back(item);
        state.unfinished += 1;
        self.available.notify_one();
        Ok(())
    }

    fn is_full(&self, state: &QueueState<T>) -> bool {
        self.capacity.is_some_and(|cap| state.items.len() >= cap)
    }

    /// Non-blocking dequeue. `None` when empty or closed.
    pub fn try_dequeue(&self) -> Option<T> {
        let mut state = self.lock();
        if state.closed {
            return None;
        }
        let item = state.items.pop_front();
        if item.is_some() {
            self.space.notify_one();
        }
        item
    }

    /// Waits up to `timeout` for an item.
    pub fn dequeue_timeout(&self, timeout: Duration) -> Dequeue<T> {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        loop {
            if state.closed {
                return Dequeue::Closed;
            }
            if let Some(item) = state.items.pop_front() {
                self.space.notify_one();
                return Dequeue::Item(item);
            }
            let now = Instant::now();
            if now >= deadline {
                return Dequeue::TimedOut;
            }
            state = self
                .available
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Marks one previously dequeued item as fully processed.
    pub fn task_done(&self) {
        let mut state = self.lock();
        debug_assert!(state.unfinished > 0, "task_done called more times than enqueue");
        state.unfinished = state.unfinished.saturating_sub(1);
        if state.unfinished == 0 {
            self.settled.notify_all();
        }
    }

    /// Returns a guard that marks one dequeued item done when dropped, so a
    /// panicking consumer still balances its `enqueue`.
    pub fn task_guard(&self) -> TaskGuard<'_, T> {
        TaskGuard { queue: self }
    }

    /// Items enqueued but not yet dequeued.
    pub fn pending_count(&self) -> usize {
        self.lock().items.len()
    }

    /// Items dequeued but not yet marked done.
    pub fn in_flight(&self) -> usize {
        let state = self.lock();
        state.unfinished - state.items.len()
    }

    /// True when nothing is pending and nothing is in flight.
    pub fn is_complete(&self) -> bool {
        self.lock().unfinished == 0
    }

    /// Blocks until the queue is drain-and-complete or closed.
    pub fn await_drain_and_complete(&self) -> Drain {
        let mut state = self.lock();
        loop {
            if state.closed {
                return Drain::Closed;
            }
            if state.unfinished == 0 {
                return Drain::Complete;
            }
            state = self.settled.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Closes the queue and wakes every blocked producer, consumer and joiner.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        self.available.notify_all();
        self.space.notify_all();
        self.settled.notify_all();
    }
}

/// See [`WorkQueue::task_guard`].
#[must_use = "the item is marked done as soon as the guard is dropped"]
pub struct TaskGuard<'a, T> {
    queue: &'a WorkQueue<T>,
}

impl<T> Drop for TaskGuard<'_, T> {
    fn drop(&mut self) {
        self.queue.task_done();
    }
}
