use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use jobscout_core::{Dequeue, Drain, QueueClosed, WorkQueue};

#[test]
fn fifo_order_and_pending_count() {
    let queue = WorkQueue::new();
    queue.enqueue(1).unwrap();
    queue.enqueue(2).unwrap();
    queue.enqueue(3).unwrap();
    assert_eq!(queue.pending_count(), 3);

    assert_eq!(queue.try_dequeue(), Some(1));
    assert_eq!(queue.try_dequeue(), Some(2));
    assert_eq!(queue.pending_count(), 1);
    assert_eq!(queue.in_flight(), 2);
}

#[test]
fn empty_is_not_complete_while_items_are_in_flight() {
    let queue: WorkQueue<&str> = ["a", "b"].into_iter().collect();

    let a = queue.try_dequeue();
    let b = queue.try_dequeue();
    assert_eq!((a, b), (Some("a"), Some("b")));
    assert_eq!(queue.pending_count(), 0);
    assert!(!queue.is_complete());

    queue.task_done();
    assert!(!queue.is_complete());
    queue.task_done();
    assert!(queue.is_complete());
}

#[test]
fn await_drain_releases_only_after_last_task_done() {
    let queue: Arc<WorkQueue<u32>> = Arc::new((0..4).collect());
    let worker = {
        let queue = queue.clone();
        thread::spawn(move || {
            while let Some(_item) = queue.try_dequeue() {
                thread::sleep(Duration::from_millis(10));
                queue.task_done();
            }
        })
    };

    assert_eq!(queue.await_drain_and_complete(), Drain::Complete);
    assert_eq!(queue.pending_count(), 0);
    assert_eq!(queue.in_flight(), 0);
    worker.join().unwrap();
}

#[test]
fn empty_queue_is_immediately_complete() {
    let queue: WorkQueue<u32> = WorkQueue::new();
    assert!(queue.is_complete());
    assert_eq!(queue.await_drain_and_complete(), Drain::Complete);
}

#[test]
fn timed_dequeue_times_out_then_sees_late_item() {
    let queue = Arc::new(WorkQueue::new());
    let started = Instant::now();
    assert_eq!(
        queue.dequeue_timeout(Duration::from_millis(30)),
        Dequeue::TimedOut
    );
    assert!(started.elapsed() >= Duration::from_millis(30));

    let producer = {
        let queue = queue.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            queue.enqueue("late").unwrap();
        })
    };
    assert_eq!(
        queue.dequeue_timeout(Duration::from_secs(5)),
        Dequeue::Item("late")
    );
    producer.join().unwrap();
}

#[test]
fn close_wakes_waiters_and_rejects_new_work() {
    let queue: Arc<WorkQueue<u32>> = Arc::new(WorkQueue::new());
    queue.enqueue(7).unwrap();

    let joiner = {
        let queue = queue.clone();
        thread::spawn(move || queue.await_drain_and_complete())
    };
    let consumer = {
        let queue = queue.clone();
        thread::spawn(move || {
            // Take the only item, then block on an empty queue.
            let first = queue.dequeue_timeout(Duration::from_secs(5));
            let second = queue.dequeue_timeout(Duration::from_secs(30));
            (first, second)
        })
    };

    thread::sleep(Duration::from_millis(30));
    queue.close();

    assert_eq!(joiner.join().unwrap(), Drain::Closed);
    let (first, second) = consumer.join().unwrap();
    assert_eq!(first, Dequeue::Item(7));
    assert_eq!(second, Dequeue::Closed);
    assert_eq!(queue.enqueue(8), Err(QueueClosed));
    assert_eq!(queue.try_dequeue(), None);
}

#[test]
fn bounded_enqueue_blocks_until_space() {
    let queue = Arc::new(WorkQueue::bounded(1));
    queue.enqueue(1).unwrap();

    let producer = {
        let queue = queue.clone();
        thread::spawn(move || {
            let started = Instant::now();
            queue.enqueue(2).unwrap();
            started.elapsed()
        })
    };

    thread::sleep(Duration::from_millis(40));
    assert_eq!(queue.pending_count(), 1);
    assert_eq!(queue.try_dequeue(), Some(1));

    let waited = producer.join().unwrap();
    assert!(waited >= Duration::from_millis(30));
    assert_eq!(queue.try_dequeue(), Some(2));
}

#[test]
fn bounded_enqueue_unblocks_on_close() {
    let queue = Arc::new(WorkQueue::bounded(1));
    queue.enqueue(1).unwrap();
    let producer = {
        let queue = queue.clone();
        thread::spawn(move || queue.enqueue(2))
    };
    thread::sleep(Duration::from_millis(20));
    queue.close();
    assert_eq!(producer.join().unwrap(), Err(QueueClosed));
}

#[test]
fn task_guard_marks_done_even_when_consumer_panics() {
    let queue: Arc<WorkQueue<u32>> = Arc::new([1].into_iter().collect());
    let consumer = {
        let queue = queue.clone();
        thread::spawn(move || {
            let _item = queue.try_dequeue();
            let _done = queue.task_guard();
            panic!("consumer blew up");
        })
    };
    assert!(consumer.join().is_err());
    assert!(queue.is_complete());
}
