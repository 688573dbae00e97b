use std::sync::{Arc, Barrier};
use std::thread;

use chrono::NaiveTime;
use jobscout_core::{
    EventKind, ProgressState, SharedStore, StatusMsg, Verdict, WorkerId, WorkerPhase,
};
use pretty_assertions::assert_eq;

fn noon() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap()
}

#[test]
fn second_claim_of_same_url_is_rejected() {
    let store = SharedStore::new(ProgressState::new(1, 1));
    assert!(store.try_claim_url("https://jobs.lever.co/acme/1"));
    assert!(!store.try_claim_url("https://jobs.lever.co/acme/1"));
    assert!(store.try_claim_url("https://jobs.lever.co/acme/2"));
    assert_eq!(store.seen_count(), 2);
}

#[test]
fn concurrent_claims_of_one_url_yield_exactly_one_winner() {
    const THREADS: usize = 16;
    let store = Arc::new(SharedStore::new(ProgressState::new(THREADS, 1)));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let store = store.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                (0..200)
                    .filter(|i| store.try_claim_url(&format!("https://boards.greenhouse.io/x/{i}")))
                    .count()
            })
        })
        .collect();

    let winners: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(winners, 200);
    assert_eq!(store.seen_count(), 200);
}

#[test]
fn snapshot_reflects_reports() {
    let store = SharedStore::new(ProgressState::new(2, 1));
    store.report_at(
        StatusMsg::WorkerPhase {
            id: WorkerId::scraper(2),
            phase: WorkerPhase::Searching,
            label: "\"Quant\" \"USA\"".into(),
        },
        noon(),
    );
    store.report_at(
        StatusMsg::JobFound {
            scraper: WorkerId::scraper(2),
            title: "Quant at Acme".into(),
            backlog: 1,
        },
        noon(),
    );
    store.report_at(
        StatusMsg::Analyzed {
            title: "Quant at Acme".into(),
            verdict: Verdict::Match { score: 8 },
        },
        noon(),
    );

    let snapshot = store.snapshot();
    assert_eq!(snapshot.scrapers[1].phase, WorkerPhase::FoundJob { backlog: 1 });
    assert_eq!(snapshot.scrapers[1].label, "Quant at Acme");
    assert_eq!(snapshot.scrapers[0].phase, WorkerPhase::Initializing);
    assert_eq!(snapshot.counters.jobs_scraped, 1);
    assert_eq!(snapshot.counters.matches_found, 1);
    assert_eq!(snapshot.events.len(), 2);
    assert_eq!(snapshot.events[0].kind, EventKind::Match { score: 8 });
    assert_eq!(snapshot.events[1].kind, EventKind::Found);
}
