use dupagent::duplicates::{
    start_scan_with_token, DuplicateFinder, EventSink, ScanEvent, ScanOutcome, ScanState,
    ScanStatus,
};
use dupagent::scanner::ScanOptions;
use dupagent::signal::CancelToken;
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Records events and trips the token on the first event matching `trigger`.
struct CancellingSink {
    token: CancelToken,
    trigger: fn(&ScanEvent) -> bool,
    events: RefCell<Vec<ScanEvent>>,
}

impl CancellingSink {
    fn new(token: CancelToken) -> Self {
        Self::on(token, |event| matches!(event, ScanEvent::Progress(_)))
    }

    fn on(token: CancelToken, trigger: fn(&ScanEvent) -> bool) -> Self {
        Self {
            token,
            trigger,
            events: RefCell::new(Vec::new()),
        }
    }
}

impl EventSink for CancellingSink {
    fn emit(&self, event: ScanEvent) {
        if (self.trigger)(&event) {
            self.token.cancel();
        }
        self.events.borrow_mut().push(event);
    }
}

fn populate(dir: &Path, count: usize) {
    for i in 0..count {
        fs::write(dir.join(format!("copy{i:03}.dat")), [7u8; 512]).unwrap();
    }
}

#[test]
fn test_cancel_during_hashing_yields_no_groups() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 20);

    let token = CancelToken::new();
    let sink = CancellingSink::new(token.clone());
    let mut finder = DuplicateFinder::new(ScanOptions::default()).with_shutdown_flag(token.flag());

    let outcome = finder.scan(&[dir.path().to_path_buf()], &sink);

    assert_eq!(outcome, ScanOutcome::Cancelled);
    assert_eq!(finder.state(), ScanState::Cancelled);

    let events = sink.events.into_inner();
    let hashed = events
        .iter()
        .filter(|e| matches!(e, ScanEvent::Status(ScanStatus::HashingFile { .. })))
        .count();
    assert_eq!(hashed, 1);
    assert_eq!(
        events.last(),
        Some(&ScanEvent::Status(ScanStatus::Cancelled))
    );
    assert!(!events
        .iter()
        .any(|e| matches!(e, ScanEvent::Status(ScanStatus::Finished { .. }))));
}

#[test]
fn test_cancel_during_walk_never_hashes() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 20);
    for sub in ["a", "b", "c"] {
        let nested = dir.path().join(sub);
        fs::create_dir(&nested).unwrap();
        populate(&nested, 10);
    }

    let token = CancelToken::new();
    let sink = CancellingSink::on(token.clone(), |event| {
        matches!(event, ScanEvent::Status(ScanStatus::Walking))
    });
    let mut finder = DuplicateFinder::new(ScanOptions::default()).with_shutdown_flag(token.flag());

    let roots = vec![dir.path().join("a"), dir.path().join("b"), dir.path().to_path_buf()];
    let outcome = finder.scan(&roots, &sink);

    assert_eq!(outcome, ScanOutcome::Cancelled);
    assert_eq!(finder.state(), ScanState::Cancelled);

    let events = sink.events.into_inner();
    assert_eq!(events.first(), Some(&ScanEvent::Status(ScanStatus::Walking)));
    assert!(!events
        .iter()
        .any(|e| matches!(e, ScanEvent::Status(ScanStatus::Hashing { .. }))));
    assert!(!events
        .iter()
        .any(|e| matches!(e, ScanEvent::Status(ScanStatus::HashingFile { .. }))));
    assert!(!events.iter().any(|e| matches!(e, ScanEvent::Progress(_))));
    assert_eq!(
        events.last(),
        Some(&ScanEvent::Status(ScanStatus::Cancelled))
    );
}

#[test]
fn test_cancel_before_start_skips_walk() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 3);

    let token = CancelToken::new();
    token.cancel();

    let handle =
        start_scan_with_token(vec![dir.path().to_path_buf()], ScanOptions::default(), token)
            .unwrap();
    let mut seen = Vec::new();
    let outcome = handle.wait_with(|event| seen.push(event.clone())).unwrap();

    assert!(outcome.is_cancelled());
    assert!(!seen.iter().any(|e| matches!(e, ScanEvent::Progress(_))));
}

#[test]
fn test_handle_cancel_ends_with_finished_event() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 50);

    let token = CancelToken::new();
    let handle = start_scan_with_token(
        vec![dir.path().to_path_buf()],
        ScanOptions::default(),
        token.clone(),
    )
    .unwrap();
    handle.cancel();
    assert!(token.is_cancelled());

    let events: Vec<ScanEvent> = handle.events().iter().collect();

    // The worker may finish before observing the request; either way the
    // outcome is the final message.
    match events.last() {
        Some(ScanEvent::Finished(ScanOutcome::Cancelled)) => {
            assert!(events.contains(&ScanEvent::Status(ScanStatus::Cancelled)));
        }
        Some(ScanEvent::Finished(ScanOutcome::Completed { groups, .. })) => {
            assert_eq!(groups.len(), 1);
        }
        other => panic!("unexpected final event: {other:?}"),
    }
}

#[test]
fn test_dropping_handle_stops_worker() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 10);

    let token = CancelToken::new();
    let handle = start_scan_with_token(
        vec![dir.path().to_path_buf()],
        ScanOptions::default(),
        token.clone(),
    )
    .unwrap();
    drop(handle);

    assert!(token.is_cancelled());
}
