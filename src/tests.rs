use {
    crate::config::Params,
    crate::detector_core::{
        DetectionEngine, Dispatched, EventError, EventKind, InvalidEvent, LineOutcome, Source,
        Verdict,
    },
    serde_json::json,
};

fn engine(depth: usize, window: usize) -> DetectionEngine {
    DetectionEngine::new(Params::new(depth, window).unwrap())
}

fn purchase(id: u64, amount: &str) -> String {
    format!(
        r#"{{"event_type":"purchase", "timestamp":"2017-06-13 11:33:01", "id": "{}", "amount": "{}"}}"#,
        id, amount
    )
}

fn befriend(id1: u64, id2: u64) -> String {
    format!(
        r#"{{"event_type":"befriend", "timestamp":"2017-06-13 11:33:01", "id1": "{}", "id2": "{}"}}"#,
        id1, id2
    )
}

fn unfriend(id1: u64, id2: u64) -> String {
    format!(
        r#"{{"event_type":"unfriend", "timestamp":"2017-06-13 11:33:01", "id1": "{}", "id2": "{}"}}"#,
        id1, id2
    )
}

/// D=1, T=2: users 1 and 2 are friends, 2 bought 10 and 20, 1 bought 15
fn seeded_engine() -> DetectionEngine {
    let mut engine = engine(1, 2);
    for line in [befriend(1, 2), purchase(2, "10"), purchase(2, "20"), purchase(1, "15")] {
        let outcome = engine.process_line(&line, Source::Batch);
        assert!(matches!(outcome, LineOutcome::Applied(_)), "{:?}", outcome);
    }
    engine
}

#[test]
fn test_stream_outlier_is_flagged() {
    let mut engine = seeded_engine();

    let outcome = engine.process_line(&purchase(1, "1000"), Source::Stream);

    let LineOutcome::Scored(Verdict::Flagged(flagged)) = outcome else {
        panic!("expected flagged verdict");
    };
    assert_eq!(flagged.mean, "15.00");
    assert_eq!(flagged.sd, "5.00");
    assert_eq!(flagged.id, json!("1"));
    assert_eq!(flagged.amount, json!("1000"));
    assert_eq!(flagged.timestamp, json!("2017-06-13 11:33:01"));
}

#[test]
fn test_stream_purchase_below_threshold() {
    let mut engine = seeded_engine();

    let outcome = engine.process_line(&purchase(1, "25"), Source::Stream);

    assert!(matches!(outcome, LineOutcome::Scored(Verdict::NotFlagged)));
}

#[test]
fn test_batch_purchases_are_never_scored() {
    let mut engine = seeded_engine();

    let outcome = engine.process_line(&purchase(1, "1000"), Source::Batch);

    assert!(matches!(outcome, LineOutcome::Applied(EventKind::Purchase)));
}

#[test]
fn test_negative_amount_is_rejected_without_mutation() {
    let mut engine = seeded_engine();
    let before = engine.purchases_recorded();

    let outcome = engine.process_line(&purchase(1, "-5"), Source::Stream);

    assert!(matches!(
        outcome,
        LineOutcome::Rejected(EventError::Invalid(InvalidEvent::NegativeAmount(_)))
    ));
    assert_eq!(engine.purchases_recorded(), before);
    assert_eq!(engine.users().history(1).unwrap().len(), 1);
}

#[test]
fn test_rejected_purchase_creates_no_user() {
    let mut engine = engine(1, 2);

    let outcome = engine.dispatch(&json!({"event_type": "purchase", "timestamp": "t", "id": "77"}));

    assert!(matches!(outcome, Dispatched::Rejected(InvalidEvent::MissingField { .. })));
    assert!(!engine.users().contains(77));
}

#[test]
fn test_malformed_line_is_rejected() {
    let mut engine = seeded_engine();

    let outcome = engine.process_line("{not json", Source::Stream);

    assert!(matches!(outcome, LineOutcome::Rejected(EventError::Malformed(_))));
}

#[test]
fn test_non_utf8_and_blank_lines_are_rejected() {
    let mut engine = seeded_engine();
    let before = engine.purchases_recorded();

    let garbage = engine.process_raw(b"\xff\xfe garbage line", Source::Batch);
    assert!(matches!(garbage, LineOutcome::Rejected(EventError::NotUtf8(_))));

    let blank = engine.process_raw(b"   ", Source::Stream);
    assert!(matches!(blank, LineOutcome::Rejected(EventError::Malformed(_))));

    assert_eq!(engine.purchases_recorded(), before);
    let outcome = engine.process_raw(purchase(1, "1000").as_bytes(), Source::Stream);
    assert!(matches!(outcome, LineOutcome::Scored(Verdict::Flagged(_))));
}

#[test]
fn test_replayed_befriend_does_not_grow_friend_set() {
    let mut engine = seeded_engine();

    engine.process_line(&befriend(2, 1), Source::Stream);
    engine.process_line(&befriend(1, 2), Source::Batch);

    assert_eq!(engine.users().friends(1).unwrap().len(), 1);
    assert_eq!(engine.users().friends(2).unwrap().len(), 1);
}

#[test]
fn test_insufficient_data_after_unfriend() {
    let mut engine = seeded_engine();

    engine.process_line(&unfriend(1, 2), Source::Stream);
    let outcome = engine.process_line(&purchase(1, "1000"), Source::Stream);

    assert!(matches!(
        outcome,
        LineOutcome::Scored(Verdict::InsufficientData { window_len: 0 })
    ));
}

#[test]
fn test_window_spans_second_degree_friends() {
    // 1 - 2 - 3, D=2, T=3: 3's purchases count toward 1's neighborhood
    let mut engine = engine(2, 3);
    for line in [
        befriend(1, 2),
        befriend(2, 3),
        purchase(3, "10"),
        purchase(3, "10"),
        purchase(2, "10"),
    ] {
        engine.process_line(&line, Source::Batch);
    }

    let outcome = engine.process_line(&purchase(1, "10.5"), Source::Stream);

    let LineOutcome::Scored(Verdict::Flagged(flagged)) = outcome else {
        panic!("expected flagged verdict");
    };
    assert_eq!(flagged.mean, "10.00");
    assert_eq!(flagged.sd, "0.00");
}

#[test]
fn test_window_keeps_only_latest_t_purchases() {
    // T=2: of 2's purchases 1, 1, 100, 100 only the last two are retained
    let mut engine = engine(1, 2);
    engine.process_line(&befriend(1, 2), Source::Batch);
    for amount in ["1", "1", "100", "100"] {
        engine.process_line(&purchase(2, amount), Source::Batch);
    }

    let outcome = engine.process_line(&purchase(1, "99"), Source::Stream);

    assert!(matches!(outcome, LineOutcome::Scored(Verdict::NotFlagged)));
}

#[test]
fn test_stream_events_update_graph() {
    let mut engine = engine(1, 2);
    engine.process_line(&purchase(2, "10"), Source::Batch);
    engine.process_line(&purchase(2, "20"), Source::Batch);

    let outcome = engine.process_line(&befriend(1, 2), Source::Stream);
    assert!(matches!(outcome, LineOutcome::Applied(EventKind::Befriend)));

    let outcome = engine.process_line(&purchase(1, "30"), Source::Stream);
    assert!(matches!(outcome, LineOutcome::Scored(Verdict::Flagged(_))));
}
