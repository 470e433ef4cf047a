use std::sync::Once;
use std::time::{Duration, Instant};

use poller_core::{ContentDigest, RunLimits, RunPhase, RunState, StopReason, Uniqueness};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(poll_logging::initialize_for_tests);
}

fn limits(secs: u64, max_unique: usize) -> RunLimits {
    RunLimits {
        run_duration: Duration::from_secs(secs),
        max_unique,
    }
}

#[test]
fn running_until_deadline() {
    init_logging();
    let start = Instant::now();
    let state = RunState::new(limits(600, 20), start);

    assert_eq!(state.stop_reason(start), None);
    assert_eq!(state.stop_reason(start + Duration::from_secs(599)), None);
    assert_eq!(
        state.stop_reason(start + Duration::from_secs(600)),
        Some(StopReason::TimeLimit)
    );
    assert_eq!(state.remaining(start + Duration::from_secs(700)), Duration::ZERO);
    assert_eq!(state.elapsed(start + Duration::from_secs(90)), Duration::from_secs(90));
}

#[test]
fn quota_stops_the_run() {
    init_logging();
    let start = Instant::now();
    let mut state = RunState::new(limits(600, 2), start);

    assert_eq!(state.record_saved(), 1);
    assert_eq!(state.stop_reason(start), None);
    assert_eq!(state.record_saved(), 2);
    assert_eq!(state.stop_reason(start), Some(StopReason::QuotaReached));
}

#[test]
fn time_limit_reported_when_both_limits_met() {
    let start = Instant::now();
    let mut state = RunState::new(limits(1, 1), start);
    state.record_saved();

    assert_eq!(
        state.stop_reason(start + Duration::from_secs(2)),
        Some(StopReason::TimeLimit)
    );
}

#[test]
fn zero_quota_stops_before_first_query() {
    let start = Instant::now();
    let state = RunState::new(limits(600, 0), start);
    assert_eq!(state.stop_reason(start), Some(StopReason::QuotaReached));
}

#[test]
fn finish_reports_counters_and_keeps_first_reason() {
    init_logging();
    let start = Instant::now();
    let mut state = RunState::new(limits(600, 20), start);
    state.begin_query();
    state.begin_query();
    assert_eq!(state.begin_query(), 3);
    assert_eq!(state.observe(ContentDigest::of("a")), Uniqueness::New);
    state.record_saved();

    let summary = state.finish(start + Duration::from_secs(30), StopReason::Interrupted);
    assert_eq!(summary.reason, StopReason::Interrupted);
    assert_eq!(summary.queries, 3);
    assert_eq!(summary.unique, 1);
    assert_eq!(summary.runtime, Duration::from_secs(30));
    assert_eq!(state.phase(), RunPhase::Stopped(StopReason::Interrupted));

    let again = state.finish(start + Duration::from_secs(40), StopReason::TimeLimit);
    assert_eq!(again.reason, StopReason::Interrupted);
    assert_eq!(
        state.stop_reason(start + Duration::from_secs(1)),
        Some(StopReason::Interrupted)
    );
}

#[test]
fn summary_block_lists_final_statistics() {
    let start = Instant::now();
    let mut state = RunState::new(limits(600, 20), start);
    state.begin_query();
    state.record_saved();
    let summary = state.finish(start + Duration::from_secs(90), StopReason::QuotaReached);

    let text = summary.to_string();
    assert_eq!(
        text,
        "========== Final Results ==========\n\
         Program completed: collected enough unique responses\n\
         Total runtime: 1.50 minutes\n\
         Total queries: 1\n\
         Unique responses collected: 1\n\
         =================================="
    );
}

#[test]
fn stop_reasons_have_readable_labels() {
    assert_eq!(StopReason::TimeLimit.to_string(), "time limit reached");
    assert_eq!(
        StopReason::QuotaReached.to_string(),
        "collected enough unique responses"
    );
    assert_eq!(StopReason::Interrupted.to_string(), "stopped by user");
}

#[test]
fn unrepresentable_duration_does_not_overflow() {
    init_logging();
    let start = Instant::now();
    let state = RunState::new(
        RunLimits {
            run_duration: Duration::from_secs(u64::MAX),
            max_unique: 20,
        },
        start,
    );

    assert!(state.deadline() > start + Duration::from_secs(86_400 * 365));
    assert_eq!(state.stop_reason(start + Duration::from_secs(3_600)), None);
    assert!(state.remaining(start) > Duration::from_secs(86_400 * 365));
}
