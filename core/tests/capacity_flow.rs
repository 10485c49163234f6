//! The 5-step capacity interview end to end: ordering, retries,
//! completion, auto-clear.

use ascore_core::capacity_interview::CapacityReply;
use ascore_core::clock::ManualClock;
use ascore_core::config::CoreConfig;
use ascore_core::content::QuestionCatalog;
use ascore_core::engine::AssessmentCore;
use ascore_core::store::MemoryProfileStore;
use chrono::{TimeZone, Utc};
use std::sync::Arc;

const PHONE: &str = "628111000222";

fn test_core(seed: u64) -> AssessmentCore {
    let clock = Arc::new(ManualClock::starting_at(
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
    ));
    AssessmentCore::new(
        seed,
        CoreConfig::default(),
        QuestionCatalog::builtin().unwrap(),
        Arc::new(MemoryProfileStore::default()),
        clock,
    )
    .unwrap()
}

const ANSWERS: [&str; 5] = ["500 ribu", "25 hari", "60%", "2 juta", "Rp 500.000"];

fn run_full_dialogue(core: &AssessmentCore) -> CapacityReply {
    core.start_capacity(PHONE);
    let mut last = CapacityReply::NoActiveInterview;
    for answer in ANSWERS {
        last = core.answer_capacity(PHONE, answer);
    }
    last
}

#[test]
fn full_dialogue_collects_all_fields_and_computes_rpc() {
    let core = test_core(42);
    let prompt = core.start_capacity(PHONE);
    assert!(prompt.contains("omzet"), "first prompt asks for revenue");

    for (i, answer) in ANSWERS.iter().enumerate().take(4) {
        match core.answer_capacity(PHONE, answer) {
            CapacityReply::Next { step, .. } => assert_eq!(step, i + 1),
            other => panic!("expected Next after answer {i}, got {other:?}"),
        }
    }

    match core.answer_capacity(PHONE, ANSWERS[4]) {
        CapacityReply::Completed { data, rpc } => {
            assert_eq!(data["daily_revenue"], 500_000.0);
            assert_eq!(data["active_days"], 25.0);
            assert_eq!(data["cogs_percentage"], 60.0);
            assert_eq!(data["household_expenses"], 2_000_000.0);
            assert_eq!(data["existing_obligations"], 500_000.0);
            assert_eq!(rpc.monthly_income, 12_500_000.0);
            assert_eq!(rpc.monthly_expenses, 10_000_000.0);
            assert_eq!(rpc.sustainable_disposable_cash, 2_500_000.0);
            assert_eq!(rpc.max_installment, 750_000.0);
            assert_eq!(rpc.capacity_score, 74);
        }
        other => panic!("expected Completed, got {other:?}"),
    }
}

#[test]
fn unparseable_reply_repeats_the_same_step() {
    let core = test_core(42);
    core.start_capacity(PHONE);

    match core.answer_capacity(PHONE, "tidak tahu") {
        CapacityReply::Retry { field, prompt } => {
            assert_eq!(field, "daily_revenue");
            assert!(prompt.contains("omzet"), "retry repeats the question");
        }
        other => panic!("expected Retry, got {other:?}"),
    }

    // The step did not advance: a valid revenue is still accepted here.
    match core.answer_capacity(PHONE, "500 ribu") {
        CapacityReply::Next { step, .. } => assert_eq!(step, 1),
        other => panic!("expected Next, got {other:?}"),
    }
}

#[test]
fn out_of_range_reply_repeats_the_same_step() {
    let core = test_core(42);
    core.start_capacity(PHONE);
    core.answer_capacity(PHONE, "500 ribu");

    // 50 parses fine but a month has at most 31 days.
    match core.answer_capacity(PHONE, "50 hari") {
        CapacityReply::Retry { field, .. } => assert_eq!(field, "active_days"),
        other => panic!("expected Retry, got {other:?}"),
    }
    match core.answer_capacity(PHONE, "setiap hari") {
        CapacityReply::Next { step, .. } => assert_eq!(step, 2),
        other => panic!("expected Next, got {other:?}"),
    }
}

#[test]
fn answer_without_session_is_recoverable() {
    let core = test_core(42);
    assert!(matches!(
        core.answer_capacity(PHONE, "500 ribu"),
        CapacityReply::NoActiveInterview
    ));
}

#[test]
fn same_answers_same_result_and_session_always_clears() {
    let core = test_core(42);

    let first = run_full_dialogue(&core);
    // The session is gone after completion.
    assert!(matches!(
        core.answer_capacity(PHONE, "500 ribu"),
        CapacityReply::NoActiveInterview
    ));

    let second = run_full_dialogue(&core);
    match (first, second) {
        (
            CapacityReply::Completed { data: d1, rpc: r1 },
            CapacityReply::Completed { data: d2, rpc: r2 },
        ) => {
            assert_eq!(d1, d2);
            assert_eq!(r1, r2);
        }
        other => panic!("expected two completions, got {other:?}"),
    }
}

#[test]
fn restart_replaces_the_session_from_step_zero() {
    let core = test_core(42);
    core.start_capacity(PHONE);
    core.answer_capacity(PHONE, "500 ribu");

    // Restart: back to daily revenue. A days-style answer is now out of
    // range for the currency field, proving we are on step 0 again.
    core.start_capacity(PHONE);
    assert!(matches!(
        core.answer_capacity(PHONE, "25 hari"),
        CapacityReply::Retry {
            field: "daily_revenue",
            ..
        }
    ));
    match core.answer_capacity(PHONE, "600 ribu") {
        CapacityReply::Next { step, .. } => assert_eq!(step, 1),
        other => panic!("expected Next, got {other:?}"),
    }
}
