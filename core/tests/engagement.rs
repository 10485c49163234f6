//! Engagement tracking: streak arithmetic, score caps and weights,
//! persistence round-trips.

use ascore_core::clock::ManualClock;
use ascore_core::config::{CoreConfig, EngagementConfig};
use ascore_core::content::QuestionCatalog;
use ascore_core::engagement_tracker::{
    engagement_score, record_interaction, streak_ending, EngagementRecord,
};
use ascore_core::engine::AssessmentCore;
use ascore_core::store::{MemoryProfileStore, ProfileStore, SqliteProfileStore};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use std::sync::Arc;

const PHONE: &str = "628555444333";

fn day(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[test]
fn three_consecutive_days_make_a_three_day_streak() {
    let mut record = EngagementRecord::default();
    record_interaction(&mut record, "quiz", day("2026-03-02"));
    record_interaction(&mut record, "quiz", day("2026-03-03"));
    record_interaction(&mut record, "check_data", day("2026-03-04"));
    assert_eq!(record.streak_days, 3);
    assert_eq!(record.total_interactions, 3);
}

#[test]
fn a_gap_resets_the_streak_to_the_unbroken_tail() {
    let mut record = EngagementRecord::default();
    record_interaction(&mut record, "quiz", day("2026-03-01"));
    record_interaction(&mut record, "quiz", day("2026-03-02"));
    // 2026-03-03 skipped.
    record_interaction(&mut record, "quiz", day("2026-03-04"));
    assert_eq!(record.streak_days, 1, "only the run ending today counts");
}

#[test]
fn no_activity_today_means_zero_streak() {
    let calendar = [day("2026-03-01"), day("2026-03-02")].into_iter().collect();
    assert_eq!(streak_ending(&calendar, day("2026-03-03")), 0);
}

#[test]
fn multiple_interactions_one_day_count_once_for_the_streak() {
    let mut record = EngagementRecord::default();
    for _ in 0..5 {
        record_interaction(&mut record, "menu", day("2026-03-02"));
    }
    assert_eq!(record.streak_days, 1);
    assert_eq!(record.total_interactions, 5);
    assert_eq!(record.activity_breakdown["menu"], 5);
}

#[test]
fn score_combines_volume_streak_and_mix() {
    let cfg = EngagementConfig::default();
    let mut record = EngagementRecord::default();
    record_interaction(&mut record, "quiz", day("2026-03-01"));
    record_interaction(&mut record, "quiz", day("2026-03-02"));

    // volume: 2 * 0.6 = 1.2; streak: 2 * 2.5 = 5; mix: 3 * 2 * 0.5 = 3.
    let score = engagement_score(&record, &cfg);
    assert!((score - 9.2).abs() < 1e-9, "got {score}");
}

#[test]
fn every_component_is_capped_and_the_total_clamped() {
    let cfg = EngagementConfig::default();
    let mut record = EngagementRecord {
        total_interactions: 1_000,
        streak_days: 365,
        ..Default::default()
    };
    record.activity_breakdown.insert("quiz".to_string(), 1_000);

    // 30 + 30 + 40, clamped to 100.
    assert_eq!(engagement_score(&record, &cfg), 100.0);
}

#[test]
fn unknown_activity_types_weigh_one() {
    let cfg = EngagementConfig::default();
    let mut record = EngagementRecord::default();
    record.activity_breakdown.insert("voicenote".to_string(), 2);

    // mix only: 1.0 * 2 * 0.5 = 1.
    assert_eq!(engagement_score(&record, &cfg), 1.0);
}

#[test]
fn menu_taps_weigh_half() {
    let cfg = EngagementConfig::default();
    let mut record = EngagementRecord::default();
    record.activity_breakdown.insert("menu".to_string(), 4);

    // 0.5 * 4 * 0.5 = 1.
    assert_eq!(engagement_score(&record, &cfg), 1.0);
}

#[test]
fn the_core_records_and_persists_interactions_across_days() {
    let clock = Arc::new(ManualClock::starting_at(
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
    ));
    let profiles = Arc::new(MemoryProfileStore::default());
    let core = AssessmentCore::new(
        42,
        CoreConfig::default(),
        QuestionCatalog::builtin().unwrap(),
        profiles.clone(),
        clock.clone(),
    )
    .unwrap();

    core.record_interaction(PHONE, "quiz").unwrap();
    clock.advance(Duration::days(1));
    let record = core.record_interaction(PHONE, "business_advice").unwrap();
    assert_eq!(record.streak_days, 2);

    let stored = profiles.engagement_record(PHONE).unwrap();
    assert_eq!(stored, record);
}

#[test]
fn engagement_records_round_trip_through_sqlite() {
    let store = SqliteProfileStore::in_memory().unwrap();

    let mut record = EngagementRecord::default();
    record_interaction(&mut record, "quiz", day("2026-03-01"));
    record_interaction(&mut record, "menu", day("2026-03-02"));
    store.save_engagement_record(PHONE, &record).unwrap();

    let loaded = store.engagement_record(PHONE).unwrap();
    assert_eq!(loaded, record);

    // Unknown users read back as empty records.
    let empty = store.engagement_record("628000000000").unwrap();
    assert_eq!(empty, EngagementRecord::default());
}
