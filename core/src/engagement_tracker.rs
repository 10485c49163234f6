//! Engagement tracking — pure transforms over a per-user activity log.
//!
//! The record itself belongs to the persistence collaborator; callers
//! load it, apply record_interaction, and save it back. streak_days is
//! derived and recomputed on every update, never mutated directly.

use crate::config::EngagementConfig;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementRecord {
    pub total_interactions: u32,
    /// Every date with at least one recorded activity.
    pub activity_calendar: BTreeSet<NaiveDate>,
    /// Interaction count per activity type.
    pub activity_breakdown: HashMap<String, u32>,
    /// Derived: consecutive active days ending today.
    pub streak_days: u32,
}

pub fn record_interaction(record: &mut EngagementRecord, activity: &str, today: NaiveDate) {
    record.total_interactions += 1;
    record.activity_calendar.insert(today);
    *record
        .activity_breakdown
        .entry(activity.to_string())
        .or_insert(0) += 1;
    record.streak_days = streak_ending(&record.activity_calendar, today);
}

/// Length of the unbroken run of active days ending today.
/// 0 when today itself has no recorded activity.
pub fn streak_ending(calendar: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = today;
    while calendar.contains(&day) {
        streak += 1;
        day = day - Duration::days(1);
    }
    streak
}

/// 0-100 engagement component: capped interaction volume, capped
/// streak bonus, capped weighted activity mix.
pub fn engagement_score(record: &EngagementRecord, cfg: &EngagementConfig) -> f64 {
    let volume =
        (record.total_interactions as f64 * cfg.interaction_points).min(cfg.interaction_cap);
    let streak = (record.streak_days as f64 * cfg.streak_points).min(cfg.streak_cap);
    let mix: f64 = record
        .activity_breakdown
        .iter()
        .map(|(activity, count)| cfg.weight_for(activity) * *count as f64 * cfg.variety_factor)
        .sum();
    (volume + streak + mix.min(cfg.variety_cap)).clamp(0.0, 100.0)
}
