//! Scoring configuration — fixed, hand-specified weights and
//! thresholds. Every number here is a product decision, not a learned
//! parameter. Defaults are the deployed values; a data-dir JSON file
//! can override them per environment.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Minutes of inactivity after which a dialogue session lazily
    /// expires.
    pub timeout_minutes: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { timeout_minutes: 30 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// Questions asked per weekly quiz session.
    pub questions_per_session: u8,
    /// Percent score at or above which a week counts as passed.
    /// Set to 100.0 to require a perfect week.
    pub passing_threshold: f64,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            questions_per_session: 4,
            passing_threshold: 70.0,
        }
    }
}

/// A-Score component weights. Must sum to 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub character: f64,
    pub capacity: f64,
    pub literacy: f64,
    pub engagement: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            character: 0.25,
            capacity: 0.30,
            literacy: 0.25,
            engagement: 0.20,
        }
    }
}

/// Risk-zone cut-offs. Monotonic: zone_a > zone_b > zone_c.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneThresholds {
    pub zone_a: f64,
    pub zone_b: f64,
    pub zone_c: f64,
}

impl Default for ZoneThresholds {
    fn default() -> Self {
        Self {
            zone_a: 70.0,
            zone_b: 55.0,
            zone_c: 40.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    /// Points per recorded interaction, capped at interaction_cap.
    pub interaction_points: f64,
    pub interaction_cap: f64,
    /// Points per consecutive active day, capped at streak_cap.
    pub streak_points: f64,
    pub streak_cap: f64,
    /// Multiplier on the weighted activity mix, capped at variety_cap.
    pub variety_factor: f64,
    pub variety_cap: f64,
    /// Per-activity weights; anything not listed scores default_weight.
    pub activity_weights: HashMap<String, f64>,
    pub default_weight: f64,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        let activity_weights = [
            ("quiz".to_string(), 3.0),
            ("business_advice".to_string(), 3.0),
            ("check_data".to_string(), 1.0),
            ("menu".to_string(), 0.5),
            ("other".to_string(), 1.0),
        ]
        .into();
        Self {
            interaction_points: 0.6,
            interaction_cap: 30.0,
            streak_points: 2.5,
            streak_cap: 30.0,
            variety_factor: 0.5,
            variety_cap: 40.0,
            activity_weights,
            default_weight: 1.0,
        }
    }
}

impl EngagementConfig {
    pub fn weight_for(&self, activity: &str) -> f64 {
        self.activity_weights
            .get(activity)
            .copied()
            .unwrap_or(self.default_weight)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub session: SessionConfig,
    pub quiz: QuizConfig,
    pub weights: ScoreWeights,
    pub zones: ZoneThresholds,
    pub engagement: EngagementConfig,
}

impl CoreConfig {
    /// Load from the data/ directory.
    /// In tests, use CoreConfig::default().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/scoring/scoring_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: CoreConfig = serde_json::from_str(&content)?;
        Ok(config)
    }
}
