//! A-Score aggregation — the final weighted composite and its risk
//! zone. Pure: four component scores in, one banded score out.

use crate::config::{ScoreWeights, ZoneThresholds};
use serde::{Deserialize, Serialize};

/// A component missing at scoring time contributes this neutral value.
pub const NEUTRAL_COMPONENT: f64 = 50.0;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScoreComponents {
    /// External character assessment, when available.
    pub character: Option<f64>,
    /// Latest repayment-capacity score.
    pub capacity: Option<f64>,
    /// Literacy component derived from completed quiz weeks.
    pub literacy: Option<f64>,
    pub engagement: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Zone {
    A,
    B,
    C,
    D,
}

impl Zone {
    pub fn from_score(score: u8, zones: &ZoneThresholds) -> Self {
        let s = score as f64;
        if s >= zones.zone_a {
            Self::A
        } else if s >= zones.zone_b {
            Self::B
        } else if s >= zones.zone_c {
            Self::C
        } else {
            Self::D
        }
    }

    /// Informational lending recommendation; the credit decision itself
    /// is made downstream.
    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::A => "auto_approve",
            Self::B => "approve_with_conditions",
            Self::C => "approve_with_coaching",
            Self::D => "reject",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AScore {
    pub score: u8,
    pub zone: Zone,
    pub recommendation: &'static str,
}

fn component(value: Option<f64>) -> f64 {
    value.unwrap_or(NEUTRAL_COMPONENT).clamp(0.0, 100.0)
}

pub fn compute(
    components: &ScoreComponents,
    weights: &ScoreWeights,
    zones: &ZoneThresholds,
) -> AScore {
    let weighted = component(components.character) * weights.character
        + component(components.capacity) * weights.capacity
        + component(components.literacy) * weights.literacy
        + component(components.engagement) * weights.engagement;
    let score = weighted.round().clamp(0.0, 100.0) as u8;
    let zone = Zone::from_score(score, zones);
    AScore {
        score,
        zone,
        recommendation: zone.recommendation(),
    }
}
