//! Quiz content catalog — the 15 financial-literacy weeks.
//!
//! RULE: question content is provisioned data, not code. The built-in
//! bank is embedded from data/questions/question_bank.json; deployments
//! can override it from a data directory in the same format. A week the
//! catalog cannot serve is an operator error (MissingContent), never a
//! user-facing retry.

use crate::error::{CoreError, CoreResult};
use crate::types::Week;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Literacy program length, in weeks.
pub const TOTAL_WEEKS: Week = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    /// 2-4 answer options, displayed in order.
    pub options: Vec<String>,
    pub correct_index: usize,
    /// Shown after grading, right or wrong.
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekBank {
    pub week: Week,
    pub title: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Deserialize)]
struct QuestionBankFile {
    weeks: Vec<WeekBank>,
}

#[derive(Debug, Clone)]
pub struct QuestionCatalog {
    weeks: HashMap<Week, WeekBank>,
}

impl QuestionCatalog {
    /// The embedded default bank.
    pub fn builtin() -> CoreResult<Self> {
        let file: QuestionBankFile =
            serde_json::from_str(include_str!("../../data/questions/question_bank.json"))?;
        Ok(Self::from_file(file))
    }

    /// Load from the data/ directory (same format as the embedded bank).
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/questions/question_bank.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: QuestionBankFile = serde_json::from_str(&content)?;
        Ok(Self::from_file(file))
    }

    /// Assemble a catalog from week banks directly (operator tooling
    /// and tests).
    pub fn from_weeks(weeks: Vec<WeekBank>) -> Self {
        Self::from_file(QuestionBankFile { weeks })
    }

    fn from_file(file: QuestionBankFile) -> Self {
        let weeks = file.weeks.into_iter().map(|w| (w.week, w)).collect();
        Self { weeks }
    }

    pub fn week(&self, week: Week) -> Option<&WeekBank> {
        self.weeks.get(&week)
    }

    /// Reject banks the quiz engine cannot serve: every week 1..=15
    /// present with at least `questions_per_session` questions, 2-4
    /// options each, correct_index in range. Validating here is what
    /// keeps a graded week from ever resting on fewer distinct
    /// questions than a full session.
    pub fn validate(&self, questions_per_session: u8) -> CoreResult<()> {
        for week in 1..=TOTAL_WEEKS {
            let bank = self
                .weeks
                .get(&week)
                .ok_or(CoreError::MissingContent { week })?;
            if bank.questions.len() < questions_per_session as usize {
                return Err(CoreError::MissingContent { week });
            }
            for q in &bank.questions {
                let option_count = q.options.len();
                if !(2..=4).contains(&option_count) || q.correct_index >= option_count {
                    return Err(CoreError::MissingContent { week });
                }
            }
        }
        Ok(())
    }
}
