//! The weekly financial-literacy quiz — four graded questions per
//! week, selected without replacement from that week's bank.
//!
//! RULES:
//!   - A question text is never issued twice within one session.
//!   - After the final graded answer the session is gone, pass or fail.
//!   - Missing week content is an operator error, not a user retry.

use crate::clock::Clock;
use crate::config::QuizConfig;
use crate::content::{Question, QuestionCatalog, TOTAL_WEEKS};
use crate::error::{CoreError, CoreResult};
use crate::rng::DialogueRng;
use crate::session_store::{After, SessionKind, SessionStore};
use crate::store::ProfileStore;
use crate::types::Week;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSessionState {
    pub week: Week,
    /// Candidate questions for this session, drawn without replacement
    /// from the week's bank.
    pub pool: Vec<Question>,
    /// Texts already issued this session, in order.
    pub asked: Vec<String>,
    pub correct_count: u8,
    pub total_asked: u8,
    /// The question awaiting an answer.
    pub current: Option<Question>,
}

/// What the user sees: the question without its answer key.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub text: String,
    pub options: Vec<String>,
    /// 1-based position within the session.
    pub number: u8,
    pub of: u8,
}

impl QuestionView {
    fn of_question(q: &Question, number: u8, of: u8) -> Self {
        Self {
            text: q.text.clone(),
            options: q.options.clone(),
            number,
            of,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuizStart {
    Started {
        week: Week,
        title: String,
        question: QuestionView,
    },
    /// An unanswered question was pending; it is re-issued unchanged.
    Resumed { week: Week, question: QuestionView },
    AllWeeksComplete,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuizReply {
    /// No quiz in flight (never started, finished, or expired).
    NoActiveQuiz,
    Answered {
        correct: bool,
        correct_option: String,
        explanation: String,
        correct_count: u8,
        total_asked: u8,
        next: QuizNext,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum QuizNext {
    Question(QuestionView),
    Completed { week: Week, score: u8, passed: bool },
}

pub struct QuizEngine {
    sessions: SessionStore<QuizSessionState>,
    profiles: Arc<dyn ProfileStore>,
    catalog: Arc<QuestionCatalog>,
    rng: Mutex<DialogueRng>,
    config: QuizConfig,
}

impl QuizEngine {
    pub fn new(
        timeout_minutes: i64,
        config: QuizConfig,
        catalog: Arc<QuestionCatalog>,
        profiles: Arc<dyn ProfileStore>,
        clock: Arc<dyn Clock>,
        rng: DialogueRng,
    ) -> Self {
        Self {
            sessions: SessionStore::new(SessionKind::Quiz, timeout_minutes, clock),
            profiles,
            catalog,
            rng: Mutex::new(rng),
            config,
        }
    }

    pub fn start(&self, phone: &str) -> CoreResult<QuizStart> {
        let per_session = self.config.questions_per_session;

        // Resume before anything else: an unanswered question stays the
        // same across repeated starts.
        let resumed = self.sessions.with_session(phone, |entry| {
            let view = entry
                .state
                .current
                .as_ref()
                .map(|q| QuestionView::of_question(q, entry.state.total_asked + 1, per_session));
            ((entry.state.week, view), After::Keep)
        });
        if let Some((week, view)) = resumed {
            if let Some(question) = view {
                return Ok(QuizStart::Resumed { week, question });
            }
            // A session with nothing pending cannot be graded; drop it
            // and fall through to a fresh start.
            self.sessions.delete(phone);
        }

        let record = self.profiles.literacy_record(phone)?;
        let Some(week) = record.next_incomplete_week(TOTAL_WEEKS) else {
            return Ok(QuizStart::AllWeeksComplete);
        };
        let bank = self
            .catalog
            .week(week)
            .filter(|b| !b.questions.is_empty())
            .ok_or(CoreError::MissingContent { week })?;

        let state = {
            let mut rng = self.rng.lock().unwrap();
            let pool =
                sample_without_replacement(&bank.questions, per_session as usize, &mut rng);
            let mut state = QuizSessionState {
                week,
                pool,
                asked: Vec::new(),
                correct_count: 0,
                total_asked: 0,
                current: None,
            };
            next_question(&mut state, &mut rng).ok_or(CoreError::MissingContent { week })?;
            state
        };

        let first = state
            .current
            .clone()
            .ok_or(CoreError::MissingContent { week })?;
        let question = QuestionView::of_question(&first, 1, per_session);
        self.sessions.create(phone, state);
        log::debug!("quiz week {week} started for {phone}");
        Ok(QuizStart::Started {
            week,
            title: bank.title.clone(),
            question,
        })
    }

    pub fn answer(&self, phone: &str, option_index: usize) -> CoreResult<QuizReply> {
        let per_session = self.config.questions_per_session;
        let reply = self.sessions.with_session(phone, |entry| {
            let Some(question) = entry.state.current.take() else {
                // A live session always has a pending question; treat
                // the inconsistency like an absent session.
                return (Ok(QuizReply::NoActiveQuiz), After::Delete);
            };

            let correct = option_index == question.correct_index;
            entry.state.total_asked += 1;
            if correct {
                entry.state.correct_count += 1;
            }
            let correct_option = question.options[question.correct_index].clone();
            let explanation = question.explanation.clone();

            if entry.state.total_asked >= per_session {
                let score = (entry.state.correct_count as f64 / per_session as f64 * 100.0)
                    .round();
                let passed = score >= self.config.passing_threshold;
                if let Err(e) =
                    self.profiles
                        .set_week_score(&entry.phone, entry.state.week, score)
                {
                    return (Err(e), After::Delete);
                }
                log::debug!(
                    "quiz week {} for {}: {}/{} -> {} ({})",
                    entry.state.week,
                    entry.phone,
                    entry.state.correct_count,
                    per_session,
                    score,
                    if passed { "passed" } else { "failed" },
                );
                return (
                    Ok(QuizReply::Answered {
                        correct,
                        correct_option,
                        explanation,
                        correct_count: entry.state.correct_count,
                        total_asked: entry.state.total_asked,
                        next: QuizNext::Completed {
                            week: entry.state.week,
                            score: score as u8,
                            passed,
                        },
                    }),
                    After::Delete,
                );
            }

            let next = {
                let mut rng = self.rng.lock().unwrap();
                next_question(&mut entry.state, &mut rng)
            };
            match next {
                Some(q) => {
                    let view =
                        QuestionView::of_question(&q, entry.state.total_asked + 1, per_session);
                    (
                        Ok(QuizReply::Answered {
                            correct,
                            correct_option,
                            explanation,
                            correct_count: entry.state.correct_count,
                            total_asked: entry.state.total_asked,
                            next: QuizNext::Question(view),
                        }),
                        After::Keep,
                    )
                }
                // Pool exhausted before the session filled: the catalog
                // validator makes this unreachable for provisioned banks.
                None => (
                    Err(CoreError::MissingContent {
                        week: entry.state.week,
                    }),
                    After::Delete,
                ),
            }
        });
        match reply {
            Some(r) => r,
            None => Ok(QuizReply::NoActiveQuiz),
        }
    }

    pub fn is_active(&self, phone: &str) -> bool {
        self.sessions.is_active(phone)
    }

    pub fn abandon(&self, phone: &str) {
        self.sessions.delete(phone);
    }

    pub fn sweep(&self) -> usize {
        self.sessions.sweep()
    }
}

/// Draw up to `count` distinct questions, uniformly without
/// replacement. A bank shorter than `count` yields the whole bank.
fn sample_without_replacement(
    bank: &[Question],
    count: usize,
    rng: &mut DialogueRng,
) -> Vec<Question> {
    let mut remaining: Vec<Question> = bank.to_vec();
    let mut pool = Vec::with_capacity(count.min(remaining.len()));
    while pool.len() < count && !remaining.is_empty() {
        let idx = rng.next_u64_below(remaining.len() as u64) as usize;
        pool.push(remaining.swap_remove(idx));
    }
    pool
}

/// Uniform pick among pool entries not yet asked; sets it as current
/// and records it as asked. None signals the pool is exhausted.
fn next_question(state: &mut QuizSessionState, rng: &mut DialogueRng) -> Option<Question> {
    let candidates: Vec<&Question> = state
        .pool
        .iter()
        .filter(|q| !state.asked.contains(&q.text))
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let idx = rng.next_u64_below(candidates.len() as u64) as usize;
    let question = candidates[idx].clone();
    state.asked.push(question.text.clone());
    state.current = Some(question.clone());
    Some(question)
}
