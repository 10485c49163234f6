//! The assessment core — the single object the messaging dispatcher
//! talks to.
//!
//! Wires the clock, the seeded RNG bank, the scoring config, the quiz
//! catalog, the profile store and both dialogue engines. Everything
//! here is synchronous; the transport layer owns its own executor and
//! calls in.

use crate::capacity_interview::{CapacityInterview, CapacityReply};
use crate::clock::{Clock, SystemClock};
use crate::config::CoreConfig;
use crate::content::QuestionCatalog;
use crate::credit_score::{self, AScore, ScoreComponents};
use crate::engagement_tracker::{self, EngagementRecord};
use crate::error::CoreResult;
use crate::quiz_engine::{QuizEngine, QuizReply, QuizStart};
use crate::rng::{RngBank, StreamSlot};
use crate::session_store::SessionKind;
use crate::store::ProfileStore;
use std::sync::Arc;

pub struct AssessmentCore {
    config: CoreConfig,
    clock: Arc<dyn Clock>,
    profiles: Arc<dyn ProfileStore>,
    quiz: QuizEngine,
    capacity: CapacityInterview,
}

impl AssessmentCore {
    /// Build a fully wired core. Call build() for the common defaults.
    pub fn new(
        seed: u64,
        config: CoreConfig,
        catalog: QuestionCatalog,
        profiles: Arc<dyn ProfileStore>,
        clock: Arc<dyn Clock>,
    ) -> CoreResult<Self> {
        catalog.validate(config.quiz.questions_per_session)?;
        let rng_bank = RngBank::new(seed);
        let catalog = Arc::new(catalog);
        let quiz = QuizEngine::new(
            config.session.timeout_minutes,
            config.quiz.clone(),
            catalog,
            profiles.clone(),
            clock.clone(),
            rng_bank.for_stream(StreamSlot::Quiz),
        );
        let capacity = CapacityInterview::new(config.session.timeout_minutes, clock.clone());
        Ok(Self {
            config,
            clock,
            profiles,
            quiz,
            capacity,
        })
    }

    /// Common defaults: built-in question bank, default scoring
    /// config, system clock.
    pub fn build(seed: u64, profiles: Arc<dyn ProfileStore>) -> CoreResult<Self> {
        Self::new(
            seed,
            CoreConfig::default(),
            QuestionCatalog::builtin()?,
            profiles,
            Arc::new(SystemClock),
        )
    }

    // ── Quiz ───────────────────────────────────────────────────

    pub fn start_quiz(&self, phone: &str) -> CoreResult<QuizStart> {
        self.quiz.start(phone)
    }

    pub fn answer_quiz(&self, phone: &str, option_index: usize) -> CoreResult<QuizReply> {
        self.quiz.answer(phone, option_index)
    }

    // ── Capacity interview ─────────────────────────────────────

    pub fn start_capacity(&self, phone: &str) -> String {
        self.capacity.start(phone)
    }

    pub fn answer_capacity(&self, phone: &str, text: &str) -> CapacityReply {
        self.capacity.answer(phone, text)
    }

    // ── Engagement ─────────────────────────────────────────────

    /// Record one inbound interaction and persist the updated log.
    pub fn record_interaction(&self, phone: &str, activity: &str) -> CoreResult<EngagementRecord> {
        let mut record = self.profiles.engagement_record(phone)?;
        engagement_tracker::record_interaction(&mut record, activity, self.clock.today());
        self.profiles.save_engagement_record(phone, &record)?;
        Ok(record)
    }

    pub fn engagement_score(&self, record: &EngagementRecord) -> f64 {
        engagement_tracker::engagement_score(record, &self.config.engagement)
    }

    // ── A-Score ────────────────────────────────────────────────

    pub fn compute_ascore(&self, components: &ScoreComponents) -> AScore {
        credit_score::compute(components, &self.config.weights, &self.config.zones)
    }

    /// Assemble literacy and engagement components from the profile
    /// store; character and capacity come from the caller (capacity is
    /// the latest RPC capacity score, character an external
    /// assessment).
    pub fn ascore_for(
        &self,
        phone: &str,
        character: Option<f64>,
        capacity: Option<f64>,
    ) -> CoreResult<AScore> {
        let literacy = self.profiles.literacy_record(phone)?.literacy_component();
        let engagement_record = self.profiles.engagement_record(phone)?;
        let engagement = if engagement_record.total_interactions == 0 {
            None
        } else {
            Some(self.engagement_score(&engagement_record))
        };
        Ok(self.compute_ascore(&ScoreComponents {
            character,
            capacity,
            literacy,
            engagement,
        }))
    }

    // ── Dispatcher support ─────────────────────────────────────

    /// Which dialogue should receive this user's next free-text
    /// message. Capacity wins when both are somehow live.
    pub fn active_session(&self, phone: &str) -> Option<SessionKind> {
        if self.capacity.is_active(phone) {
            Some(SessionKind::Capacity)
        } else if self.quiz.is_active(phone) {
            Some(SessionKind::Quiz)
        } else {
            None
        }
    }

    /// Optional memory hygiene; lazy expiry remains the source of
    /// truth.
    pub fn sweep_sessions(&self) -> usize {
        self.quiz.sweep() + self.capacity.sweep()
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }
}
