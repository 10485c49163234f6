//! ascore-core — conversational assessment and credit scoring for a
//! microfinance WhatsApp assistant.
//!
//! The crate is an in-process library: a thin messaging transport
//! feeds it one user message at a time and renders the structured
//! replies it returns. Inside live the two dialogue engines (weekly
//! literacy quiz, repayment-capacity interview), the pure scoring
//! pipeline (RPC calculator, engagement tracker, A-Score aggregator),
//! and the session and profile stores they share.
//!
//! RULES:
//!   - All randomness flows through rng::RngBank (seeded, reproducible).
//!   - All time flows through clock::Clock (injectable).
//!   - User-facing failures are structured replies; only operator-class
//!     failures (missing content, storage) travel as CoreError.

pub mod capacity_interview;
pub mod clock;
pub mod config;
pub mod content;
pub mod credit_score;
pub mod engagement_tracker;
pub mod engine;
pub mod error;
pub mod parse;
pub mod quiz_engine;
pub mod rng;
pub mod rpc_calculator;
pub mod session_store;
pub mod store;
pub mod types;
