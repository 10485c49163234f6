//! The guided repayment-capacity interview — five fields, asked
//! strictly in order, each parsed from one free-text reply.
//!
//! RULES:
//!   - An unparseable or out-of-range reply repeats the same step.
//!   - The 5th accepted field computes the RPC result and ends the
//!     session within the same operation.
//!   - Answering without a session is a structured reply, not an error.

use crate::clock::Clock;
use crate::parse;
use crate::rpc_calculator::{self, RpcInputs, RpcResult};
use crate::session_store::{After, SessionKind, SessionStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldParser {
    Currency,
    Days,
    Percentage,
}

/// One entry of the fixed interview schedule.
pub struct CapacityField {
    pub name: &'static str,
    pub prompt: &'static str,
    pub parser: FieldParser,
    pub min: f64,
    pub max: f64,
}

/// The five questions, in interview order. Order is part of the
/// contract — downstream copy refers to "pertanyaan ke-N".
pub const SCHEDULE: [CapacityField; 5] = [
    CapacityField {
        name: "daily_revenue",
        prompt: "Berapa rata-rata omzet (pendapatan kotor) usaha Anda per hari? \
                 Contoh: 500 ribu, Rp 750.000, atau 1,5 juta.",
        parser: FieldParser::Currency,
        min: 1_000.0,
        max: 1_000_000_000.0,
    },
    CapacityField {
        name: "active_days",
        prompt: "Berapa hari usaha Anda buka dalam sebulan? \
                 Contoh: 25 hari, setiap hari, atau 6 hari seminggu.",
        parser: FieldParser::Days,
        min: 1.0,
        max: 31.0,
    },
    CapacityField {
        name: "cogs_percentage",
        prompt: "Kira-kira berapa persen omzet yang habis untuk belanja bahan \
                 atau kulakan (modal barang)? Contoh: 60%, atau setengah.",
        parser: FieldParser::Percentage,
        min: 0.0,
        max: 100.0,
    },
    CapacityField {
        name: "household_expenses",
        prompt: "Berapa pengeluaran rumah tangga Anda per bulan? \
                 Contoh: 2 juta, atau Rp 1.500.000.",
        parser: FieldParser::Currency,
        min: 0.0,
        max: 1_000_000_000.0,
    },
    CapacityField {
        name: "existing_obligations",
        prompt: "Berapa total cicilan atau angsuran lain yang Anda bayar per \
                 bulan? Jika tidak ada, jawab 0.",
        parser: FieldParser::Currency,
        min: 0.0,
        max: 1_000_000_000.0,
    },
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapacitySessionState {
    /// Index into SCHEDULE of the question currently awaiting a reply.
    pub step: usize,
    /// Field name -> accepted value, for the steps answered so far.
    pub data: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CapacityReply {
    /// No interview in flight (never started, finished, or expired).
    NoActiveInterview,
    /// The reply did not parse or fell outside the field's range; the
    /// step did not advance.
    Retry { field: &'static str, prompt: String },
    /// Field accepted; here is the next one.
    Next { step: usize, prompt: String },
    /// All five fields collected; the session is gone.
    Completed {
        data: BTreeMap<String, f64>,
        rpc: RpcResult,
    },
}

pub struct CapacityInterview {
    sessions: SessionStore<CapacitySessionState>,
}

impl CapacityInterview {
    pub fn new(timeout_minutes: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: SessionStore::new(SessionKind::Capacity, timeout_minutes, clock),
        }
    }

    /// Begin (or restart) the interview; returns the first prompt.
    pub fn start(&self, phone: &str) -> String {
        self.sessions.create(phone, CapacitySessionState::default());
        SCHEDULE[0].prompt.to_string()
    }

    pub fn answer(&self, phone: &str, text: &str) -> CapacityReply {
        self.sessions
            .with_session(phone, |entry| {
                let field = &SCHEDULE[entry.state.step];
                let parsed = match field.parser {
                    FieldParser::Currency => parse::parse_currency(text),
                    FieldParser::Days => parse::parse_days(text),
                    FieldParser::Percentage => parse::parse_percentage(text),
                };
                let value = match parsed {
                    Some(v) if v >= field.min && v <= field.max => v,
                    _ => {
                        log::debug!("capacity {phone}: rejected reply for {}", field.name);
                        return (
                            CapacityReply::Retry {
                                field: field.name,
                                prompt: retry_prompt(field),
                            },
                            After::Keep,
                        );
                    }
                };

                entry.state.data.insert(field.name.to_string(), value);
                entry.state.step += 1;

                if entry.state.step == SCHEDULE.len() {
                    let rpc = rpc_calculator::compute(&inputs_from(&entry.state.data));
                    log::debug!(
                        "capacity {phone}: completed, sdc={:.0} score={}",
                        rpc.sustainable_disposable_cash,
                        rpc.capacity_score
                    );
                    (
                        CapacityReply::Completed {
                            data: entry.state.data.clone(),
                            rpc,
                        },
                        After::Delete,
                    )
                } else {
                    (
                        CapacityReply::Next {
                            step: entry.state.step,
                            prompt: SCHEDULE[entry.state.step].prompt.to_string(),
                        },
                        After::Keep,
                    )
                }
            })
            .unwrap_or(CapacityReply::NoActiveInterview)
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

/// Same question again, with a short nudge so the user knows why.
fn retry_prompt(field: &CapacityField) -> String {
    format!("Maaf, jawaban itu belum bisa kami baca. {}", field.prompt)
}

fn inputs_from(data: &BTreeMap<String, f64>) -> RpcInputs {
    RpcInputs {
        daily_revenue: data.get("daily_revenue").copied().unwrap_or_default(),
        active_days: data.get("active_days").copied(),
        cogs_percentage: data.get("cogs_percentage").copied(),
        household_expenses: data.get("household_expenses").copied(),
        existing_obligations: data.get("existing_obligations").copied(),
    }
}
