//! Profile persistence — the collaborator interface the engines call.
//!
//! RULE: Only this module talks to the database.
//! Engines call trait methods — they never execute SQL directly.

use crate::engagement_tracker::EngagementRecord;
use crate::error::CoreResult;
use crate::types::Week;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WeekScore {
    pub score: f64,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiteracyRecord {
    pub weeks: BTreeMap<Week, WeekScore>,
}

impl LiteracyRecord {
    pub fn is_completed(&self, week: Week) -> bool {
        self.weeks.get(&week).map(|w| w.completed).unwrap_or(false)
    }

    /// Lowest-numbered week not yet completed, if any.
    pub fn next_incomplete_week(&self, total_weeks: Week) -> Option<Week> {
        (1..=total_weeks).find(|w| !self.is_completed(*w))
    }

    /// Mean score across completed weeks — the 0-100 literacy
    /// component. None until at least one week is completed.
    pub fn literacy_component(&self) -> Option<f64> {
        let completed: Vec<f64> = self
            .weeks
            .values()
            .filter(|w| w.completed)
            .map(|w| w.score)
            .collect();
        if completed.is_empty() {
            None
        } else {
            Some(completed.iter().sum::<f64>() / completed.len() as f64)
        }
    }
}

pub trait ProfileStore: Send + Sync {
    fn literacy_record(&self, phone: &str) -> CoreResult<LiteracyRecord>;

    /// Persist a week's score and mark the week completed.
    fn set_week_score(&self, phone: &str, week: Week, score: f64) -> CoreResult<()>;

    fn engagement_record(&self, phone: &str) -> CoreResult<EngagementRecord>;

    fn save_engagement_record(&self, phone: &str, record: &EngagementRecord) -> CoreResult<()>;
}

// ── In-memory store ────────────────────────────────────────────

/// The injected test double; also the demo runner's default.
#[derive(Default)]
pub struct MemoryProfileStore {
    inner: Mutex<HashMap<String, Profile>>,
}

#[derive(Default, Clone)]
struct Profile {
    literacy: LiteracyRecord,
    engagement: EngagementRecord,
}

impl ProfileStore for MemoryProfileStore {
    fn literacy_record(&self, phone: &str) -> CoreResult<LiteracyRecord> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .get(phone)
            .map(|p| p.literacy.clone())
            .unwrap_or_default())
    }

    fn set_week_score(&self, phone: &str, week: Week, score: f64) -> CoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let profile = inner.entry(phone.to_string()).or_default();
        profile.literacy.weeks.insert(
            week,
            WeekScore {
                score,
                completed: true,
            },
        );
        Ok(())
    }

    fn engagement_record(&self, phone: &str) -> CoreResult<EngagementRecord> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .get(phone)
            .map(|p| p.engagement.clone())
            .unwrap_or_default())
    }

    fn save_engagement_record(&self, phone: &str, record: &EngagementRecord) -> CoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.entry(phone.to_string()).or_default().engagement = record.clone();
        Ok(())
    }
}

// ── SQLite store ───────────────────────────────────────────────

pub struct SqliteProfileStore {
    conn: Mutex<Connection>,
}

impl SqliteProfileStore {
    pub fn open(path: &str) -> CoreResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> CoreResult<Self> {
        let conn = Connection::open(":memory:")?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> CoreResult<()> {
        self.conn
            .lock()
            .unwrap()
            .execute_batch(include_str!("../../migrations/001_profiles.sql"))?;
        Ok(())
    }
}

impl ProfileStore for SqliteProfileStore {
    fn literacy_record(&self, phone: &str) -> CoreResult<LiteracyRecord> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT week, score, completed FROM literacy_week
             WHERE phone = ?1 ORDER BY week ASC",
        )?;
        let weeks = stmt
            .query_map(params![phone], |row| {
                Ok((
                    row.get::<_, i64>(0)? as Week,
                    WeekScore {
                        score: row.get(1)?,
                        completed: row.get::<_, i32>(2)? != 0,
                    },
                ))
            })?
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(LiteracyRecord { weeks })
    }

    fn set_week_score(&self, phone: &str, week: Week, score: f64) -> CoreResult<()> {
        self.conn.lock().unwrap().execute(
            "INSERT INTO literacy_week (phone, week, score, completed)
             VALUES (?1, ?2, ?3, 1)
             ON CONFLICT(phone, week) DO UPDATE SET
                score = excluded.score, completed = 1",
            params![phone, week as i64, score],
        )?;
        Ok(())
    }

    fn engagement_record(&self, phone: &str) -> CoreResult<EngagementRecord> {
        let payload: Option<String> = {
            let conn = self.conn.lock().unwrap();
            conn.query_row(
                "SELECT payload FROM engagement WHERE phone = ?1",
                params![phone],
                |row| row.get(0),
            )
            .optional()?
        };
        match payload {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(EngagementRecord::default()),
        }
    }

    fn save_engagement_record(&self, phone: &str, record: &EngagementRecord) -> CoreResult<()> {
        let json = serde_json::to_string(record)?;
        self.conn.lock().unwrap().execute(
            "INSERT INTO engagement (phone, payload) VALUES (?1, ?2)
             ON CONFLICT(phone) DO UPDATE SET payload = excluded.payload",
            params![phone, json],
        )?;
        Ok(())
    }
}
