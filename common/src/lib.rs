//! A library with common logic for running a recurring score-prediction contest.
//!
//! Administrators publish rounds of fixtures, participants submit a predicted score for every
//! fixture, results are entered after the matches and each round is scored into a leaderboard.

pub mod config;
pub mod contest;
pub mod error;
pub mod lifecycle;
pub mod memory_store;
pub mod scoring;
pub mod session;
pub mod store;
pub mod validation;
pub mod workflow;

#[cfg(feature = "database")]
pub mod db_util;

pub use config::WorkflowConfig;
pub use contest::Quiniela;
pub use error::QuinielaError;
pub use memory_store::MemoryStore;
pub use store::Store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of fixtures that make up a complete round.
pub const FIXTURES_PER_ROUND: usize = 10;
/// Number of values a single form step can capture.
pub const DEFAULT_CHUNK_SIZE: usize = 5;
/// Number of standings shown on a round leaderboard.
pub const LEADERBOARD_SIZE: usize = 25;
/// Minutes a partially submitted form stays usable.
pub const SESSION_TTL_MINUTES: i64 = 30;

/// One numbered contest cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub number: u32,
    pub locked: bool,
}

/// One match within a round. Slots are numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureRecord {
    pub round: u32,
    pub slot: u8,
    pub title: String,
    pub result: Option<String>,
    pub active: bool,
}

impl FixtureRecord {
    /// A fixture counts towards scoring only when it is active and has a result.
    #[must_use]
    pub fn is_scorable(&self) -> bool {
        self.active && self.result.is_some()
    }
}

/// A participant's current predicted scores for a round, one per slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub user_id: String,
    pub round: u32,
    pub scores: Vec<String>,
    pub submitted_at: DateTime<Utc>,
}

/// One computed point total, appended by every scoring run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub user_id: String,
    pub round: u32,
    pub points: u32,
    pub computed_at: DateTime<Utc>,
}
