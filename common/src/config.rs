//! Tunables for the chunked input forms and the leaderboard.

use crate::{DEFAULT_CHUNK_SIZE, FIXTURES_PER_ROUND, LEADERBOARD_SIZE, SESSION_TTL_MINUTES};
use chrono::TimeDelta;

/// Shape of the multi-step forms and presentation limits.
///
/// The front-end decides how many fields it can show at once; the workflow only knows it will
/// receive `fixtures_per_round` values in steps of `chunk_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowConfig {
    pub fixtures_per_round: usize,
    pub chunk_size: usize,
    pub leaderboard_size: usize,
    /// Partially submitted forms older than this are discarded. `None` keeps them forever.
    pub session_ttl: Option<TimeDelta>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            fixtures_per_round: FIXTURES_PER_ROUND,
            chunk_size: DEFAULT_CHUNK_SIZE,
            leaderboard_size: LEADERBOARD_SIZE,
            session_ttl: Some(TimeDelta::minutes(SESSION_TTL_MINUTES)),
        }
    }
}

impl WorkflowConfig {
    /// Build a config, rejecting shapes the workflow cannot drive.
    ///
    /// # Errors
    /// Returns an error if the chunk size is zero or larger than a round,
    /// or if a round would not fit in the slot numbering.
    pub fn new(
        chunk_size: usize,
        leaderboard_size: usize,
        session_ttl_minutes: Option<i64>,
    ) -> Result<Self, String> {
        let config = Self {
            chunk_size,
            leaderboard_size,
            session_ttl: session_ttl_minutes.map(TimeDelta::minutes),
            ..Self::default()
        };
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk size must be at least 1".to_string());
        }
        if self.chunk_size > self.fixtures_per_round {
            return Err(format!(
                "chunk size {} is larger than a round of {} fixtures",
                self.chunk_size, self.fixtures_per_round
            ));
        }
        if self.fixtures_per_round > u8::MAX as usize {
            return Err("a round cannot have more than 255 fixtures".to_string());
        }
        Ok(())
    }

    /// Number of steps needed to capture a full round.
    #[must_use]
    pub fn phase_count(&self) -> usize {
        self.fixtures_per_round.div_ceil(self.chunk_size)
    }

    /// Number of values expected in a given 1-based step, or `None` if the step does not exist.
    #[must_use]
    pub fn phase_len(&self, phase: usize) -> Option<usize> {
        if phase == 0 || phase > self.phase_count() {
            return None;
        }
        let offset = (phase - 1) * self.chunk_size;
        Some(self.chunk_size.min(self.fixtures_per_round - offset))
    }

    /// Index of the first value a given 1-based step covers.
    #[must_use]
    pub fn phase_offset(&self, phase: usize) -> usize {
        phase.saturating_sub(1) * self.chunk_size
    }
}
