//! Error kinds surfaced to callers of the contest entry points.

use std::error::Error;
use std::fmt;

/// Every recoverable condition a contest operation can report.
/// None of these are fatal; they carry enough context for a front-end to explain the refusal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuinielaError {
    DuplicateRound { round: u32 },
    RoundNotFound { round: u32 },
    InvalidFixtureCount { round: u32, expected: usize, got: usize },
    RoundLocked { round: u32 },
    IncompleteRound { round: u32, expected: usize, got: usize },
    InvalidScoreFormat { value: String },
    NoExistingPrediction { user_id: String, round: u32 },
    NoResults { round: u32 },
    NoPredictions { round: u32 },
    InvalidSlot { round: u32, slot: u8 },
    InvalidChunkLength { expected: usize, got: usize },
    InvalidPhase { phase: usize, phases: usize },
    NoPendingSubmission { user_id: String, round: u32 },
    EmptyFixtureTitle { slot: usize },
    /// Connectivity or I/O failure in the persistence layer, passed through unchanged.
    Store(String),
}

impl QuinielaError {
    /// A stable snake_case name for the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            QuinielaError::DuplicateRound { .. } => "duplicate_round",
            QuinielaError::RoundNotFound { .. } => "round_not_found",
            QuinielaError::InvalidFixtureCount { .. } => "invalid_fixture_count",
            QuinielaError::RoundLocked { .. } => "round_locked",
            QuinielaError::IncompleteRound { .. } => "incomplete_round",
            QuinielaError::InvalidScoreFormat { .. } => "invalid_score_format",
            QuinielaError::NoExistingPrediction { .. } => "no_existing_prediction",
            QuinielaError::NoResults { .. } => "no_results",
            QuinielaError::NoPredictions { .. } => "no_predictions",
            QuinielaError::InvalidSlot { .. } => "invalid_slot",
            QuinielaError::InvalidChunkLength { .. } => "invalid_chunk_length",
            QuinielaError::InvalidPhase { .. } => "invalid_phase",
            QuinielaError::NoPendingSubmission { .. } => "no_pending_submission",
            QuinielaError::EmptyFixtureTitle { .. } => "empty_fixture_title",
            QuinielaError::Store(_) => "store",
        }
    }
}

impl fmt::Display for QuinielaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QuinielaError::DuplicateRound { round } => write!(f, "Round {round} already exists."),
            QuinielaError::RoundNotFound { round } => write!(f, "Round {round} does not exist."),
            QuinielaError::InvalidFixtureCount {
                round,
                expected,
                got,
            } => write!(
                f,
                "Round {round} needs exactly {expected} fixtures, but {got} were supplied."
            ),
            QuinielaError::RoundLocked { round } => write!(f, "Round {round} is locked."),
            QuinielaError::IncompleteRound {
                round,
                expected,
                got,
            } => write!(
                f,
                "Round {round} has {got} of its {expected} fixtures loaded."
            ),
            QuinielaError::InvalidScoreFormat { value } => {
                write!(f, "The score '{value}' is not valid. Use the format 'X-Y'.")
            }
            QuinielaError::NoExistingPrediction { user_id, round } => {
                write!(f, "User {user_id} has no prediction for round {round}.")
            }
            QuinielaError::NoResults { round } => write!(
                f,
                "Round {round} has no results yet, or every fixture is suspended."
            ),
            QuinielaError::NoPredictions { round } => {
                write!(f, "No predictions were submitted for round {round}.")
            }
            QuinielaError::InvalidSlot { round, slot } => {
                write!(f, "Round {round} has no fixture in slot {slot}.")
            }
            QuinielaError::InvalidChunkLength { expected, got } => {
                write!(f, "Expected {expected} values in this step, got {got}.")
            }
            QuinielaError::InvalidPhase { phase, phases } => {
                write!(f, "Step {phase} does not exist, this form has {phases} steps.")
            }
            QuinielaError::NoPendingSubmission { user_id, round } => write!(
                f,
                "User {user_id} has no unfinished form for round {round}, start again from the first step."
            ),
            QuinielaError::EmptyFixtureTitle { slot } => {
                write!(f, "Fixture {slot} needs a title.")
            }
            QuinielaError::Store(msg) => write!(f, "Store error: {msg}"),
        }
    }
}

impl Error for QuinielaError {}
