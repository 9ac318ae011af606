//! The persistence interface the contest logic runs against.

use crate::{FixtureRecord, PredictionRecord, RoundRecord, ScoreRecord};
use chrono::{DateTime, Utc};
use log::warn;

/// Store operations fail with a plain message; callers wrap it as `QuinielaError::Store`.
pub type StoreResult<T> = Result<T, String>;

/// Durable tables for rounds, fixtures, predictions and score records.
///
/// Every write is a single-row insert, update or upsert except `delete_round_cascade` and
/// `upsert_fixture_titles`, which implementations should run atomically when they can.
pub trait Store: Send + Sync {
    fn get_round(&self, number: u32) -> StoreResult<Option<RoundRecord>>;

    /// Insert an unlocked round. Fails if the number is already taken.
    fn insert_round(&self, number: u32) -> StoreResult<RoundRecord>;

    /// Returns `None` if the round does not exist.
    fn set_round_locked(&self, number: u32, locked: bool) -> StoreResult<Option<RoundRecord>>;

    /// Remove a round with all of its fixtures, predictions and score records.
    /// Returns whether the round row or any of its fixtures existed; stray predictions and
    /// score records are removed either way but do not count.
    fn delete_round_cascade(&self, number: u32) -> StoreResult<bool>;

    /// Insert or retitle fixtures, the first title going to slot 1.
    /// Results and active flags of existing fixtures are left alone.
    fn upsert_fixture_titles(&self, round: u32, titles: &[String])
    -> StoreResult<Vec<FixtureRecord>>;

    /// All fixtures of a round ordered by slot.
    fn get_fixtures_for_round(&self, round: u32) -> StoreResult<Vec<FixtureRecord>>;

    /// Returns `None` if there is no such fixture.
    fn set_fixture_active(
        &self,
        round: u32,
        slot: u8,
        active: bool,
    ) -> StoreResult<Option<FixtureRecord>>;

    /// Returns `None` if there is no such fixture.
    fn set_fixture_result(
        &self,
        round: u32,
        slot: u8,
        result: Option<&str>,
    ) -> StoreResult<Option<FixtureRecord>>;

    /// The highest round number that still has a fixture without a result.
    fn get_latest_open_round(&self) -> StoreResult<Option<u32>>;

    fn get_prediction(&self, user_id: &str, round: u32) -> StoreResult<Option<PredictionRecord>>;

    /// Insert the prediction, or overwrite the scores and timestamp of the existing one.
    fn upsert_prediction(
        &self,
        user_id: &str,
        round: u32,
        scores: &[String],
        submitted_at: DateTime<Utc>,
    ) -> StoreResult<PredictionRecord>;

    /// All predictions of a round in the order they were first submitted.
    fn get_predictions_for_round(&self, round: u32) -> StoreResult<Vec<PredictionRecord>>;

    fn insert_score_record(
        &self,
        user_id: &str,
        round: u32,
        points: u32,
        computed_at: DateTime<Utc>,
    ) -> StoreResult<ScoreRecord>;

    /// All score records of a round in the order they were appended.
    fn get_score_records_for_round(&self, round: u32) -> StoreResult<Vec<ScoreRecord>>;
}

/// Serialize a list of scores into the canonical stored form, a JSON array.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn encode_scores(scores: &[String]) -> StoreResult<String> {
    serde_json::to_string(scores).map_err(|e| e.to_string())
}

/// Read a stored list of scores.
/// Rows written before the JSON format was adopted hold comma-separated values, those are
/// still accepted. Anything else decodes to an empty list, which scores as all misses.
#[must_use]
pub fn decode_scores(stored: &str) -> Vec<String> {
    if let Ok(scores) = serde_json::from_str::<Vec<String>>(stored) {
        return scores;
    }
    if stored.trim_start().starts_with('[') {
        warn!("Stored prediction is not a valid list of scores: {stored:?}");
        return Vec::new();
    }
    stored.split(',').map(|s| s.trim().to_string()).collect()
}
