//! A mutex-guarded in-process store, used for tests and for running without a database.

use crate::store::{Store, StoreResult};
use crate::{FixtureRecord, PredictionRecord, RoundRecord, ScoreRecord};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tables {
    rounds: BTreeMap<u32, RoundRecord>,
    /// Keyed by (round, slot) so iteration is ordered by slot within a round.
    fixtures: BTreeMap<(u32, u8), FixtureRecord>,
    /// Kept in first-submission order.
    predictions: Vec<PredictionRecord>,
    score_records: Vec<ScoreRecord>,
}

/// Thread-safe in-memory tables. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| "memory store lock poisoned".to_string())
    }
}

impl Store for MemoryStore {
    fn get_round(&self, number: u32) -> StoreResult<Option<RoundRecord>> {
        Ok(self.tables()?.rounds.get(&number).cloned())
    }

    fn insert_round(&self, number: u32) -> StoreResult<RoundRecord> {
        let mut tables = self.tables()?;
        if tables.rounds.contains_key(&number) {
            return Err(format!("duplicate key: round {number}"));
        }
        let round = RoundRecord {
            number,
            locked: false,
        };
        tables.rounds.insert(number, round.clone());
        Ok(round)
    }

    fn set_round_locked(&self, number: u32, locked: bool) -> StoreResult<Option<RoundRecord>> {
        let mut tables = self.tables()?;
        Ok(tables.rounds.get_mut(&number).map(|round| {
            round.locked = locked;
            round.clone()
        }))
    }

    fn delete_round_cascade(&self, number: u32) -> StoreResult<bool> {
        let mut tables = self.tables()?;
        let mut existed = tables.rounds.remove(&number).is_some();

        let before = tables.fixtures.len();
        tables.fixtures.retain(|(round, _), _| *round != number);
        existed |= tables.fixtures.len() != before;

        tables.predictions.retain(|p| p.round != number);
        tables.score_records.retain(|s| s.round != number);

        Ok(existed)
    }

    fn upsert_fixture_titles(
        &self,
        round: u32,
        titles: &[String],
    ) -> StoreResult<Vec<FixtureRecord>> {
        let mut tables = self.tables()?;
        let mut written = Vec::with_capacity(titles.len());
        for (i, title) in titles.iter().enumerate() {
            let slot = u8::try_from(i + 1).map_err(|e| e.to_string())?;
            let fixture = tables
                .fixtures
                .entry((round, slot))
                .and_modify(|f| f.title.clone_from(title))
                .or_insert_with(|| FixtureRecord {
                    round,
                    slot,
                    title: title.clone(),
                    result: None,
                    active: true,
                });
            written.push(fixture.clone());
        }
        Ok(written)
    }

    fn get_fixtures_for_round(&self, round: u32) -> StoreResult<Vec<FixtureRecord>> {
        Ok(self
            .tables()?
            .fixtures
            .range((round, 0)..=(round, u8::MAX))
            .map(|(_, f)| f.clone())
            .collect())
    }

    fn set_fixture_active(
        &self,
        round: u32,
        slot: u8,
        active: bool,
    ) -> StoreResult<Option<FixtureRecord>> {
        let mut tables = self.tables()?;
        Ok(tables.fixtures.get_mut(&(round, slot)).map(|f| {
            f.active = active;
            f.clone()
        }))
    }

    fn set_fixture_result(
        &self,
        round: u32,
        slot: u8,
        result: Option<&str>,
    ) -> StoreResult<Option<FixtureRecord>> {
        let mut tables = self.tables()?;
        Ok(tables.fixtures.get_mut(&(round, slot)).map(|f| {
            f.result = result.map(str::to_string);
            f.clone()
        }))
    }

    fn get_latest_open_round(&self) -> StoreResult<Option<u32>> {
        Ok(self
            .tables()?
            .fixtures
            .values()
            .filter(|f| f.result.is_none())
            .map(|f| f.round)
            .max())
    }

    fn get_prediction(&self, user_id: &str, round: u32) -> StoreResult<Option<PredictionRecord>> {
        Ok(self
            .tables()?
            .predictions
            .iter()
            .find(|p| p.user_id == user_id && p.round == round)
            .cloned())
    }

    fn upsert_prediction(
        &self,
        user_id: &str,
        round: u32,
        scores: &[String],
        submitted_at: DateTime<Utc>,
    ) -> StoreResult<PredictionRecord> {
        let mut tables = self.tables()?;
        if let Some(existing) = tables
            .predictions
            .iter_mut()
            .find(|p| p.user_id == user_id && p.round == round)
        {
            existing.scores = scores.to_vec();
            existing.submitted_at = submitted_at;
            return Ok(existing.clone());
        }
        let prediction = PredictionRecord {
            user_id: user_id.to_string(),
            round,
            scores: scores.to_vec(),
            submitted_at,
        };
        tables.predictions.push(prediction.clone());
        Ok(prediction)
    }

    fn get_predictions_for_round(&self, round: u32) -> StoreResult<Vec<PredictionRecord>> {
        Ok(self
            .tables()?
            .predictions
            .iter()
            .filter(|p| p.round == round)
            .cloned()
            .collect())
    }

    fn insert_score_record(
        &self,
        user_id: &str,
        round: u32,
        points: u32,
        computed_at: DateTime<Utc>,
    ) -> StoreResult<ScoreRecord> {
        let record = ScoreRecord {
            user_id: user_id.to_string(),
            round,
            points,
            computed_at,
        };
        self.tables()?.score_records.push(record.clone());
        Ok(record)
    }

    fn get_score_records_for_round(&self, round: u32) -> StoreResult<Vec<ScoreRecord>> {
        Ok(self
            .tables()?
            .score_records
            .iter()
            .filter(|s| s.round == round)
            .cloned()
            .collect())
    }
}
