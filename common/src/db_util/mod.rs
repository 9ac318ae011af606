//! Interfaces between the application code and a Postgres database.

use super::*;
use crate::store::StoreResult;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use log::info;

mod conversions;
mod fixtures;
mod predictions;
mod rounds;
mod score_records;

pub use fixtures::*;
pub use predictions::*;
pub use rounds::*;
pub use score_records::*;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;
pub type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

/// Load variables from a `.env` file, if there is one.
pub fn load_env_file() {
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded environment from {}", path.display());
    }
}

/// Build a connection pool for the given URL.
///
/// # Errors
/// Returns an error if the pool cannot open its first connections.
pub fn get_database_pool(database_url: &str) -> Result<PgPool, String> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().build(manager).map_err(|e| e.to_string())
}

/// Check a connection out of the pool.
///
/// # Errors
/// Returns an error if no connection becomes available in time.
pub fn get_pooled_database_connection(pool: &PgPool) -> Result<PgPooledConnection, String> {
    pool.get().map_err(|e| e.to_string())
}

/// A [`Store`] backed by Postgres through a connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database at the given URL.
    ///
    /// # Errors
    /// Returns an error if the pool cannot be built.
    pub fn connect(database_url: &str) -> Result<Self, String> {
        get_database_pool(database_url).map(Self::new)
    }

    fn conn(&self) -> StoreResult<PgPooledConnection> {
        get_pooled_database_connection(&self.pool)
    }
}

impl Store for PgStore {
    fn get_round(&self, number: u32) -> StoreResult<Option<RoundRecord>> {
        get_round_by_number(&mut *self.conn()?, number)
    }

    fn insert_round(&self, number: u32) -> StoreResult<RoundRecord> {
        insert_round(&mut *self.conn()?, number)
    }

    fn set_round_locked(&self, number: u32, locked: bool) -> StoreResult<Option<RoundRecord>> {
        update_round_locked(&mut *self.conn()?, number, locked)
    }

    fn delete_round_cascade(&self, number: u32) -> StoreResult<bool> {
        let round_number = conversions::u32_to_i32(number)?;
        let mut conn = self.conn()?;
        let existed = conn
            .transaction::<usize, diesel::result::Error, _>(|conn| {
                delete_score_records_in_round(conn, round_number)?;
                delete_predictions_in_round(conn, round_number)?;
                let fixtures = delete_fixtures_in_round(conn, round_number)?;
                Ok(fixtures + delete_round(conn, round_number)?)
            })
            .map_err(|err| err.to_string())?;
        Ok(existed > 0)
    }

    fn upsert_fixture_titles(
        &self,
        round: u32,
        titles: &[String],
    ) -> StoreResult<Vec<FixtureRecord>> {
        upsert_fixture_titles(&mut *self.conn()?, round, titles)
    }

    fn get_fixtures_for_round(&self, round: u32) -> StoreResult<Vec<FixtureRecord>> {
        get_fixtures_in_round(&mut *self.conn()?, round)
    }

    fn set_fixture_active(
        &self,
        round: u32,
        slot: u8,
        active: bool,
    ) -> StoreResult<Option<FixtureRecord>> {
        update_fixture_active(&mut *self.conn()?, round, slot, active)
    }

    fn set_fixture_result(
        &self,
        round: u32,
        slot: u8,
        result: Option<&str>,
    ) -> StoreResult<Option<FixtureRecord>> {
        update_fixture_result(&mut *self.conn()?, round, slot, result)
    }

    fn get_latest_open_round(&self) -> StoreResult<Option<u32>> {
        get_latest_unresulted_round(&mut *self.conn()?)
    }

    fn get_prediction(&self, user_id: &str, round: u32) -> StoreResult<Option<PredictionRecord>> {
        get_prediction_by_user(&mut *self.conn()?, user_id, round)
    }

    fn upsert_prediction(
        &self,
        user_id: &str,
        round: u32,
        scores: &[String],
        submitted_at: DateTime<Utc>,
    ) -> StoreResult<PredictionRecord> {
        upsert_prediction(&mut *self.conn()?, user_id, round, scores, submitted_at)
    }

    fn get_predictions_for_round(&self, round: u32) -> StoreResult<Vec<PredictionRecord>> {
        get_predictions_in_round(&mut *self.conn()?, round)
    }

    fn insert_score_record(
        &self,
        user_id: &str,
        round: u32,
        points: u32,
        computed_at: DateTime<Utc>,
    ) -> StoreResult<ScoreRecord> {
        insert_score_record(&mut *self.conn()?, user_id, round, points, computed_at)
    }

    fn get_score_records_for_round(&self, round: u32) -> StoreResult<Vec<ScoreRecord>> {
        get_score_records_in_round(&mut *self.conn()?, round)
    }
}
