//! The contest entry points a front-end calls.
//!
//! `Quiniela` owns the store handle, the form buffers and the configuration; every method is
//! an independent unit of work. Authorization is the caller's job.

use crate::config::WorkflowConfig;
use crate::scoring::{self, RoundScoring};
use crate::session::SessionManager;
use crate::store::Store;
use crate::workflow::{PhaseOutcome, SubmissionStart, Workflow};
use crate::{FixtureRecord, PredictionRecord, QuinielaError, RoundRecord, ScoreRecord, lifecycle};
use chrono::Utc;
use std::sync::Arc;

pub struct Quiniela {
    store: Arc<dyn Store>,
    workflow: Workflow,
}

impl Quiniela {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: WorkflowConfig) -> Self {
        Self {
            store,
            workflow: Workflow::new(config),
        }
    }

    /// Use a custom session manager, e.g. one backed by shared storage.
    #[must_use]
    pub fn with_sessions(
        store: Arc<dyn Store>,
        config: WorkflowConfig,
        sessions: SessionManager,
    ) -> Self {
        Self {
            store,
            workflow: Workflow::with_sessions(config, sessions),
        }
    }

    #[must_use]
    pub fn config(&self) -> &WorkflowConfig {
        self.workflow.config()
    }

    fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// # Errors
    /// Returns `DuplicateRound` if the number is taken.
    pub fn create_round(&self, number: u32) -> Result<RoundRecord, QuinielaError> {
        lifecycle::create_round(self.store(), number)
    }

    /// # Errors
    /// Returns `InvalidFixtureCount` or `EmptyFixtureTitle`.
    pub fn set_fixtures(
        &self,
        round: u32,
        titles: &[String],
    ) -> Result<Vec<FixtureRecord>, QuinielaError> {
        lifecycle::set_fixtures(self.store(), round, titles, self.config().fixtures_per_round)
    }

    /// # Errors
    /// Returns `RoundNotFound` if the round does not exist.
    pub fn lock_round(&self, number: u32) -> Result<RoundRecord, QuinielaError> {
        lifecycle::lock_round(self.store(), number)
    }

    /// # Errors
    /// Returns `RoundNotFound` if the round does not exist.
    pub fn unlock_round(&self, number: u32) -> Result<RoundRecord, QuinielaError> {
        lifecycle::unlock_round(self.store(), number)
    }

    /// # Errors
    /// Returns `InvalidSlot` if there is no such fixture.
    pub fn set_fixture_active(
        &self,
        round: u32,
        slot: u8,
        active: bool,
    ) -> Result<FixtureRecord, QuinielaError> {
        lifecycle::set_fixture_active(self.store(), round, slot, active)
    }

    /// # Errors
    /// Returns `IncompleteRound`, `InvalidChunkLength` or `InvalidScoreFormat`.
    pub fn set_results(
        &self,
        round: u32,
        results: &[String],
    ) -> Result<Vec<FixtureRecord>, QuinielaError> {
        lifecycle::set_results(self.store(), round, results, self.config().fixtures_per_round)
    }

    /// # Errors
    /// Returns `RoundNotFound` if there was nothing to remove.
    pub fn delete_round(&self, number: u32) -> Result<(), QuinielaError> {
        lifecycle::delete_round(self.store(), number)
    }

    /// # Errors
    /// Returns a store error if the lookup fails.
    pub fn latest_open_round(&self) -> Result<Option<u32>, QuinielaError> {
        lifecycle::latest_open_round(self.store())
    }

    /// # Errors
    /// Returns `RoundLocked` or `IncompleteRound`.
    pub fn begin_submission(
        &self,
        user_id: &str,
        round: u32,
    ) -> Result<SubmissionStart, QuinielaError> {
        self.workflow.begin_submission(self.store(), user_id, round)
    }

    /// Submit any step of a new prediction.
    ///
    /// # Errors
    /// See [`Workflow::submit_prediction_phase`].
    pub fn submit_prediction_phase(
        &self,
        user_id: &str,
        round: u32,
        phase: usize,
        values: &[String],
    ) -> Result<PhaseOutcome<PredictionRecord>, QuinielaError> {
        self.workflow
            .submit_prediction_phase(self.store(), user_id, round, phase, values, Utc::now())
    }

    /// # Errors
    /// See [`Workflow::submit_prediction_phase`].
    pub fn submit_phase1(
        &self,
        user_id: &str,
        round: u32,
        values: &[String],
    ) -> Result<PhaseOutcome<PredictionRecord>, QuinielaError> {
        self.submit_prediction_phase(user_id, round, 1, values)
    }

    /// # Errors
    /// See [`Workflow::submit_prediction_phase`].
    pub fn submit_phase2(
        &self,
        user_id: &str,
        round: u32,
        values: &[String],
    ) -> Result<PhaseOutcome<PredictionRecord>, QuinielaError> {
        self.submit_prediction_phase(user_id, round, 2, values)
    }

    /// # Errors
    /// Returns `NoExistingPrediction` or `RoundLocked`.
    pub fn begin_edit(&self, user_id: &str, round: u32) -> Result<SubmissionStart, QuinielaError> {
        self.workflow.begin_edit(self.store(), user_id, round)
    }

    /// Submit any step of an edit to an existing prediction.
    ///
    /// # Errors
    /// See [`Workflow::submit_edit_phase`].
    pub fn submit_edit_phase(
        &self,
        user_id: &str,
        round: u32,
        phase: usize,
        values: &[String],
    ) -> Result<PhaseOutcome<PredictionRecord>, QuinielaError> {
        self.workflow
            .submit_edit_phase(self.store(), user_id, round, phase, values, Utc::now())
    }

    /// # Errors
    /// See [`Workflow::submit_results_phase`].
    pub fn submit_results_phase(
        &self,
        user_id: &str,
        round: u32,
        phase: usize,
        values: &[String],
    ) -> Result<PhaseOutcome<Vec<FixtureRecord>>, QuinielaError> {
        self.workflow
            .submit_results_phase(self.store(), user_id, round, phase, values, Utc::now())
    }

    /// # Errors
    /// See [`Workflow::submit_fixtures_phase`].
    pub fn submit_fixtures_phase(
        &self,
        user_id: &str,
        round: u32,
        phase: usize,
        values: &[String],
    ) -> Result<PhaseOutcome<Vec<FixtureRecord>>, QuinielaError> {
        self.workflow
            .submit_fixtures_phase(self.store(), user_id, round, phase, values, Utc::now())
    }

    /// # Errors
    /// Returns a store error if the lookup fails.
    pub fn get_prediction(
        &self,
        user_id: &str,
        round: u32,
    ) -> Result<Option<PredictionRecord>, QuinielaError> {
        self.workflow.get_prediction(self.store(), user_id, round)
    }

    /// Score a round, append its score records and return the ranking.
    ///
    /// # Errors
    /// Returns `NoResults` or `NoPredictions` without writing anything.
    pub fn score(&self, round: u32) -> Result<RoundScoring, QuinielaError> {
        scoring::score_round(
            self.store(),
            round,
            self.config().leaderboard_size,
            Utc::now(),
        )
    }

    /// Every score record appended for a round, oldest first.
    ///
    /// # Errors
    /// Returns a store error if the lookup fails.
    pub fn score_records(&self, round: u32) -> Result<Vec<ScoreRecord>, QuinielaError> {
        self.store()
            .get_score_records_for_round(round)
            .map_err(QuinielaError::Store)
    }
}
