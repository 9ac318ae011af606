//! The chunked submission workflow for predictions, results and fixture titles.
//!
//! A form is collected in steps of `chunk_size` values. Every step is validated as a whole
//! before it is buffered, and nothing is written to the store until the last step succeeds:
//!
//! ```text
//! Idle --step 1 ok--> AwaitingStep(2) --step 2 ok--> ... --last step ok--> Complete
//!   ^                       |
//!   +--- step 1 again ------+   (replaces the buffered values)
//! ```
//!
//! A failed step leaves the buffer and the store exactly as they were, so it can be retried.

use crate::config::WorkflowConfig;
use crate::lifecycle;
use crate::session::{SessionKey, SessionManager, SessionPurpose};
use crate::store::Store;
use crate::validation::{validate_scores, validate_titles};
use crate::{FixtureRecord, PredictionRecord, QuinielaError};
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;

/// What a participant sees when they ask to predict a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SubmissionStart {
    /// No prediction yet, collect a new one.
    Fresh { titles: Vec<String> },
    /// A prediction exists, collect changes seeded with the stored scores.
    Edit {
        titles: Vec<String>,
        defaults: Vec<String>,
    },
}

/// The state a form is left in after a successful step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum PhaseOutcome<T> {
    /// The step was buffered and another one is needed.
    Pending { next_phase: usize, expected: usize },
    /// The last step was accepted and the form was stored.
    Complete(T),
}

/// Drives every chunked form against a store, buffering completed steps per user.
pub struct Workflow {
    config: WorkflowConfig,
    sessions: SessionManager,
}

impl Workflow {
    #[must_use]
    pub fn new(config: WorkflowConfig) -> Self {
        Self::with_sessions(config, SessionManager::new(config.session_ttl))
    }

    #[must_use]
    pub fn with_sessions(config: WorkflowConfig, sessions: SessionManager) -> Self {
        Self { config, sessions }
    }

    #[must_use]
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    fn check_chunk(&self, phase: usize, values: &[String]) -> Result<(), QuinielaError> {
        let expected = self
            .config
            .phase_len(phase)
            .ok_or(QuinielaError::InvalidPhase {
                phase,
                phases: self.config.phase_count(),
            })?;
        if values.len() != expected {
            return Err(QuinielaError::InvalidChunkLength {
                expected,
                got: values.len(),
            });
        }
        Ok(())
    }

    /// Buffer an already validated step. Returns every collected value once the last step
    /// arrives; the buffer is only released by `finish` after the caller stored them.
    fn collect(
        &self,
        key: SessionKey,
        phase: usize,
        values: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<String>>, QuinielaError> {
        let last_phase = self.config.phase_count();

        if phase == 1 {
            if last_phase == 1 {
                return Ok(Some(values));
            }
            debug!("{key:?}: step 1 of {last_phase} buffered");
            self.sessions.start(key, values, now);
            return Ok(None);
        }

        // a step may be resubmitted, anything it and later steps buffered is replaced
        let offset = self.config.phase_offset(phase);
        let mut collected = match self.sessions.pending(&key, now) {
            Some(pending) if pending.values.len() >= offset => pending.values,
            _ => {
                return Err(QuinielaError::NoPendingSubmission {
                    user_id: key.user_id,
                    round: key.round,
                });
            }
        };
        collected.truncate(offset);
        collected.extend(values);

        if phase == last_phase {
            Ok(Some(collected))
        } else {
            debug!("{key:?}: step {phase} of {last_phase} buffered");
            self.sessions.update(key, collected, now);
            Ok(None)
        }
    }

    fn pending_outcome<T>(&self, phase: usize) -> PhaseOutcome<T> {
        let next_phase = phase + 1;
        PhaseOutcome::Pending {
            next_phase,
            expected: self.config.phase_len(next_phase).unwrap_or_default(),
        }
    }

    /// Fixtures of a round that is open for predictions.
    fn open_fixtures(
        &self,
        store: &dyn Store,
        round: u32,
    ) -> Result<Vec<FixtureRecord>, QuinielaError> {
        if lifecycle::is_round_locked(store, round)? {
            return Err(QuinielaError::RoundLocked { round });
        }
        let fixtures = store
            .get_fixtures_for_round(round)
            .map_err(QuinielaError::Store)?;
        if fixtures.len() < self.config.fixtures_per_round {
            return Err(QuinielaError::IncompleteRound {
                round,
                expected: self.config.fixtures_per_round,
                got: fixtures.len(),
            });
        }
        Ok(fixtures)
    }

    fn existing_prediction(
        store: &dyn Store,
        user_id: &str,
        round: u32,
    ) -> Result<PredictionRecord, QuinielaError> {
        store
            .get_prediction(user_id, round)
            .map_err(QuinielaError::Store)?
            .ok_or_else(|| QuinielaError::NoExistingPrediction {
                user_id: user_id.to_string(),
                round,
            })
    }

    /// Open the prediction form for a round. A participant who already predicted is sent
    /// down the edit path with their stored scores as defaults.
    ///
    /// # Errors
    /// Returns `RoundLocked` or `IncompleteRound` if the round does not take predictions.
    pub fn begin_submission(
        &self,
        store: &dyn Store,
        user_id: &str,
        round: u32,
    ) -> Result<SubmissionStart, QuinielaError> {
        let fixtures = self.open_fixtures(store, round)?;
        let titles = fixtures.into_iter().map(|f| f.title).collect();
        match store
            .get_prediction(user_id, round)
            .map_err(QuinielaError::Store)?
        {
            Some(prediction) => Ok(SubmissionStart::Edit {
                titles,
                defaults: prediction.scores,
            }),
            None => Ok(SubmissionStart::Fresh { titles }),
        }
    }

    /// Open the edit form for an existing prediction.
    ///
    /// # Errors
    /// Returns `NoExistingPrediction` if there is nothing to edit, or `RoundLocked`.
    pub fn begin_edit(
        &self,
        store: &dyn Store,
        user_id: &str,
        round: u32,
    ) -> Result<SubmissionStart, QuinielaError> {
        let prediction = Self::existing_prediction(store, user_id, round)?;
        let fixtures = self.open_fixtures(store, round)?;
        Ok(SubmissionStart::Edit {
            titles: fixtures.into_iter().map(|f| f.title).collect(),
            defaults: prediction.scores,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn submit_score_phase(
        &self,
        store: &dyn Store,
        purpose: SessionPurpose,
        user_id: &str,
        round: u32,
        phase: usize,
        values: &[String],
        now: DateTime<Utc>,
    ) -> Result<PhaseOutcome<PredictionRecord>, QuinielaError> {
        self.check_chunk(phase, values)?;
        self.open_fixtures(store, round)?;
        if purpose == SessionPurpose::Edit {
            Self::existing_prediction(store, user_id, round)?;
        }
        let values = validate_scores(values)?;

        let key = SessionKey::new(user_id, round, purpose);
        let Some(scores) = self.collect(key.clone(), phase, values, now)? else {
            return Ok(self.pending_outcome(phase));
        };

        let prediction = store
            .upsert_prediction(user_id, round, &scores, now)
            .map_err(QuinielaError::Store)?;
        self.sessions.finish(&key);
        info!("Stored prediction of {user_id} for round {round}");
        Ok(PhaseOutcome::Complete(prediction))
    }

    /// Submit one step of a new prediction. The last step stores the prediction, overwriting
    /// any earlier one for the same round.
    ///
    /// # Errors
    /// Returns `RoundLocked`, `IncompleteRound`, `InvalidPhase`, `InvalidChunkLength`,
    /// `InvalidScoreFormat`, or `NoPendingSubmission` for a later step without its earlier ones.
    pub fn submit_prediction_phase(
        &self,
        store: &dyn Store,
        user_id: &str,
        round: u32,
        phase: usize,
        values: &[String],
        now: DateTime<Utc>,
    ) -> Result<PhaseOutcome<PredictionRecord>, QuinielaError> {
        self.submit_score_phase(
            store,
            SessionPurpose::Prediction,
            user_id,
            round,
            phase,
            values,
            now,
        )
    }

    /// Submit one step of an edit to an existing prediction.
    ///
    /// # Errors
    /// As `submit_prediction_phase`, plus `NoExistingPrediction` if there is nothing to edit.
    pub fn submit_edit_phase(
        &self,
        store: &dyn Store,
        user_id: &str,
        round: u32,
        phase: usize,
        values: &[String],
        now: DateTime<Utc>,
    ) -> Result<PhaseOutcome<PredictionRecord>, QuinielaError> {
        self.submit_score_phase(
            store,
            SessionPurpose::Edit,
            user_id,
            round,
            phase,
            values,
            now,
        )
    }

    /// Submit one step of the real results of a round. Locked rounds still take results.
    ///
    /// # Errors
    /// Returns `IncompleteRound`, `InvalidPhase`, `InvalidChunkLength`, `InvalidScoreFormat`
    /// or `NoPendingSubmission`.
    pub fn submit_results_phase(
        &self,
        store: &dyn Store,
        user_id: &str,
        round: u32,
        phase: usize,
        values: &[String],
        now: DateTime<Utc>,
    ) -> Result<PhaseOutcome<Vec<FixtureRecord>>, QuinielaError> {
        self.check_chunk(phase, values)?;
        let fixtures = store
            .get_fixtures_for_round(round)
            .map_err(QuinielaError::Store)?;
        if fixtures.len() != self.config.fixtures_per_round {
            return Err(QuinielaError::IncompleteRound {
                round,
                expected: self.config.fixtures_per_round,
                got: fixtures.len(),
            });
        }
        let values = validate_scores(values)?;

        let key = SessionKey::new(user_id, round, SessionPurpose::Results);
        let Some(results) = self.collect(key.clone(), phase, values, now)? else {
            return Ok(self.pending_outcome(phase));
        };
        let fixtures =
            lifecycle::set_results(store, round, &results, self.config.fixtures_per_round)?;
        self.sessions.finish(&key);
        Ok(PhaseOutcome::Complete(fixtures))
    }

    /// Submit one step of the fixture titles of a round. The last step writes them.
    ///
    /// # Errors
    /// Returns `InvalidPhase`, `InvalidChunkLength`, `EmptyFixtureTitle` or
    /// `NoPendingSubmission`.
    pub fn submit_fixtures_phase(
        &self,
        store: &dyn Store,
        user_id: &str,
        round: u32,
        phase: usize,
        values: &[String],
        now: DateTime<Utc>,
    ) -> Result<PhaseOutcome<Vec<FixtureRecord>>, QuinielaError> {
        self.check_chunk(phase, values)?;
        let titles = validate_titles(values, self.config.phase_offset(phase) + 1)?;

        let key = SessionKey::new(user_id, round, SessionPurpose::Fixtures);
        let Some(titles) = self.collect(key.clone(), phase, titles, now)? else {
            return Ok(self.pending_outcome(phase));
        };
        let fixtures =
            lifecycle::set_fixtures(store, round, &titles, self.config.fixtures_per_round)?;
        self.sessions.finish(&key);
        Ok(PhaseOutcome::Complete(fixtures))
    }

    /// A participant's stored prediction for a round, if any.
    ///
    /// # Errors
    /// Returns a store error if the lookup fails.
    pub fn get_prediction(
        &self,
        store: &dyn Store,
        user_id: &str,
        round: u32,
    ) -> Result<Option<PredictionRecord>, QuinielaError> {
        store
            .get_prediction(user_id, round)
            .map_err(QuinielaError::Store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use chrono::TimeDelta;

    fn scores(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    fn create_test_store() -> MemoryStore {
        let store = MemoryStore::new();
        let titles: Vec<String> = (1..=10).map(|i| format!("Home {i} vs Away {i}")).collect();
        lifecycle::set_fixtures(&store, 1, &titles, 10).unwrap();
        store
    }

    fn create_test_workflow() -> Workflow {
        Workflow::new(WorkflowConfig::default())
    }

    fn first_half() -> Vec<String> {
        scores(&["1-0", "2-2", "0-1", "3-1", "0-0"])
    }

    fn second_half() -> Vec<String> {
        scores(&["4-0", "1-1", "2-1", "0-2", "1-3"])
    }

    fn stored_scores(store: &MemoryStore, user_id: &str) -> Option<Vec<String>> {
        store.get_prediction(user_id, 1).unwrap().map(|p| p.scores)
    }

    #[test_log::test]
    fn test_two_steps_make_one_prediction() {
        let store = create_test_store();
        let workflow = create_test_workflow();
        let now = Utc::now();

        assert_eq!(
            workflow.begin_submission(&store, "u1", 1).unwrap(),
            SubmissionStart::Fresh {
                titles: (1..=10).map(|i| format!("Home {i} vs Away {i}")).collect()
            }
        );

        let outcome = workflow
            .submit_prediction_phase(&store, "u1", 1, 1, &first_half(), now)
            .unwrap();
        assert_eq!(
            outcome,
            PhaseOutcome::Pending {
                next_phase: 2,
                expected: 5
            }
        );
        assert_eq!(stored_scores(&store, "u1"), None);

        let outcome = workflow
            .submit_prediction_phase(&store, "u1", 1, 2, &second_half(), now)
            .unwrap();
        let PhaseOutcome::Complete(prediction) = outcome else {
            panic!("expected a stored prediction, got {outcome:?}");
        };
        let expected = [first_half(), second_half()].concat();
        assert_eq!(prediction.scores, expected);
        assert_eq!(prediction.submitted_at, now);
        assert_eq!(stored_scores(&store, "u1"), Some(expected));
    }

    #[test_log::test]
    fn test_restarting_step_one_discards_earlier_values() {
        let store = create_test_store();
        let workflow = create_test_workflow();
        let now = Utc::now();
        let replacement = scores(&["9-9", "8-8", "7-7", "6-6", "5-5"]);

        workflow
            .submit_prediction_phase(&store, "u1", 1, 1, &first_half(), now)
            .unwrap();
        workflow
            .submit_prediction_phase(&store, "u1", 1, 1, &replacement, now)
            .unwrap();
        workflow
            .submit_prediction_phase(&store, "u1", 1, 2, &second_half(), now)
            .unwrap();

        assert_eq!(
            stored_scores(&store, "u1"),
            Some([replacement, second_half()].concat())
        );
    }

    #[test_log::test]
    fn test_invalid_first_step_buffers_nothing() {
        let store = create_test_store();
        let workflow = create_test_workflow();
        let now = Utc::now();
        let mut bad = first_half();
        bad[2] = "2 1".to_string();

        assert_eq!(
            workflow.submit_prediction_phase(&store, "u1", 1, 1, &bad, now),
            Err(QuinielaError::InvalidScoreFormat {
                value: "2 1".to_string()
            })
        );
        assert_eq!(
            workflow.submit_prediction_phase(&store, "u1", 1, 2, &second_half(), now),
            Err(QuinielaError::NoPendingSubmission {
                user_id: "u1".to_string(),
                round: 1
            })
        );
        assert_eq!(stored_scores(&store, "u1"), None);
    }

    #[test_log::test]
    fn test_invalid_second_step_can_be_retried() {
        let store = create_test_store();
        let workflow = create_test_workflow();
        let now = Utc::now();
        let mut bad = second_half();
        bad[4] = "x-1".to_string();

        workflow
            .submit_prediction_phase(&store, "u1", 1, 1, &first_half(), now)
            .unwrap();
        assert!(matches!(
            workflow.submit_prediction_phase(&store, "u1", 1, 2, &bad, now),
            Err(QuinielaError::InvalidScoreFormat { .. })
        ));
        assert_eq!(stored_scores(&store, "u1"), None);

        workflow
            .submit_prediction_phase(&store, "u1", 1, 2, &second_half(), now)
            .unwrap();
        assert_eq!(
            stored_scores(&store, "u1"),
            Some([first_half(), second_half()].concat())
        );
    }

    #[test_log::test]
    fn test_completed_form_consumes_buffer() {
        let store = create_test_store();
        let workflow = create_test_workflow();
        let now = Utc::now();

        workflow
            .submit_prediction_phase(&store, "u1", 1, 1, &first_half(), now)
            .unwrap();
        workflow
            .submit_prediction_phase(&store, "u1", 1, 2, &second_half(), now)
            .unwrap();
        assert!(matches!(
            workflow.submit_prediction_phase(&store, "u1", 1, 2, &second_half(), now),
            Err(QuinielaError::NoPendingSubmission { .. })
        ));
    }

    #[test_log::test]
    fn test_locked_round_refuses_every_step() {
        let store = create_test_store();
        let workflow = create_test_workflow();
        let now = Utc::now();

        workflow
            .submit_prediction_phase(&store, "u1", 1, 1, &first_half(), now)
            .unwrap();
        lifecycle::lock_round(&store, 1).unwrap();

        assert_eq!(
            workflow.submit_prediction_phase(&store, "u1", 1, 2, &second_half(), now),
            Err(QuinielaError::RoundLocked { round: 1 })
        );
        assert_eq!(
            workflow.submit_prediction_phase(&store, "u2", 1, 1, &first_half(), now),
            Err(QuinielaError::RoundLocked { round: 1 })
        );
        assert_eq!(
            workflow.begin_submission(&store, "u1", 1),
            Err(QuinielaError::RoundLocked { round: 1 })
        );
        assert_eq!(stored_scores(&store, "u1"), None);

        // the buffered first step survives the lock
        lifecycle::unlock_round(&store, 1).unwrap();
        workflow
            .submit_prediction_phase(&store, "u1", 1, 2, &second_half(), now)
            .unwrap();
        assert_eq!(
            stored_scores(&store, "u1"),
            Some([first_half(), second_half()].concat())
        );
    }

    #[test_log::test]
    fn test_locked_round_keeps_existing_prediction() {
        let store = create_test_store();
        let workflow = create_test_workflow();
        let original = [first_half(), second_half()].concat();
        store
            .upsert_prediction("u1", 1, &original, Utc::now())
            .unwrap();
        lifecycle::lock_round(&store, 1).unwrap();

        assert_eq!(
            workflow.begin_edit(&store, "u1", 1),
            Err(QuinielaError::RoundLocked { round: 1 })
        );
        assert_eq!(
            workflow.submit_edit_phase(&store, "u1", 1, 1, &second_half(), Utc::now()),
            Err(QuinielaError::RoundLocked { round: 1 })
        );
        assert_eq!(stored_scores(&store, "u1"), Some(original));
    }

    #[test_log::test]
    fn test_lock_between_edit_steps_keeps_stored_scores() {
        let store = create_test_store();
        let workflow = create_test_workflow();
        let now = Utc::now();
        let stored = [first_half(), second_half()].concat();
        store.upsert_prediction("u1", 1, &stored, now).unwrap();

        workflow
            .submit_edit_phase(&store, "u1", 1, 1, &second_half(), now)
            .unwrap();
        lifecycle::lock_round(&store, 1).unwrap();

        assert_eq!(
            workflow.submit_edit_phase(&store, "u1", 1, 2, &first_half(), now),
            Err(QuinielaError::RoundLocked { round: 1 })
        );
        assert_eq!(stored_scores(&store, "u1"), Some(stored));

        // the buffered edit step is still there once the round reopens
        lifecycle::unlock_round(&store, 1).unwrap();
        workflow
            .submit_edit_phase(&store, "u1", 1, 2, &first_half(), now)
            .unwrap();
        assert_eq!(
            stored_scores(&store, "u1"),
            Some([second_half(), first_half()].concat())
        );
    }

    #[test_log::test]
    fn test_incomplete_round_refuses_predictions() {
        let store = MemoryStore::new();
        let workflow = create_test_workflow();
        store
            .upsert_fixture_titles(1, &scores(&["A vs B", "C vs D"]))
            .unwrap();

        assert_eq!(
            workflow.begin_submission(&store, "u1", 1),
            Err(QuinielaError::IncompleteRound {
                round: 1,
                expected: 10,
                got: 2
            })
        );
        assert!(matches!(
            workflow.submit_prediction_phase(&store, "u1", 1, 1, &first_half(), Utc::now()),
            Err(QuinielaError::IncompleteRound { .. })
        ));
    }

    #[test_log::test]
    fn test_existing_prediction_redirects_to_edit() {
        let store = create_test_store();
        let workflow = create_test_workflow();
        let original = [first_half(), second_half()].concat();
        store
            .upsert_prediction("u1", 1, &original, Utc::now())
            .unwrap();

        let start = workflow.begin_submission(&store, "u1", 1).unwrap();
        let SubmissionStart::Edit { titles, defaults } = start else {
            panic!("expected the edit path, got {start:?}");
        };
        assert_eq!(titles.len(), 10);
        assert_eq!(defaults, original);
    }

    #[test_log::test]
    fn test_edit_overwrites_prediction() {
        let store = create_test_store();
        let workflow = create_test_workflow();
        let earlier = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let later = earlier + TimeDelta::minutes(5);
        store
            .upsert_prediction("u1", 1, &[first_half(), second_half()].concat(), earlier)
            .unwrap();

        workflow
            .submit_edit_phase(&store, "u1", 1, 1, &second_half(), later)
            .unwrap();
        let outcome = workflow
            .submit_edit_phase(&store, "u1", 1, 2, &first_half(), later)
            .unwrap();
        let PhaseOutcome::Complete(prediction) = outcome else {
            panic!("expected a stored prediction, got {outcome:?}");
        };
        assert_eq!(prediction.scores, [second_half(), first_half()].concat());
        assert_eq!(prediction.submitted_at, later);
        assert_eq!(store.get_predictions_for_round(1).unwrap().len(), 1);
    }

    #[test_log::test]
    fn test_edit_without_prediction() {
        let store = create_test_store();
        let workflow = create_test_workflow();
        let missing = QuinielaError::NoExistingPrediction {
            user_id: "u1".to_string(),
            round: 1,
        };

        assert_eq!(workflow.begin_edit(&store, "u1", 1), Err(missing.clone()));
        assert_eq!(
            workflow.submit_edit_phase(&store, "u1", 1, 1, &first_half(), Utc::now()),
            Err(missing)
        );
    }

    #[test_log::test]
    fn test_edit_and_prediction_buffers_are_separate() {
        let store = create_test_store();
        let workflow = create_test_workflow();
        let now = Utc::now();
        store
            .upsert_prediction("u1", 1, &[first_half(), second_half()].concat(), now)
            .unwrap();

        workflow
            .submit_prediction_phase(&store, "u1", 1, 1, &first_half(), now)
            .unwrap();
        assert!(matches!(
            workflow.submit_edit_phase(&store, "u1", 1, 2, &second_half(), now),
            Err(QuinielaError::NoPendingSubmission { .. })
        ));
    }

    #[test]
    fn test_wrong_chunk_shapes() {
        let store = create_test_store();
        let workflow = create_test_workflow();
        let now = Utc::now();

        assert_eq!(
            workflow.submit_prediction_phase(&store, "u1", 1, 1, &first_half()[..4], now),
            Err(QuinielaError::InvalidChunkLength {
                expected: 5,
                got: 4
            })
        );
        assert_eq!(
            workflow.submit_prediction_phase(&store, "u1", 1, 3, &first_half(), now),
            Err(QuinielaError::InvalidPhase {
                phase: 3,
                phases: 2
            })
        );
        assert_eq!(
            workflow.submit_prediction_phase(&store, "u1", 1, 0, &first_half(), now),
            Err(QuinielaError::InvalidPhase {
                phase: 0,
                phases: 2
            })
        );
    }

    #[test_log::test]
    fn test_expired_first_step() {
        let store = create_test_store();
        let workflow = create_test_workflow();
        let start = Utc::now();

        workflow
            .submit_prediction_phase(&store, "u1", 1, 1, &first_half(), start)
            .unwrap();
        assert!(matches!(
            workflow.submit_prediction_phase(
                &store,
                "u1",
                1,
                2,
                &second_half(),
                start + TimeDelta::hours(2)
            ),
            Err(QuinielaError::NoPendingSubmission { .. })
        ));
    }

    #[test_log::test]
    fn test_three_step_form() {
        let store = create_test_store();
        let workflow = Workflow::new(WorkflowConfig::new(4, 25, None).unwrap());
        let now = Utc::now();
        let all = [first_half(), second_half()].concat();

        assert_eq!(
            workflow
                .submit_prediction_phase(&store, "u1", 1, 1, &all[..4], now)
                .unwrap(),
            PhaseOutcome::Pending {
                next_phase: 2,
                expected: 4
            }
        );
        assert_eq!(
            workflow
                .submit_prediction_phase(&store, "u1", 1, 2, &all[4..8], now)
                .unwrap(),
            PhaseOutcome::Pending {
                next_phase: 3,
                expected: 2
            }
        );
        // resubmitting a middle step replaces it
        workflow
            .submit_prediction_phase(&store, "u1", 1, 2, &all[4..8], now)
            .unwrap();
        let outcome = workflow
            .submit_prediction_phase(&store, "u1", 1, 3, &all[8..], now)
            .unwrap();
        assert!(matches!(outcome, PhaseOutcome::Complete(ref p) if p.scores == all));
    }

    #[test_log::test]
    fn test_single_step_form() {
        let store = create_test_store();
        let workflow = Workflow::new(WorkflowConfig::new(10, 25, None).unwrap());
        let all = [first_half(), second_half()].concat();

        let outcome = workflow
            .submit_prediction_phase(&store, "u1", 1, 1, &all, Utc::now())
            .unwrap();
        assert!(matches!(outcome, PhaseOutcome::Complete(ref p) if p.scores == all));
    }

    #[test_log::test]
    fn test_results_form() {
        let store = create_test_store();
        let workflow = create_test_workflow();
        let now = Utc::now();
        lifecycle::lock_round(&store, 1).unwrap();

        workflow
            .submit_results_phase(&store, "admin", 1, 1, &first_half(), now)
            .unwrap();
        assert!(
            store
                .get_fixtures_for_round(1)
                .unwrap()
                .iter()
                .all(|f| f.result.is_none())
        );
        let outcome = workflow
            .submit_results_phase(&store, "admin", 1, 2, &second_half(), now)
            .unwrap();
        let PhaseOutcome::Complete(fixtures) = outcome else {
            panic!("expected stored results, got {outcome:?}");
        };
        let results: Vec<String> = fixtures.into_iter().filter_map(|f| f.result).collect();
        assert_eq!(results, [first_half(), second_half()].concat());
    }

    #[test_log::test]
    fn test_results_form_needs_full_round() {
        let store = MemoryStore::new();
        let workflow = create_test_workflow();
        assert_eq!(
            workflow.submit_results_phase(&store, "admin", 1, 1, &first_half(), Utc::now()),
            Err(QuinielaError::IncompleteRound {
                round: 1,
                expected: 10,
                got: 0
            })
        );
    }

    #[test_log::test]
    fn test_fixtures_form_creates_round() {
        let store = MemoryStore::new();
        let workflow = create_test_workflow();
        let now = Utc::now();
        let titles: Vec<String> = (1..=10)
            .map(|i| format!("  Team {i} vs Team {} ", i + 10))
            .collect();

        workflow
            .submit_fixtures_phase(&store, "admin", 5, 1, &titles[..5], now)
            .unwrap();
        let mut blank = titles[5..].to_vec();
        blank[1] = String::new();
        assert_eq!(
            workflow.submit_fixtures_phase(&store, "admin", 5, 2, &blank, now),
            Err(QuinielaError::EmptyFixtureTitle { slot: 7 })
        );
        let outcome = workflow
            .submit_fixtures_phase(&store, "admin", 5, 2, &titles[5..], now)
            .unwrap();
        assert!(matches!(outcome, PhaseOutcome::Complete(ref f) if f.len() == 10));

        assert!(store.get_round(5).unwrap().is_some());
        let fixtures = store.get_fixtures_for_round(5).unwrap();
        assert_eq!(fixtures[0].title, "Team 1 vs Team 11");
        assert_eq!(fixtures[9].title, "Team 10 vs Team 20");
    }
}
