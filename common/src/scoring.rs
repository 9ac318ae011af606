//! Point computation and leaderboards for a finished round.

use crate::store::Store;
use crate::{FixtureRecord, PredictionRecord, QuinielaError};
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Awarded when the predicted outcome (home win, draw, away win) is right.
pub const OUTCOME_POINTS: u32 = 1;
/// Awarded on top of the outcome points when the exact score is right.
pub const EXACT_SCORE_BONUS: u32 = 3;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

/// Goal counts of any length, kept as digits without leading zeros.
fn normalize_goals(digits: &str) -> Option<String> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let trimmed = digits.trim_start_matches('0');
    Some(if trimmed.is_empty() { "0" } else { trimmed }.to_string())
}

/// Numeric order of two normalized goal counts.
fn compare_goals(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// A parsed `<home>-<away>` score.
///
/// Goals stay as normalized digit strings, so every score that passes validation can be
/// compared no matter how many digits it has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreLine {
    pub home: String,
    pub away: String,
}

impl ScoreLine {
    /// Parse a score string. Returns `None` for anything that is not two non-negative
    /// integers joined by a dash.
    #[must_use]
    pub fn parse(score: &str) -> Option<Self> {
        let (home, away) = score.trim().split_once('-')?;
        Some(Self {
            home: normalize_goals(home)?,
            away: normalize_goals(away)?,
        })
    }

    #[must_use]
    pub fn outcome(&self) -> Outcome {
        match compare_goals(&self.home, &self.away) {
            Ordering::Greater => Outcome::HomeWin,
            Ordering::Equal => Outcome::Draw,
            Ordering::Less => Outcome::AwayWin,
        }
    }
}

/// Points a single predicted score earns against a fixture.
/// Suspended or unresulted fixtures and unparsable scores on either side earn nothing.
#[must_use]
pub fn fixture_points(predicted: &str, fixture: &FixtureRecord) -> u32 {
    if !fixture.active {
        return 0;
    }
    let Some(result) = fixture.result.as_deref() else {
        return 0;
    };
    let (Some(predicted), Some(actual)) = (ScoreLine::parse(predicted), ScoreLine::parse(result))
    else {
        return 0;
    };

    let mut points = 0;
    if predicted.outcome() == actual.outcome() {
        points += OUTCOME_POINTS;
    }
    if predicted == actual {
        points += EXACT_SCORE_BONUS;
    }
    points
}

/// Total points of a prediction over a round. The score for slot `n` is the `n`th entry.
#[must_use]
pub fn prediction_points(fixtures: &[FixtureRecord], scores: &[String]) -> u32 {
    fixtures
        .iter()
        .filter_map(|fixture| {
            let index = usize::from(fixture.slot).checked_sub(1)?;
            let predicted = scores.get(index)?;
            Some(fixture_points(predicted, fixture))
        })
        .sum()
}

/// One participant's total for a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub user_id: String,
    pub points: u32,
}

/// Sort standings by points, highest first. Ties keep their input order.
#[must_use]
pub fn rank_standings(mut standings: Vec<Standing>) -> Vec<Standing> {
    // sort_by is stable
    standings.sort_by(|a, b| b.points.cmp(&a.points));
    standings
}

/// The outcome of one scoring run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundScoring {
    pub round: u32,
    pub computed_at: DateTime<Utc>,
    /// The top of the ranking, cut to the leaderboard size.
    pub leaderboard: Vec<Standing>,
    /// Every participant, ranked.
    pub standings: Vec<Standing>,
}

/// Compute standings from a round's fixtures and predictions without touching any store.
///
/// # Errors
/// Returns `NoResults` if no fixture is both active and resulted,
/// or `NoPredictions` if there are no predictions.
pub fn evaluate_round(
    round: u32,
    fixtures: &[FixtureRecord],
    predictions: &[PredictionRecord],
) -> Result<Vec<Standing>, QuinielaError> {
    if !fixtures.iter().any(FixtureRecord::is_scorable) {
        return Err(QuinielaError::NoResults { round });
    }
    if predictions.is_empty() {
        return Err(QuinielaError::NoPredictions { round });
    }

    Ok(predictions
        .iter()
        .map(|prediction| Standing {
            user_id: prediction.user_id.clone(),
            points: prediction_points(fixtures, &prediction.scores),
        })
        .collect())
}

/// Score every prediction of a round, append a score record per participant and return the
/// ranking. Earlier score records are never touched, so re-running adds a later set.
///
/// # Errors
/// Returns `NoResults` or `NoPredictions` before anything is written,
/// or a store error if reading or appending fails.
pub fn score_round(
    store: &dyn Store,
    round: u32,
    leaderboard_size: usize,
    computed_at: DateTime<Utc>,
) -> Result<RoundScoring, QuinielaError> {
    let fixtures = store
        .get_fixtures_for_round(round)
        .map_err(QuinielaError::Store)?;
    let predictions = store
        .get_predictions_for_round(round)
        .map_err(QuinielaError::Store)?;

    let standings = evaluate_round(round, &fixtures, &predictions)?;
    info!(
        "Scoring round {round}: {} predictions against {} fixtures",
        predictions.len(),
        fixtures.len()
    );

    for standing in &standings {
        debug!("Round {round}: {} scored {}", standing.user_id, standing.points);
        store
            .insert_score_record(&standing.user_id, round, standing.points, computed_at)
            .map_err(QuinielaError::Store)?;
    }

    let standings = rank_standings(standings);
    let leaderboard = standings.iter().take(leaderboard_size).cloned().collect();
    Ok(RoundScoring {
        round,
        computed_at,
        leaderboard,
        standings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use chrono::TimeDelta;

    fn create_test_fixture(slot: u8, result: Option<&str>, active: bool) -> FixtureRecord {
        FixtureRecord {
            round: 1,
            slot,
            title: format!("Match {slot}"),
            result: result.map(str::to_string),
            active,
        }
    }

    fn create_test_prediction(user_id: &str, scores: &[&str]) -> PredictionRecord {
        PredictionRecord {
            user_id: user_id.to_string(),
            round: 1,
            scores: scores.iter().map(|s| (*s).to_string()).collect(),
            submitted_at: Utc::now(),
        }
    }

    fn standing(user_id: &str, points: u32) -> Standing {
        Standing {
            user_id: user_id.to_string(),
            points,
        }
    }

    /// A store with ten fixtures, the given results filling the first slots.
    fn create_test_store(results: &[&str]) -> MemoryStore {
        let store = MemoryStore::new();
        let titles: Vec<String> = (1..=10).map(|i| format!("Match {i}")).collect();
        store.upsert_fixture_titles(1, &titles).unwrap();
        for (i, result) in results.iter().enumerate() {
            let slot = u8::try_from(i + 1).unwrap();
            store.set_fixture_result(1, slot, Some(result)).unwrap();
        }
        store
    }

    #[test]
    fn test_parse_score_line() {
        assert_eq!(
            ScoreLine::parse("2-1"),
            Some(ScoreLine {
                home: "2".to_string(),
                away: "1".to_string(),
            })
        );
        assert_eq!(ScoreLine::parse("2-1").unwrap().outcome(), Outcome::HomeWin);
        assert_eq!(ScoreLine::parse("0-0").unwrap().outcome(), Outcome::Draw);
        assert_eq!(ScoreLine::parse("0-3").unwrap().outcome(), Outcome::AwayWin);
        assert_eq!(ScoreLine::parse("2:1"), None);
        assert_eq!(ScoreLine::parse("-1-2"), None);
        assert_eq!(ScoreLine::parse("1-"), None);
        assert_eq!(ScoreLine::parse("007-7"), ScoreLine::parse("7-7"));
    }

    #[test]
    fn test_large_scores_compare_without_overflow() {
        let large = "4294967296-0";
        assert!(crate::validation::is_valid_score(large));

        let fixture = create_test_fixture(1, Some(large), true);
        assert_eq!(fixture_points(large, &fixture), 4);
        assert_eq!(fixture_points("04294967296-000", &fixture), 4);
        assert_eq!(fixture_points("4294967297-0", &fixture), 1);
        assert_eq!(fixture_points("0-4294967296", &fixture), 0);

        assert_eq!(
            ScoreLine::parse("99999999999-100000000000").map(|s| s.outcome()),
            Some(Outcome::AwayWin)
        );
        assert_eq!(
            ScoreLine::parse("10-9").map(|s| s.outcome()),
            Some(Outcome::HomeWin)
        );
    }

    #[test]
    fn test_fixture_points() {
        let fixture = create_test_fixture(1, Some("2-1"), true);
        assert_eq!(fixture_points("2-1", &fixture), 4);
        assert_eq!(fixture_points("3-0", &fixture), 1);
        assert_eq!(fixture_points("1-1", &fixture), 0);
        assert_eq!(fixture_points("0-2", &fixture), 0);
        assert_eq!(fixture_points("garbage", &fixture), 0);
    }

    #[test]
    fn test_outcome_and_exact_points_stack() {
        let fixtures = vec![
            create_test_fixture(1, Some("2-1"), true),
            create_test_fixture(2, Some("0-0"), true),
        ];
        let scores = vec!["2-1".to_string(), "1-1".to_string()];
        assert_eq!(prediction_points(&fixtures, &scores), 5);
    }

    #[test]
    fn test_suspended_and_unresulted_fixtures_score_nothing() {
        let fixtures = vec![
            create_test_fixture(1, Some("2-1"), false),
            create_test_fixture(2, None, true),
            create_test_fixture(3, Some("corrupt"), true),
            create_test_fixture(4, Some("1-1"), true),
        ];
        let scores: Vec<String> = ["2-1", "0-0", "1-0", "1-1"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        assert_eq!(prediction_points(&fixtures, &scores), 4);
    }

    #[test]
    fn test_short_prediction_scores_missing_slots_as_misses() {
        let fixtures = vec![
            create_test_fixture(1, Some("1-0"), true),
            create_test_fixture(2, Some("1-0"), true),
        ];
        assert_eq!(prediction_points(&fixtures, &["1-0".to_string()]), 4);
        assert_eq!(prediction_points(&fixtures, &[]), 0);
    }

    #[test]
    fn test_ranking_is_stable_and_descending() {
        let ranked = rank_standings(vec![standing("c", 3), standing("a", 5), standing("b", 5)]);
        assert_eq!(
            ranked,
            vec![standing("a", 5), standing("b", 5), standing("c", 3)]
        );
    }

    #[test]
    fn test_evaluate_round_preconditions() {
        let predictions = vec![create_test_prediction("a", &["1-0"])];
        let unresulted = vec![create_test_fixture(1, None, true)];
        assert_eq!(
            evaluate_round(1, &unresulted, &predictions),
            Err(QuinielaError::NoResults { round: 1 })
        );

        let all_suspended = vec![create_test_fixture(1, Some("1-0"), false)];
        assert_eq!(
            evaluate_round(1, &all_suspended, &predictions),
            Err(QuinielaError::NoResults { round: 1 })
        );
        assert_eq!(
            evaluate_round(1, &[], &predictions),
            Err(QuinielaError::NoResults { round: 1 })
        );

        let resulted = vec![create_test_fixture(1, Some("1-0"), true)];
        assert_eq!(
            evaluate_round(1, &resulted, &[]),
            Err(QuinielaError::NoPredictions { round: 1 })
        );
    }

    #[test_log::test]
    fn test_score_round_appends_records() {
        let store = create_test_store(&["2-1", "0-0"]);
        let mut c = vec!["0-2".to_string(); 10];
        c[1] = "1-1".to_string();
        store.upsert_prediction("c", 1, &c, Utc::now()).unwrap();
        let mut a = vec!["0-0".to_string(); 10];
        a[0] = "2-1".to_string();
        a[1] = "1-1".to_string();
        store.upsert_prediction("a", 1, &a, Utc::now()).unwrap();
        store.upsert_prediction("b", 1, &a, Utc::now()).unwrap();

        let first_run = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let scoring = score_round(&store, 1, 2, first_run).unwrap();

        assert_eq!(
            scoring.standings,
            vec![standing("a", 5), standing("b", 5), standing("c", 1)]
        );
        assert_eq!(scoring.leaderboard, vec![standing("a", 5), standing("b", 5)]);

        let records = store.get_score_records_for_round(1).unwrap();
        assert_eq!(records.len(), 3);
        // records follow prediction order, not rank
        assert_eq!(records[0].user_id, "c");
        assert!(records.iter().all(|r| r.computed_at == first_run));

        let second_run = first_run + TimeDelta::hours(1);
        score_round(&store, 1, 25, second_run).unwrap();
        let records = store.get_score_records_for_round(1).unwrap();
        assert_eq!(records.len(), 6);
        assert!(records[..3].iter().all(|r| r.computed_at == first_run));
        assert!(records[3..].iter().all(|r| r.computed_at == second_run));
    }

    #[test_log::test]
    fn test_score_round_without_results_writes_nothing() {
        let store = create_test_store(&[]);
        store
            .upsert_prediction("a", 1, &["1-0".to_string()], Utc::now())
            .unwrap();

        assert_eq!(
            score_round(&store, 1, 25, Utc::now()),
            Err(QuinielaError::NoResults { round: 1 })
        );
        assert!(store.get_score_records_for_round(1).unwrap().is_empty());
    }

    #[test_log::test]
    fn test_deactivated_fixture_scores_nothing_for_anyone() {
        let store = create_test_store(&["2-1", "0-0"]);
        store.set_fixture_active(1, 1, false).unwrap();
        let scores: Vec<String> = ["2-1", "0-0"].iter().map(|s| (*s).to_string()).collect();
        store.upsert_prediction("a", 1, &scores, Utc::now()).unwrap();

        let scoring = score_round(&store, 1, 25, Utc::now()).unwrap();
        assert_eq!(scoring.standings, vec![standing("a", 4)]);
    }
}
