//! Administrative operations on rounds and their fixtures.

use crate::store::Store;
use crate::validation::{validate_scores, validate_titles};
use crate::{FixtureRecord, QuinielaError, RoundRecord};
use log::info;

/// Register a new, unlocked round without fixtures.
///
/// # Errors
/// Returns `DuplicateRound` if the number is taken.
pub fn create_round(store: &dyn Store, number: u32) -> Result<RoundRecord, QuinielaError> {
    if store.get_round(number).map_err(QuinielaError::Store)?.is_some() {
        return Err(QuinielaError::DuplicateRound { round: number });
    }
    let round = store.insert_round(number).map_err(QuinielaError::Store)?;
    info!("Created round {number}");
    Ok(round)
}

/// Write the titles of every fixture in a round, registering the round if it is missing.
/// Re-running with the same titles changes nothing; results and active flags are never touched.
///
/// # Errors
/// Returns `InvalidFixtureCount` unless exactly one title per slot is given,
/// or `EmptyFixtureTitle` if any title is blank.
pub fn set_fixtures(
    store: &dyn Store,
    round: u32,
    titles: &[String],
    fixtures_per_round: usize,
) -> Result<Vec<FixtureRecord>, QuinielaError> {
    if titles.len() != fixtures_per_round {
        return Err(QuinielaError::InvalidFixtureCount {
            round,
            expected: fixtures_per_round,
            got: titles.len(),
        });
    }
    let titles = validate_titles(titles, 1)?;

    if store.get_round(round).map_err(QuinielaError::Store)?.is_none() {
        store.insert_round(round).map_err(QuinielaError::Store)?;
        info!("Registered round {round} while setting its fixtures");
    }
    let fixtures = store
        .upsert_fixture_titles(round, &titles)
        .map_err(QuinielaError::Store)?;
    info!("Set {} fixtures for round {round}", fixtures.len());
    Ok(fixtures)
}

fn set_round_locked(
    store: &dyn Store,
    number: u32,
    locked: bool,
) -> Result<RoundRecord, QuinielaError> {
    let round = store
        .set_round_locked(number, locked)
        .map_err(QuinielaError::Store)?
        .ok_or(QuinielaError::RoundNotFound { round: number })?;
    info!(
        "Round {number} {}",
        if locked { "locked" } else { "unlocked" }
    );
    Ok(round)
}

/// Stop accepting new or edited predictions for a round.
///
/// # Errors
/// Returns `RoundNotFound` if the round does not exist.
pub fn lock_round(store: &dyn Store, number: u32) -> Result<RoundRecord, QuinielaError> {
    set_round_locked(store, number, true)
}

/// Accept predictions for a round again.
///
/// # Errors
/// Returns `RoundNotFound` if the round does not exist.
pub fn unlock_round(store: &dyn Store, number: u32) -> Result<RoundRecord, QuinielaError> {
    set_round_locked(store, number, false)
}

/// Whether a round refuses predictions. A round with no row is open.
///
/// # Errors
/// Returns a store error if the lookup fails.
pub fn is_round_locked(store: &dyn Store, number: u32) -> Result<bool, QuinielaError> {
    Ok(store
        .get_round(number)
        .map_err(QuinielaError::Store)?
        .is_some_and(|r| r.locked))
}

/// Include or exclude a fixture from scoring, for postponed or abandoned matches.
/// The stored result is kept either way.
///
/// # Errors
/// Returns `InvalidSlot` if the round has no fixture in that slot.
pub fn set_fixture_active(
    store: &dyn Store,
    round: u32,
    slot: u8,
    active: bool,
) -> Result<FixtureRecord, QuinielaError> {
    let fixture = store
        .set_fixture_active(round, slot, active)
        .map_err(QuinielaError::Store)?
        .ok_or(QuinielaError::InvalidSlot { round, slot })?;
    info!(
        "Fixture {slot} of round {round} marked {}",
        if active { "active" } else { "suspended" }
    );
    Ok(fixture)
}

/// Record the real result of every fixture in a round, slot 1 first.
/// All results are validated before the first one is written.
///
/// # Errors
/// Returns `IncompleteRound` if the round does not have all its fixtures,
/// `InvalidChunkLength` if the number of results is wrong,
/// or `InvalidScoreFormat` for the first malformed result.
pub fn set_results(
    store: &dyn Store,
    round: u32,
    results: &[String],
    fixtures_per_round: usize,
) -> Result<Vec<FixtureRecord>, QuinielaError> {
    let fixtures = store
        .get_fixtures_for_round(round)
        .map_err(QuinielaError::Store)?;
    if fixtures.len() != fixtures_per_round {
        return Err(QuinielaError::IncompleteRound {
            round,
            expected: fixtures_per_round,
            got: fixtures.len(),
        });
    }
    if results.len() != fixtures.len() {
        return Err(QuinielaError::InvalidChunkLength {
            expected: fixtures.len(),
            got: results.len(),
        });
    }
    let results = validate_scores(results)?;

    let mut updated = Vec::with_capacity(fixtures.len());
    for (fixture, result) in fixtures.iter().zip(&results) {
        let fixture = store
            .set_fixture_result(round, fixture.slot, Some(result))
            .map_err(QuinielaError::Store)?
            .ok_or(QuinielaError::InvalidSlot {
                round,
                slot: fixture.slot,
            })?;
        updated.push(fixture);
    }
    info!("Saved results for round {round}");
    Ok(updated)
}

/// Remove a round and everything recorded for it. This cannot be undone.
///
/// # Errors
/// Returns `RoundNotFound` if neither the round nor any of its fixtures existed, even when
/// stray predictions or score records were cleared.
pub fn delete_round(store: &dyn Store, number: u32) -> Result<(), QuinielaError> {
    if store
        .delete_round_cascade(number)
        .map_err(QuinielaError::Store)?
    {
        info!("Deleted round {number} with all its data");
        Ok(())
    } else {
        Err(QuinielaError::RoundNotFound { round: number })
    }
}

/// The highest round that still has a fixture waiting for its result.
///
/// # Errors
/// Returns a store error if the lookup fails.
pub fn latest_open_round(store: &dyn Store) -> Result<Option<u32>, QuinielaError> {
    store.get_latest_open_round().map_err(QuinielaError::Store)
}
