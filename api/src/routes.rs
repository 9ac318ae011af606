//! JSON endpoints over the contest entry points.
//!
//! Participant and administrator identities arrive in the path; checking that a caller may act
//! as them belongs to whatever sits in front of this api.

use crate::helpers::{ApiError, ApiResult, not_found_error, quiniela_error};
use quiniela_common::scoring::RoundScoring;
use quiniela_common::workflow::{PhaseOutcome, SubmissionStart};
use quiniela_common::{FixtureRecord, PredictionRecord, Quiniela, RoundRecord, ScoreRecord};
use rocket::State;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct RoundInput {
    number: u32,
}

/// The values of a whole round or of one form step, in slot order.
#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ValuesInput {
    values: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ActiveInput {
    active: bool,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct OpenRound {
    round: Option<u32>,
}

#[get("/rounds/open")]
pub fn open_round(contest: &State<Quiniela>) -> ApiResult<OpenRound> {
    let round = contest.latest_open_round().map_err(quiniela_error)?;
    Ok(Json(OpenRound { round }))
}

#[post("/rounds", data = "<input>")]
pub fn create_round(contest: &State<Quiniela>, input: Json<RoundInput>) -> ApiResult<RoundRecord> {
    contest
        .create_round(input.number)
        .map(Json)
        .map_err(quiniela_error)
}

#[delete("/rounds/<round>")]
pub fn delete_round(contest: &State<Quiniela>, round: u32) -> Result<Status, ApiError> {
    contest.delete_round(round).map_err(quiniela_error)?;
    Ok(Status::NoContent)
}

#[post("/rounds/<round>/lock")]
pub fn lock_round(contest: &State<Quiniela>, round: u32) -> ApiResult<RoundRecord> {
    contest.lock_round(round).map(Json).map_err(quiniela_error)
}

#[post("/rounds/<round>/unlock")]
pub fn unlock_round(contest: &State<Quiniela>, round: u32) -> ApiResult<RoundRecord> {
    contest.unlock_round(round).map(Json).map_err(quiniela_error)
}

#[put("/rounds/<round>/fixtures", data = "<input>")]
pub fn set_fixtures(
    contest: &State<Quiniela>,
    round: u32,
    input: Json<ValuesInput>,
) -> ApiResult<Vec<FixtureRecord>> {
    contest
        .set_fixtures(round, &input.values)
        .map(Json)
        .map_err(quiniela_error)
}

#[post("/rounds/<round>/fixtures/<admin>/phase/<phase>", data = "<input>")]
pub fn submit_fixtures_phase(
    contest: &State<Quiniela>,
    round: u32,
    admin: &str,
    phase: usize,
    input: Json<ValuesInput>,
) -> ApiResult<PhaseOutcome<Vec<FixtureRecord>>> {
    contest
        .submit_fixtures_phase(admin, round, phase, &input.values)
        .map(Json)
        .map_err(quiniela_error)
}

#[put("/rounds/<round>/fixtures/<slot>/active", data = "<input>")]
pub fn set_fixture_active(
    contest: &State<Quiniela>,
    round: u32,
    slot: u8,
    input: Json<ActiveInput>,
) -> ApiResult<FixtureRecord> {
    contest
        .set_fixture_active(round, slot, input.active)
        .map(Json)
        .map_err(quiniela_error)
}

#[put("/rounds/<round>/results", data = "<input>")]
pub fn set_results(
    contest: &State<Quiniela>,
    round: u32,
    input: Json<ValuesInput>,
) -> ApiResult<Vec<FixtureRecord>> {
    contest
        .set_results(round, &input.values)
        .map(Json)
        .map_err(quiniela_error)
}

#[post("/rounds/<round>/results/<admin>/phase/<phase>", data = "<input>")]
pub fn submit_results_phase(
    contest: &State<Quiniela>,
    round: u32,
    admin: &str,
    phase: usize,
    input: Json<ValuesInput>,
) -> ApiResult<PhaseOutcome<Vec<FixtureRecord>>> {
    contest
        .submit_results_phase(admin, round, phase, &input.values)
        .map(Json)
        .map_err(quiniela_error)
}

#[get("/rounds/<round>/predictions/<user>")]
pub fn get_prediction(
    contest: &State<Quiniela>,
    round: u32,
    user: &str,
) -> ApiResult<PredictionRecord> {
    match contest.get_prediction(user, round).map_err(quiniela_error)? {
        Some(prediction) => Ok(Json(prediction)),
        None => Err(not_found_error(format!(
            "User {user} has no prediction for round {round}."
        ))),
    }
}

#[post("/rounds/<round>/predictions/<user>/begin")]
pub fn begin_submission(
    contest: &State<Quiniela>,
    round: u32,
    user: &str,
) -> ApiResult<SubmissionStart> {
    contest
        .begin_submission(user, round)
        .map(Json)
        .map_err(quiniela_error)
}

#[post("/rounds/<round>/predictions/<user>/phase/<phase>", data = "<input>")]
pub fn submit_prediction_phase(
    contest: &State<Quiniela>,
    round: u32,
    user: &str,
    phase: usize,
    input: Json<ValuesInput>,
) -> ApiResult<PhaseOutcome<PredictionRecord>> {
    contest
        .submit_prediction_phase(user, round, phase, &input.values)
        .map(Json)
        .map_err(quiniela_error)
}

#[post("/rounds/<round>/predictions/<user>/edit")]
pub fn begin_edit(
    contest: &State<Quiniela>,
    round: u32,
    user: &str,
) -> ApiResult<SubmissionStart> {
    contest
        .begin_edit(user, round)
        .map(Json)
        .map_err(quiniela_error)
}

#[post("/rounds/<round>/predictions/<user>/edit/phase/<phase>", data = "<input>")]
pub fn submit_edit_phase(
    contest: &State<Quiniela>,
    round: u32,
    user: &str,
    phase: usize,
    input: Json<ValuesInput>,
) -> ApiResult<PhaseOutcome<PredictionRecord>> {
    contest
        .submit_edit_phase(user, round, phase, &input.values)
        .map(Json)
        .map_err(quiniela_error)
}

#[post("/rounds/<round>/score")]
pub fn score_round(contest: &State<Quiniela>, round: u32) -> ApiResult<RoundScoring> {
    contest.score(round).map(Json).map_err(quiniela_error)
}

#[get("/rounds/<round>/scores")]
pub fn score_records(contest: &State<Quiniela>, round: u32) -> ApiResult<Vec<ScoreRecord>> {
    contest.score_records(round).map(Json).map_err(quiniela_error)
}
