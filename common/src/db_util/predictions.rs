use super::*;
use crate::store::{decode_scores, encode_scores};
use diesel::upsert::excluded;

table! {
    predictions (id) {
        id -> BigInt,
        user_id -> Text,
        round_number -> Integer,
        scores -> Text,
        submitted_at -> Timestamptz,
    }
}

#[derive(Queryable)]
#[diesel(table_name = predictions)]
struct PredictionPrivate {
    #[allow(dead_code)]
    id: i64,
    user_id: String,
    round_number: i32,
    scores: String,
    submitted_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = predictions)]
struct PredictionPrivateNew {
    user_id: String,
    round_number: i32,
    scores: String,
    submitted_at: DateTime<Utc>,
}

fn private_to_public(p: PredictionPrivate) -> Result<PredictionRecord, String> {
    use conversions::*;
    Ok(PredictionRecord {
        user_id: p.user_id,
        round: i32_to_u32(p.round_number)?,
        scores: decode_scores(&p.scores),
        submitted_at: p.submitted_at,
    })
}

pub fn get_prediction_by_user(
    conn: &mut PgConnection,
    input_user: &str,
    input_round: u32,
) -> Result<Option<PredictionRecord>, String> {
    use self::predictions::dsl::*;

    let input_round = conversions::u32_to_i32(input_round)?;

    predictions
        .filter(user_id.eq(input_user))
        .filter(round_number.eq(input_round))
        .first::<PredictionPrivate>(conn)
        .optional()
        .map_err(|err| err.to_string())?
        .map(private_to_public)
        .transpose()
}

/// Insert a prediction, or replace the scores of the user's existing one for the round.
pub fn upsert_prediction(
    conn: &mut PgConnection,
    input_user: &str,
    input_round: u32,
    input_scores: &[String],
    input_submitted_at: DateTime<Utc>,
) -> Result<PredictionRecord, String> {
    use self::predictions::dsl::*;

    let insert_row = PredictionPrivateNew {
        user_id: input_user.to_string(),
        round_number: conversions::u32_to_i32(input_round)?,
        scores: encode_scores(input_scores)?,
        submitted_at: input_submitted_at,
    };

    diesel::insert_into(predictions)
        .values(&insert_row)
        .on_conflict((user_id, round_number))
        .do_update()
        .set((
            scores.eq(excluded(scores)),
            submitted_at.eq(excluded(submitted_at)),
        ))
        .get_result::<PredictionPrivate>(conn)
        .map_err(|err| err.to_string())
        .and_then(private_to_public)
}

pub fn get_predictions_in_round(
    conn: &mut PgConnection,
    input_round: u32,
) -> Result<Vec<PredictionRecord>, String> {
    use self::predictions::dsl::*;

    let input_round = conversions::u32_to_i32(input_round)?;
    let items_private: Vec<PredictionPrivate> = predictions
        .filter(round_number.eq(input_round))
        .order(id.asc())
        .load(conn)
        .map_err(|err| err.to_string())?;

    items_private
        .into_iter()
        .map(private_to_public)
        .collect::<Result<Vec<PredictionRecord>, String>>()
}

pub fn delete_predictions_in_round(
    conn: &mut PgConnection,
    input_round: i32,
) -> QueryResult<usize> {
    use self::predictions::dsl::*;

    diesel::delete(predictions.filter(round_number.eq(input_round))).execute(conn)
}
