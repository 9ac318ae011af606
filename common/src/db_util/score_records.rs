use super::*;

table! {
    score_records (id) {
        id -> BigInt,
        user_id -> Text,
        round_number -> Integer,
        points -> Integer,
        computed_at -> Timestamptz,
    }
}

#[derive(Queryable)]
#[diesel(table_name = score_records)]
struct ScoreRecordPrivate {
    #[allow(dead_code)]
    id: i64,
    user_id: String,
    round_number: i32,
    points: i32,
    computed_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = score_records)]
struct ScoreRecordPrivateNew {
    user_id: String,
    round_number: i32,
    points: i32,
    computed_at: DateTime<Utc>,
}

fn private_to_public(p: ScoreRecordPrivate) -> Result<ScoreRecord, String> {
    use conversions::*;
    Ok(ScoreRecord {
        user_id: p.user_id,
        round: i32_to_u32(p.round_number)?,
        points: i32_to_u32(p.points)?,
        computed_at: p.computed_at,
    })
}

/// Append a score row. Earlier rows for the same user and round are kept.
pub fn insert_score_record(
    conn: &mut PgConnection,
    input_user: &str,
    input_round: u32,
    input_points: u32,
    input_computed_at: DateTime<Utc>,
) -> Result<ScoreRecord, String> {
    use self::score_records::dsl::*;

    let insert_row = ScoreRecordPrivateNew {
        user_id: input_user.to_string(),
        round_number: conversions::u32_to_i32(input_round)?,
        points: conversions::u32_to_i32(input_points)?,
        computed_at: input_computed_at,
    };

    diesel::insert_into(score_records)
        .values(&insert_row)
        .get_result::<ScoreRecordPrivate>(conn)
        .map_err(|err| err.to_string())
        .and_then(private_to_public)
}

pub fn get_score_records_in_round(
    conn: &mut PgConnection,
    input_round: u32,
) -> Result<Vec<ScoreRecord>, String> {
    use self::score_records::dsl::*;

    let input_round = conversions::u32_to_i32(input_round)?;
    let items_private: Vec<ScoreRecordPrivate> = score_records
        .filter(round_number.eq(input_round))
        .order(id.asc())
        .load(conn)
        .map_err(|err| err.to_string())?;

    items_private
        .into_iter()
        .map(private_to_public)
        .collect::<Result<Vec<ScoreRecord>, String>>()
}

pub fn delete_score_records_in_round(
    conn: &mut PgConnection,
    input_round: i32,
) -> QueryResult<usize> {
    use self::score_records::dsl::*;

    diesel::delete(score_records.filter(round_number.eq(input_round))).execute(conn)
}
