use super::*;

table! {
    rounds (number) {
        number -> Integer,
        locked -> Bool,
    }
}

#[derive(Queryable)]
#[diesel(table_name = rounds)]
struct RoundPrivate {
    number: i32,
    locked: bool,
}

#[derive(Insertable)]
#[diesel(table_name = rounds)]
struct RoundPrivateNew {
    number: i32,
    locked: bool,
}

fn private_to_public(p: RoundPrivate) -> Result<RoundRecord, String> {
    use conversions::*;
    Ok(RoundRecord {
        number: i32_to_u32(p.number)?,
        locked: p.locked,
    })
}

pub fn insert_round(conn: &mut PgConnection, input_number: u32) -> Result<RoundRecord, String> {
    use self::rounds::dsl::*;

    let insert_row = RoundPrivateNew {
        number: conversions::u32_to_i32(input_number)?,
        locked: false,
    };

    diesel::insert_into(rounds)
        .values(&insert_row)
        .get_result::<RoundPrivate>(conn)
        .map_err(|err| err.to_string())
        .and_then(private_to_public)
}

pub fn get_round_by_number(
    conn: &mut PgConnection,
    input_number: u32,
) -> Result<Option<RoundRecord>, String> {
    use self::rounds::dsl::*;

    let input_number = conversions::u32_to_i32(input_number)?;

    rounds
        .filter(number.eq(input_number))
        .first::<RoundPrivate>(conn)
        .optional()
        .map_err(|err| err.to_string())?
        .map(private_to_public)
        .transpose()
}

pub fn update_round_locked(
    conn: &mut PgConnection,
    input_number: u32,
    input_locked: bool,
) -> Result<Option<RoundRecord>, String> {
    use self::rounds::dsl::*;

    let input_number = conversions::u32_to_i32(input_number)?;

    diesel::update(rounds.filter(number.eq(input_number)))
        .set(locked.eq(input_locked))
        .get_result::<RoundPrivate>(conn)
        .optional()
        .map_err(|err| err.to_string())?
        .map(private_to_public)
        .transpose()
}

/// Only removes the round row, see `PgStore::delete_round_cascade` for the full removal.
pub fn delete_round(conn: &mut PgConnection, input_number: i32) -> QueryResult<usize> {
    use self::rounds::dsl::*;

    diesel::delete(rounds.filter(number.eq(input_number))).execute(conn)
}
