use super::*;
use diesel::upsert::excluded;

table! {
    fixtures (round_number, slot) {
        round_number -> Integer,
        slot -> SmallInt,
        title -> Text,
        result -> Nullable<Text>,
        active -> Bool,
    }
}

#[derive(Queryable)]
#[diesel(table_name = fixtures)]
struct FixturePrivate {
    round_number: i32,
    slot: i16,
    title: String,
    result: Option<String>,
    active: bool,
}

#[derive(Insertable)]
#[diesel(table_name = fixtures)]
struct FixturePrivateNew {
    round_number: i32,
    slot: i16,
    title: String,
}

fn private_to_public(p: FixturePrivate) -> Result<FixtureRecord, String> {
    use conversions::*;
    Ok(FixtureRecord {
        round: i32_to_u32(p.round_number)?,
        slot: i16_to_u8(p.slot)?,
        title: p.title,
        result: p.result,
        active: p.active,
    })
}

fn build_new_rows(round: i32, titles: &[String]) -> Result<Vec<FixturePrivateNew>, String> {
    titles
        .iter()
        .enumerate()
        .map(|(i, input_title)| {
            Ok(FixturePrivateNew {
                round_number: round,
                slot: conversions::slot_from_index(i)?,
                title: input_title.clone(),
            })
        })
        .collect()
}

/// Insert fixtures or overwrite their titles, leaving `result` and `active` as they were.
pub fn upsert_fixture_titles(
    conn: &mut PgConnection,
    input_round: u32,
    titles: &[String],
) -> Result<Vec<FixtureRecord>, String> {
    use self::fixtures::dsl::*;

    let input_round = conversions::u32_to_i32(input_round)?;
    let insert_rows = build_new_rows(input_round, titles)?;

    let items_private: Vec<FixturePrivate> = diesel::insert_into(fixtures)
        .values(&insert_rows)
        .on_conflict((round_number, slot))
        .do_update()
        .set(title.eq(excluded(title)))
        .get_results(conn)
        .map_err(|err| err.to_string())?;

    let mut items = items_private
        .into_iter()
        .map(private_to_public)
        .collect::<Result<Vec<FixtureRecord>, String>>()?;
    items.sort_by_key(|f| f.slot);
    Ok(items)
}

pub fn get_fixtures_in_round(
    conn: &mut PgConnection,
    input_round: u32,
) -> Result<Vec<FixtureRecord>, String> {
    use self::fixtures::dsl::*;

    let input_round = conversions::u32_to_i32(input_round)?;
    let items_private: Vec<FixturePrivate> = fixtures
        .filter(round_number.eq(input_round))
        .order(slot.asc())
        .load(conn)
        .map_err(|err| err.to_string())?;

    items_private
        .into_iter()
        .map(private_to_public)
        .collect::<Result<Vec<FixtureRecord>, String>>()
}

pub fn update_fixture_active(
    conn: &mut PgConnection,
    input_round: u32,
    input_slot: u8,
    input_active: bool,
) -> Result<Option<FixtureRecord>, String> {
    use self::fixtures::dsl::*;

    let input_round = conversions::u32_to_i32(input_round)?;
    let input_slot = conversions::u8_to_i16(input_slot);

    diesel::update(
        fixtures
            .filter(round_number.eq(input_round))
            .filter(slot.eq(input_slot)),
    )
    .set(active.eq(input_active))
    .get_result::<FixturePrivate>(conn)
    .optional()
    .map_err(|err| err.to_string())?
    .map(private_to_public)
    .transpose()
}

pub fn update_fixture_result(
    conn: &mut PgConnection,
    input_round: u32,
    input_slot: u8,
    input_result: Option<&str>,
) -> Result<Option<FixtureRecord>, String> {
    use self::fixtures::dsl::*;

    let input_round = conversions::u32_to_i32(input_round)?;
    let input_slot = conversions::u8_to_i16(input_slot);

    diesel::update(
        fixtures
            .filter(round_number.eq(input_round))
            .filter(slot.eq(input_slot)),
    )
    .set(result.eq(input_result))
    .get_result::<FixturePrivate>(conn)
    .optional()
    .map_err(|err| err.to_string())?
    .map(private_to_public)
    .transpose()
}

/// The highest round with a fixture that still has no result.
/// Used at startup to decide which round's submission form to bring back.
pub fn get_latest_unresulted_round(conn: &mut PgConnection) -> Result<Option<u32>, String> {
    use self::fixtures::dsl::*;

    fixtures
        .filter(result.is_null())
        .order(round_number.desc())
        .select(round_number)
        .first::<i32>(conn)
        .optional()
        .map_err(|err| err.to_string())?
        .map(conversions::i32_to_u32)
        .transpose()
}

pub fn delete_fixtures_in_round(conn: &mut PgConnection, input_round: i32) -> QueryResult<usize> {
    use self::fixtures::dsl::*;

    diesel::delete(fixtures.filter(round_number.eq(input_round))).execute(conn)
}
