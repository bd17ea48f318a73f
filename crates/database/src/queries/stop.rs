use model::{stop::Stop, WithId};
use seeder::database::Result;
use sqlx::{Executor, Sqlite};
use utility::id::Id;

use crate::data_model::{stop::StopRow, with_ids};

use super::{convert_error, convert_json_error};

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<WithId<Stop>>>
where
    E: Executor<'c, Database = Sqlite>,
{
    let rows: Vec<StopRow> = sqlx::query_as(
        "
        SELECT id, code, geo, name
        FROM stops
        ORDER BY id;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(|why| convert_error(why))?;

    with_ids(rows)
}

pub async fn insert<'c, E>(executor: E, stop: &Stop) -> Result<Id<Stop>>
where
    E: Executor<'c, Database = Sqlite>,
{
    let geo = stop.geo.to_json().map_err(convert_json_error)?;
    let name = stop.name.to_json().map_err(convert_json_error)?;

    let result = sqlx::query(
        "
        INSERT INTO stops(code, geo, name)
        VALUES (?, ?, ?);
        ",
    )
    .bind(&stop.code)
    .bind(geo)
    .bind(name)
    .execute(executor)
    .await
    .map_err(|why| convert_error(why))?;

    Ok(Id::new(result.last_insert_rowid()))
}

pub async fn id_by_code<'c, E>(executor: E, code: &str) -> Result<Option<Id<Stop>>>
where
    E: Executor<'c, Database = Sqlite>,
{
    let id: Option<i64> = sqlx::query_scalar(
        "
        SELECT id
        FROM stops
        WHERE code = ?
        ORDER BY id
        LIMIT 1;
        ",
    )
    .bind(code)
    .fetch_optional(executor)
    .await
    .map_err(|why| convert_error(why))?;

    Ok(id.map(Id::new))
}

pub async fn delete_all<'c, E>(executor: E) -> Result<u64>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query("DELETE FROM stops;")
        .execute(executor)
        .await
        .map(|result| result.rows_affected())
        .map_err(|why| convert_error(why))
}
