use model::stop_by_line::StopByLine;
use seeder::database::Result;
use sqlx::{Executor, Sqlite};

use crate::data_model::stop_by_line::StopByLineRow;

use super::convert_error;

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<StopByLine>>
where
    E: Executor<'c, Database = Sqlite>,
{
    let rows: Vec<StopByLineRow> = sqlx::query_as(
        "
        SELECT stop_id, line_id, \"order\"
        FROM stops_by_lines
        ORDER BY rowid;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(|why| convert_error(why))?;

    Ok(rows.into_iter().map(StopByLineRow::to_model).collect())
}

pub async fn insert<'c, E>(executor: E, entry: &StopByLine) -> Result<()>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        "
        INSERT INTO stops_by_lines(stop_id, line_id, \"order\")
        VALUES (?, ?, ?);
        ",
    )
    .bind(entry.stop_id.raw())
    .bind(entry.line_id.raw())
    .bind(entry.order)
    .execute(executor)
    .await
    .map_err(|why| convert_error(why))?;

    Ok(())
}

pub async fn delete_all<'c, E>(executor: E) -> Result<u64>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query("DELETE FROM stops_by_lines;")
        .execute(executor)
        .await
        .map(|result| result.rows_affected())
        .map_err(|why| convert_error(why))
}
