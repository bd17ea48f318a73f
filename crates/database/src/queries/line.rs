use model::{
    line::{Color, Direction, Line, LineMetadata},
    WithId,
};
use seeder::database::Result;
use sqlx::{Executor, Sqlite};
use utility::id::Id;

use crate::data_model::{
    line::{LineRow, RowMode},
    with_ids,
};

use super::{convert_error, convert_json_error};

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<WithId<Line>>>
where
    E: Executor<'c, Database = Sqlite>,
{
    let rows: Vec<LineRow> = sqlx::query_as(
        "
        SELECT id, code, destination, direction, mode, color, text_color
        FROM lines
        ORDER BY id;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(|why| convert_error(why))?;

    with_ids(rows)
}

pub async fn insert<'c, E>(executor: E, line: &Line) -> Result<Id<Line>>
where
    E: Executor<'c, Database = Sqlite>,
{
    let destination = line.destination.to_json().map_err(convert_json_error)?;

    let result = sqlx::query(
        "
        INSERT INTO lines(code, destination, direction, mode, color, text_color)
        VALUES (?, ?, ?, ?, ?, ?);
        ",
    )
    .bind(&line.code)
    .bind(destination)
    .bind(line.direction.as_flag())
    .bind(line.mode.map(RowMode::from_mode))
    .bind(line.color.map(|color| color.to_hex()))
    .bind(line.text_color_or_default().to_hex())
    .execute(executor)
    .await
    .map_err(|why| convert_error(why))?;

    Ok(Id::new(result.last_insert_rowid()))
}

pub async fn id_by_code_and_direction<'c, E>(
    executor: E,
    code: &str,
    direction: Direction,
) -> Result<Option<Id<Line>>>
where
    E: Executor<'c, Database = Sqlite>,
{
    let id: Option<i64> = sqlx::query_scalar(
        "
        SELECT id
        FROM lines
        WHERE code = ? AND direction = ?
        ORDER BY id
        LIMIT 1;
        ",
    )
    .bind(code)
    .bind(direction.as_flag())
    .fetch_optional(executor)
    .await
    .map_err(|why| convert_error(why))?;

    Ok(id.map(Id::new))
}

pub async fn update_metadata<'c, E>(
    executor: E,
    code: &str,
    metadata: &LineMetadata,
) -> Result<u64>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        "
        UPDATE lines
        SET mode = ?, color = ?
        WHERE code = ?;
        ",
    )
    .bind(RowMode::from_mode(metadata.mode))
    .bind(metadata.color.to_hex())
    .bind(code)
    .execute(executor)
    .await
    .map(|result| result.rows_affected())
    .map_err(|why| convert_error(why))
}

pub async fn update_text_color<'c, E>(
    executor: E,
    id: &Id<Line>,
    text_color: &Color,
) -> Result<u64>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        "
        UPDATE lines
        SET text_color = ?
        WHERE id = ?;
        ",
    )
    .bind(text_color.to_hex())
    .bind(id.raw())
    .execute(executor)
    .await
    .map(|result| result.rows_affected())
    .map_err(|why| convert_error(why))
}

pub async fn delete_all<'c, E>(executor: E) -> Result<u64>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query("DELETE FROM lines;")
        .execute(executor)
        .await
        .map(|result| result.rows_affected())
        .map_err(|why| convert_error(why))
}
