use async_trait::async_trait;
use model::{line::Line, Localized};

use crate::{
    batch::BatchOperation,
    database::DatabaseTransaction,
    error::{Result, SeedError},
    source::RawRow,
    transform,
    validate::{Cell, FieldPolicies},
};

/// `destination;direction;lineid;points`
pub const COLUMNS: usize = 4;

/// Points are ignored here, they are loaded by the stops by lines stage.
pub fn prepare(row: &RawRow, policies: &FieldPolicies) -> Result<Option<Line>> {
    row.expect_arity(COLUMNS)?;

    let destination: Localized = Cell::of(row, 0, "destination").json()?;
    let direction = Cell::of(row, 1, "direction").alphanumeric()?;
    let Some(code) = policies
        .line_code
        .apply(Cell::of(row, 2, "lineid").alphanumeric())?
    else {
        return Ok(None);
    };

    Ok(Some(Line::new(
        code.to_owned(),
        destination,
        transform::direction_from_label(direction),
    )))
}

pub struct InsertLines;

#[async_trait]
impl<T: DatabaseTransaction + Send> BatchOperation<T> for InsertLines {
    type Row = Line;

    async fn apply(&self, tx: &mut T, row: usize, line: &Line) -> Result<()> {
        tx.insert_line(line)
            .await
            .map_err(|source| SeedError::Write { row, source })?;
        Ok(())
    }
}
