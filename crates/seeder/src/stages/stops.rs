use async_trait::async_trait;
use model::{
    stop::{Geo, Stop},
    Localized,
};

use crate::{
    batch::BatchOperation,
    database::DatabaseTransaction,
    error::{Result, SeedError},
    source::RawRow,
    validate::{Cell, FieldPolicies},
};

/// `gpscoordinates;id;name`
pub const COLUMNS: usize = 3;

pub fn prepare(row: &RawRow, policies: &FieldPolicies) -> Result<Option<Stop>> {
    row.expect_arity(COLUMNS)?;

    let geo: Geo = Cell::of(row, 0, "gpscoordinates").json()?;
    let Some(code) = policies
        .stop_code
        .apply(Cell::of(row, 1, "id").alphanumeric())?
    else {
        return Ok(None);
    };
    let name: Localized = Cell::of(row, 2, "name").json()?;

    Ok(Some(Stop {
        code: code.to_owned(),
        geo,
        name,
    }))
}

pub struct InsertStops;

#[async_trait]
impl<T: DatabaseTransaction + Send> BatchOperation<T> for InsertStops {
    type Row = Stop;

    async fn apply(&self, tx: &mut T, row: usize, stop: &Stop) -> Result<()> {
        tx.insert_stop(stop)
            .await
            .map_err(|source| SeedError::Write { row, source })?;
        Ok(())
    }
}
