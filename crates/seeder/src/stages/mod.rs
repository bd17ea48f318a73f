//! The loading stages. Each stage prepares raw rows into typed values and
//! writes them through a [`BatchOperation`].

use crate::{
    batch::{BatchOperation, BatchWriter, Numbered},
    database::Database,
    error::Result,
    pipeline::{Stage, StageReport},
    source::RawRow,
};

pub mod line_metadata;
pub mod line_text_colors;
pub mod lines;
pub mod stops;
pub mod stops_by_lines;

/// Prepares every row with `prepare` and writes what survives with
/// `operation`. Rows for which `prepare` returns `None` are counted as
/// skipped.
pub async fn run<D, O, F>(
    writer: &BatchWriter<'_, D>,
    stage: Stage,
    operation: &O,
    rows: Vec<RawRow>,
    mut prepare: F,
) -> Result<StageReport>
where
    D: Database,
    O: BatchOperation<D::Transaction>,
    F: FnMut(&RawRow) -> Result<Option<O::Row>>,
{
    let total = rows.len();
    let mut skipped = 0;

    let prepared = rows.iter().filter_map(|row| match prepare(row) {
        Ok(Some(value)) => Some(Ok(Numbered::new(row.number, value))),
        Ok(None) => {
            skipped += 1;
            None
        }
        Err(why) => Some(Err(why)),
    });
    let batches = writer.write(&stage.to_string(), operation, prepared).await?;

    Ok(StageReport {
        stage,
        rows: total,
        skipped,
        written: batches.written,
        batches: batches.batches,
        fallbacks: 0,
    })
}
