use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use model::{line::Direction, stop_by_line::StopByLine};
use serde::Deserialize;

use crate::{
    batch::BatchOperation,
    database::DatabaseTransaction,
    error::{Result, SeedError},
    resolve::Resolver,
    source::RawRow,
    transform,
    validate::{Cell, FieldPolicies},
};

/// Same layout as the lines source: `destination;direction;lineid;points`
pub const COLUMNS: usize = 4;

/// One entry of the `points` cell.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Point {
    /// Code of the stop, possibly with a trailing letter.
    pub id: String,
    pub order: i64,
}

/// The ordered stops of one line direction.
#[derive(Debug, Clone, PartialEq)]
pub struct LineStops {
    pub code: u32,
    pub direction: Direction,
    pub points: Vec<Point>,
}

pub fn prepare(row: &RawRow, policies: &FieldPolicies) -> Result<Option<LineStops>> {
    row.expect_arity(COLUMNS)?;

    let Some(code) = policies
        .line_variant
        .apply(Cell::of(row, 2, "lineid").numeric_prefix())?
    else {
        return Ok(None);
    };
    let direction = transform::direction_from_label(&row.fields[1]);
    let points: Vec<Point> = Cell::of(row, 3, "points").json()?;

    Ok(Some(LineStops {
        code,
        direction,
        points,
    }))
}

/// Inserts one association per point. The line must exist, stops fall back to
/// the unknown stop.
pub struct InsertStopsByLines {
    resolver: Resolver,
    fallbacks: AtomicUsize,
}

impl InsertStopsByLines {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver,
            fallbacks: AtomicUsize::new(0),
        }
    }

    pub fn fallbacks(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl<T: DatabaseTransaction + Send> BatchOperation<T> for InsertStopsByLines {
    type Row = LineStops;

    async fn apply(&self, tx: &mut T, row: usize, value: &LineStops) -> Result<()> {
        let line_id = self
            .resolver
            .line(tx, row, value.code, value.direction)
            .await?;

        for point in &value.points {
            let stop = self.resolver.stop(tx, &point.id).await?;
            if stop.is_fallback() {
                self.fallbacks.fetch_add(1, Ordering::Relaxed);
            }
            tx.insert_stop_by_line(&StopByLine {
                stop_id: stop.id(),
                line_id,
                order: point.order,
            })
            .await
            .map_err(|source| SeedError::Write { row, source })?;
        }
        Ok(())
    }
}
