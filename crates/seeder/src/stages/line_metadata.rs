use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use model::line::LineMetadata;

use crate::{
    batch::BatchOperation,
    database::DatabaseTransaction,
    error::{Result, SeedError},
    source::RawRow,
    validate::{Cell, FieldPolicies},
};

/// `lineid_mode;route_short_name;route_color`
pub const COLUMNS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRow {
    /// Line code the metadata applies to, e.g. `2` for `002m`.
    pub code: String,
    pub metadata: LineMetadata,
}

pub fn prepare(row: &RawRow, policies: &FieldPolicies) -> Result<Option<MetadataRow>> {
    row.expect_arity(COLUMNS)?;

    let (id, mode) = Cell::of(row, 0, "lineid_mode").id_with_mode()?;
    if policies
        .line_variant
        .apply(Cell::of(row, 1, "route_short_name").numeric())?
        .is_none()
    {
        return Ok(None);
    }
    let color = Cell::of(row, 2, "route_color").hex_color()?;

    Ok(Some(MetadataRow {
        code: id.to_string(),
        metadata: LineMetadata { mode, color },
    }))
}

/// Sets mode and color on both directions of a line.
#[derive(Default)]
pub struct UpdateLineMetadata {
    unmatched: AtomicUsize,
}

impl UpdateLineMetadata {
    /// Rows whose code matched no line.
    pub fn unmatched(&self) -> usize {
        self.unmatched.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl<T: DatabaseTransaction + Send> BatchOperation<T> for UpdateLineMetadata {
    type Row = MetadataRow;

    async fn apply(&self, tx: &mut T, row: usize, value: &MetadataRow) -> Result<()> {
        let updated = tx
            .update_line_metadata(&value.code, &value.metadata)
            .await
            .map_err(|source| SeedError::Write { row, source })?;
        if updated == 0 {
            log::warn!("row {row}: no line with code {} to apply metadata to.", value.code);
            self.unmatched.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }
}
