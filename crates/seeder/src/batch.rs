use async_trait::async_trait;
use serde::Serialize;

use crate::{
    database::{Database, DatabaseTransaction},
    error::Result,
};

/// A prepared value together with the source row it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Numbered<T> {
    pub row: usize,
    pub value: T,
}

impl<T> Numbered<T> {
    pub fn new(row: usize, value: T) -> Self {
        Self { row, value }
    }
}

/// The write performed for every prepared row of a stage, e.g. one insert or
/// one keyed update. Lookups needed to complete the write happen on the same
/// transaction.
#[async_trait]
pub trait BatchOperation<T: DatabaseTransaction + Send>: Send + Sync {
    type Row: Send + Sync;

    async fn apply(&self, tx: &mut T, row: usize, value: &Self::Row) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub written: usize,
    /// Sizes of the committed batches, in commit order.
    pub batches: Vec<usize>,
}

/// Writes rows in transactions of `batch_size` rows each.
///
/// A failing row rolls back its own batch only, batches committed before it
/// stay. The last batch is committed even when it is not full.
pub struct BatchWriter<'d, D: Database> {
    database: &'d D,
    batch_size: usize,
}

impl<'d, D: Database> BatchWriter<'d, D> {
    pub fn new(database: &'d D, batch_size: usize) -> Self {
        Self {
            database,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Consumes `rows` lazily, so a row is only validated once every batch
    /// before it has been committed.
    pub async fn write<O, I>(
        &self,
        label: &str,
        operation: &O,
        rows: I,
    ) -> Result<BatchReport>
    where
        O: BatchOperation<D::Transaction>,
        I: IntoIterator<Item = Result<Numbered<O::Row>>>,
    {
        let mut report = BatchReport::default();
        let mut open: Option<D::Transaction> = None;
        let mut in_batch = 0;

        for prepared in rows {
            let prepared = match prepared {
                Ok(prepared) => prepared,
                Err(why) => {
                    if let Some(tx) = open.take() {
                        rollback(tx, label).await;
                    }
                    return Err(why);
                }
            };

            let mut tx = match open.take() {
                Some(tx) => tx,
                None => self.database.transaction().await?,
            };

            if let Err(why) = operation.apply(&mut tx, prepared.row, &prepared.value).await {
                rollback(tx, label).await;
                return Err(why);
            }
            in_batch += 1;

            if in_batch == self.batch_size {
                tx.commit().await?;
                report.written += in_batch;
                report.batches.push(in_batch);
                log::info!("'{}' batch complete: #{}", label, report.batches.len());
                in_batch = 0;
            } else {
                open = Some(tx);
            }
        }

        if let Some(tx) = open.take() {
            tx.commit().await?;
            report.written += in_batch;
            report.batches.push(in_batch);
            log::info!("'{}' batch complete: #{}", label, report.batches.len());
        }

        Ok(report)
    }
}

async fn rollback<T: DatabaseTransaction>(tx: T, label: &str) {
    if let Err(why) = tx.rollback().await {
        log::error!("'{}' batch could not be rolled back: {}", label, why);
    } else {
        log::warn!("'{}' batch rolled back.", label);
    }
}
