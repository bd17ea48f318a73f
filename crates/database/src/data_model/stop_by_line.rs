use async_trait::async_trait;
use model::stop_by_line::StopByLine;
use seeder::database::{Result, StopsByLinesRepo};
use sqlx::prelude::FromRow;
use utility::id::Id;

use crate::{
    queries::stop_by_line::{delete_all, insert},
    SqliteDatabaseTransaction,
};

#[derive(Debug, Clone, FromRow)]
pub struct StopByLineRow {
    pub stop_id: i64,
    pub line_id: i64,
    pub order: i64,
}

impl StopByLineRow {
    pub fn to_model(self) -> StopByLine {
        StopByLine {
            stop_id: Id::new(self.stop_id),
            line_id: Id::new(self.line_id),
            order: self.order,
        }
    }
}

#[async_trait]
impl<'a> StopsByLinesRepo for SqliteDatabaseTransaction<'a> {
    async fn insert_stop_by_line(&mut self, entry: &StopByLine) -> Result<()> {
        insert(&mut *self.tx, entry).await
    }

    async fn delete_stops_by_lines(&mut self) -> Result<u64> {
        delete_all(&mut *self.tx).await
    }
}
