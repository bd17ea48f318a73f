use async_trait::async_trait;
use model::stop::Stop;
use seeder::database::{Result, StopRepo};
use sqlx::prelude::FromRow;
use utility::id::Id;

use super::DatabaseRow;
use crate::{
    queries::{
        convert_json_error,
        stop::{delete_all, id_by_code, insert},
    },
    SqliteDatabaseTransaction,
};

#[derive(Debug, Clone, FromRow)]
pub struct StopRow {
    pub id: i64,
    pub code: String,
    pub geo: String,
    pub name: String,
}

impl DatabaseRow for StopRow {
    type Model = Stop;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id)
    }

    fn to_model(self) -> Result<Self::Model> {
        Ok(Stop {
            code: self.code,
            geo: serde_json::from_str(&self.geo).map_err(convert_json_error)?,
            name: serde_json::from_str(&self.name).map_err(convert_json_error)?,
        })
    }
}

#[async_trait]
impl<'a> StopRepo for SqliteDatabaseTransaction<'a> {
    async fn insert_stop(&mut self, stop: &Stop) -> Result<Id<Stop>> {
        insert(&mut *self.tx, stop).await
    }

    async fn stop_id_by_code(&mut self, code: &str) -> Result<Option<Id<Stop>>> {
        id_by_code(&mut *self.tx, code).await
    }

    async fn delete_stops(&mut self) -> Result<u64> {
        delete_all(&mut *self.tx).await
    }
}
