use std::{error, result};

use async_trait::async_trait;
use model::{
    line::{Color, Direction, Line, LineMetadata},
    stop::Stop,
    stop_by_line::StopByLine,
};
use thiserror::Error;
use utility::id::Id;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("row not found")]
    NotFound,
    #[error(transparent)]
    Other(Box<dyn error::Error + Send + Sync>),
}

impl DatabaseError {
    pub fn other<E: error::Error + Send + Sync + 'static>(why: E) -> Self {
        Self::Other(Box::new(why))
    }
}

pub type Result<T> = result::Result<T, DatabaseError>;

#[async_trait]
pub trait StopRepo {
    async fn insert_stop(&mut self, stop: &Stop) -> Result<Id<Stop>>;

    /// Returns the stop with the lowest id carrying the given natural key.
    async fn stop_id_by_code(&mut self, code: &str) -> Result<Option<Id<Stop>>>;

    async fn delete_stops(&mut self) -> Result<u64>;
}

#[async_trait]
pub trait LineRepo {
    async fn insert_line(&mut self, line: &Line) -> Result<Id<Line>>;

    /// Returns the line with the lowest id carrying the given code and direction.
    async fn line_id_by_code_and_direction(
        &mut self,
        code: &str,
        direction: Direction,
    ) -> Result<Option<Id<Line>>>;

    /// Sets mode and color on every line (both directions) with the given code.
    /// Returns the number of updated rows.
    async fn update_line_metadata(
        &mut self,
        code: &str,
        metadata: &LineMetadata,
    ) -> Result<u64>;

    async fn update_line_text_color(
        &mut self,
        id: &Id<Line>,
        text_color: &Color,
    ) -> Result<u64>;

    async fn delete_lines(&mut self) -> Result<u64>;
}

#[async_trait]
pub trait StopsByLinesRepo {
    async fn insert_stop_by_line(&mut self, entry: &StopByLine) -> Result<()>;

    async fn delete_stops_by_lines(&mut self) -> Result<u64>;
}

pub trait DatabaseOperations: StopRepo + LineRepo + StopsByLinesRepo + Send {}

impl<T> DatabaseOperations for T where T: StopRepo + LineRepo + StopsByLinesRepo + Send {}

#[async_trait]
pub trait DatabaseTransaction: DatabaseOperations {
    async fn commit(self) -> Result<()>;

    async fn rollback(self) -> Result<()>;
}

/// Storage the pipeline loads into. The pipeline only ever writes through
/// transactions obtained from here and never touches a transaction from more
/// than one task.
#[async_trait]
pub trait Database: Clone + Send + Sync + Sized {
    type Transaction: DatabaseTransaction + Send;

    async fn transaction(&self) -> Result<Self::Transaction>;
}
