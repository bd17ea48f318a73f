use std::fmt::Debug;

use model::WithId;
use seeder::database::Result;
use serde::Serialize;
use utility::id::{HasId, Id};

pub mod line;
pub mod stop;
pub mod stop_by_line;

/// A row as stored, convertible into the model type it holds.
pub trait DatabaseRow {
    type Model: HasId;

    fn get_id(&self) -> Id<Self::Model>;

    /// Fails when a column holds a value the model can not represent, e.g. a
    /// JSON cell which does not decode.
    fn to_model(self) -> Result<Self::Model>;
}

pub fn with_ids<R: DatabaseRow>(rows: Vec<R>) -> Result<Vec<WithId<R::Model>>>
where
    <R::Model as HasId>::IdType: Debug + Clone + Serialize,
{
    rows.into_iter().map(|row| with_id(row)).collect()
}

pub fn with_id<R: DatabaseRow>(row: R) -> Result<WithId<R::Model>>
where
    <R::Model as HasId>::IdType: Debug + Clone + Serialize,
{
    let id = row.get_id();
    Ok(WithId::new(id, row.to_model()?))
}
