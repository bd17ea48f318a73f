use model::{
    line::{Direction, Line},
    stop::Stop,
};
use utility::id::Id;

use crate::{
    database::DatabaseOperations,
    error::{Result, SeedError},
    transform,
};

/// Outcome of resolving a stop reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopResolution {
    Found(Id<Stop>),
    /// The reference did not resolve and the unknown stop stands in.
    Fallback(Id<Stop>),
}

impl StopResolution {
    pub fn id(&self) -> Id<Stop> {
        match self {
            Self::Found(id) | Self::Fallback(id) => *id,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Turns textual references of a source row into storage ids, using the
/// transaction of the batch the row belongs to.
#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    unknown_stop: Id<Stop>,
}

impl Resolver {
    pub fn new(unknown_stop: Id<Stop>) -> Self {
        Self { unknown_stop }
    }

    pub fn unknown_stop(&self) -> Id<Stop> {
        self.unknown_stop
    }

    /// Lines have no fallback: a missing line is an error.
    pub async fn line<T: DatabaseOperations>(
        &self,
        tx: &mut T,
        row: usize,
        code: u32,
        direction: Direction,
    ) -> Result<Id<Line>> {
        let code = code.to_string();
        tx.line_id_by_code_and_direction(&code, direction)
            .await?
            .ok_or(SeedError::LineNotFound {
                row,
                code,
                direction,
            })
    }

    /// Stops fall back to the unknown stop, both when the reference has no
    /// numeric code and when no stop carries it.
    pub async fn stop<T: DatabaseOperations>(
        &self,
        tx: &mut T,
        reference: &str,
    ) -> Result<StopResolution> {
        let Some(code) = transform::numeric_prefix(reference) else {
            log::warn!("stop reference {reference:?} is not numeric, using the unknown stop.");
            return Ok(StopResolution::Fallback(self.unknown_stop));
        };
        match tx.stop_id_by_code(&code.to_string()).await? {
            Some(id) => Ok(StopResolution::Found(id)),
            None => {
                log::warn!("stop {reference:?} was not found, using the unknown stop.");
                Ok(StopResolution::Fallback(self.unknown_stop))
            }
        }
    }
}
