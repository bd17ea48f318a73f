use std::{io, path::PathBuf};

use model::line::Direction;
use thiserror::Error;

use crate::{database::DatabaseError, pipeline::Stage};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("could not open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed delimited file: {0}")]
    Csv(#[from] csv::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed with status code {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("malformed page from {url}: {source}")]
    Page {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("row {row} has incorrect number of columns: expected {expected}, found {found}")]
    Arity {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid '{field}' at row {row}: {value:?} ({reason})")]
    InvalidField {
        row: usize,
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("invalid JSON in '{field}' at row {row}: {source}")]
    InvalidJson {
        row: usize,
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {code} ({direction}) was not found in lines at row {row}")]
    LineNotFound {
        row: usize,
        code: String,
        direction: Direction,
    },

    #[error("failed to write row {row}: {source}")]
    Write {
        row: usize,
        #[source]
        source: DatabaseError,
    },

    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("the unknown stop has not been inserted yet")]
    MissingSentinel,

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<SeedError>,
    },
}

impl SeedError {
    /// Source row the error points at, if any.
    pub fn row(&self) -> Option<usize> {
        match self {
            Self::Arity { row, .. }
            | Self::InvalidField { row, .. }
            | Self::InvalidJson { row, .. }
            | Self::LineNotFound { row, .. }
            | Self::Write { row, .. } => Some(*row),
            Self::Stage { source, .. } => source.row(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SeedError>;
