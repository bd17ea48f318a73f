//! Loads the reference data of the network (stops, lines, line metadata, the
//! ordered stops of every line and line text colors) into a store.
//!
//! The five stages run strictly one after the other since every stage looks
//! up rows committed by the stages before it. References to stops that can
//! not be resolved point at a reserved "unknown" stop instead of being
//! dropped.

pub mod batch;
pub mod config;
pub mod database;
pub mod error;
pub mod pipeline;
pub mod resolve;
pub mod source;
pub mod stages;
pub mod transform;
pub mod validate;

#[cfg(test)]
pub(crate) mod memory;

pub use config::SeedConfig;
pub use error::{Result, SeedError};
pub use pipeline::{Pipeline, PipelineConfig, RunMode, RunReport, Sources, Stage, StageReport};
