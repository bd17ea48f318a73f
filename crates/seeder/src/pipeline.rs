use std::{fmt, str::FromStr};

use model::stop::{Stop, UNKNOWN_STOP_CODE};
use serde::Serialize;
use utility::id::Id;

use crate::{
    batch::BatchWriter,
    database::{Database, DatabaseTransaction, StopsByLinesRepo},
    error::{Result, SeedError},
    resolve::Resolver,
    source::Source,
    stages::{
        self,
        line_metadata::{self, UpdateLineMetadata},
        line_text_colors::{self, UpdateLineTextColors},
        lines::{self, InsertLines},
        stops::{self, InsertStops},
        stops_by_lines::{self, InsertStopsByLines},
    },
    validate::FieldPolicies,
};

/// The stages of a run, in the order they execute. Every stage reads rows
/// committed by the stages before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Bootstrap,
    Stops,
    Lines,
    LineMetadata,
    StopsByLines,
    LineTextColors,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Bootstrap,
        Stage::Stops,
        Stage::Lines,
        Stage::LineMetadata,
        Stage::StopsByLines,
        Stage::LineTextColors,
    ];

    pub fn next(self) -> Option<Stage> {
        match self {
            Self::Bootstrap => Some(Self::Stops),
            Self::Stops => Some(Self::Lines),
            Self::Lines => Some(Self::LineMetadata),
            Self::LineMetadata => Some(Self::StopsByLines),
            Self::StopsByLines => Some(Self::LineTextColors),
            Self::LineTextColors => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Bootstrap => "bootstrap",
            Self::Stops => "stops",
            Self::Lines => "lines",
            Self::LineMetadata => "line metadata",
            Self::StopsByLines => "stops by lines",
            Self::LineTextColors => "line text colors",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Pending,
    Running(Stage),
    Done,
    Failed(Stage),
}

impl State {
    fn advance(self) -> Self {
        match self {
            Self::Pending => Self::Running(Stage::Bootstrap),
            Self::Running(stage) => stage.next().map(Self::Running).unwrap_or(Self::Done),
            other => other,
        }
    }
}

/// Whether a run starts from empty tables or adds to what is already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Clears stops, lines and stops by lines first.
    Replace,
    /// Keeps existing rows. Natural keys may end up duplicated.
    Append,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "append" => Ok(Self::Append),
            other => Err(format!(
                "unknown run mode '{other}', expected 'replace' or 'append'"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sources {
    pub stops: Source,
    /// Feeds both the lines and the stops by lines stage.
    pub lines: Source,
    pub line_metadata: Source,
    pub line_text_colors: Source,
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    pub run_mode: RunMode,
    pub batch_size: usize,
    pub policies: FieldPolicies,
}

impl PipelineConfig {
    pub fn new(run_mode: RunMode) -> Self {
        Self {
            run_mode,
            batch_size: 100,
            policies: FieldPolicies::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    /// Rows read from the source.
    pub rows: usize,
    pub skipped: usize,
    pub written: usize,
    pub batches: Vec<usize>,
    /// Stop references replaced by the unknown stop.
    pub fallbacks: usize,
}

impl StageReport {
    fn empty(stage: Stage) -> Self {
        Self {
            stage,
            rows: 0,
            skipped: 0,
            written: 0,
            batches: Vec::new(),
            fallbacks: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub run_mode: RunMode,
    pub unknown_stop: Option<i64>,
    pub stages: Vec<StageReport>,
}

impl RunReport {
    pub fn log(&self) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => log::info!("seed report: {}", json),
            Err(why) => log::warn!("seed report could not be encoded: {}", why),
        }
    }
}

/// Runs the stages one after the other. A failing stage stops the run;
/// batches committed until then stay.
pub struct Pipeline<D: Database> {
    database: D,
    sources: Sources,
    config: PipelineConfig,
    state: State,
    report: RunReport,
}

impl<D: Database> Pipeline<D> {
    pub fn new(database: D, sources: Sources, config: PipelineConfig) -> Self {
        Self {
            database,
            sources,
            report: RunReport {
                run_mode: config.run_mode,
                unknown_stop: None,
                stages: Vec::new(),
            },
            config,
            state: State::Pending,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Reports of the stages completed so far.
    pub fn report(&self) -> &RunReport {
        &self.report
    }

    pub async fn run(&mut self) -> Result<RunReport> {
        let mut resolver = None;
        self.state = self.state.advance();

        while let State::Running(stage) = self.state {
            log::info!("{} stage started.", stage);

            let outcome = match stage {
                Stage::Bootstrap => match self.bootstrap().await {
                    Ok((unknown_stop, report)) => {
                        self.report.unknown_stop = Some(unknown_stop.raw());
                        resolver = Some(Resolver::new(unknown_stop));
                        Ok(report)
                    }
                    Err(why) => Err(why),
                },
                Stage::Stops => self.load_stops().await,
                Stage::Lines => self.load_lines().await,
                Stage::LineMetadata => self.load_line_metadata().await,
                Stage::StopsByLines => match resolver {
                    Some(resolver) => self.load_stops_by_lines(resolver).await,
                    None => Err(SeedError::MissingSentinel),
                },
                Stage::LineTextColors => match resolver {
                    Some(resolver) => self.load_line_text_colors(resolver).await,
                    None => Err(SeedError::MissingSentinel),
                },
            };

            match outcome {
                Ok(report) => {
                    log::info!(
                        "{} stage complete: {} written, {} skipped, {} fallbacks.",
                        stage,
                        report.written,
                        report.skipped,
                        report.fallbacks
                    );
                    self.report.stages.push(report);
                    self.state = self.state.advance();
                }
                Err(why) => {
                    log::error!("{} stage failed: {}", stage, why);
                    self.state = State::Failed(stage);
                    return Err(SeedError::Stage {
                        stage,
                        source: Box::new(why),
                    });
                }
            }
        }

        self.report.log();
        Ok(self.report.clone())
    }

    fn writer(&self) -> BatchWriter<'_, D> {
        BatchWriter::new(&self.database, self.config.batch_size)
    }

    async fn bootstrap(&self) -> Result<(Id<Stop>, StageReport)> {
        let mut tx = self.database.transaction().await?;
        match prepare_store(&mut tx, self.config.run_mode).await {
            Ok((unknown_stop, written)) => {
                tx.commit().await?;
                log::info!("unknown stop has id {}.", unknown_stop);
                let mut report = StageReport::empty(Stage::Bootstrap);
                report.written = written;
                if written > 0 {
                    report.batches.push(written);
                }
                Ok((unknown_stop, report))
            }
            Err(why) => {
                if let Err(rollback) = tx.rollback().await {
                    log::error!("bootstrap could not be rolled back: {}", rollback);
                }
                Err(why)
            }
        }
    }

    async fn load_stops(&self) -> Result<StageReport> {
        log::info!("reading stops from {}...", self.sources.stops);
        let rows = self.sources.stops.read().await?;
        let policies = self.config.policies;
        stages::run(&self.writer(), Stage::Stops, &InsertStops, rows, |row| {
            stops::prepare(row, &policies)
        })
        .await
    }

    async fn load_lines(&self) -> Result<StageReport> {
        log::info!("reading lines from {}...", self.sources.lines);
        let rows = self.sources.lines.read().await?;
        let policies = self.config.policies;
        stages::run(&self.writer(), Stage::Lines, &InsertLines, rows, |row| {
            lines::prepare(row, &policies)
        })
        .await
    }

    async fn load_line_metadata(&self) -> Result<StageReport> {
        log::info!("reading line metadata from {}...", self.sources.line_metadata);
        let rows = self.sources.line_metadata.read().await?;
        let policies = self.config.policies;
        let operation = UpdateLineMetadata::default();
        let report = stages::run(
            &self.writer(),
            Stage::LineMetadata,
            &operation,
            rows,
            |row| line_metadata::prepare(row, &policies),
        )
        .await?;
        if operation.unmatched() > 0 {
            log::warn!("{} line metadata rows matched no line.", operation.unmatched());
        }
        Ok(report)
    }

    async fn load_stops_by_lines(&self, resolver: Resolver) -> Result<StageReport> {
        let mut tx = self.database.transaction().await?;
        let cleared = tx.delete_stops_by_lines().await;
        match cleared {
            Ok(cleared) => {
                tx.commit().await?;
                log::info!("cleared {} stops by lines.", cleared);
            }
            Err(why) => {
                if let Err(rollback) = tx.rollback().await {
                    log::error!("clearing stops by lines could not be rolled back: {}", rollback);
                }
                return Err(why.into());
            }
        }

        log::info!("reading stops by lines from {}...", self.sources.lines);
        let rows = self.sources.lines.read().await?;
        let policies = self.config.policies;
        let operation = InsertStopsByLines::new(resolver);
        let mut report = stages::run(
            &self.writer(),
            Stage::StopsByLines,
            &operation,
            rows,
            |row| stops_by_lines::prepare(row, &policies),
        )
        .await?;
        report.fallbacks = operation.fallbacks();
        Ok(report)
    }

    async fn load_line_text_colors(&self, resolver: Resolver) -> Result<StageReport> {
        log::info!(
            "reading line text colors from {}...",
            self.sources.line_text_colors
        );
        let rows = self.sources.line_text_colors.read().await?;
        let policies = self.config.policies;
        stages::run(
            &self.writer(),
            Stage::LineTextColors,
            &UpdateLineTextColors::new(resolver),
            rows,
            |row| line_text_colors::prepare(row, &policies),
        )
        .await
    }
}

/// Clears the tables in replace mode and makes sure the unknown stop exists.
/// Returns its id and the number of writes.
async fn prepare_store<T: DatabaseTransaction>(
    tx: &mut T,
    run_mode: RunMode,
) -> Result<(Id<Stop>, usize)> {
    if run_mode == RunMode::Replace {
        let stops_by_lines = tx.delete_stops_by_lines().await?;
        let lines = tx.delete_lines().await?;
        let stops = tx.delete_stops().await?;
        log::info!(
            "cleared {} stops by lines, {} lines and {} stops.",
            stops_by_lines,
            lines,
            stops
        );
    } else if let Some(existing) = tx.stop_id_by_code(UNKNOWN_STOP_CODE).await? {
        log::info!("reusing the unknown stop.");
        return Ok((existing, 0));
    }

    let id = tx.insert_stop(&Stop::unknown()).await?;
    Ok((id, 1))
}
