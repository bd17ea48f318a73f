//! A store held in memory, used by the tests of this crate.
//!
//! Transactions work on a snapshot of the tables which replaces the shared
//! tables on commit and is dropped on rollback.

use std::{
    collections::{BTreeMap, HashSet},
    io,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use model::{
    line::{Color, Direction, Line, LineMetadata},
    stop::Stop,
    stop_by_line::StopByLine,
};
use utility::id::Id;

use crate::database::{
    Database, DatabaseError, DatabaseTransaction, LineRepo, Result, StopRepo, StopsByLinesRepo,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    stops: BTreeMap<i64, Stop>,
    lines: BTreeMap<i64, Line>,
    stops_by_lines: Vec<StopByLine>,
    next_stop_id: i64,
    next_line_id: i64,
}

#[derive(Debug, Default)]
struct State {
    tables: Tables,
    commits: Vec<usize>,
    rollbacks: usize,
    failing_stop_codes: HashSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<State>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later insert of a stop with `code` fail.
    pub fn fail_stop_insert(&self, code: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_stop_codes
            .insert(code.to_owned());
    }

    /// Number of writes of every committed transaction, in commit order.
    pub fn commits(&self) -> Vec<usize> {
        self.state.lock().unwrap().commits.clone()
    }

    pub fn rollbacks(&self) -> usize {
        self.state.lock().unwrap().rollbacks
    }

    pub fn stops(&self) -> Vec<(Id<Stop>, Stop)> {
        let state = self.state.lock().unwrap();
        state
            .tables
            .stops
            .iter()
            .map(|(id, stop)| (Id::new(*id), stop.clone()))
            .collect()
    }

    pub fn lines(&self) -> Vec<(Id<Line>, Line)> {
        let state = self.state.lock().unwrap();
        state
            .tables
            .lines
            .iter()
            .map(|(id, line)| (Id::new(*id), line.clone()))
            .collect()
    }

    pub fn stops_by_lines(&self) -> Vec<StopByLine> {
        self.state.lock().unwrap().tables.stops_by_lines.clone()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    type Transaction = MemoryTransaction;

    async fn transaction(&self) -> Result<Self::Transaction> {
        let tables = self.state.lock().unwrap().tables.clone();
        Ok(MemoryTransaction {
            database: self.clone(),
            tables,
            writes: 0,
        })
    }
}

pub struct MemoryTransaction {
    database: MemoryDatabase,
    tables: Tables,
    writes: usize,
}

#[async_trait]
impl DatabaseTransaction for MemoryTransaction {
    async fn commit(self) -> Result<()> {
        let mut state = self.database.state.lock().unwrap();
        state.tables = self.tables;
        state.commits.push(self.writes);
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.database.state.lock().unwrap().rollbacks += 1;
        Ok(())
    }
}

#[async_trait]
impl StopRepo for MemoryTransaction {
    async fn insert_stop(&mut self, stop: &Stop) -> Result<Id<Stop>> {
        let failing = self
            .database
            .state
            .lock()
            .unwrap()
            .failing_stop_codes
            .contains(&stop.code);
        if failing {
            return Err(DatabaseError::other(io::Error::new(
                io::ErrorKind::Other,
                format!("insert of stop {} refused", stop.code),
            )));
        }
        self.tables.next_stop_id += 1;
        let id = self.tables.next_stop_id;
        self.tables.stops.insert(id, stop.clone());
        self.writes += 1;
        Ok(Id::new(id))
    }

    async fn stop_id_by_code(&mut self, code: &str) -> Result<Option<Id<Stop>>> {
        Ok(self
            .tables
            .stops
            .iter()
            .find(|(_, stop)| stop.code == code)
            .map(|(id, _)| Id::new(*id)))
    }

    async fn delete_stops(&mut self) -> Result<u64> {
        let deleted = self.tables.stops.len() as u64;
        self.tables.stops.clear();
        self.writes += 1;
        Ok(deleted)
    }
}

#[async_trait]
impl LineRepo for MemoryTransaction {
    async fn insert_line(&mut self, line: &Line) -> Result<Id<Line>> {
        self.tables.next_line_id += 1;
        let id = self.tables.next_line_id;
        self.tables.lines.insert(id, line.clone());
        self.writes += 1;
        Ok(Id::new(id))
    }

    async fn line_id_by_code_and_direction(
        &mut self,
        code: &str,
        direction: Direction,
    ) -> Result<Option<Id<Line>>> {
        Ok(self
            .tables
            .lines
            .iter()
            .find(|(_, line)| line.code == code && line.direction == direction)
            .map(|(id, _)| Id::new(*id)))
    }

    async fn update_line_metadata(
        &mut self,
        code: &str,
        metadata: &LineMetadata,
    ) -> Result<u64> {
        let mut updated = 0;
        for line in self.tables.lines.values_mut().filter(|line| line.code == code) {
            line.mode = Some(metadata.mode);
            line.color = Some(metadata.color);
            updated += 1;
        }
        self.writes += 1;
        Ok(updated)
    }

    async fn update_line_text_color(
        &mut self,
        id: &Id<Line>,
        text_color: &Color,
    ) -> Result<u64> {
        self.writes += 1;
        match self.tables.lines.get_mut(&id.raw()) {
            Some(line) => {
                line.text_color = Some(*text_color);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_lines(&mut self) -> Result<u64> {
        let deleted = self.tables.lines.len() as u64;
        self.tables.lines.clear();
        self.writes += 1;
        Ok(deleted)
    }
}

#[async_trait]
impl StopsByLinesRepo for MemoryTransaction {
    async fn insert_stop_by_line(&mut self, entry: &StopByLine) -> Result<()> {
        self.tables.stops_by_lines.push(entry.clone());
        self.writes += 1;
        Ok(())
    }

    async fn delete_stops_by_lines(&mut self) -> Result<u64> {
        let deleted = self.tables.stops_by_lines.len() as u64;
        self.tables.stops_by_lines.clear();
        self.writes += 1;
        Ok(deleted)
    }
}
