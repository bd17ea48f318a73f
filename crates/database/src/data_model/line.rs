use async_trait::async_trait;
use model::line::{Color, Direction, Line, LineMetadata, Mode};
use seeder::database::{DatabaseError, LineRepo, Result};
use sqlx::prelude::FromRow;
use utility::id::Id;

use super::DatabaseRow;
use crate::{
    queries::{
        convert_json_error,
        line::{delete_all, id_by_code_and_direction, insert, update_metadata, update_text_color},
    },
    SqliteDatabaseTransaction,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
pub enum RowMode {
    Metro,
    Bus,
    Tram,
}

impl RowMode {
    pub fn from_mode(mode: Mode) -> Self {
        match mode {
            Mode::Metro => Self::Metro,
            Mode::Bus => Self::Bus,
            Mode::Tram => Self::Tram,
        }
    }

    pub fn to_mode(self) -> Mode {
        match self {
            Self::Metro => Mode::Metro,
            Self::Bus => Mode::Bus,
            Self::Tram => Mode::Tram,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct LineRow {
    pub id: i64,
    pub code: String,
    pub destination: String,
    pub direction: i64,
    pub mode: Option<RowMode>,
    pub color: Option<String>,
    pub text_color: String,
}

fn parse_color(hex: &str) -> Result<Color> {
    Color::from_hex(hex).ok_or_else(|| {
        DatabaseError::Other(format!("stored color {hex:?} is not a hex color").into())
    })
}

impl DatabaseRow for LineRow {
    type Model = Line;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id)
    }

    fn to_model(self) -> Result<Self::Model> {
        Ok(Line {
            code: self.code,
            destination: serde_json::from_str(&self.destination).map_err(convert_json_error)?,
            direction: Direction::from_flag(self.direction),
            mode: self.mode.map(RowMode::to_mode),
            color: self.color.as_deref().map(parse_color).transpose()?,
            text_color: Some(parse_color(&self.text_color)?),
        })
    }
}

#[async_trait]
impl<'a> LineRepo for SqliteDatabaseTransaction<'a> {
    async fn insert_line(&mut self, line: &Line) -> Result<Id<Line>> {
        insert(&mut *self.tx, line).await
    }

    async fn line_id_by_code_and_direction(
        &mut self,
        code: &str,
        direction: Direction,
    ) -> Result<Option<Id<Line>>> {
        id_by_code_and_direction(&mut *self.tx, code, direction).await
    }

    async fn update_line_metadata(
        &mut self,
        code: &str,
        metadata: &LineMetadata,
    ) -> Result<u64> {
        update_metadata(&mut *self.tx, code, metadata).await
    }

    async fn update_line_text_color(
        &mut self,
        id: &Id<Line>,
        text_color: &Color,
    ) -> Result<u64> {
        update_text_color(&mut *self.tx, id, text_color).await
    }

    async fn delete_lines(&mut self) -> Result<u64> {
        delete_all(&mut *self.tx).await
    }
}
