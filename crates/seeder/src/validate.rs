//! Field level checks applied to raw rows before anything is written.
//!
//! Every check fails closed. Whether a failure aborts the stage or only skips
//! the row is decided by the caller through [`OnInvalid`].

use std::{fmt, str::FromStr};

use lazy_static::lazy_static;
use model::line::{Color, Mode};
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::{
    error::{Result, SeedError},
    source::RawRow,
    transform,
};

lazy_static! {
    static ref ALPHANUMERIC: Regex = Regex::new(r"^[a-zA-Z0-9]+$").unwrap();
    static ref NUMERIC: Regex = Regex::new(r"^\d+$").unwrap();
    static ref HEX_COLOR: Regex = Regex::new(r"^#(?:[0-9a-fA-F]{3}){1,2}$").unwrap();
    static ref ID_WITH_MODE: Regex = Regex::new(r"^(\d+)([a-zA-Z])$").unwrap();
}

/// What to do with a row whose field fails a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnInvalid {
    Abort,
    SkipWithWarning,
}

impl OnInvalid {
    /// Turns a failed check into `Ok(None)` when the row may be skipped.
    pub fn apply<T>(self, checked: Result<T>) -> Result<Option<T>> {
        match (self, checked) {
            (_, Ok(value)) => Ok(Some(value)),
            (Self::SkipWithWarning, Err(why)) => {
                log::warn!("skipping row: {why}");
                Ok(None)
            }
            (Self::Abort, Err(why)) => Err(why),
        }
    }
}

impl FromStr for OnInvalid {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" | "skip-with-warning" => Ok(Self::SkipWithWarning),
            other => Err(format!("unknown policy '{other}', expected 'abort' or 'skip'")),
        }
    }
}

impl fmt::Display for OnInvalid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Abort => write!(f, "abort"),
            Self::SkipWithWarning => write!(f, "skip-with-warning"),
        }
    }
}

/// Policies for the checks whose outcome is configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPolicies {
    /// Stop natural keys in the stops stage.
    pub stop_code: OnInvalid,
    /// Line natural keys in the lines stage.
    pub line_code: OnInvalid,
    /// Non-standard line codes (night lines and the like) in the stages
    /// joining against already loaded lines.
    pub line_variant: OnInvalid,
}

impl Default for FieldPolicies {
    fn default() -> Self {
        Self {
            stop_code: OnInvalid::Abort,
            line_code: OnInvalid::Abort,
            line_variant: OnInvalid::SkipWithWarning,
        }
    }
}

/// A single field of a raw row, together with what is needed to report it.
#[derive(Debug, Clone, Copy)]
pub struct Cell<'a> {
    pub row: usize,
    pub field: &'static str,
    pub value: &'a str,
}

impl<'a> Cell<'a> {
    pub fn of(row: &'a RawRow, index: usize, field: &'static str) -> Self {
        Self {
            row: row.number,
            field,
            value: row.fields.get(index).map(String::as_str).unwrap_or(""),
        }
    }

    fn invalid(&self, reason: &'static str) -> SeedError {
        SeedError::InvalidField {
            row: self.row,
            field: self.field,
            value: self.value.to_owned(),
            reason,
        }
    }

    /// Natural keys which must not contain special characters.
    pub fn alphanumeric(&self) -> Result<&'a str> {
        if ALPHANUMERIC.is_match(self.value) {
            Ok(self.value)
        } else {
            Err(self.invalid("must be alphanumeric"))
        }
    }

    pub fn numeric(&self) -> Result<u32> {
        if !NUMERIC.is_match(self.value) {
            return Err(self.invalid("must be numeric"));
        }
        self.value
            .parse()
            .map_err(|_| self.invalid("numeric value out of range"))
    }

    /// A code whose trailing letter, if any, is dropped, e.g. `123a` -> `123`.
    pub fn numeric_prefix(&self) -> Result<u32> {
        transform::numeric_prefix(self.value)
            .ok_or_else(|| self.invalid("must be numeric with an optional trailing letter"))
    }

    pub fn hex_color(&self) -> Result<Color> {
        if !HEX_COLOR.is_match(self.value) {
            return Err(self.invalid("must be a hex color"));
        }
        Color::from_hex(self.value).ok_or_else(|| self.invalid("must be a hex color"))
    }

    /// Like [`Cell::hex_color`], but an empty cell is `None`.
    pub fn optional_hex_color(&self) -> Result<Option<Color>> {
        if self.value.trim().is_empty() {
            Ok(None)
        } else {
            self.hex_color().map(Some)
        }
    }

    /// A composite `<numeric id><mode letter>` key such as `002m`.
    pub fn id_with_mode(&self) -> Result<(u32, Mode)> {
        let captures = ID_WITH_MODE
            .captures(self.value)
            .ok_or_else(|| self.invalid("must be a numeric id followed by a mode letter"))?;
        let id = captures[1]
            .parse()
            .map_err(|_| self.invalid("numeric value out of range"))?;
        let mode = transform::mode_from_letter(&captures[2])
            .ok_or_else(|| self.invalid("unknown mode letter, expected one of m, b, t"))?;
        Ok((id, mode))
    }

    /// Decodes a JSON document embedded in the cell.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(self.value).map_err(|source| SeedError::InvalidJson {
            row: self.row,
            field: self.field,
            source,
        })
    }
}
