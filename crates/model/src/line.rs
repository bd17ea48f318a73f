use std::{fmt, num::ParseIntError};

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use utility::id::HasId;

use crate::Localized;

/// Travel direction of one of the two rows sharing a line code.
///
/// Stored as an integer since the store has no boolean type.
#[derive(Serialize_repr, Deserialize_repr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    /// Away from the city center.
    Suburb = 0,

    /// Towards the city center.
    City = 1,
}

impl Direction {
    pub fn as_flag(self) -> i64 {
        self as i64
    }

    pub fn from_flag(flag: i64) -> Self {
        if flag == 0 {
            Self::Suburb
        } else {
            Self::City
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Suburb => write!(f, "Suburb"),
            Self::City => write!(f, "City"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Metro,
    Bus,
    Tram,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metro => "metro",
            Self::Bus => "bus",
            Self::Tram => "tram",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A color written as `#RGB` or `#RRGGBB`.
///
/// # Examples
///
/// `#FFFFFF` for white, `#C4008F` for metro line 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let rgb_strings = if hex.len() == 3 {
            [
                hex[0..1].repeat(2),
                hex[1..2].repeat(2),
                hex[2..3].repeat(2),
            ]
        } else if hex.len() == 6 {
            [
                hex[0..2].to_owned(),
                hex[2..4].to_owned(),
                hex[4..6].to_owned(),
            ]
        } else {
            return None;
        };
        let rgb = rgb_strings
            .iter()
            .map(|val| u8::from_str_radix(val, 16))
            .collect::<Result<Vec<u8>, ParseIntError>>()
            .ok()?;
        Some(Color {
            red: rgb[0],
            green: rgb[1],
            blue: rgb[2],
        })
    }

    pub fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn white() -> Self {
        Self::from_rgb(255, 255, 255)
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

/// One direction of a line. Two rows share each `code`.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub code: String,
    pub destination: Localized,
    pub direction: Direction,
    pub mode: Option<Mode>,
    pub color: Option<Color>,
    /// White when unset.
    pub text_color: Option<Color>,
}

impl Line {
    pub fn new(code: String, destination: Localized, direction: Direction) -> Self {
        Self {
            code,
            destination,
            direction,
            mode: None,
            color: None,
            text_color: None,
        }
    }

    pub fn text_color_or_default(&self) -> Color {
        self.text_color.unwrap_or_else(Color::white)
    }
}

impl HasId for Line {
    type IdType = i64;
}

/// Enrichment applied to both directions of a line after it was loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineMetadata {
    pub mode: Mode,
    pub color: Color,
}
