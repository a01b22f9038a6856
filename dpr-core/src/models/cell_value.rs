use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A scalar written into a single spreadsheet cell.
///
/// Serialized untagged, so a payload reads as a plain JSON object of strings
/// and numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(#[serde(with = "rust_decimal::serde::float")] Decimal),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

impl From<Decimal> for CellValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl fmt::Display for CellValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}
