//! Spreadsheet cell addresses used as payload keys.
//!
//! The report generator addresses cells in lowercase A1 notation (`"e263"`).
//! Input is accepted case-insensitively and with optional `$` markers, but the
//! canonical display form is always lowercase without markers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when parsing an A1-style cell address.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CellAddressError {
    #[error("cell address is empty")]
    Empty,

    #[error("cell address '{0}' has no column letters")]
    MissingColumn(String),

    #[error("cell address '{0}' has no row number")]
    MissingRow(String),

    #[error("cell address '{0}' has an invalid row number")]
    InvalidRow(String),

    #[error("cell address '{0}' has trailing characters")]
    TrailingCharacters(String),
}

/// A single spreadsheet cell, e.g. `e263`.
///
/// Rows are 1-based, matching the row numbers used in the layout tables.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellAddress {
    column: String,
    row: u32,
}

impl CellAddress {
    /// Builds an address from a column (letters, any case) and a 1-based row.
    pub fn new(
        column: &str,
        row: u32,
    ) -> Result<Self, CellAddressError> {
        Self::parse(&format!("{column}{row}"))
    }

    /// Parses `e263`, `E263` or `$E$263`.
    pub fn parse(input: &str) -> Result<Self, CellAddressError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(CellAddressError::Empty);
        }

        let bytes = s.as_bytes();
        let mut idx = 0usize;
        if bytes.get(idx) == Some(&b'$') {
            idx += 1;
        }

        let col_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_alphabetic() {
            idx += 1;
        }
        if idx == col_start {
            return Err(CellAddressError::MissingColumn(s.to_string()));
        }
        let column = s[col_start..idx].to_ascii_lowercase();

        if bytes.get(idx) == Some(&b'$') {
            idx += 1;
        }

        let row_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        if idx == row_start {
            return Err(CellAddressError::MissingRow(s.to_string()));
        }
        if idx != bytes.len() {
            return Err(CellAddressError::TrailingCharacters(s.to_string()));
        }

        let row: u32 = s[row_start..idx]
            .parse()
            .map_err(|_| CellAddressError::InvalidRow(s.to_string()))?;
        if row == 0 {
            return Err(CellAddressError::InvalidRow(s.to_string()));
        }

        Ok(Self { column, row })
    }

    /// Lowercase column letters.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// 1-based row number.
    pub fn row(&self) -> u32 {
        self.row
    }

    /// The same column on a different row.
    pub fn with_row(
        &self,
        row: u32,
    ) -> Self {
        Self {
            column: self.column.clone(),
            row,
        }
    }
}

impl fmt::Display for CellAddress {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

impl FromStr for CellAddress {
    type Err = CellAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CellAddress {
    type Error = CellAddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CellAddress> for String {
    fn from(value: CellAddress) -> Self {
        value.to_string()
    }
}
