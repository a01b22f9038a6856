use serde::{Deserialize, Serialize};

use crate::models::CellAddress;

/// An inclusive span of sheet rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowRange {
    pub start: u32,
    pub end: u32,
}

impl RowRange {
    pub const fn new(
        start: u32,
        end: u32,
    ) -> Self {
        Self { start, end }
    }

    pub fn contains(
        &self,
        row: u32,
    ) -> bool {
        (self.start..=self.end).contains(&row)
    }

    /// Number of rows in the span; zero for an inverted range.
    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zero-based position of `row` within the span.
    pub fn offset_of(
        &self,
        row: u32,
    ) -> Option<u32> {
        self.contains(row).then(|| row - self.start)
    }

    /// Row at a zero-based position, if the span is long enough.
    pub fn row_at(
        &self,
        offset: u32,
    ) -> Option<u32> {
        let row = self.start.checked_add(offset)?;
        self.contains(row).then_some(row)
    }

    pub fn overlaps(
        &self,
        other: &RowRange,
    ) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn rows(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

/// Rows reserved for one fixed-asset category, plus the cell that carries the
/// category's loan percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSection {
    pub category: String,
    pub rows: RowRange,
    pub loan_cell: CellAddress,
}

impl AssetSection {
    /// Largest number of line items the category can hold.
    pub fn capacity(&self) -> usize {
        self.rows.len()
    }
}

/// The fixed-asset schedule layout for one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTable {
    pub description_column: String,
    pub amount_column: String,
    pub sections: Vec<AssetSection>,
}

impl AssetTable {
    pub fn section(
        &self,
        category: &str,
    ) -> Option<&AssetSection> {
        self.sections.iter().find(|s| s.category == category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.category.as_str())
    }

    /// Description cell for a row of this schedule.
    pub fn description_cell(
        &self,
        row: u32,
    ) -> Option<CellAddress> {
        CellAddress::new(&self.description_column, row).ok()
    }

    /// Amount cell for a row of this schedule.
    pub fn amount_cell(
        &self,
        row: u32,
    ) -> Option<CellAddress> {
        CellAddress::new(&self.amount_column, row).ok()
    }

    /// Whether `cell` is a description, amount or loan cell of this table.
    pub fn owns_cell(
        &self,
        cell: &CellAddress,
    ) -> bool {
        let in_item_column = cell.column() == self.description_column
            || cell.column() == self.amount_column;
        self.sections.iter().any(|s| {
            (in_item_column && s.rows.contains(cell.row())) || s.loan_cell == *cell
        })
    }
}
