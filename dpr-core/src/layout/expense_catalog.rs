use serde::{Deserialize, Serialize};

use crate::layout::RowRange;
use crate::models::CellAddress;

/// A fixed indirect-expense line: a label and its description/amount cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndirectExpenseItem {
    pub label: String,
    pub d: CellAddress,
    pub e: CellAddress,
}

impl IndirectExpenseItem {
    /// Builds an item whose description and amount cells share `row`.
    pub fn on_row(
        label: impl Into<String>,
        description_column: &str,
        amount_column: &str,
        row: u32,
    ) -> Option<Self> {
        Some(Self {
            label: label.into(),
            d: CellAddress::new(description_column, row).ok()?,
            e: CellAddress::new(amount_column, row).ok()?,
        })
    }

    /// Rows touched by this item (one, unless the two cells disagree).
    pub fn rows(&self) -> impl Iterator<Item = u32> {
        let d = self.d.row();
        let e = self.e.row();
        std::iter::once(d).chain((e != d).then_some(e))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseCategory {
    pub name: String,
    pub items: Vec<IndirectExpenseItem>,
}

/// The indirect-expense schedule for one bracket.
///
/// `reserved_rows` lie inside the schedule span but belong to the report
/// generator (computed formulas) and must never receive user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseCatalog {
    pub categories: Vec<ExpenseCategory>,
    #[serde(default)]
    pub reserved_rows: Vec<u32>,
}

impl ExpenseCatalog {
    pub fn category(
        &self,
        name: &str,
    ) -> Option<&ExpenseCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    pub fn items(&self) -> impl Iterator<Item = &IndirectExpenseItem> {
        self.categories.iter().flat_map(|c| c.items.iter())
    }

    pub fn item_by_label(
        &self,
        label: &str,
    ) -> Option<&IndirectExpenseItem> {
        self.items().find(|i| i.label == label)
    }

    /// The item owning `cell`, along with whether it is the amount cell.
    pub fn item_for_cell(
        &self,
        cell: &CellAddress,
    ) -> Option<(&IndirectExpenseItem, bool)> {
        self.items().find_map(|i| {
            if i.d == *cell {
                Some((i, false))
            } else if i.e == *cell {
                Some((i, true))
            } else {
                None
            }
        })
    }

    /// First to last row of the schedule, reserved rows included.
    pub fn valid_span(&self) -> Option<RowRange> {
        let rows: Vec<u32> = self
            .items()
            .flat_map(IndirectExpenseItem::rows)
            .chain(self.reserved_rows.iter().copied())
            .collect();
        let min = rows.iter().min()?;
        let max = rows.iter().max()?;
        Some(RowRange::new(*min, *max))
    }

    /// A row may carry user input if it is inside the span and not reserved.
    pub fn accepts_row(
        &self,
        row: u32,
    ) -> bool {
        self.valid_span().is_some_and(|span| span.contains(row))
            && !self.reserved_rows.contains(&row)
    }

    /// Whether `cell` is a description or amount cell of some catalog item.
    pub fn contains_cell(
        &self,
        cell: &CellAddress,
    ) -> bool {
        self.item_for_cell(cell).is_some()
    }

    /// Whether `cell` falls in the schedule area: an item column on a row of
    /// the span, reserved rows included.
    pub fn covers_cell(
        &self,
        cell: &CellAddress,
    ) -> bool {
        let in_item_column = self
            .items()
            .any(|i| i.d.column() == cell.column() || i.e.column() == cell.column());
        in_item_column && self.valid_span().is_some_and(|span| span.contains(cell.row()))
    }

    pub fn item_count(&self) -> usize {
        self.items().count()
    }
}
