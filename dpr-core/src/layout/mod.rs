//! Tenure-dependent sheet layout.
//!
//! A [`Layout`] holds one [`BracketLayout`] per [`TenureBracket`]: the row
//! ranges of the fixed-asset schedule and the indirect-expense catalog. Both
//! schedules switch on the same bracket signal, so every caller resolves the
//! bracket through this module and then reads the matching tables.
//!
//! Layouts are validated on construction. The two brackets must describe the
//! same categories, and no table may overlap itself.

mod asset_table;
mod expense_catalog;
pub mod standard;

use std::collections::BTreeSet;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use asset_table::{AssetSection, AssetTable, RowRange};
pub use expense_catalog::{ExpenseCatalog, ExpenseCategory, IndirectExpenseItem};

use crate::models::{CellAddress, TenureBracket};

/// Configuration errors in a pair of bracket tables.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error(
        "{schedule} categories differ between brackets (only default: {only_default:?}, only extended: {only_extended:?})"
    )]
    CategoryMismatch {
        schedule: &'static str,
        only_default: Vec<String>,
        only_extended: Vec<String>,
    },

    #[error("{bracket} {schedule} lists category '{category}' more than once")]
    DuplicateCategory {
        bracket: TenureBracket,
        schedule: &'static str,
        category: String,
    },

    #[error("{bracket} asset range for '{category}' is inverted ({start} > {end})")]
    InvertedRange {
        bracket: TenureBracket,
        category: String,
        start: u32,
        end: u32,
    },

    #[error("{bracket} asset ranges for '{first}' and '{second}' overlap")]
    OverlappingRanges {
        bracket: TenureBracket,
        first: String,
        second: String,
    },

    #[error("{bracket} loan cell {cell} for '{category}' lies inside an item range")]
    LoanCellInsideItems {
        bracket: TenureBracket,
        category: String,
        cell: CellAddress,
    },

    #[error("{bracket} expense '{label}' uses reserved row {row}")]
    ReservedRowUsed {
        bracket: TenureBracket,
        label: String,
        row: u32,
    },

    #[error("{bracket} expense row {row} is used by both '{first}' and '{second}'")]
    DuplicateExpenseRow {
        bracket: TenureBracket,
        row: u32,
        first: String,
        second: String,
    },
}

/// Asset and expense tables for a single bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketLayout {
    pub assets: AssetTable,
    pub expenses: ExpenseCatalog,
}

/// The complete, validated two-bracket layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    default: BracketLayout,
    extended: BracketLayout,
}

static STANDARD: LazyLock<Layout> = LazyLock::new(|| {
    Layout::new(standard::default_layout(), standard::extended_layout())
        .expect("built-in layout tables are consistent")
});

impl Layout {
    /// Validates and combines the two bracket tables.
    pub fn new(
        default: BracketLayout,
        extended: BracketLayout,
    ) -> Result<Self, LayoutError> {
        validate_bracket(TenureBracket::Default, &default)?;
        validate_bracket(TenureBracket::Extended, &extended)?;

        compare_categories(
            "asset",
            default.assets.categories(),
            extended.assets.categories(),
        )?;
        compare_categories(
            "indirect expense",
            default.expenses.category_names(),
            extended.expenses.category_names(),
        )?;

        Ok(Self { default, extended })
    }

    /// The built-in DPR/CMA layout (see [`standard`]).
    pub fn standard() -> &'static Layout {
        &STANDARD
    }

    /// Resolves the bracket for a raw tenure value.
    pub fn resolve_bracket(
        &self,
        tenure_raw: Option<&str>,
    ) -> TenureBracket {
        TenureBracket::resolve(tenure_raw)
    }

    pub fn bracket(
        &self,
        bracket: TenureBracket,
    ) -> &BracketLayout {
        match bracket {
            TenureBracket::Default => &self.default,
            TenureBracket::Extended => &self.extended,
        }
    }

    pub fn asset_sections(
        &self,
        bracket: TenureBracket,
    ) -> &AssetTable {
        &self.bracket(bracket).assets
    }

    pub fn indirect_expense_catalog(
        &self,
        bracket: TenureBracket,
    ) -> &ExpenseCatalog {
        &self.bracket(bracket).expenses
    }

    pub fn asset_section(
        &self,
        bracket: TenureBracket,
        category: &str,
    ) -> Option<&AssetSection> {
        self.asset_sections(bracket).section(category)
    }

    /// Asset categories in display order (identical for both brackets).
    pub fn asset_categories(&self) -> impl Iterator<Item = &str> {
        self.default.assets.categories()
    }

    /// Whether `cell` belongs to any schedule area of either bracket.
    pub fn is_schedule_cell(
        &self,
        cell: &CellAddress,
    ) -> bool {
        [&self.default, &self.extended]
            .iter()
            .any(|b| b.assets.owns_cell(cell) || b.expenses.covers_cell(cell))
    }
}

fn validate_bracket(
    bracket: TenureBracket,
    layout: &BracketLayout,
) -> Result<(), LayoutError> {
    let mut seen = BTreeSet::new();
    for section in &layout.assets.sections {
        if !seen.insert(section.category.as_str()) {
            return Err(LayoutError::DuplicateCategory {
                bracket,
                schedule: "asset",
                category: section.category.clone(),
            });
        }
        if section.rows.is_empty() {
            return Err(LayoutError::InvertedRange {
                bracket,
                category: section.category.clone(),
                start: section.rows.start,
                end: section.rows.end,
            });
        }
    }

    let sections = &layout.assets.sections;
    for (i, first) in sections.iter().enumerate() {
        for second in &sections[i + 1..] {
            if first.rows.overlaps(&second.rows) {
                return Err(LayoutError::OverlappingRanges {
                    bracket,
                    first: first.category.clone(),
                    second: second.category.clone(),
                });
            }
        }
        let loan_row = first.loan_cell.row();
        let loan_column = first.loan_cell.column();
        let shares_item_column = loan_column == layout.assets.description_column
            || loan_column == layout.assets.amount_column;
        if shares_item_column && sections.iter().any(|s| s.rows.contains(loan_row)) {
            return Err(LayoutError::LoanCellInsideItems {
                bracket,
                category: first.category.clone(),
                cell: first.loan_cell.clone(),
            });
        }
    }

    let mut seen = BTreeSet::new();
    for category in &layout.expenses.categories {
        if !seen.insert(category.name.as_str()) {
            return Err(LayoutError::DuplicateCategory {
                bracket,
                schedule: "indirect expense",
                category: category.name.clone(),
            });
        }
    }

    let mut owners: Vec<(u32, &str)> = Vec::new();
    for item in layout.expenses.items() {
        for row in item.rows() {
            if layout.expenses.reserved_rows.contains(&row) {
                return Err(LayoutError::ReservedRowUsed {
                    bracket,
                    label: item.label.clone(),
                    row,
                });
            }
            if let Some((_, first)) = owners.iter().find(|(r, _)| *r == row) {
                return Err(LayoutError::DuplicateExpenseRow {
                    bracket,
                    row,
                    first: first.to_string(),
                    second: item.label.clone(),
                });
            }
            owners.push((row, item.label.as_str()));
        }
    }

    Ok(())
}

fn compare_categories<'a>(
    schedule: &'static str,
    default: impl Iterator<Item = &'a str>,
    extended: impl Iterator<Item = &'a str>,
) -> Result<(), LayoutError> {
    let default: BTreeSet<&str> = default.collect();
    let extended: BTreeSet<&str> = extended.collect();
    if default == extended {
        return Ok(());
    }

    Err(LayoutError::CategoryMismatch {
        schedule,
        only_default: default
            .difference(&extended)
            .map(|s| s.to_string())
            .collect(),
        only_extended: extended
            .difference(&default)
            .map(|s| s.to_string())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn standard_parts() -> (BracketLayout, BracketLayout) {
        (standard::default_layout(), standard::extended_layout())
    }

    // =========================================================================
    // built-in tables
    // =========================================================================

    #[test]
    fn standard_layout_passes_validation() {
        let (default, extended) = standard_parts();

        let layout = Layout::new(default, extended).unwrap();

        assert_eq!(&layout, Layout::standard());
    }

    #[test]
    fn plant_and_machinery_rows_per_bracket() {
        let layout = Layout::standard();

        let default = layout
            .asset_section(TenureBracket::Default, "Plant and Machinery")
            .unwrap();
        let extended = layout
            .asset_section(TenureBracket::Extended, "Plant and Machinery")
            .unwrap();

        assert_eq!(default.rows, RowRange::new(136, 145));
        assert_eq!(default.loan_cell.to_string(), "g146");
        assert_eq!(extended.rows, RowRange::new(148, 157));
        assert_eq!(extended.loan_cell.to_string(), "g158");
    }

    #[test]
    fn other_fixed_assets_capacity_differs_by_bracket() {
        let layout = Layout::standard();

        let default = layout
            .asset_section(TenureBracket::Default, "Other Fixed Assets")
            .unwrap();
        let extended = layout
            .asset_section(TenureBracket::Extended, "Other Fixed Assets")
            .unwrap();

        assert_eq!(default.capacity(), 10);
        assert_eq!(extended.capacity(), 12);
    }

    #[test]
    fn expense_catalogs_differ_in_rows_and_counts() {
        let layout = Layout::standard();
        let default = layout.indirect_expense_catalog(TenureBracket::Default);
        let extended = layout.indirect_expense_catalog(TenureBracket::Extended);

        assert_eq!(default.valid_span(), Some(RowRange::new(255, 270)));
        assert_eq!(extended.valid_span(), Some(RowRange::new(267, 282)));
        assert!(default.reserved_rows.is_empty());
        assert_eq!(extended.reserved_rows, vec![267]);

        let admin_default = default.category("Administrative Expenses").unwrap();
        let admin_extended = extended.category("Administrative Expenses").unwrap();
        assert_eq!(admin_default.items.len(), 8);
        assert_eq!(admin_extended.items.len(), 7);
        assert!(extended.item_by_label(standard::STAFF_SALARIES).is_none());
    }

    #[test]
    fn advertisement_lives_on_row_263_by_default() {
        let catalog = Layout::standard().indirect_expense_catalog(TenureBracket::Default);

        let item = catalog.item_by_label("Advertisement and Publicity").unwrap();

        assert_eq!(item.d.to_string(), "d263");
        assert_eq!(item.e.to_string(), "e263");
    }

    #[test]
    fn resolve_bracket_delegates_to_tenure_rules() {
        let layout = Layout::standard();

        assert_eq!(layout.resolve_bracket(Some("5")), TenureBracket::Default);
        assert_eq!(layout.resolve_bracket(Some("9")), TenureBracket::Extended);
        assert_eq!(layout.resolve_bracket(None), TenureBracket::Default);
    }

    #[test]
    fn schedule_cells_cover_both_brackets() {
        let layout = Layout::standard();
        let cell = |s: &str| CellAddress::parse(s).unwrap();

        assert!(layout.is_schedule_cell(&cell("c124")));
        assert!(layout.is_schedule_cell(&cell("e207")));
        assert!(layout.is_schedule_cell(&cell("g146")));
        assert!(layout.is_schedule_cell(&cell("d267")));
        assert!(layout.is_schedule_cell(&cell("e282")));
        assert!(!layout.is_schedule_cell(&cell("i47")));
        assert!(!layout.is_schedule_cell(&cell("c300")));
    }

    // =========================================================================
    // validation failures
    // =========================================================================

    #[test]
    fn mismatched_asset_categories_are_rejected() {
        let (default, mut extended) = standard_parts();
        extended.assets.sections[5].category = "Intangibles".to_string();

        let err = Layout::new(default, extended).unwrap_err();

        assert_eq!(
            err,
            LayoutError::CategoryMismatch {
                schedule: "asset",
                only_default: vec!["Other Fixed Assets".to_string()],
                only_extended: vec!["Intangibles".to_string()],
            }
        );
    }

    #[test]
    fn mismatched_expense_categories_are_rejected() {
        let (default, mut extended) = standard_parts();
        extended.expenses.categories.pop();

        let err = Layout::new(default, extended).unwrap_err();

        assert!(matches!(
            err,
            LayoutError::CategoryMismatch {
                schedule: "indirect expense",
                ..
            }
        ));
    }

    #[test]
    fn overlapping_asset_ranges_are_rejected() {
        let (mut default, extended) = standard_parts();
        default.assets.sections[1].rows = RowRange::new(130, 145);

        let err = Layout::new(default, extended).unwrap_err();

        assert_eq!(
            err,
            LayoutError::OverlappingRanges {
                bracket: TenureBracket::Default,
                first: "Land and Building".to_string(),
                second: "Plant and Machinery".to_string(),
            }
        );
    }

    #[test]
    fn inverted_range_is_rejected() {
        let (default, mut extended) = standard_parts();
        extended.assets.sections[0].rows = RowRange::new(145, 136);

        let err = Layout::new(default, extended).unwrap_err();

        assert!(matches!(err, LayoutError::InvertedRange { .. }));
    }

    #[test]
    fn loan_cell_inside_item_range_is_rejected() {
        let (mut default, extended) = standard_parts();
        default.assets.sections[0].loan_cell = CellAddress::parse("e130").unwrap();

        let err = Layout::new(default, extended).unwrap_err();

        assert!(matches!(err, LayoutError::LoanCellInsideItems { .. }));
    }

    #[test]
    fn expense_on_reserved_row_is_rejected() {
        let (default, mut extended) = standard_parts();
        extended.expenses.reserved_rows.push(270);

        let err = Layout::new(default, extended).unwrap_err();

        assert!(matches!(
            err,
            LayoutError::ReservedRowUsed { row: 270, .. }
        ));
    }

    #[test]
    fn duplicate_expense_rows_are_rejected() {
        let (mut default, extended) = standard_parts();
        let rent = default.expenses.categories[0].items[1].clone();
        default.expenses.categories[0].items[2].d = rent.d.clone();
        default.expenses.categories[0].items[2].e = rent.e.clone();

        let err = Layout::new(default, extended).unwrap_err();

        assert!(matches!(err, LayoutError::DuplicateExpenseRow { .. }));
    }
}
