//! TOML layout configuration.
//!
//! A layout file describes both tenure brackets. Each bracket lists its asset
//! sections and its indirect-expense categories; column letters are shared
//! and default to the standard sheet.
//!
//! ```toml
//! [default]
//! reserved_expense_rows = []
//!
//! [[default.assets]]
//! category = "Land and Building"
//! start = 124
//! end = 133
//! loan_cell = "g134"
//!
//! [[default.expenses]]
//! name = "Administrative Expenses"
//! items = [
//!     { label = "Staff Salaries", row = 255 },
//!     { label = "Rent", row = 256 },
//! ]
//! ```
//!
//! The `[extended]` table has the same shape. The result is run through
//! [`Layout::new`], so a file that loads is a valid layout.

use std::path::Path;

use dpr_core::layout::{
    AssetSection, AssetTable, BracketLayout, ExpenseCatalog, ExpenseCategory,
    IndirectExpenseItem, Layout, LayoutError, RowRange,
};
use dpr_core::models::{CellAddress, CellAddressError};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LayoutConfigError {
    #[error("failed to read layout file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("layout TOML error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid cell in layout: {0}")]
    Cell(#[from] CellAddressError),

    #[error("invalid layout: {0}")]
    Layout(#[from] LayoutError),
}

// ---------------------------------------------------------------------------
// Serde-compatible document that mirrors the TOML layout exactly
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutFile {
    #[serde(default)]
    columns: Columns,
    default: BracketConfig,
    extended: BracketConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Columns {
    asset_description: String,
    asset_amount: String,
    expense_description: String,
    expense_amount: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            asset_description: "c".to_string(),
            asset_amount: "e".to_string(),
            expense_description: "d".to_string(),
            expense_amount: "e".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BracketConfig {
    assets: Vec<AssetConfig>,
    #[serde(default)]
    reserved_expense_rows: Vec<u32>,
    expenses: Vec<ExpenseGroupConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AssetConfig {
    category: String,
    start: u32,
    end: u32,
    loan_cell: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExpenseGroupConfig {
    name: String,
    items: Vec<ExpenseItemConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExpenseItemConfig {
    label: String,
    row: u32,
}

fn convert_bracket(
    columns: &Columns,
    config: BracketConfig,
) -> Result<BracketLayout, LayoutConfigError> {
    let sections = config
        .assets
        .into_iter()
        .map(|asset| {
            Ok(AssetSection {
                category: asset.category,
                rows: RowRange::new(asset.start, asset.end),
                loan_cell: CellAddress::parse(&asset.loan_cell)?,
            })
        })
        .collect::<Result<Vec<_>, LayoutConfigError>>()?;

    let categories = config
        .expenses
        .into_iter()
        .map(|group| {
            let items = group
                .items
                .into_iter()
                .map(|item| {
                    Ok(IndirectExpenseItem {
                        d: CellAddress::new(&columns.expense_description, item.row)?,
                        e: CellAddress::new(&columns.expense_amount, item.row)?,
                        label: item.label,
                    })
                })
                .collect::<Result<Vec<_>, LayoutConfigError>>()?;
            Ok(ExpenseCategory {
                name: group.name,
                items,
            })
        })
        .collect::<Result<Vec<_>, LayoutConfigError>>()?;

    Ok(BracketLayout {
        assets: AssetTable {
            description_column: normalise_column(&columns.asset_description)?,
            amount_column: normalise_column(&columns.asset_amount)?,
            sections,
        },
        expenses: ExpenseCatalog {
            categories,
            reserved_rows: config.reserved_expense_rows,
        },
    })
}

/// Lowercases a column through the address parser so `"C"` matches `c140`.
fn normalise_column(column: &str) -> Result<String, CellAddressError> {
    Ok(CellAddress::new(column, 1)?.column().to_string())
}

/// Parse a TOML layout document and validate it.
///
/// # Errors
///
/// * [`LayoutConfigError::Parse`] when the document does not match the
///   expected shape.
/// * [`LayoutConfigError::Cell`] when a column or loan cell is not a valid
///   address.
/// * [`LayoutConfigError::Layout`] when the two brackets fail validation.
pub fn load_from_str(input: &str) -> Result<Layout, LayoutConfigError> {
    let file: LayoutFile = toml::from_str(input)?;

    let default = convert_bracket(&file.columns, file.default)?;
    let extended = convert_bracket(&file.columns, file.extended)?;
    let layout = Layout::new(default, extended)?;

    debug!(
        categories = layout.asset_categories().count(),
        "layout configuration loaded"
    );
    Ok(layout)
}

/// Read a layout file from disk and delegate to [`load_from_str`].
pub fn load_from_file(path: &Path) -> Result<Layout, LayoutConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LayoutConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_from_str(&contents)
}

#[cfg(test)]
mod tests {
    use dpr_core::models::TenureBracket;
    use pretty_assertions::assert_eq;

    use super::*;

    const SMALL: &str = r#"
[default]
[[default.assets]]
category = "Vehicles"
start = 10
end = 12
loan_cell = "G13"

[[default.expenses]]
name = "Selling"
items = [{ label = "Freight", row = 40 }]

[extended]
reserved_expense_rows = [50]
[[extended.assets]]
category = "Vehicles"
start = 20
end = 23
loan_cell = "g24"

[[extended.expenses]]
name = "Selling"
items = [{ label = "Freight", row = 51 }]
"#;

    #[test]
    fn small_layout_loads() {
        let layout = load_from_str(SMALL).unwrap();

        let extended = layout
            .asset_section(TenureBracket::Extended, "Vehicles")
            .unwrap();
        assert_eq!(extended.rows, RowRange::new(20, 23));
        assert_eq!(extended.loan_cell.to_string(), "g24");

        let default = layout
            .asset_section(TenureBracket::Default, "Vehicles")
            .unwrap();
        assert_eq!(default.loan_cell.to_string(), "g13");

        let catalog = layout.indirect_expense_catalog(TenureBracket::Extended);
        assert_eq!(catalog.reserved_rows, vec![50]);
        assert_eq!(catalog.item_by_label("Freight").unwrap().e.to_string(), "e51");
    }

    #[test]
    fn custom_columns_are_lowercased() {
        let input = format!(
            "[columns]\nasset_description = \"B\"\nasset_amount = \"D\"\n{SMALL}"
        );

        let layout = load_from_str(&input).unwrap();

        let table = layout.asset_sections(TenureBracket::Default);
        assert_eq!(table.description_column, "b");
        assert_eq!(table.amount_column, "d");
    }

    #[test]
    fn mismatched_categories_are_rejected() {
        let input = SMALL.replace(
            "[[extended.assets]]\ncategory = \"Vehicles\"",
            "[[extended.assets]]\ncategory = \"Cars\"",
        );

        let err = load_from_str(&input).unwrap_err();

        assert!(matches!(
            err,
            LayoutConfigError::Layout(LayoutError::CategoryMismatch { .. })
        ));
    }

    #[test]
    fn bad_loan_cell_is_a_cell_error() {
        let input = SMALL.replace("\"G13\"", "\"13\"");

        let err = load_from_str(&input).unwrap_err();

        assert!(matches!(err, LayoutConfigError::Cell(_)));
    }

    #[test]
    fn reserved_row_in_use_is_rejected() {
        let input = SMALL.replace("row = 51", "row = 50");

        let err = load_from_str(&input).unwrap_err();

        assert!(matches!(
            err,
            LayoutConfigError::Layout(LayoutError::ReservedRowUsed { row: 50, .. })
        ));
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let input = format!("colour = \"red\"\n{SMALL}");

        let err = load_from_str(&input).unwrap_err();

        assert!(matches!(err, LayoutConfigError::Parse(_)));
    }
}
