//! CSV import of fixed-asset line items.
//!
//! ## CSV Format
//!
//! | Column        | Required | Type    | Notes                                   |
//! |---------------|----------|---------|-----------------------------------------|
//! | `category`    | yes      | string  | One of the layout's asset categories    |
//! | `description` | yes      | string  | May be empty                            |
//! | `amount`      | no       | decimal | Leave cell empty for no amount          |
//!
//! ```csv
//! category,description,amount
//! Plant and Machinery,CNC lathe,1000000
//! Vehicles,Delivery van,650000
//! ```
//!
//! Records are applied through the wizard's own actions, one `AddItem` and
//! then `UpdateItem` per field, so an import obeys the same capacity rules as
//! typing the rows in by hand.

use std::collections::BTreeSet;
use std::path::Path;

use dpr_core::models::AssetField;
use dpr_core::wizard::{Action, ActionError, FormObserver, FormSession};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout exactly
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    category: String,
    description: String,
    amount: Option<Decimal>,
}

/// One line item read from the CSV, with its 1-based record number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub row: usize,
    pub category: String,
    pub description: String,
    pub amount: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum AssetImportError {
    #[error("failed to read asset file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Bad structure, missing column or an amount that is not a number.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("unknown asset category '{category}' on row {row}")]
    UnknownCategory { category: String, row: usize },

    #[error("'{category}' is full ({max} items) at row {row}")]
    CapacityReached {
        category: String,
        row: usize,
        max: usize,
    },

    #[error("row {row} rejected: {source}")]
    Action {
        row: usize,
        #[source]
        source: ActionError,
    },
}

/// Parse CSV text into asset records, in file order.
///
/// # Errors
///
/// [`AssetImportError::Parse`] if the CSV is structurally invalid or an
/// amount cannot be read as a decimal.
pub fn load_from_str(input: &str) -> Result<Vec<AssetRecord>, AssetImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            Ok(AssetRecord {
                row: idx + 1,
                category: row.category,
                description: row.description,
                amount: row.amount,
            })
        })
        .collect()
}

/// Read a CSV file from disk and delegate to [`load_from_str`].
pub fn load_from_file(path: &Path) -> Result<Vec<AssetRecord>, AssetImportError> {
    let contents = std::fs::read_to_string(path).map_err(|source| AssetImportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_from_str(&contents)
}

/// Adds every record to the session's asset schedule and returns the number
/// of items added.
///
/// Items land on the first vacant rows of the current bracket. Import stops
/// at the first rejected record; records before it stay applied.
pub fn apply<O: FormObserver>(
    session: &mut FormSession<'_, O>,
    records: &[AssetRecord],
) -> Result<usize, AssetImportError> {
    let layout = session.layout();

    for record in records {
        let bracket = session.state().bracket();
        let Some(section) = layout.asset_section(bracket, &record.category) else {
            return Err(AssetImportError::UnknownCategory {
                category: record.category.clone(),
                row: record.row,
            });
        };

        let before = rows_of(session, &record.category);
        session
            .dispatch(Action::AddItem(record.category.clone()))
            .map_err(|source| match source {
                ActionError::CapacityReached { .. } => AssetImportError::CapacityReached {
                    category: record.category.clone(),
                    row: record.row,
                    max: section.capacity(),
                },
                source => AssetImportError::Action {
                    row: record.row,
                    source,
                },
            })?;
        let Some(sheet_row) = rows_of(session, &record.category)
            .difference(&before)
            .next()
            .copied()
        else {
            continue;
        };

        let mut edits = vec![(AssetField::Description, record.description.clone())];
        if let Some(amount) = record.amount {
            edits.push((AssetField::Amount, amount.to_string()));
        }
        for (field, value) in edits {
            session
                .dispatch(Action::UpdateItem {
                    category: record.category.clone(),
                    row: sheet_row,
                    field,
                    value,
                })
                .map_err(|source| AssetImportError::Action {
                    row: record.row,
                    source,
                })?;
        }
        debug!(category = %record.category, row = sheet_row, "asset item imported");
    }

    info!(count = records.len(), "asset items imported");
    Ok(records.len())
}

fn rows_of<O: FormObserver>(
    session: &FormSession<'_, O>,
    category: &str,
) -> BTreeSet<u32> {
    session
        .state()
        .assets
        .items(category)
        .map(|(row, _)| row)
        .collect()
}
