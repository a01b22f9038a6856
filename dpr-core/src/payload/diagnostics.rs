use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{SectionId, TenureBracket};

/// Something the serializer left out of the payload.
///
/// None of these stop a submission; each is logged and returned with the
/// payload so the loss can be traced.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RemapDiagnostic {
    #[error("'{category}' row {row} lies outside its {bracket} and alternate ranges")]
    RowOutsideRanges {
        category: String,
        row: u32,
        bracket: TenureBracket,
    },

    #[error("'{category}' row {row} was entered for an extended tenure but the tenure is now default")]
    ExtendedRowUnderDefault { category: String, row: u32 },

    #[error("'{category}' row {row} has no extended counterpart at offset {offset}")]
    OffsetBeyondRange {
        category: String,
        row: u32,
        offset: u32,
    },

    #[error("'{category}' row {row} would move onto row {target}, which is already filled")]
    Collision {
        category: String,
        row: u32,
        target: u32,
    },

    #[error("'{category}' is not a category of the current layout")]
    UnknownCategory { category: String },

    #[error("expense cell {cell} is not part of the {bracket} catalog")]
    StrayExpenseCell { cell: String, bracket: TenureBracket },

    #[error("{section} key '{key}' is not a cell address")]
    InvalidCellKey { section: SectionId, key: String },

    #[error("{section} field {cell} addresses a schedule cell")]
    ScalarInScheduleArea { section: SectionId, cell: String },
}
