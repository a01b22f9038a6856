//! Built-in DPR/CMA sheet layout.
//!
//! Extended-tenure sheets carry twelve extra repayment rows above the asset
//! schedule, so every extended asset range sits twelve rows lower than its
//! default counterpart. The extended indirect-expense schedule also reserves
//! its first row for the computed staff salaries line.
//!
//! | Category                  | Default   | Loan | Extended  | Loan |
//! |---------------------------|-----------|------|-----------|------|
//! | Land and Building         | 124–133   | g134 | 136–145   | g146 |
//! | Plant and Machinery       | 136–145   | g146 | 148–157   | g158 |
//! | Furniture and Fixtures    | 148–157   | g158 | 160–169   | g170 |
//! | Vehicles                  | 160–169   | g170 | 172–181   | g182 |
//! | Computers and Peripherals | 172–181   | g182 | 184–193   | g194 |
//! | Other Fixed Assets        | 184–193   | g194 | 196–207   | g208 |

use crate::layout::{
    AssetSection, AssetTable, BracketLayout, ExpenseCatalog, ExpenseCategory,
    IndirectExpenseItem, RowRange,
};
use crate::models::CellAddress;

const DESCRIPTION_COLUMN: &str = "c";
const AMOUNT_COLUMN: &str = "e";
const LOAN_COLUMN: &str = "g";

const EXPENSE_DESCRIPTION_COLUMN: &str = "d";
const EXPENSE_AMOUNT_COLUMN: &str = "e";

/// `(category, default rows, extended rows)`; loan cells sit on the row after.
const ASSET_ROWS: [(&str, (u32, u32), (u32, u32)); 6] = [
    ("Land and Building", (124, 133), (136, 145)),
    ("Plant and Machinery", (136, 145), (148, 157)),
    ("Furniture and Fixtures", (148, 157), (160, 169)),
    ("Vehicles", (160, 169), (172, 181)),
    ("Computers and Peripherals", (172, 181), (184, 193)),
    ("Other Fixed Assets", (184, 193), (196, 207)),
];

pub const STAFF_SALARIES: &str = "Staff Salaries";

const ADMINISTRATIVE: [&str; 8] = [
    STAFF_SALARIES,
    "Rent",
    "Electricity Charges",
    "Telephone and Internet",
    "Printing and Stationery",
    "Repairs and Maintenance",
    "Insurance",
    "Travelling and Conveyance",
];

const SELLING: [&str; 4] = [
    "Advertisement and Publicity",
    "Sales Commission",
    "Freight Outward",
    "Packing Expenses",
];

const FINANCIAL: [&str; 4] = [
    "Bank Charges",
    "Professional Fees",
    "Audit Fees",
    "Miscellaneous Expenses",
];

const DEFAULT_EXPENSE_FIRST_ROW: u32 = 255;
const EXTENDED_EXPENSE_FIRST_ROW: u32 = 267;

pub(crate) fn default_layout() -> BracketLayout {
    BracketLayout {
        assets: asset_table(|(_, default, _)| default),
        expenses: expense_catalog(DEFAULT_EXPENSE_FIRST_ROW, false),
    }
}

pub(crate) fn extended_layout() -> BracketLayout {
    BracketLayout {
        assets: asset_table(|(_, _, extended)| extended),
        expenses: expense_catalog(EXTENDED_EXPENSE_FIRST_ROW, true),
    }
}

fn asset_table(pick: impl Fn((&str, (u32, u32), (u32, u32))) -> (u32, u32)) -> AssetTable {
    let sections = ASSET_ROWS
        .iter()
        .filter_map(|entry| {
            let (start, end) = pick(*entry);
            let loan_cell = CellAddress::new(LOAN_COLUMN, end + 1).ok()?;
            Some(AssetSection {
                category: entry.0.to_string(),
                rows: RowRange::new(start, end),
                loan_cell,
            })
        })
        .collect();

    AssetTable {
        description_column: DESCRIPTION_COLUMN.to_string(),
        amount_column: AMOUNT_COLUMN.to_string(),
        sections,
    }
}

/// Lays the three expense categories out on consecutive rows from
/// `first_row`. With `reserve_salaries`, the first row is left to the
/// generator's salaries formula and the manual salaries line is omitted.
fn expense_catalog(
    first_row: u32,
    reserve_salaries: bool,
) -> ExpenseCatalog {
    let mut row = first_row;
    let mut reserved_rows = Vec::new();
    if reserve_salaries {
        reserved_rows.push(row);
        row += 1;
    }

    let groups: [(&str, &[&str]); 3] = [
        ("Administrative Expenses", &ADMINISTRATIVE),
        ("Selling and Distribution Expenses", &SELLING),
        ("Financial and Other Expenses", &FINANCIAL),
    ];

    let categories = groups
        .into_iter()
        .map(|(name, labels)| {
            let items = labels
                .iter()
                .filter(|label| !(reserve_salaries && **label == STAFF_SALARIES))
                .filter_map(|label| {
                    let item = IndirectExpenseItem::on_row(
                        *label,
                        EXPENSE_DESCRIPTION_COLUMN,
                        EXPENSE_AMOUNT_COLUMN,
                        row,
                    );
                    row += 1;
                    item
                })
                .collect();
            ExpenseCategory {
                name: name.to_string(),
                items,
            }
        })
        .collect();

    ExpenseCatalog {
        categories,
        reserved_rows,
    }
}
