//! Edit mode: rebuilding wizard state from a saved report.

use std::collections::BTreeMap;

use tracing::debug;

use crate::layout::{AssetTable, Layout};
use crate::models::{AssetItem, CellAddress, SectionData, SectionId, TenureBracket, WizardState};
use crate::payload::CellMapping;
use crate::schema::section_of;
use crate::utils::parse_optional_decimal;
use crate::wizard::{AssetSchedule, FormState, WizardCursor};

/// Builds a form from previously saved sections.
///
/// Scalar sections are taken as saved. A saved `assets` section holds flat
/// sheet cells; those are read back into the asset schedule against the
/// bracket of the saved tenure. Rows that belong to the other bracket are
/// moved by offset, rows in neither range are dropped.
pub fn hydrate(
    layout: &Layout,
    initial: WizardState,
) -> FormState {
    let mut saved = initial;
    let asset_cells = saved.take_section(SectionId::Assets);

    let mut state = FormState {
        sections: WizardState::new(),
        assets: AssetSchedule::new(layout),
        cursor: WizardCursor::default(),
        expense_bracket: None,
    };
    state.sections.merge(saved);

    if let Some(cells) = asset_cells {
        restore_assets(layout, state.bracket(), &mut state.assets, &cells);
    }
    state.sync_expenses(layout);
    state
}

/// Splits a flat payload back into wizard sections.
///
/// Cells are assigned to the section whose field or schedule owns them;
/// cells owned by nothing are skipped.
pub fn sections_from_payload(
    layout: &Layout,
    cells: &CellMapping,
) -> WizardState {
    let brackets = [TenureBracket::Default, TenureBracket::Extended];
    let mut sections = WizardState::new();

    for (cell, value) in cells.iter() {
        let key = cell.to_string();
        let section = section_of(&key).or_else(|| {
            if brackets
                .iter()
                .any(|b| layout.asset_sections(*b).owns_cell(cell))
            {
                Some(SectionId::Assets)
            } else if brackets
                .iter()
                .any(|b| layout.indirect_expense_catalog(*b).covers_cell(cell))
            {
                Some(SectionId::IndirectExpenses)
            } else {
                None
            }
        });

        match section {
            Some(section) => sections.set(section, key, value.to_string()),
            None => debug!(%cell, "payload cell belongs to no section; skipped"),
        }
    }

    sections
}

fn restore_assets(
    layout: &Layout,
    bracket: TenureBracket,
    assets: &mut AssetSchedule,
    cells: &SectionData,
) {
    let table = layout.asset_sections(bracket);
    let other = layout.asset_sections(bracket.other());

    let mut items: BTreeMap<(String, u32), AssetItem> = BTreeMap::new();
    let mut loans: Vec<(String, &str)> = Vec::new();

    for (key, raw) in cells {
        let Ok(cell) = CellAddress::parse(key) else {
            debug!(key, "saved asset key is not a cell; skipped");
            continue;
        };

        let loan_section = table
            .sections
            .iter()
            .chain(&other.sections)
            .find(|s| s.loan_cell == cell);
        if let Some(section) = loan_section {
            loans.push((section.category.clone(), raw.as_str()));
            continue;
        }

        let Some((category, row)) = place(table, other, cell.row()) else {
            debug!(%cell, %bracket, "saved asset row outside every range; dropped");
            continue;
        };
        let item = items.entry((category, row)).or_default();
        if cell.column() == table.description_column {
            item.description = raw.clone();
        } else if cell.column() == table.amount_column {
            item.amount = parse_optional_decimal(raw);
        } else {
            debug!(%cell, "saved asset cell is not an item column; skipped");
        }
    }

    for ((category, row), item) in items {
        if item.is_populated() {
            assets.restore_item(&category, row, item);
            assets.mark_visited(&category);
        }
    }
    for (category, raw) in loans {
        if let Err(err) = assets.set_loan_percentage(layout, &category, raw) {
            debug!(%err, "saved loan percentage skipped");
        }
        assets.mark_visited(&category);
    }
}

/// Category and row for a saved item row; rows of the other bracket move to
/// the same offset in the current one.
fn place(
    table: &AssetTable,
    other: &AssetTable,
    row: u32,
) -> Option<(String, u32)> {
    if let Some(section) = table.sections.iter().find(|s| s.rows.contains(row)) {
        return Some((section.category.clone(), row));
    }

    let source = other.sections.iter().find(|s| s.rows.contains(row))?;
    let offset = source.rows.offset_of(row)?;
    let target = table.section(&source.category)?.rows.row_at(offset)?;
    Some((source.category.clone(), target))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::payload::serialize;
    use crate::schema::TENURE_FIELD;

    const PLANT: &str = "Plant and Machinery";

    fn saved(
        tenure: &str,
        assets: &[(&str, &str)],
    ) -> WizardState {
        let mut state = WizardState::new();
        state.set(SectionId::MeansOfFinance, TENURE_FIELD, tenure);
        for (cell, value) in assets {
            state.set(SectionId::Assets, *cell, *value);
        }
        state
    }

    #[test]
    fn saved_asset_cells_become_items() {
        let layout = Layout::standard();
        let initial = saved(
            "5",
            &[("c140", "CNC lathe"), ("e140", "1000000"), ("g146", "25")],
        );

        let state = hydrate(layout, initial);

        let item = state.assets.item(PLANT, 140).unwrap();
        assert_eq!(item.description, "CNC lathe");
        assert_eq!(item.amount, Some(dec!(1000000)));
        let loan = state.assets.loan(PLANT).unwrap();
        assert_eq!(loan.percentage, Some(dec!(25)));
        assert_eq!(loan.amount, Some(dec!(250000)));
        assert!(state.assets.has_visited(PLANT));
        assert!(state.sections.section(SectionId::Assets).is_none());
    }

    #[test]
    fn rows_are_read_against_saved_tenure() {
        let layout = Layout::standard();

        let state = hydrate(layout, saved("9", &[("c152", "Press"), ("e152", "300")]));

        assert!(state.assets.item(PLANT, 152).is_some());
        assert_eq!(state.assets.total(PLANT), dec!(300));
    }

    #[test]
    fn rows_outside_every_range_are_dropped() {
        let layout = Layout::standard();

        let state = hydrate(layout, saved("5", &[("c120", "Stray"), ("x", "1")]));

        assert_eq!(state.assets.categories().count(), 0);
    }

    #[test]
    fn saved_expenses_are_kept_and_labels_seeded() {
        let layout = Layout::standard();
        let mut initial = saved("5", &[]);
        initial.set(SectionId::IndirectExpenses, "e263", "12000");

        let state = hydrate(layout, initial);

        assert_eq!(state.expense_bracket, Some(TenureBracket::Default));
        assert_eq!(
            state.sections.value(SectionId::IndirectExpenses, "e263"),
            Some("12000")
        );
        assert_eq!(
            state.sections.value(SectionId::IndirectExpenses, "d263"),
            Some("Advertisement and Publicity")
        );
    }

    #[test]
    fn payload_splits_into_sections() {
        let layout = Layout::standard();
        let mut assets = AssetSchedule::new(layout);
        assets.restore_item(PLANT, 148, AssetItem::new("Press", Some(dec!(400000))));
        assets.set_loan_percentage(layout, PLANT, "50").unwrap();
        let mut sections = WizardState::new();
        sections.set(SectionId::GeneralInformation, "c5", "Shree Engineering Works");
        sections.set(SectionId::MeansOfFinance, TENURE_FIELD, "10");
        sections.set(SectionId::IndirectExpenses, "e275", "12000");
        let payload = serialize(layout, &sections, &assets);

        let split = sections_from_payload(layout, &payload.cells);

        assert_eq!(
            split.value(SectionId::GeneralInformation, "c5"),
            Some("Shree Engineering Works")
        );
        assert_eq!(split.value(SectionId::MeansOfFinance, TENURE_FIELD), Some("10"));
        assert_eq!(split.value(SectionId::Assets, "c148"), Some("Press"));
        assert_eq!(split.value(SectionId::Assets, "g158"), Some("50"));
        assert_eq!(split.value(SectionId::IndirectExpenses, "e275"), Some("12000"));
    }

    #[test]
    fn saved_payload_round_trips() {
        let layout = Layout::standard();
        let mut assets = AssetSchedule::new(layout);
        assets.restore_item(PLANT, 140, AssetItem::new("Lathe", Some(dec!(1000000))));
        assets.set_loan_percentage(layout, PLANT, "25").unwrap();
        let mut sections = WizardState::new();
        sections.set(SectionId::MeansOfFinance, TENURE_FIELD, "9");
        let first = serialize(layout, &sections, &assets);

        let state = hydrate(layout, sections_from_payload(layout, &first.cells));
        let second = serialize(layout, &state.sections, &state.assets);

        assert_eq!(state.assets.item(PLANT, 152).unwrap().description, "Lathe");
        assert_eq!(second.cells.get("c152"), first.cells.get("c152"));
        assert_eq!(second.cells.get("e152"), first.cells.get("e152"));
        assert_eq!(second.cells.get("g158"), first.cells.get("g158"));
    }
}
