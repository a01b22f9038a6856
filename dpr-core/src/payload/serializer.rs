//! Wizard state to flat cell mapping.
//!
//! Schedule rows are addressed by the bracket of the tenure present at
//! submission. Asset items keep the row they were entered on, so rows entered
//! under the default bracket are translated by offset when the report is
//! submitted with an extended tenure. Anything that cannot be placed is left
//! out and reported as a [`RemapDiagnostic`].

use tracing::{debug, warn};

use crate::layout::{AssetSection, Layout};
use crate::models::{AssetItem, CellAddress, CellValue, SectionId, TenureBracket, WizardState};
use crate::payload::{CellMapping, RemapDiagnostic, SubmissionPayload};
use crate::schema::field_spec;
use crate::utils::{is_blank, parse_optional_decimal};
use crate::wizard::AssetSchedule;

/// Flattens the wizard into the payload for the report generator.
pub fn serialize(
    layout: &Layout,
    sections: &WizardState,
    assets: &AssetSchedule,
) -> SubmissionPayload {
    let mut builder = PayloadBuilder {
        layout,
        bracket: sections.bracket(),
        cells: CellMapping::new(),
        diagnostics: Vec::new(),
    };

    builder.asset_rows(assets);
    builder.expenses(sections);
    builder.scalars(sections);
    builder.loan_cells(assets);

    debug!(
        bracket = %builder.bracket,
        cells = builder.cells.len(),
        dropped = builder.diagnostics.len(),
        "payload serialized"
    );

    SubmissionPayload {
        cells: builder.cells,
        loan_percentages: assets.loan_percentages(),
        diagnostics: builder.diagnostics,
    }
}

struct PayloadBuilder<'a> {
    layout: &'a Layout,
    bracket: TenureBracket,
    cells: CellMapping,
    diagnostics: Vec<RemapDiagnostic>,
}

impl PayloadBuilder<'_> {
    fn asset_rows(
        &mut self,
        assets: &AssetSchedule,
    ) {
        for category in assets.categories() {
            let Some(target) = self.layout.asset_section(self.bracket, category) else {
                self.leave_out(RemapDiagnostic::UnknownCategory {
                    category: category.to_string(),
                });
                continue;
            };

            let populated: Vec<(u32, &AssetItem)> = assets
                .items(category)
                .filter(|(_, item)| item.is_populated())
                .collect();

            let mut placed: Vec<(u32, &AssetItem)> = populated
                .iter()
                .filter(|(row, _)| target.rows.contains(*row))
                .copied()
                .collect();

            for (row, item) in populated.iter().filter(|(row, _)| !target.rows.contains(*row)) {
                match self.remap(category, target, *row) {
                    Ok(to) if placed.iter().any(|(r, _)| *r == to) => {
                        self.leave_out(RemapDiagnostic::Collision {
                            category: category.to_string(),
                            row: *row,
                            target: to,
                        });
                    }
                    Ok(to) => {
                        debug!(category, from = *row, to, "asset row remapped");
                        placed.push((to, *item));
                    }
                    Err(diagnostic) => self.leave_out(diagnostic),
                }
            }

            for (row, item) in placed {
                self.write_item(row, item);
            }
        }
    }

    /// Target row for an item stored outside the submit bracket's range.
    fn remap(
        &self,
        category: &str,
        target: &AssetSection,
        row: u32,
    ) -> Result<u32, RemapDiagnostic> {
        let offset = self
            .layout
            .asset_section(self.bracket.other(), category)
            .and_then(|other| other.rows.offset_of(row));

        match (self.bracket, offset) {
            (TenureBracket::Extended, Some(offset)) => {
                target
                    .rows
                    .row_at(offset)
                    .ok_or_else(|| RemapDiagnostic::OffsetBeyondRange {
                        category: category.to_string(),
                        row,
                        offset,
                    })
            }
            (TenureBracket::Default, Some(_)) => Err(RemapDiagnostic::ExtendedRowUnderDefault {
                category: category.to_string(),
                row,
            }),
            (_, None) => Err(RemapDiagnostic::RowOutsideRanges {
                category: category.to_string(),
                row,
                bracket: self.bracket,
            }),
        }
    }

    fn write_item(
        &mut self,
        row: u32,
        item: &AssetItem,
    ) {
        let table = self.layout.asset_sections(self.bracket);
        if !is_blank(&item.description)
            && let Some(cell) = table.description_cell(row)
        {
            self.cells.insert(cell, CellValue::text(item.description.trim()));
        }
        if let Some(amount) = item.amount
            && let Some(cell) = table.amount_cell(row)
        {
            self.cells.insert(cell, amount);
        }
    }

    fn expenses(
        &mut self,
        sections: &WizardState,
    ) {
        let section = SectionId::IndirectExpenses;
        let Some(data) = sections.section(section) else {
            return;
        };
        let catalog = self.layout.indirect_expense_catalog(self.bracket);

        for (key, raw) in data {
            if is_blank(raw) {
                continue;
            }
            let Some(cell) = self.cell_key(section, key) else {
                continue;
            };

            let owner = catalog
                .item_for_cell(&cell)
                .filter(|_| catalog.accepts_row(cell.row()));
            match owner {
                Some((_, true)) => match parse_optional_decimal(raw) {
                    Some(amount) => {
                        self.cells.insert(cell, amount);
                    }
                    None => debug!(%cell, "non-numeric expense amount left blank"),
                },
                Some((_, false)) => {
                    self.cells.insert(cell, CellValue::text(raw.trim()));
                }
                None => self.leave_out(RemapDiagnostic::StrayExpenseCell {
                    cell: cell.to_string(),
                    bracket: self.bracket,
                }),
            }
        }
    }

    fn scalars(
        &mut self,
        sections: &WizardState,
    ) {
        for (section, data) in sections.sections() {
            if matches!(section, SectionId::Assets | SectionId::IndirectExpenses) {
                continue;
            }

            for (key, raw) in data {
                if is_blank(raw) {
                    continue;
                }
                let Some(cell) = self.cell_key(section, key) else {
                    continue;
                };
                if self.layout.is_schedule_cell(&cell) {
                    self.leave_out(RemapDiagnostic::ScalarInScheduleArea {
                        section,
                        cell: cell.to_string(),
                    });
                    continue;
                }
                self.cells.insert(cell, scalar_value(section, key, raw));
            }
        }
    }

    fn loan_cells(
        &mut self,
        assets: &AssetSchedule,
    ) {
        for (category, percentage) in assets.loan_percentages() {
            match self.layout.asset_section(self.bracket, &category) {
                Some(section) => {
                    self.cells.insert(section.loan_cell.clone(), percentage);
                }
                None => self.leave_out(RemapDiagnostic::UnknownCategory { category }),
            }
        }
    }

    fn cell_key(
        &mut self,
        section: SectionId,
        key: &str,
    ) -> Option<CellAddress> {
        match CellAddress::parse(key) {
            Ok(cell) => Some(cell),
            Err(_) => {
                self.leave_out(RemapDiagnostic::InvalidCellKey {
                    section,
                    key: key.to_string(),
                });
                None
            }
        }
    }

    fn leave_out(
        &mut self,
        diagnostic: RemapDiagnostic,
    ) {
        warn!(bracket = %self.bracket, "left out of payload: {diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

/// Numeric fields are written as numbers when they parse; everything else
/// is written as text.
fn scalar_value(
    section: SectionId,
    key: &str,
    raw: &str,
) -> CellValue {
    let numeric = field_spec(section, key).is_some_and(|f| f.kind.is_numeric());
    match numeric.then(|| parse_optional_decimal(raw)).flatten() {
        Some(number) => CellValue::Number(number),
        None => CellValue::text(raw.trim()),
    }
}
