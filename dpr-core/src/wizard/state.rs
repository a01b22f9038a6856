use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::Layout;
use crate::models::{AssetField, CellAddress, SectionId, TenureBracket, WizardState};
use crate::schema::{FieldErrors, TENURE_FIELD, field_spec, validate_section};
use crate::wizard::expenses::sync_catalog;
use crate::wizard::{ActionError, AssetSchedule, WizardCursor};

/// Everything the wizard knows, as one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub sections: WizardState,
    pub assets: AssetSchedule,
    pub cursor: WizardCursor,
    /// Bracket the indirect-expense cells are currently laid out for.
    pub expense_bracket: Option<TenureBracket>,
}

impl FormState {
    /// A fresh wizard on its first step, expense labels seeded for the
    /// default bracket.
    pub fn new(layout: &Layout) -> Self {
        let mut state = Self {
            sections: WizardState::new(),
            assets: AssetSchedule::new(layout),
            cursor: WizardCursor::default(),
            expense_bracket: None,
        };
        state.sync_expenses(layout);
        state
    }

    pub fn bracket(&self) -> TenureBracket {
        self.sections.bracket()
    }

    pub fn current_section(&self) -> SectionId {
        self.cursor.section()
    }

    /// Errors blocking the transition out of `section`.
    pub fn validate(
        &self,
        layout: &Layout,
        section: SectionId,
    ) -> FieldErrors {
        match section {
            SectionId::Assets => self.assets.check_complete(layout),
            _ => validate_section(section, &self.sections),
        }
    }

    /// Lays the expense cells out for the current bracket if it changed.
    pub(crate) fn sync_expenses(
        &mut self,
        layout: &Layout,
    ) {
        let bracket = self.bracket();
        if sync_catalog(layout, &mut self.sections, self.expense_bracket, bracket) {
            self.expense_bracket = Some(bracket);
        }
    }
}

/// A user interaction with the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetField {
        section: SectionId,
        field: String,
        value: String,
    },
    Next,
    Previous,
    JumpTo(usize),
    SelectCategory(String),
    AddItem(String),
    RemoveItem {
        category: String,
        row: u32,
    },
    UpdateItem {
        category: String,
        row: u32,
        field: AssetField,
        value: String,
    },
    SetLoanPercentage {
        category: String,
        value: String,
    },
    SetLoanAmount {
        category: String,
        value: String,
    },
}

/// Applies `action` to `state`, returning the next state.
///
/// A rejected action returns the reason and leaves `state` as it was.
///
/// # Example
///
/// ```
/// use dpr_core::layout::Layout;
/// use dpr_core::models::{SectionId, TenureBracket};
/// use dpr_core::wizard::{Action, FormState, reduce};
///
/// let layout = Layout::standard();
/// let state = FormState::new(layout);
///
/// let next = reduce(
///     layout,
///     &state,
///     Action::SetField {
///         section: SectionId::MeansOfFinance,
///         field: "i47".to_string(),
///         value: "9".to_string(),
///     },
/// )
/// .unwrap();
///
/// assert_eq!(next.bracket(), TenureBracket::Extended);
/// ```
pub fn reduce(
    layout: &Layout,
    state: &FormState,
    action: Action,
) -> Result<FormState, ActionError> {
    let mut next = state.clone();
    let bracket = state.bracket();

    match action {
        Action::SetField {
            section,
            field,
            value,
        } => set_field(layout, &mut next, section, field, value)?,
        Action::Next => {
            let section = state.current_section();
            let errors = state.validate(layout, section);
            if !errors.is_empty() {
                return Err(ActionError::Validation { section, errors });
            }
            next.cursor.advance()?;
        }
        Action::Previous => next.cursor.retreat()?,
        Action::JumpTo(step) => next.cursor.jump_to(step)?,
        Action::SelectCategory(category) => next.assets.select_category(layout, &category)?,
        Action::AddItem(category) => {
            next.assets.add_item(layout, bracket, &category)?;
        }
        Action::RemoveItem { category, row } => next.assets.remove_item(layout, &category, row)?,
        Action::UpdateItem {
            category,
            row,
            field,
            value,
        } => next
            .assets
            .update_item(layout, &category, row, field, &value)?,
        Action::SetLoanPercentage { category, value } => next
            .assets
            .set_loan_percentage(layout, &category, &value)?,
        Action::SetLoanAmount { category, value } => next
            .assets
            .set_loan_amount(layout, &category, &value)?,
    }

    Ok(next)
}

fn set_field(
    layout: &Layout,
    state: &mut FormState,
    section: SectionId,
    field: String,
    value: String,
) -> Result<(), ActionError> {
    let field = match section {
        SectionId::Assets => return Err(ActionError::NotEditable(section)),
        // Stored under the canonical cell name so catalog swaps find it.
        SectionId::IndirectExpenses => {
            let catalog = layout.indirect_expense_catalog(state.bracket());
            match CellAddress::parse(&field) {
                Ok(cell) if catalog.contains_cell(&cell) => cell.to_string(),
                _ => return Err(ActionError::UnknownField { section, field }),
            }
        }
        _ => {
            if field_spec(section, &field).is_none() {
                return Err(ActionError::UnknownField { section, field });
            }
            field
        }
    };

    let is_tenure = section == SectionId::MeansOfFinance && field == TENURE_FIELD;
    state.sections.set(section, field, value);

    if is_tenure {
        let previous = state.expense_bracket;
        state.sync_expenses(layout);
        if state.expense_bracket != previous {
            debug!(bracket = %state.bracket(), "tenure bracket changed");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::layout::RowRange;
    use crate::models::CellValue;
    use crate::payload::serialize;

    const PLANT: &str = "Plant and Machinery";

    fn apply(
        state: &FormState,
        action: Action,
    ) -> FormState {
        reduce(Layout::standard(), state, action).unwrap()
    }

    fn set(
        section: SectionId,
        field: &str,
        value: &str,
    ) -> Action {
        Action::SetField {
            section,
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    fn general_information() -> Vec<Action> {
        [
            ("c5", "Shree Engineering Works"),
            ("c6", "Plot 14, MIDC Bhosari, Pune"),
            ("c7", "Proprietorship"),
            ("c8", "Anil Patil"),
            ("c9", "9876543210"),
            ("c11", "ABCDE1234F"),
            ("c12", "Precision machining"),
        ]
        .into_iter()
        .map(|(f, v)| set(SectionId::GeneralInformation, f, v))
        .collect()
    }

    fn means_of_finance(tenure: &str) -> Vec<Action> {
        [
            ("i45", "2500000"),
            ("i46", "1800000"),
            (TENURE_FIELD, tenure),
            ("i49", "9.5"),
            ("i51", "1.5"),
        ]
        .into_iter()
        .map(|(f, v)| set(SectionId::MeansOfFinance, f, v))
        .collect()
    }

    fn apply_all(
        state: FormState,
        actions: Vec<Action>,
    ) -> FormState {
        actions.into_iter().fold(state, |s, a| apply(&s, a))
    }

    fn at_assets_step(tenure: &str) -> FormState {
        let state = FormState::new(Layout::standard());
        let state = apply_all(state, general_information());
        let state = apply(&state, Action::Next);
        let state = apply_all(state, means_of_finance(tenure));
        apply(&state, Action::Next)
    }

    // =========================================================================
    // navigation
    // =========================================================================

    #[test]
    fn next_is_refused_with_field_errors() {
        let layout = Layout::standard();
        let state = FormState::new(layout);

        let err = reduce(layout, &state, Action::Next).unwrap_err();

        let ActionError::Validation { section, errors } = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(section, SectionId::GeneralInformation);
        assert!(errors.get("c5").is_some());
        assert!(errors.get("c11").is_some());
    }

    #[test]
    fn repeated_next_gives_same_result() {
        let layout = Layout::standard();
        let state = apply_all(
            FormState::new(layout),
            vec![set(SectionId::GeneralInformation, "c9", "12345")],
        );

        let first = reduce(layout, &state, Action::Next);
        let second = reduce(layout, &state, Action::Next);

        assert!(first.is_err());
        assert_eq!(first, second);

        let state = apply_all(state, general_information());
        let first = reduce(layout, &state, Action::Next).unwrap();
        let second = reduce(layout, &state, Action::Next).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.current_section(), SectionId::MeansOfFinance);
    }

    #[test]
    fn previous_is_unguarded() {
        let state = at_assets_step("5");

        let back = apply(&state, Action::Previous);

        assert_eq!(back.current_section(), SectionId::MeansOfFinance);
    }

    #[test]
    fn jump_back_to_visited_step() {
        let layout = Layout::standard();
        let state = at_assets_step("5");

        let jumped = apply(&state, Action::JumpTo(0));
        assert_eq!(jumped.current_section(), SectionId::GeneralInformation);

        assert_eq!(
            reduce(layout, &jumped, Action::JumpTo(2)),
            Err(ActionError::StepNotReachable { target: 2 })
        );
    }

    // =========================================================================
    // fields
    // =========================================================================

    #[test]
    fn unknown_fields_are_rejected() {
        let layout = Layout::standard();
        let state = FormState::new(layout);

        assert_eq!(
            reduce(layout, &state, set(SectionId::GeneralInformation, "z99", "x")),
            Err(ActionError::UnknownField {
                section: SectionId::GeneralInformation,
                field: "z99".to_string(),
            })
        );
        assert_eq!(
            reduce(layout, &state, set(SectionId::Assets, "c136", "Lathe")),
            Err(ActionError::NotEditable(SectionId::Assets))
        );
        assert!(reduce(layout, &state, set(SectionId::IndirectExpenses, "e275", "1")).is_err());
    }

    #[test]
    fn expense_cells_follow_current_catalog() {
        let state = FormState::new(Layout::standard());
        let state = apply(&state, set(SectionId::IndirectExpenses, "e263", "12000"));

        let state = apply(&state, set(SectionId::MeansOfFinance, TENURE_FIELD, "10"));

        assert_eq!(state.expense_bracket, Some(TenureBracket::Extended));
        assert_eq!(state.sections.value(SectionId::IndirectExpenses, "e275"), Some("12000"));
        assert_eq!(state.sections.value(SectionId::IndirectExpenses, "e263"), None);
        let state = apply(&state, set(SectionId::IndirectExpenses, "e275", "15000"));
        assert_eq!(state.sections.value(SectionId::IndirectExpenses, "e275"), Some("15000"));
    }

    #[test]
    fn expense_cells_are_stored_under_canonical_names() {
        let layout = Layout::standard();
        let state = FormState::new(layout);
        let state = apply(&state, set(SectionId::IndirectExpenses, "E263", "5000"));
        assert_eq!(state.sections.value(SectionId::IndirectExpenses, "e263"), Some("5000"));
        assert_eq!(state.sections.value(SectionId::IndirectExpenses, "E263"), None);

        let state = apply(&state, set(SectionId::MeansOfFinance, TENURE_FIELD, "9"));

        assert_eq!(state.sections.value(SectionId::IndirectExpenses, "e275"), Some("5000"));
        let payload = serialize(layout, &state.sections, &state.assets);
        assert_eq!(payload.cells.get("e275"), Some(&CellValue::from(dec!(5000))));
        assert_eq!(payload.cells.get("e263"), None);
    }

    #[test]
    fn retyping_same_bracket_keeps_expenses() {
        let state = FormState::new(Layout::standard());
        let state = apply(&state, set(SectionId::MeansOfFinance, TENURE_FIELD, "8"));
        let state = apply(&state, set(SectionId::IndirectExpenses, "e275", "12000"));

        let again = apply(&state, set(SectionId::MeansOfFinance, TENURE_FIELD, "12"));

        assert_eq!(
            again.sections.section(SectionId::IndirectExpenses),
            state.sections.section(SectionId::IndirectExpenses)
        );
    }

    // =========================================================================
    // tenure changes mid-form
    // =========================================================================

    #[test]
    fn tenure_five_exposes_default_rows() {
        let layout = Layout::standard();
        let state = apply(
            &FormState::new(layout),
            set(SectionId::MeansOfFinance, TENURE_FIELD, "5"),
        );

        assert_eq!(state.bracket(), TenureBracket::Default);
        let section = layout.asset_section(state.bracket(), PLANT).unwrap();
        assert_eq!(section.rows, RowRange::new(136, 145));
    }

    #[test]
    fn tenure_nine_exposes_extended_rows() {
        let layout = Layout::standard();
        let state = apply(
            &FormState::new(layout),
            set(SectionId::MeansOfFinance, TENURE_FIELD, "9"),
        );

        let section = layout.asset_section(state.bracket(), PLANT).unwrap();
        assert_eq!(section.rows, RowRange::new(148, 157));
    }

    #[test]
    fn add_item_uses_bracket_at_entry_time() {
        let state = at_assets_step("5");
        let state = apply(&state, Action::AddItem(PLANT.to_string()));
        assert!(state.assets.item(PLANT, 136).is_some());

        let state = apply(&state, set(SectionId::MeansOfFinance, TENURE_FIELD, "9"));
        let state = apply(&state, Action::AddItem(PLANT.to_string()));

        assert!(state.assets.item(PLANT, 149).is_some());
        assert_eq!(state.assets.item_count(PLANT), 2);
    }

    #[test]
    fn capacity_rejection_leaves_state_unchanged() {
        let layout = Layout::standard();
        let mut state = at_assets_step("5");
        for _ in 0..10 {
            state = apply(&state, Action::AddItem(PLANT.to_string()));
        }

        let result = reduce(layout, &state, Action::AddItem(PLANT.to_string()));

        assert_eq!(
            result,
            Err(ActionError::CapacityReached {
                category: PLANT.to_string(),
                max: 10,
            })
        );
        assert_eq!(state.assets.item_count(PLANT), 10);
    }

    #[test]
    fn blank_zero_item_does_not_block_tab_switch() {
        let state = at_assets_step("5");
        let state = apply(&state, Action::SelectCategory(PLANT.to_string()));
        let state = apply(&state, Action::AddItem(PLANT.to_string()));
        let state = apply(
            &state,
            Action::UpdateItem {
                category: PLANT.to_string(),
                row: 136,
                field: AssetField::Amount,
                value: "0".to_string(),
            },
        );

        assert_eq!(state.assets.categories_with_items().count(), 0);
        let state = apply(&state, Action::SelectCategory("Vehicles".to_string()));
        assert_eq!(state.assets.active_category(), Some("Vehicles"));
    }

    #[test]
    fn loan_percentage_sizes_category() {
        let state = at_assets_step("5");
        let state = apply(&state, Action::SelectCategory(PLANT.to_string()));
        let state = apply(&state, Action::AddItem(PLANT.to_string()));
        let state = apply(
            &state,
            Action::UpdateItem {
                category: PLANT.to_string(),
                row: 136,
                field: AssetField::Amount,
                value: "1000000".to_string(),
            },
        );

        let state = apply(
            &state,
            Action::SetLoanPercentage {
                category: PLANT.to_string(),
                value: "25".to_string(),
            },
        );

        let loan = state.assets.loan(PLANT).unwrap();
        assert_eq!(loan.amount.unwrap().to_string(), "250000.00");
        assert_eq!(loan.percentage, Some(dec!(25)));
    }

    #[test]
    fn assets_step_requires_every_category() {
        let layout = Layout::standard();
        let state = at_assets_step("5");

        let err = reduce(layout, &state, Action::Next).unwrap_err();
        assert!(matches!(
            err,
            ActionError::Validation {
                section: SectionId::Assets,
                ..
            }
        ));

        let state = layout
            .asset_categories()
            .fold(state, |s, c| apply(&s, Action::SelectCategory(c.to_string())));
        let state = apply(&state, Action::Next);

        assert_eq!(state.current_section(), SectionId::WorkingCapital);
    }
}
