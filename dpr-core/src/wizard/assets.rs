//! Fixed-asset schedule editor.
//!
//! Items are stored against the sheet row they were entered on. Rows never
//! shift: removing an item leaves a gap that the next `add_item` fills. An
//! item entered under one bracket keeps its row when the tenure changes; the
//! serializer translates it at submit time.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::LoanSizing;
use crate::layout::{AssetSection, Layout};
use crate::models::{AssetField, AssetItem, TenureBracket};
use crate::schema::FieldErrors;
use crate::utils::parse_optional_decimal;
use crate::wizard::ActionError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSchedule {
    items: BTreeMap<String, BTreeMap<u32, AssetItem>>,
    loans: BTreeMap<String, LoanSizing>,
    active_category: Option<String>,
    visited: BTreeSet<String>,
    with_items: BTreeSet<String>,
}

impl AssetSchedule {
    /// An empty schedule with the first category tab open.
    pub fn new(layout: &Layout) -> Self {
        let mut schedule = Self::default();
        if let Some(first) = layout.asset_categories().next() {
            schedule.active_category = Some(first.to_string());
            schedule.visited.insert(first.to_string());
        }
        schedule
    }

    pub fn items(
        &self,
        category: &str,
    ) -> impl Iterator<Item = (u32, &AssetItem)> {
        self.items
            .get(category)
            .into_iter()
            .flat_map(|rows| rows.iter().map(|(row, item)| (*row, item)))
    }

    /// Categories that have at least one stored item, populated or not.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn item(
        &self,
        category: &str,
        row: u32,
    ) -> Option<&AssetItem> {
        self.items.get(category)?.get(&row)
    }

    pub fn item_count(
        &self,
        category: &str,
    ) -> usize {
        self.items.get(category).map_or(0, BTreeMap::len)
    }

    /// Sum of item amounts in a category. Saturates at [`Decimal::MAX`].
    pub fn total(
        &self,
        category: &str,
    ) -> Decimal {
        self.checked_total(category).unwrap_or(Decimal::MAX)
    }

    pub fn loan(
        &self,
        category: &str,
    ) -> Option<&LoanSizing> {
        self.loans.get(category)
    }

    /// Percentages of every category that has one.
    pub fn loan_percentages(&self) -> BTreeMap<String, Decimal> {
        self.loans
            .iter()
            .filter_map(|(category, loan)| Some((category.clone(), loan.percentage?)))
            .collect()
    }

    pub fn active_category(&self) -> Option<&str> {
        self.active_category.as_deref()
    }

    pub fn has_visited(
        &self,
        category: &str,
    ) -> bool {
        self.visited.contains(category)
    }

    /// Categories holding at least one populated item.
    pub fn categories_with_items(&self) -> impl Iterator<Item = &str> {
        self.with_items.iter().map(String::as_str)
    }

    /// Places an empty item on the first vacant row of the category's range
    /// for `bracket` and returns that row.
    ///
    /// A row is vacant when no item is stored on it, nor on the row at the
    /// same offset in the other bracket's range.
    pub fn add_item(
        &mut self,
        layout: &Layout,
        bracket: TenureBracket,
        category: &str,
    ) -> Result<u32, ActionError> {
        let section = section(layout, bracket, category)?;
        let other = layout.asset_section(bracket.other(), category);

        let occupied: BTreeSet<u32> = self
            .items(category)
            .filter_map(|(row, _)| {
                section
                    .rows
                    .offset_of(row)
                    .or_else(|| other.and_then(|o| o.rows.offset_of(row)))
            })
            .collect();

        let row = section
            .rows
            .rows()
            .find(|row| !occupied.contains(&(row - section.rows.start)))
            .ok_or_else(|| ActionError::CapacityReached {
                category: category.to_string(),
                max: section.capacity(),
            })?;

        self.items
            .entry(category.to_string())
            .or_default()
            .insert(row, AssetItem::default());
        self.refresh(category);
        Ok(row)
    }

    /// Clears the item on `row`. Other rows keep their positions.
    pub fn remove_item(
        &mut self,
        layout: &Layout,
        category: &str,
        row: u32,
    ) -> Result<(), ActionError> {
        check_row(layout, category, row)?;

        if let Some(rows) = self.items.get_mut(category) {
            rows.remove(&row);
            if rows.is_empty() {
                self.items.remove(category);
            }
        }
        self.refresh(category);
        Ok(())
    }

    /// Edits one column of an existing item. Amounts that do not parse are
    /// stored blank; an amount that would overflow the category total is
    /// refused.
    pub fn update_item(
        &mut self,
        layout: &Layout,
        category: &str,
        row: u32,
        field: AssetField,
        value: &str,
    ) -> Result<(), ActionError> {
        check_row(layout, category, row)?;

        let item = self
            .items
            .get_mut(category)
            .and_then(|rows| rows.get_mut(&row))
            .ok_or_else(|| ActionError::NoItemAtRow {
                category: category.to_string(),
                row,
            })?;

        let previous = item.amount;
        match field {
            AssetField::Description => item.description = value.to_string(),
            AssetField::Amount => item.amount = parse_optional_decimal(value),
        }

        if self.checked_total(category).is_none() {
            if let Some(item) = self.items.get_mut(category).and_then(|rows| rows.get_mut(&row)) {
                item.amount = previous;
            }
            return Err(ActionError::AmountTooLarge {
                category: category.to_string(),
            });
        }
        self.refresh(category);
        Ok(())
    }

    /// Opens another category tab.
    ///
    /// Leaving a category that holds items is refused until its loan is sized.
    pub fn select_category(
        &mut self,
        layout: &Layout,
        category: &str,
    ) -> Result<(), ActionError> {
        section(layout, TenureBracket::Default, category)?;
        if self.active_category.as_deref() == Some(category) {
            return Ok(());
        }

        if let Some(active) = &self.active_category
            && self.with_items.contains(active)
            && !self.loans.get(active).is_some_and(LoanSizing::is_sized)
        {
            return Err(ActionError::LoanNotSized {
                category: active.clone(),
            });
        }

        self.active_category = Some(category.to_string());
        self.visited.insert(category.to_string());
        Ok(())
    }

    pub fn set_loan_percentage(
        &mut self,
        layout: &Layout,
        category: &str,
        raw: &str,
    ) -> Result<(), ActionError> {
        section(layout, TenureBracket::Default, category)?;
        let total = self.total(category);
        self.update_loan(category, |loan| loan.set_percentage(raw, total));
        Ok(())
    }

    pub fn set_loan_amount(
        &mut self,
        layout: &Layout,
        category: &str,
        raw: &str,
    ) -> Result<(), ActionError> {
        section(layout, TenureBracket::Default, category)?;
        let total = self.total(category);
        self.update_loan(category, |loan| loan.set_amount(raw, total));
        Ok(())
    }

    /// Guard for leaving the assets step: every category must have been
    /// opened, and every category with items must have a loan percentage.
    pub fn check_complete(
        &self,
        layout: &Layout,
    ) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for category in layout.asset_categories() {
            if !self.visited.contains(category) {
                errors.insert(category, format!("Review the {category} category"));
            } else if self.with_items.contains(category)
                && !self.loans.get(category).is_some_and(LoanSizing::is_sized)
            {
                errors.insert(category, format!("Set a loan percentage for {category}"));
            }
        }
        errors
    }

    /// Stores an item read back from a saved payload.
    pub(crate) fn restore_item(
        &mut self,
        category: &str,
        row: u32,
        item: AssetItem,
    ) {
        self.items
            .entry(category.to_string())
            .or_default()
            .insert(row, item);
        self.refresh(category);
    }

    pub(crate) fn mark_visited(
        &mut self,
        category: &str,
    ) {
        self.visited.insert(category.to_string());
    }

    fn checked_total(
        &self,
        category: &str,
    ) -> Option<Decimal> {
        self.items(category)
            .try_fold(Decimal::ZERO, |sum, (_, item)| sum.checked_add(item.value()))
    }

    fn update_loan(
        &mut self,
        category: &str,
        edit: impl FnOnce(&mut LoanSizing),
    ) {
        let loan = self.loans.entry(category.to_string()).or_default();
        edit(loan);
        if *loan == LoanSizing::default() {
            self.loans.remove(category);
        }
    }

    fn refresh(
        &mut self,
        category: &str,
    ) {
        let populated = self.items(category).any(|(_, item)| item.is_populated());
        if populated {
            self.with_items.insert(category.to_string());
        } else if self.with_items.remove(category) {
            debug!(category, "category no longer holds items");
        }

        let total = self.total(category);
        if let Some(loan) = self.loans.get_mut(category) {
            loan.recompute(total);
        }
    }
}

fn section<'a>(
    layout: &'a Layout,
    bracket: TenureBracket,
    category: &str,
) -> Result<&'a AssetSection, ActionError> {
    layout
        .asset_section(bracket, category)
        .ok_or_else(|| ActionError::UnknownCategory(category.to_string()))
}

/// A row is addressable if it lies in the category's range for either bracket.
fn check_row(
    layout: &Layout,
    category: &str,
    row: u32,
) -> Result<(), ActionError> {
    let default = section(layout, TenureBracket::Default, category)?;
    let extended = section(layout, TenureBracket::Extended, category)?;
    if default.rows.contains(row) || extended.rows.contains(row) {
        Ok(())
    } else {
        Err(ActionError::RowOutOfRange {
            category: category.to_string(),
            row,
        })
    }
}
