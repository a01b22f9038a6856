//! Indirect-expense catalog swap.
//!
//! The expense section is edited directly in sheet cells of the current
//! catalog, so the cells are rebuilt whenever the bracket changes.

use tracing::debug;

use crate::layout::Layout;
use crate::models::{SectionData, SectionId, TenureBracket, WizardState};
use crate::utils::is_blank;

/// Rebuilds the indirect-expense cells for `next`.
///
/// Description cells are seeded with their labels. Amounts follow their label
/// from the `previous` catalog; labels missing from the new catalog lose their
/// amount. With no previous catalog, values already sitting on the new
/// catalog's cells are kept. Returns `false` when the bracket did not change.
pub(crate) fn sync_catalog(
    layout: &Layout,
    sections: &mut WizardState,
    previous: Option<TenureBracket>,
    next: TenureBracket,
) -> bool {
    if previous == Some(next) {
        return false;
    }

    let catalog = layout.indirect_expense_catalog(next);
    let old_catalog = previous.map(|b| layout.indirect_expense_catalog(b));
    let data: SectionData = sections
        .section(SectionId::IndirectExpenses)
        .cloned()
        .unwrap_or_default();

    let mut rebuilt = data.clone();
    if let Some(old) = old_catalog {
        for item in old.items() {
            rebuilt.remove(&item.d.to_string());
            rebuilt.remove(&item.e.to_string());
        }
    }

    let mut carried = 0usize;
    for item in catalog.items() {
        let source = old_catalog
            .map(|old| old.item_by_label(&item.label))
            .unwrap_or(Some(item));

        let description = source
            .and_then(|s| data.get(&s.d.to_string()))
            .filter(|d| !is_blank(d))
            .cloned()
            .unwrap_or_else(|| item.label.clone());
        rebuilt.insert(item.d.to_string(), description);

        if let Some(amount) = source.and_then(|s| data.get(&s.e.to_string())) {
            rebuilt.insert(item.e.to_string(), amount.clone());
            carried += 1;
        }
    }

    if let Some(old) = old_catalog {
        for item in old.items() {
            let amount = data.get(&item.e.to_string());
            if amount.is_some_and(|a| !is_blank(a)) && catalog.item_by_label(&item.label).is_none() {
                debug!(label = %item.label, bracket = %next, "expense not carried into catalog");
            }
        }
    }

    debug!(from = ?previous, to = %next, carried, "indirect expense catalog rebuilt");
    *sections.section_mut(SectionId::IndirectExpenses) = rebuilt;
    true
}
