use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::SectionId;
use crate::wizard::ActionError;

/// Position of the user in the linear wizard.
///
/// Moving forward is guarded by the caller (section validation); moving back
/// is always allowed. Direct jumps may only land on a step already visited
/// and never ahead of the current one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardCursor {
    current: usize,
    visited: BTreeSet<usize>,
}

impl Default for WizardCursor {
    fn default() -> Self {
        Self {
            current: 0,
            visited: BTreeSet::from([0]),
        }
    }
}

impl WizardCursor {
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn section(&self) -> SectionId {
        SectionId::from_step(self.current).unwrap_or(SectionId::GeneralInformation)
    }

    pub fn last_step() -> usize {
        SectionId::ALL.len() - 1
    }

    pub fn is_last(&self) -> bool {
        self.current == Self::last_step()
    }

    pub fn has_visited(
        &self,
        step: usize,
    ) -> bool {
        self.visited.contains(&step)
    }

    pub(crate) fn advance(&mut self) -> Result<(), ActionError> {
        if self.is_last() {
            return Err(ActionError::AlreadyAtLastStep);
        }
        self.current += 1;
        self.visited.insert(self.current);
        Ok(())
    }

    pub(crate) fn retreat(&mut self) -> Result<(), ActionError> {
        if self.current == 0 {
            return Err(ActionError::AlreadyAtFirstStep);
        }
        self.current -= 1;
        Ok(())
    }

    pub(crate) fn jump_to(
        &mut self,
        target: usize,
    ) -> Result<(), ActionError> {
        if target > self.current || !self.visited.contains(&target) {
            return Err(ActionError::StepNotReachable { target });
        }
        self.current = target;
        Ok(())
    }
}
