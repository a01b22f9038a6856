use thiserror::Error;
use tracing::{debug, info};

use crate::layout::Layout;
use crate::models::{SectionId, WizardState};
use crate::payload::{SubmissionPayload, serialize};
use crate::schema::FieldErrors;
use crate::wizard::{Action, ActionError, FormState, hydrate, reduce};

/// Receives the wizard's outbound notifications.
pub trait FormObserver {
    /// Called after every accepted action that changed the form.
    fn form_data_changed(
        &mut self,
        state: &FormState,
    );

    /// Called once per successful submission.
    fn submitted(
        &mut self,
        payload: &SubmissionPayload,
    );
}

/// Observer that ignores every notification.
impl FormObserver for () {
    fn form_data_changed(
        &mut self,
        _state: &FormState,
    ) {
    }

    fn submitted(
        &mut self,
        _payload: &SubmissionPayload,
    ) {
    }
}

impl<O: FormObserver + ?Sized> FormObserver for &mut O {
    fn form_data_changed(
        &mut self,
        state: &FormState,
    ) {
        (**self).form_data_changed(state);
    }

    fn submitted(
        &mut self,
        payload: &SubmissionPayload,
    ) {
        (**self).submitted(payload);
    }
}

impl<O: FormObserver> FormObserver for Option<O> {
    fn form_data_changed(
        &mut self,
        state: &FormState,
    ) {
        if let Some(observer) = self {
            observer.form_data_changed(state);
        }
    }

    fn submitted(
        &mut self,
        payload: &SubmissionPayload,
    ) {
        if let Some(observer) = self {
            observer.submitted(payload);
        }
    }
}

/// Notifies both observers, first then second.
impl<A: FormObserver, B: FormObserver> FormObserver for (A, B) {
    fn form_data_changed(
        &mut self,
        state: &FormState,
    ) {
        self.0.form_data_changed(state);
        self.1.form_data_changed(state);
    }

    fn submitted(
        &mut self,
        payload: &SubmissionPayload,
    ) {
        self.0.submitted(payload);
        self.1.submitted(payload);
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("the report can only be submitted from the last step (currently on {current})")]
    NotOnLastStep { current: SectionId },

    #[error("{section} is incomplete: {errors}")]
    Validation {
        section: SectionId,
        errors: FieldErrors,
    },
}

/// Owns a form and its observer. The only way to change the form is
/// [`FormSession::dispatch`].
pub struct FormSession<'a, O> {
    layout: &'a Layout,
    state: FormState,
    observer: O,
}

impl<'a, O: FormObserver> FormSession<'a, O> {
    pub fn new(
        layout: &'a Layout,
        observer: O,
    ) -> Self {
        Self::resume(layout, FormState::new(layout), observer)
    }

    /// Opens a saved report for editing.
    pub fn hydrate(
        layout: &'a Layout,
        initial: WizardState,
        observer: O,
    ) -> Self {
        Self::resume(layout, hydrate(layout, initial), observer)
    }

    /// Continues from a previously captured form state.
    pub fn resume(
        layout: &'a Layout,
        state: FormState,
        observer: O,
    ) -> Self {
        Self {
            layout,
            state,
            observer,
        }
    }

    pub fn layout(&self) -> &'a Layout {
        self.layout
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Applies an action and notifies the observer if the form changed.
    pub fn dispatch(
        &mut self,
        action: Action,
    ) -> Result<(), ActionError> {
        let next = reduce(self.layout, &self.state, action)?;
        if next != self.state {
            self.state = next;
            self.observer.form_data_changed(&self.state);
        }
        Ok(())
    }

    /// Serializes the form and hands the payload to the observer.
    pub fn submit(&mut self) -> Result<SubmissionPayload, SubmitError> {
        let current = self.state.current_section();
        if !self.state.cursor.is_last() {
            return Err(SubmitError::NotOnLastStep { current });
        }

        let errors = self.state.validate(self.layout, current);
        if !errors.is_empty() {
            return Err(SubmitError::Validation {
                section: current,
                errors,
            });
        }

        let payload = serialize(self.layout, &self.state.sections, &self.state.assets);
        if !payload.diagnostics.is_empty() {
            debug!(dropped = payload.diagnostics.len(), "submitting with dropped rows");
        }
        info!(
            bracket = %self.state.bracket(),
            cells = payload.cells.len(),
            "report submitted"
        );
        self.observer.submitted(&payload);
        Ok(payload)
    }
}
