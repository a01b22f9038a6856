use thiserror::Error;

use crate::models::SectionId;
use crate::schema::FieldErrors;

/// Why the wizard refused an action. A refused action never changes state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("{section} is incomplete: {errors}")]
    Validation {
        section: SectionId,
        errors: FieldErrors,
    },

    #[error("'{category}' already holds the maximum of {max} items")]
    CapacityReached { category: String, max: usize },

    #[error("set a loan percentage for '{category}' before moving on")]
    LoanNotSized { category: String },

    #[error("unknown asset category '{0}'")]
    UnknownCategory(String),

    #[error("row {row} is outside the rows reserved for '{category}'")]
    RowOutOfRange { category: String, row: u32 },

    #[error("amounts in '{category}' add up to more than can be stored")]
    AmountTooLarge { category: String },

    #[error("'{category}' has no item at row {row}")]
    NoItemAtRow { category: String, row: u32 },

    #[error("{section} has no field '{field}'")]
    UnknownField { section: SectionId, field: String },

    #[error("{0} is not edited field by field")]
    NotEditable(SectionId),

    #[error("step {target} has not been reached yet")]
    StepNotReachable { target: usize },

    #[error("already at the first step")]
    AlreadyAtFirstStep,

    #[error("already at the last step")]
    AlreadyAtLastStep,
}
