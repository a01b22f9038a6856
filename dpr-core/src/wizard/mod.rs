//! The form wizard: a linear walk through the report sections.
//!
//! All edits go through [`reduce`], which maps a [`FormState`] and an
//! [`Action`] to the next state or rejects the action. [`FormSession`] wraps
//! the reducer for callers that want change and submit notifications.

mod assets;
mod cursor;
mod error;
mod expenses;
mod hydrate;
mod session;
mod state;

pub use assets::AssetSchedule;
pub use cursor::WizardCursor;
pub use error::ActionError;
pub use hydrate::{hydrate, sections_from_payload};
pub use session::{FormObserver, FormSession, SubmitError};
pub use state::{Action, FormState, reduce};
