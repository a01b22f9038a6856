pub mod calculations;
pub mod layout;
pub mod models;
pub mod payload;
pub mod schema;
pub mod utils;
pub mod wizard;

pub use layout::{Layout, LayoutError};
pub use models::*;
pub use payload::{CellMapping, RemapDiagnostic, SubmissionPayload};
pub use wizard::{Action, ActionError, FormObserver, FormSession, FormState, SubmitError};
