//! Flat cell-mapping payload handed to the report generator.

mod diagnostics;
mod mapping;
mod serializer;

pub use diagnostics::RemapDiagnostic;
pub use mapping::{CellMapping, SubmissionPayload};
pub use serializer::serialize;
