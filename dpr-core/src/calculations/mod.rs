//! Derived-value calculations for the report wizard.
//!
//! This module provides the rounding helpers shared by all money values and
//! the reconciler that keeps a category's loan percentage and loan amount in
//! step with each other and with the category's asset total.

pub mod common;
pub mod loan;

pub use loan::LoanSizing;
