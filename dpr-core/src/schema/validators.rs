//! Per-section validation used to gate wizard navigation.
//!
//! General Information and Means of Finance get field-level structured checks.
//! Every other scalar section only requires its declared-required fields to be
//! non-empty. The asset schedule has its own guard in the wizard.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{SectionId, WizardState};
use crate::schema::{
    CC_INTEREST_FIELD, COMMENCEMENT_FIELD, CONSTITUTION_FIELD, CONSTITUTIONS, DSCR_FIELD,
    EMAIL_FIELD, INTEREST_RATE_FIELD, MOBILE_FIELD, MORATORIUM_FIELD, PAN_FIELD,
    PROJECT_COST_FIELD, TENURE_FIELD, TERM_LOAN_FIELD, fields_for,
};
use crate::utils::{is_blank, parse_optional_decimal};

static MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("mobile pattern is valid"));
static PAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("PAN pattern is valid"));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

const MAX_TENURE_YEARS: i64 = 15;
const MIN_DSCR: Decimal = Decimal::ONE;
const MAX_DSCR: Decimal = Decimal::from_parts(5, 0, 0, false, 0);
const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Field id -> user-facing message. Empty means the section is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(
        &self,
        field: &str,
    ) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Validates one scalar section of the wizard state.
///
/// The asset schedule is not a scalar section and always yields no errors here.
pub fn validate_section(
    section: SectionId,
    state: &WizardState,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_required(section, state, &mut errors);

    match section {
        SectionId::GeneralInformation => check_general_information(state, &mut errors),
        SectionId::MeansOfFinance => check_means_of_finance(state, &mut errors),
        _ => {}
    }

    errors
}

fn check_required(
    section: SectionId,
    state: &WizardState,
    errors: &mut FieldErrors,
) {
    for spec in fields_for(section).iter().filter(|f| f.required) {
        if state.value(section, spec.id).is_none_or(is_blank) {
            errors.insert(spec.id, format!("{} is required", spec.label));
        }
    }
}

/// Non-blank trimmed value of a field, if present.
fn present<'a>(
    state: &'a WizardState,
    section: SectionId,
    field: &str,
) -> Option<&'a str> {
    state
        .value(section, field)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn check_general_information(
    state: &WizardState,
    errors: &mut FieldErrors,
) {
    let section = SectionId::GeneralInformation;

    if let Some(value) = present(state, section, CONSTITUTION_FIELD) {
        if !CONSTITUTIONS.contains(&value) {
            errors.insert(CONSTITUTION_FIELD, "Select a valid constitution");
        }
    }

    if let Some(value) = present(state, section, MOBILE_FIELD) {
        if !MOBILE_RE.is_match(value) {
            errors.insert(MOBILE_FIELD, "Mobile number must be exactly 10 digits");
        }
    }

    if let Some(value) = present(state, section, EMAIL_FIELD) {
        if !EMAIL_RE.is_match(value) {
            errors.insert(EMAIL_FIELD, "Enter a valid email address");
        }
    }

    if let Some(value) = present(state, section, PAN_FIELD) {
        if !PAN_RE.is_match(&value.to_ascii_uppercase()) {
            errors.insert(PAN_FIELD, "PAN must look like ABCDE1234F");
        }
    }

    if let Some(value) = present(state, section, COMMENCEMENT_FIELD) {
        if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
            errors.insert(COMMENCEMENT_FIELD, "Enter the date as YYYY-MM-DD");
        }
    }
}

fn check_means_of_finance(
    state: &WizardState,
    errors: &mut FieldErrors,
) {
    let section = SectionId::MeansOfFinance;
    let number = |field: &str| present(state, section, field).map(parse_optional_decimal);

    let project_cost = match number(PROJECT_COST_FIELD) {
        Some(Some(cost)) if cost > Decimal::ZERO => Some(cost),
        Some(_) => {
            errors.insert(PROJECT_COST_FIELD, "Project cost must be a positive amount");
            None
        }
        None => None,
    };

    match number(TERM_LOAN_FIELD) {
        Some(Some(loan)) if loan > Decimal::ZERO => {
            if project_cost.is_some_and(|cost| loan > cost) {
                errors.insert(TERM_LOAN_FIELD, "Term loan cannot exceed the project cost");
            }
        }
        Some(_) => errors.insert(TERM_LOAN_FIELD, "Term loan must be a positive amount"),
        None => {}
    }

    let tenure_years = match number(TENURE_FIELD) {
        Some(Some(years)) if is_whole(years) && (1..=MAX_TENURE_YEARS).contains(&to_i64(years)) => {
            Some(years)
        }
        Some(_) => {
            errors.insert(
                TENURE_FIELD,
                format!("Tenure must be a whole number of years between 1 and {MAX_TENURE_YEARS}"),
            );
            None
        }
        None => None,
    };

    match number(MORATORIUM_FIELD) {
        Some(Some(months)) if is_whole(months) && months >= Decimal::ZERO => {
            if tenure_years.is_some_and(|years| months > years * Decimal::from(12)) {
                errors.insert(MORATORIUM_FIELD, "Moratorium cannot exceed the loan tenure");
            }
        }
        Some(_) => errors.insert(MORATORIUM_FIELD, "Moratorium must be a whole number of months"),
        None => {}
    }

    for field in [INTEREST_RATE_FIELD, CC_INTEREST_FIELD] {
        match number(field) {
            Some(Some(rate)) if rate > Decimal::ZERO && rate <= HUNDRED => {}
            Some(_) => errors.insert(field, "Interest rate must be between 0 and 100"),
            None => {}
        }
    }

    match number(DSCR_FIELD) {
        Some(Some(dscr)) if (MIN_DSCR..=MAX_DSCR).contains(&dscr) => {}
        Some(_) => errors.insert(
            DSCR_FIELD,
            format!("DSCR must be between {MIN_DSCR} and {MAX_DSCR}"),
        ),
        None => {}
    }

    for field in ["i50", "i52"] {
        if let Some(parsed) = number(field) {
            if !parsed.is_some_and(|v| v >= Decimal::ZERO) {
                errors.insert(field, "Amount cannot be negative");
            }
        }
    }
}

fn is_whole(value: Decimal) -> bool {
    value.fract().is_zero()
}

fn to_i64(value: Decimal) -> i64 {
    value.trunc().try_into().unwrap_or(i64::MAX)
}
