//! Field schema registry.
//!
//! Every scalar wizard section declares its fields here. A field id doubles as
//! the spreadsheet cell the value is written to, so the registry is also the
//! source of truth for how a raw value is typed in the payload.

mod validators;

use crate::models::SectionId;

pub use validators::{FieldErrors, validate_section};

/// Loan tenure in years; drives the layout bracket.
pub const TENURE_FIELD: &str = "i47";
pub const PROJECT_COST_FIELD: &str = "i45";
pub const TERM_LOAN_FIELD: &str = "i46";
pub const MORATORIUM_FIELD: &str = "i48";
pub const INTEREST_RATE_FIELD: &str = "i49";
pub const DSCR_FIELD: &str = "i51";
pub const CC_INTEREST_FIELD: &str = "i53";

pub const MOBILE_FIELD: &str = "c9";
pub const EMAIL_FIELD: &str = "c10";
pub const PAN_FIELD: &str = "c11";
pub const CONSTITUTION_FIELD: &str = "c7";
pub const COMMENCEMENT_FIELD: &str = "c13";

pub const CONSTITUTIONS: &[&str] = &["Proprietorship", "Partnership", "LLP", "Private Limited"];

/// How a field's raw input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
    Percent,
    /// ISO `YYYY-MM-DD`.
    Date,
    Choice(&'static [&'static str]),
}

impl FieldKind {
    /// Numeric kinds are written to the sheet as numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Decimal | Self::Percent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn field(
    id: &'static str,
    label: &'static str,
    kind: FieldKind,
    required: bool,
) -> FieldSpec {
    FieldSpec {
        id,
        label,
        kind,
        required,
    }
}

const GENERAL_INFORMATION: &[FieldSpec] = &[
    field("c5", "Business name", FieldKind::Text, true),
    field("c6", "Business address", FieldKind::Text, true),
    field(CONSTITUTION_FIELD, "Constitution", FieldKind::Choice(CONSTITUTIONS), true),
    field("c8", "Promoter name", FieldKind::Text, true),
    field(MOBILE_FIELD, "Mobile number", FieldKind::Text, true),
    field(EMAIL_FIELD, "Email", FieldKind::Text, false),
    field(PAN_FIELD, "PAN", FieldKind::Text, true),
    field("c12", "Nature of activity", FieldKind::Text, true),
    field(COMMENCEMENT_FIELD, "Date of commencement", FieldKind::Date, false),
];

const MEANS_OF_FINANCE: &[FieldSpec] = &[
    field(PROJECT_COST_FIELD, "Total project cost", FieldKind::Decimal, true),
    field(TERM_LOAN_FIELD, "Term loan amount", FieldKind::Decimal, true),
    field(TENURE_FIELD, "Loan tenure (years)", FieldKind::Integer, true),
    field(MORATORIUM_FIELD, "Moratorium (months)", FieldKind::Integer, false),
    field(INTEREST_RATE_FIELD, "Term loan interest rate", FieldKind::Percent, true),
    field("i50", "Promoter contribution", FieldKind::Decimal, false),
    field(DSCR_FIELD, "Target DSCR", FieldKind::Decimal, true),
    field("i52", "Cash credit limit", FieldKind::Decimal, false),
    field(CC_INTEREST_FIELD, "Cash credit interest rate", FieldKind::Percent, false),
];

const WORKING_CAPITAL: &[FieldSpec] = &[
    field("f80", "Opening stock", FieldKind::Decimal, true),
    field("f81", "Stock holding period (days)", FieldKind::Integer, true),
    field("f82", "Debtor collection period (days)", FieldKind::Integer, true),
    field("f83", "Creditor payment period (days)", FieldKind::Integer, true),
    field("f84", "Expected annual sales growth", FieldKind::Percent, false),
];

const EMPLOYMENT: &[FieldSpec] = &[
    field("d95", "Number of staff", FieldKind::Integer, true),
    field("e95", "Average monthly staff salary", FieldKind::Decimal, true),
    field("d96", "Number of workers", FieldKind::Integer, false),
    field("e96", "Average monthly worker wage", FieldKind::Decimal, false),
    field("e97", "Annual salary increment", FieldKind::Percent, false),
];

const PREPARED_BY: &[FieldSpec] = &[
    field("c300", "Prepared by", FieldKind::Text, true),
    field("c301", "Firm / organisation", FieldKind::Text, false),
    field("c302", "Date", FieldKind::Date, true),
    field("c303", "Place", FieldKind::Text, false),
];

/// Scalar fields of a section. The two schedule sections have none; their
/// cells come from the layout tables.
pub fn fields_for(section: SectionId) -> &'static [FieldSpec] {
    match section {
        SectionId::GeneralInformation => GENERAL_INFORMATION,
        SectionId::MeansOfFinance => MEANS_OF_FINANCE,
        SectionId::WorkingCapital => WORKING_CAPITAL,
        SectionId::Employment => EMPLOYMENT,
        SectionId::PreparedBy => PREPARED_BY,
        SectionId::Assets | SectionId::IndirectExpenses => &[],
    }
}

pub fn field_spec(
    section: SectionId,
    id: &str,
) -> Option<&'static FieldSpec> {
    fields_for(section).iter().find(|f| f.id == id)
}

/// Section owning a scalar field id, if any.
pub fn section_of(id: &str) -> Option<SectionId> {
    SectionId::ALL
        .into_iter()
        .find(|s| field_spec(*s, id).is_some())
}
