use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::TenureBracket;
use crate::schema::TENURE_FIELD;

/// Raw field values of one wizard section, keyed by field id.
pub type SectionData = BTreeMap<String, String>;

/// The wizard sections, in the order the user walks through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionId {
    GeneralInformation,
    MeansOfFinance,
    Assets,
    WorkingCapital,
    Employment,
    IndirectExpenses,
    PreparedBy,
}

impl SectionId {
    pub const ALL: [SectionId; 7] = [
        SectionId::GeneralInformation,
        SectionId::MeansOfFinance,
        SectionId::Assets,
        SectionId::WorkingCapital,
        SectionId::Employment,
        SectionId::IndirectExpenses,
        SectionId::PreparedBy,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::GeneralInformation => "General Information",
            Self::MeansOfFinance => "Means of Finance",
            Self::Assets => "Fixed Assets Schedule",
            Self::WorkingCapital => "Working Capital",
            Self::Employment => "Employment",
            Self::IndirectExpenses => "Indirect Expenses Schedule",
            Self::PreparedBy => "Prepared By",
        }
    }

    /// Zero-based wizard step of this section.
    pub fn step(&self) -> usize {
        Self::ALL
            .iter()
            .position(|s| s == self)
            .unwrap_or_default()
    }

    pub fn from_step(step: usize) -> Option<Self> {
        Self::ALL.get(step).copied()
    }
}

impl fmt::Display for SectionId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Nested wizard input: section -> field id -> raw value.
///
/// Sections are independent namespaces. Values are kept exactly as typed;
/// typing and validation happen when a section is checked or serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WizardState {
    sections: BTreeMap<SectionId, SectionData>,
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(
        &self,
        id: SectionId,
    ) -> Option<&SectionData> {
        self.sections.get(&id)
    }

    pub fn section_mut(
        &mut self,
        id: SectionId,
    ) -> &mut SectionData {
        self.sections.entry(id).or_default()
    }

    pub fn value(
        &self,
        section: SectionId,
        field: &str,
    ) -> Option<&str> {
        self.sections
            .get(&section)
            .and_then(|data| data.get(field))
            .map(String::as_str)
    }

    pub fn set(
        &mut self,
        section: SectionId,
        field: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.section_mut(section).insert(field.into(), value.into());
    }

    pub fn remove(
        &mut self,
        section: SectionId,
        field: &str,
    ) -> Option<String> {
        self.sections.get_mut(&section)?.remove(field)
    }

    /// Removes a whole section, returning its fields.
    pub fn take_section(
        &mut self,
        id: SectionId,
    ) -> Option<SectionData> {
        self.sections.remove(&id)
    }

    pub fn sections(&self) -> impl Iterator<Item = (SectionId, &SectionData)> {
        self.sections.iter().map(|(id, data)| (*id, data))
    }

    /// Raw loan tenure as entered in the Means of Finance section.
    pub fn tenure(&self) -> Option<&str> {
        self.value(SectionId::MeansOfFinance, TENURE_FIELD)
    }

    /// Bracket implied by the current tenure value.
    pub fn bracket(&self) -> TenureBracket {
        TenureBracket::resolve(self.tenure())
    }

    /// Overlays every field of `other` onto `self`, section by section.
    pub fn merge(
        &mut self,
        other: WizardState,
    ) {
        for (id, data) in other.sections {
            self.section_mut(id).extend(data);
        }
    }
}
