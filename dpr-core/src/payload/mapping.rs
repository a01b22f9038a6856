use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CellAddress, CellValue};
use crate::payload::RemapDiagnostic;

/// Cell address -> value, serialized as one flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellMapping(BTreeMap<CellAddress, CellValue>);

impl CellMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a cell, returning the value it replaced.
    pub fn insert(
        &mut self,
        cell: CellAddress,
        value: impl Into<CellValue>,
    ) -> Option<CellValue> {
        self.0.insert(cell, value.into())
    }

    pub fn get(
        &self,
        cell: &str,
    ) -> Option<&CellValue> {
        let cell = CellAddress::parse(cell).ok()?;
        self.0.get(&cell)
    }

    pub fn contains(
        &self,
        cell: &CellAddress,
    ) -> bool {
        self.0.contains_key(cell)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CellAddress, &CellValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CellAddress> {
        self.0.keys()
    }
}

impl FromIterator<(CellAddress, CellValue)> for CellMapping {
    fn from_iter<I: IntoIterator<Item = (CellAddress, CellValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// What a submission hands to the report generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub cells: CellMapping,
    /// Raw loan percentage per asset category, for reuse downstream.
    pub loan_percentages: BTreeMap<String, Decimal>,
    /// Rows and keys left out of `cells`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<RemapDiagnostic>,
}
