use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One fixed-asset line item, stored against a sheet row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetItem {
    pub description: String,
    pub amount: Option<Decimal>,
}

impl AssetItem {
    pub fn new(
        description: impl Into<String>,
        amount: Option<Decimal>,
    ) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }

    /// An item counts once it has a non-blank description or a non-zero amount.
    pub fn is_populated(&self) -> bool {
        !self.description.trim().is_empty() || self.amount.is_some_and(|a| !a.is_zero())
    }

    /// The amount contributing to the category total.
    pub fn value(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }
}

/// Which column of an asset row an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetField {
    Description,
    Amount,
}
