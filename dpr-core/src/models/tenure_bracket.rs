use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::parse_optional_decimal;

/// Loan tenures above this many years use the extended sheet layout.
pub const TENURE_THRESHOLD_YEARS: u32 = 7;

/// Which of the two sheet layouts is active for a given loan tenure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenureBracket {
    /// Tenure of seven years or less, or no usable tenure at all.
    #[default]
    Default,
    /// Tenure longer than seven years.
    Extended,
}

impl TenureBracket {
    /// Resolves the bracket from the raw tenure field.
    ///
    /// Never fails: missing, blank and non-numeric input all resolve to
    /// [`TenureBracket::Default`].
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw.and_then(parse_optional_decimal) {
            Some(years) => Self::from_years(years),
            None => Self::Default,
        }
    }

    /// Resolves the bracket from an already-parsed tenure.
    pub fn from_years(years: Decimal) -> Self {
        if years > Decimal::from(TENURE_THRESHOLD_YEARS) {
            Self::Extended
        } else {
            Self::Default
        }
    }

    /// The opposite bracket.
    pub fn other(self) -> Self {
        match self {
            Self::Default => Self::Extended,
            Self::Extended => Self::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Extended => "extended",
        }
    }
}

impl fmt::Display for TenureBracket {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn resolve_is_extended_only_above_threshold() {
        let cases = [
            (None, TenureBracket::Default),
            (Some(""), TenureBracket::Default),
            (Some("   "), TenureBracket::Default),
            (Some("abc"), TenureBracket::Default),
            (Some("8 years"), TenureBracket::Default),
            (Some("0"), TenureBracket::Default),
            (Some("-12"), TenureBracket::Default),
            (Some("5"), TenureBracket::Default),
            (Some("7"), TenureBracket::Default),
            (Some("7.0"), TenureBracket::Default),
            (Some("7.5"), TenureBracket::Extended),
            (Some("8"), TenureBracket::Extended),
            (Some(" 9 "), TenureBracket::Extended),
            (Some("15"), TenureBracket::Extended),
        ];

        for (raw, expected) in cases {
            assert_eq!(TenureBracket::resolve(raw), expected, "input {raw:?}");
        }
    }

    #[test]
    fn resolve_is_stable_across_repeated_calls() {
        let first = TenureBracket::resolve(Some("9"));
        let second = TenureBracket::resolve(Some("9"));

        assert_eq!(first, second);
    }

    #[test]
    fn from_years_boundary() {
        assert_eq!(TenureBracket::from_years(dec!(7)), TenureBracket::Default);
        assert_eq!(TenureBracket::from_years(dec!(7.01)), TenureBracket::Extended);
    }

    #[test]
    fn other_flips_bracket() {
        assert_eq!(TenureBracket::Default.other(), TenureBracket::Extended);
        assert_eq!(TenureBracket::Extended.other(), TenureBracket::Default);
    }
}
