use rust_decimal::Decimal;

/// Trims whitespace and strips comma grouping, so both `"1,234.56"` and the
/// lakh style `"10,00,000"` parse.
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a form amount. Blank input is `None`; so is input that does not
/// parse, which is logged.
pub fn parse_optional_decimal(s: &str) -> Option<Decimal> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return None;
    }
    normalized.parse().map_or_else(
        |e| {
            tracing::warn!(input = %s, "ignoring amount that is not a number: {}", e);
            None
        },
        Some,
    )
}

/// Parses user input into a [`Decimal`], coercing anything unusable to zero.
pub fn parse_decimal_or_zero(s: &str) -> Decimal {
    parse_optional_decimal(s).unwrap_or(Decimal::ZERO)
}

/// Returns `true` when the raw input is empty after trimming.
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
