//! Loan sizing for a single fixed-asset category.
//!
//! A category's loan request can be entered either as a percentage of the
//! category total or as an absolute amount. Whichever the user edits, the
//! other is derived so that `amount == total * percentage / 100` holds after
//! every edit (to two decimal places).
//!
//! | Edit                    | total > 0                         | total == 0                  |
//! |-------------------------|-----------------------------------|-----------------------------|
//! | percentage `p`          | amount = total × p / 100          | amount blank                |
//! | amount `a`              | a capped at total, p = a/total×100 | a stored, percentage blank  |
//! | asset list changed      | amount re-derived from percentage | amount blank if p is set    |
//! | empty input             | both fields cleared               | both fields cleared         |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{clamp_percentage, round_half_up};
use crate::utils::{is_blank, parse_decimal_or_zero};

/// Percentage and amount requested as loan against one asset category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanSizing {
    pub percentage: Option<Decimal>,
    pub amount: Option<Decimal>,
}

impl LoanSizing {
    /// A category counts as sized once it has a non-zero percentage.
    pub fn is_sized(&self) -> bool {
        self.percentage.is_some_and(|p| !p.is_zero())
    }

    /// Applies a percentage typed by the user and re-derives the amount.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use dpr_core::calculations::LoanSizing;
    ///
    /// let mut loan = LoanSizing::default();
    /// loan.set_percentage("25", dec!(1000000));
    ///
    /// assert_eq!(loan.amount.unwrap().to_string(), "250000.00");
    /// ```
    pub fn set_percentage(
        &mut self,
        raw: &str,
        total: Decimal,
    ) {
        if is_blank(raw) {
            self.clear();
            return;
        }

        let percentage = clamp_percentage(parse_decimal_or_zero(raw));
        self.percentage = Some(percentage);
        self.amount = amount_for(percentage, total);
    }

    /// Applies an amount typed by the user and re-derives the percentage.
    ///
    /// The amount is capped at `total`. With nothing to size against
    /// (`total <= 0`) the amount is kept as typed and the percentage is left
    /// blank until the category has a value.
    pub fn set_amount(
        &mut self,
        raw: &str,
        total: Decimal,
    ) {
        if is_blank(raw) {
            self.clear();
            return;
        }

        let requested = parse_decimal_or_zero(raw).max(Decimal::ZERO);
        if total <= Decimal::ZERO {
            debug!(%requested, "loan amount entered before any asset value; percentage left blank");
            self.amount = Some(round_half_up(requested));
            self.percentage = None;
            return;
        }

        self.apply_amount(requested, total);
    }

    /// Re-derives the amount after the category's asset list changed.
    pub fn recompute(
        &mut self,
        total: Decimal,
    ) {
        match (self.percentage, self.amount) {
            (Some(_), _) if total <= Decimal::ZERO => self.amount = None,
            (Some(percentage), _) => self.amount = amount_for(percentage, total),
            (None, Some(orphan)) if total > Decimal::ZERO => {
                debug!(%orphan, %total, "deriving loan percentage from amount entered earlier");
                self.apply_amount(orphan, total);
            }
            (None, _) => {}
        }
    }

    pub fn clear(&mut self) {
        self.percentage = None;
        self.amount = None;
    }

    fn apply_amount(
        &mut self,
        requested: Decimal,
        total: Decimal,
    ) {
        let capped = requested.min(total);
        self.amount = Some(round_half_up(capped));
        self.percentage = Some(clamp_percentage(round_half_up(
            capped / total * Decimal::ONE_HUNDRED,
        )));
    }
}

/// `total * percentage / 100`. For totals too large to multiply first, the
/// total is scaled down before multiplying; `percentage <= 100` keeps that
/// product within `total`.
fn amount_for(
    percentage: Decimal,
    total: Decimal,
) -> Option<Decimal> {
    if total <= Decimal::ZERO {
        return None;
    }
    let amount = total
        .checked_mul(percentage)
        .map(|product| product / Decimal::ONE_HUNDRED)
        .unwrap_or_else(|| total / Decimal::ONE_HUNDRED * percentage);
    Some(round_half_up(amount))
}
