//! Headline totals: balance, income and expense.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::Transaction;

/// Decimal places used when totals are shown.
pub const DISPLAY_SCALE: u32 = 2;

/// Derived totals over a transaction sequence.
///
/// `balance == income - expense` holds exactly: zero amounts count towards the
/// balance only and both sides use strict comparisons. Sums that leave the
/// `Decimal` range saturate, and the identity no longer holds for them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub balance: Decimal,
    pub income: Decimal,
    pub expense: Decimal,
}

impl Totals {
    /// Rounds every figure to cents, midpoint away from zero.
    pub fn rounded(&self) -> Self {
        Self {
            balance: round_for_display(self.balance),
            income: round_for_display(self.income),
            expense: round_for_display(self.expense),
        }
    }
}

impl fmt::Display for Totals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.rounded();
        write!(
            f,
            "balance {}, income {}, expense {}",
            rounded.balance, rounded.income, rounded.expense
        )
    }
}

/// Rounds to cents and pads to exactly two decimal places.
pub fn round_for_display(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(DISPLAY_SCALE);
    rounded
}

/// `total + value`, saturating at the `Decimal` bounds instead of panicking.
pub fn accumulate(total: Decimal, value: Decimal) -> Decimal {
    total.checked_add(value).unwrap_or_else(|| {
        tracing::warn!(%total, %value, "sum exceeds the decimal range; saturating");
        total.saturating_add(value)
    })
}

fn checked_sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, accumulate)
}

pub struct MetricsEngine;

impl MetricsEngine {
    pub fn balance(transactions: &[Transaction]) -> Decimal {
        checked_sum(transactions.iter().map(Transaction::amount))
    }

    pub fn income(transactions: &[Transaction]) -> Decimal {
        checked_sum(
            transactions
                .iter()
                .filter(|txn| txn.is_income())
                .map(Transaction::amount),
        )
    }

    pub fn expense(transactions: &[Transaction]) -> Decimal {
        checked_sum(
            transactions
                .iter()
                .filter(|txn| txn.is_expense())
                .map(Transaction::amount),
        )
        .abs()
    }

    pub fn totals(transactions: &[Transaction]) -> Totals {
        Totals {
            balance: Self::balance(transactions),
            income: Self::income(transactions),
            expense: Self::expense(transactions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;
    use uuid::Uuid;

    fn entries(amounts: &[&str]) -> Vec<Transaction> {
        amounts
            .iter()
            .enumerate()
            .map(|(idx, amount)| {
                Transaction::new(
                    Uuid::from_u128(idx as u128),
                    "entry",
                    Decimal::from_str(amount).unwrap(),
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn empty_input_is_all_zero() {
        assert_eq!(MetricsEngine::totals(&[]), Totals::default());
    }

    #[test]
    fn single_income_entry() {
        let totals = MetricsEngine::totals(&entries(&["100"])).rounded();
        assert_eq!(totals.balance.to_string(), "100.00");
        assert_eq!(totals.income.to_string(), "100.00");
        assert_eq!(totals.expense.to_string(), "0.00");
    }

    #[test]
    fn mixed_entries_split_by_sign() {
        let totals = MetricsEngine::totals(&entries(&["50", "-20"]));
        assert_eq!(totals.balance, Decimal::from(30));
        assert_eq!(totals.income, Decimal::from(50));
        assert_eq!(totals.expense, Decimal::from(20));
        assert_eq!(totals.to_string(), "balance 30.00, income 50.00, expense 20.00");
    }

    #[test]
    fn zero_counts_towards_balance_only() {
        let totals = MetricsEngine::totals(&entries(&["0", "12", "-4"]));
        assert_eq!(totals.income, Decimal::from(12));
        assert_eq!(totals.expense, Decimal::from(4));
        assert_eq!(totals.balance, Decimal::from(8));
    }

    #[test]
    fn balance_matches_income_minus_expense_exactly() {
        let totals = MetricsEngine::totals(&entries(&["0.1", "0.2", "-0.3", "-0.7", "19.99", "0"]));
        assert_eq!(totals.balance, totals.income - totals.expense);
    }

    #[test]
    fn overflowing_sums_saturate() {
        let mut history = entries(&["1", "-1"]);
        history.push(Transaction::new(
            Uuid::from_u128(10),
            "huge",
            Decimal::MAX,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ));
        history.push(Transaction::new(
            Uuid::from_u128(11),
            "huge loss",
            Decimal::MIN,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        ));
        let totals = MetricsEngine::totals(&history);
        assert_eq!(totals.income, Decimal::MAX);
        assert_eq!(totals.expense, Decimal::MAX);
        assert_eq!(accumulate(Decimal::MAX, Decimal::ONE), Decimal::MAX);
        assert_eq!(totals.rounded().income, round_for_display(Decimal::MAX));
    }

    #[test]
    fn rounding_goes_away_from_zero_on_midpoints() {
        assert_eq!(round_for_display(Decimal::from_str("2.345").unwrap()).to_string(), "2.35");
        assert_eq!(round_for_display(Decimal::from_str("-2.345").unwrap()).to_string(), "-2.35");
        assert_eq!(round_for_display(Decimal::from(3)).to_string(), "3.00");
    }
}
