//! Plain-text rendering of ledger state. Styling is left to [`super::output`].

use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use uuid::Uuid;

use crate::core::{metrics::round_for_display, ChartBucket, Totals};
use crate::domain::{Identifiable, Transaction};

pub const EMPTY_CHART: &str = "add some expenses to see the graph";
pub const EMPTY_HISTORY: &str = "no transactions yet.";

const BAR_GLYPH: char = '#';

/// First eight hex digits of an id, as shown in listings.
pub fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

/// `$30.00`, `-$12.50`.
pub fn format_money(symbol: &str, value: Decimal) -> String {
    let sign = if value < Decimal::ZERO { "-" } else { "" };
    format!("{sign}{symbol}{}", round_for_display(value.abs()))
}

/// `-$20` for expenses, `+$100` otherwise.
pub fn format_signed_amount(symbol: &str, amount: Decimal) -> String {
    let sign = if amount < Decimal::ZERO { '-' } else { '+' };
    format!("{sign}{symbol}{}", amount.abs().normalize())
}

/// en-US short date: `1/15/2024`.
pub fn format_history_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

/// One entry of the history list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub position: usize,
    pub id: String,
    pub date: String,
    pub description: String,
    pub amount: String,
    pub is_expense: bool,
}

impl fmt::Display for HistoryRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:<3} [{}] {:>10}  {}  {}",
            self.position, self.id, self.date, self.description, self.amount
        )
    }
}

pub fn history_rows(transactions: &[Transaction], symbol: &str) -> Vec<HistoryRow> {
    transactions
        .iter()
        .enumerate()
        .map(|(idx, txn)| HistoryRow {
            position: idx + 1,
            id: short_id(txn.id()),
            date: format_history_date(txn.date()),
            description: txn.description().to_string(),
            amount: format_signed_amount(symbol, txn.amount()),
            is_expense: txn.is_expense(),
        })
        .collect()
}

pub fn totals_lines(totals: &Totals, symbol: &str) -> Vec<String> {
    vec![
        format!("Balance: {}", format_money(symbol, totals.balance)),
        format!("Income:  +{}", format_money(symbol, totals.income)),
        format!("Expense: -{}", format_money(symbol, totals.expense)),
    ]
}

/// Horizontal bar chart; the largest bucket spans `width` glyphs.
pub fn chart_lines(buckets: &[ChartBucket], width: usize) -> Vec<String> {
    if buckets.is_empty() {
        return vec![EMPTY_CHART.to_string()];
    }
    let label_width = buckets
        .iter()
        .map(|bucket| bucket.name.chars().count())
        .max()
        .unwrap_or(0);
    let peak = buckets
        .iter()
        .map(|bucket| bucket.amount)
        .max()
        .unwrap_or(Decimal::ZERO);

    buckets
        .iter()
        .map(|bucket| {
            let bar = bar_length(bucket.amount, peak, width);
            format!(
                "{:<label_width$} | {} {}",
                bucket.name,
                BAR_GLYPH.to_string().repeat(bar),
                bucket.amount.normalize()
            )
        })
        .collect()
}

fn bar_length(amount: Decimal, peak: Decimal, width: usize) -> usize {
    if peak <= Decimal::ZERO || width == 0 {
        return 0;
    }
    amount
        .checked_div(peak)
        .and_then(|ratio| ratio.checked_mul(Decimal::from(width)))
        .and_then(|scaled| scaled.ceil().to_usize())
        .unwrap_or(width)
        .clamp(1, width)
}
