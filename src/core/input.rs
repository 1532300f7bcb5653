//! Validation of raw form input before it reaches the controller.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Largest accepted magnitude for a single entry: one trillion
/// (`232 * 2^32 + 3_567_587_328`). Running totals stay far inside the
/// `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Reasons a draft entry is refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("description is required")]
    EmptyDescription,
    #[error("amount is required")]
    MissingAmount,
    #[error("amount `{0}` is not a number")]
    InvalidAmount(String),
    #[error("amount `{0}` is outside the supported range")]
    AmountOutOfRange(String),
    #[error("date `{0}` is not a valid YYYY-MM-DD date")]
    InvalidDate(String),
}

/// Raw field values as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionDraft {
    pub description: String,
    pub amount: String,
    pub date: Option<String>,
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEntry {
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
}

impl TransactionDraft {
    pub fn new(description: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
            date: None,
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Checks every field, defaulting a missing or blank date to `today`.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidatedEntry, InputError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(InputError::EmptyDescription);
        }
        let amount = parse_amount(&self.amount)?;
        let date = parse_date(self.date.as_deref(), today)?;
        Ok(ValidatedEntry {
            description: description.to_string(),
            amount,
            date,
        })
    }
}

/// Parses a signed decimal amount. Plain and scientific notation are accepted.
pub fn parse_amount(raw: &str) -> Result<Decimal, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InputError::MissingAmount);
    }
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if unsigned.starts_with(['+', '-']) && unsigned.len() != trimmed.len() {
        return Err(InputError::InvalidAmount(trimmed.to_string()));
    }
    let amount = Decimal::from_str(unsigned)
        .or_else(|_| Decimal::from_scientific(unsigned))
        .map_err(|_| InputError::InvalidAmount(trimmed.to_string()))?;
    if !amount_in_range(amount) {
        return Err(InputError::AmountOutOfRange(trimmed.to_string()));
    }
    Ok(amount)
}

/// `true` when `|amount| <= MAX_AMOUNT`.
pub fn amount_in_range(amount: Decimal) -> bool {
    amount.abs() <= MAX_AMOUNT
}

/// Parses an optional `YYYY-MM-DD` date; missing or blank means `today`.
pub fn parse_date(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate, InputError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(today),
        Some(text) => NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map_err(|_| InputError::InvalidDate(text.to_string())),
    }
}
