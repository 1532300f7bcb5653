use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Displayable, Identifiable};

/// A single dated ledger entry. Negative amounts are expenses, positive amounts
/// income; zero sits on neither side.
///
/// Entries are immutable: they are created once and only ever removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(with = "entry_id")]
    id: Uuid,
    #[serde(alias = "text")]
    description: String,
    amount: Decimal,
    #[serde(with = "calendar_date")]
    date: NaiveDate,
}

impl Transaction {
    pub fn new(id: Uuid, description: impl Into<String>, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            id,
            description: description.into(),
            amount,
            date,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Strictly negative amounts only.
    pub fn is_expense(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Strictly positive amounts only.
    pub fn is_income(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn magnitude(&self) -> Decimal {
        self.amount.abs()
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        format!("{} ({})", self.description, self.date.format("%Y-%m-%d"))
    }
}

/// Ids are written as UUID strings. Older data used bounded random integers;
/// those are lifted into the UUID space so they stay distinct and stable.
mod entry_id {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use uuid::Uuid;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Uuid(Uuid),
        Numeric(u64),
    }

    pub fn serialize<S: Serializer>(id: &Uuid, serializer: S) -> Result<S::Ok, S::Error> {
        id.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Uuid, D::Error> {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Uuid(id) => id,
            RawId::Numeric(value) => Uuid::from_u128(u128::from(value)),
        })
    }
}

/// Dates are written as `YYYY-MM-DD`. Full RFC 3339 timestamps are accepted on
/// read and reduced to the calendar date in their own offset.
mod calendar_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, FORMAT) {
            return Ok(date);
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|timestamp| timestamp.date_naive())
            .map_err(|_| D::Error::custom(format!("unrecognized date `{raw}`")))
    }
}
