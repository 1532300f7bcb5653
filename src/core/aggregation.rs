//! Chart series: expenses bucketed by weekday or by week.

use std::{collections::HashMap, fmt, str::FromStr};

use chrono::{Datelike, Days, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::metrics::accumulate;
use crate::domain::Transaction;

/// How expenses are grouped for the chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
    /// One bucket per weekday name, across all weeks.
    #[default]
    Day,
    /// One bucket per calendar week, labelled by its first day.
    Week,
}

impl GroupMode {
    pub fn toggle(self) -> Self {
        match self {
            GroupMode::Day => GroupMode::Week,
            GroupMode::Week => GroupMode::Day,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GroupMode::Day => "day",
            GroupMode::Week => "week",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GroupMode::Day => "daily",
            GroupMode::Week => "weekly",
        }
    }
}

impl fmt::Display for GroupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGroupMode(pub String);

impl fmt::Display for UnknownGroupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown view `{}` (expected `day` or `week`)", self.0)
    }
}

impl std::error::Error for UnknownGroupMode {}

impl FromStr for GroupMode {
    type Err = UnknownGroupMode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(GroupMode::Day),
            "week" | "weekly" => Ok(GroupMode::Week),
            _ => Err(UnknownGroupMode(value.trim().to_string())),
        }
    }
}

/// First day of the calendar week. The en-US default is Sunday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }
}

/// One bar of the chart: a bucket label and the summed expense magnitude.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartBucket {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

pub struct AggregationEngine;

impl AggregationEngine {
    /// Groups with the default Sunday week start.
    pub fn aggregate(transactions: &[Transaction], mode: GroupMode) -> Vec<ChartBucket> {
        Self::aggregate_with(transactions, mode, WeekStart::default())
    }

    /// Sums `|amount|` of every strictly negative entry into its bucket.
    /// Buckets appear in the order their key is first met.
    pub fn aggregate_with(
        transactions: &[Transaction],
        mode: GroupMode,
        week_start: WeekStart,
    ) -> Vec<ChartBucket> {
        let mut buckets: Vec<ChartBucket> = Vec::new();
        let mut slots: HashMap<String, usize> = HashMap::new();

        for txn in transactions.iter().filter(|txn| txn.is_expense()) {
            let key = bucket_key(txn.date(), mode, week_start);
            match slots.get(&key) {
                Some(&slot) => {
                    let bucket = &mut buckets[slot];
                    bucket.amount = accumulate(bucket.amount, txn.magnitude());
                }
                None => {
                    slots.insert(key.clone(), buckets.len());
                    buckets.push(ChartBucket {
                        name: key,
                        amount: txn.magnitude(),
                    });
                }
            }
        }

        buckets
    }
}

/// Label of the bucket `date` falls into.
pub fn bucket_key(date: NaiveDate, mode: GroupMode, week_start: WeekStart) -> String {
    match mode {
        GroupMode::Day => date.format("%a").to_string(),
        GroupMode::Week => {
            let start = start_of_week(date, week_start);
            format!("{} {}", start.day(), start.format("%b"))
        }
    }
}

/// The most recent `week_start` day on or before `date`.
pub fn start_of_week(date: NaiveDate, week_start: WeekStart) -> NaiveDate {
    let offset = (date.weekday().num_days_from_sunday() + 7
        - week_start.weekday().num_days_from_sunday())
        % 7;
    date.checked_sub_days(Days::new(u64::from(offset)))
        .unwrap_or_else(|| {
            tracing::debug!(
                %date,
                "week start falls before the calendar range; using the date itself"
            );
            date
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn spend(id: u128, amount: i64, on: NaiveDate) -> Transaction {
        Transaction::new(Uuid::from_u128(id), "spend", Decimal::from(amount), on)
    }

    #[test]
    fn same_weekday_in_different_weeks_shares_a_bucket() {
        let txns = vec![spend(1, -20, date(2024, 1, 1)), spend(2, -30, date(2024, 1, 8))];
        let chart = AggregationEngine::aggregate(&txns, GroupMode::Day);
        assert_eq!(
            chart,
            vec![ChartBucket {
                name: "Mon".into(),
                amount: Decimal::from(50),
            }]
        );
    }

    #[test]
    fn week_mode_labels_by_sunday_start() {
        let txns = vec![spend(1, -20, date(2024, 1, 1)), spend(2, -10, date(2024, 1, 10))];
        let chart = AggregationEngine::aggregate(&txns, GroupMode::Week);
        let names: Vec<_> = chart.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["31 Dec", "7 Jan"]);
        assert_eq!(chart[0].amount, Decimal::from(20));
        assert_eq!(chart[1].amount, Decimal::from(10));
    }

    #[test]
    fn income_and_zero_never_reach_the_chart() {
        let txns = vec![
            spend(1, 50, date(2024, 1, 2)),
            spend(2, 0, date(2024, 1, 3)),
            spend(3, -20, date(2024, 1, 4)),
        ];
        let chart = AggregationEngine::aggregate(&txns, GroupMode::Day);
        assert_eq!(chart.len(), 1);
        assert_eq!(chart[0].name, "Thu");
    }

    #[test]
    fn bucket_order_follows_first_encounter() {
        let txns = vec![
            spend(1, -1, date(2024, 1, 5)),
            spend(2, -2, date(2024, 1, 1)),
            spend(3, -3, date(2024, 1, 12)),
        ];
        let names: Vec<_> = AggregationEngine::aggregate(&txns, GroupMode::Day)
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["Fri", "Mon"]);
    }

    #[test]
    fn start_of_week_respects_configured_first_day() {
        let sunday = date(2024, 1, 7);
        assert_eq!(start_of_week(sunday, WeekStart::Sunday), sunday);
        assert_eq!(start_of_week(sunday, WeekStart::Monday), date(2024, 1, 1));
        assert_eq!(
            bucket_key(date(2024, 1, 10), GroupMode::Week, WeekStart::Monday),
            "8 Jan"
        );
    }

    #[test]
    fn bucket_totals_saturate_instead_of_overflowing() {
        let huge = |id: u128, on| Transaction::new(Uuid::from_u128(id), "huge", Decimal::MIN, on);
        let txns = vec![huge(1, date(2024, 1, 1)), huge(2, date(2024, 1, 8))];
        let chart = AggregationEngine::aggregate(&txns, GroupMode::Day);
        assert_eq!(chart.len(), 1);
        assert_eq!(chart[0].amount, Decimal::MAX);
    }

    #[test]
    fn earliest_dates_keep_their_own_week_label() {
        assert_eq!(start_of_week(NaiveDate::MIN, WeekStart::Sunday), NaiveDate::MIN);
    }

    #[test]
    fn group_mode_parses_aliases_and_toggles() {
        assert_eq!("Weekly".parse::<GroupMode>(), Ok(GroupMode::Week));
        assert_eq!(" day ".parse::<GroupMode>(), Ok(GroupMode::Day));
        assert!("month".parse::<GroupMode>().is_err());
        assert_eq!(GroupMode::Day.toggle(), GroupMode::Week);
        assert_eq!(GroupMode::Week.toggle().to_string(), "daily");
    }

    #[test]
    fn chart_buckets_serialize_amounts_as_numbers() {
        let bucket = ChartBucket {
            name: "Mon".into(),
            amount: Decimal::from(50),
        };
        let json = serde_json::to_value(&bucket).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Mon", "amount": 50.0}));
    }
}
