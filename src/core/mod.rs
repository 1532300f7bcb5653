//! Ledger state, derived metrics and the controller that ties them to storage.

pub mod aggregation;
pub mod controller;
pub mod dashboard;
pub mod ids;
pub mod input;
pub mod metrics;
pub mod store;
pub mod time;

pub use aggregation::{AggregationEngine, ChartBucket, GroupMode, WeekStart};
pub use controller::TransactionController;
pub use dashboard::Dashboard;
pub use ids::{IdSupplier, RandomIds, SequentialIds};
pub use input::{InputError, TransactionDraft, ValidatedEntry};
pub use metrics::{MetricsEngine, Totals};
pub use store::{DuplicateId, TransactionStore};
pub use time::{Clock, FixedClock, SystemClock};
