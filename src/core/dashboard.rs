use serde::Serialize;

use crate::core::{aggregation::ChartBucket, metrics::Totals, GroupMode};
use crate::domain::Transaction;

/// Everything the dashboard view renders, computed from one store state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub transactions: Vec<Transaction>,
    pub totals: Totals,
    pub view: GroupMode,
    pub chart: Vec<ChartBucket>,
}

impl Dashboard {
    /// `false` means the chart area shows its empty-state placeholder.
    pub fn has_chart_data(&self) -> bool {
        !self.chart.is_empty()
    }
}
