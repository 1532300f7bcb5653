//! Add/delete orchestration over the transaction store and its persistence.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::{
    aggregation::{AggregationEngine, ChartBucket, GroupMode, WeekStart},
    dashboard::Dashboard,
    ids::{IdSupplier, RandomIds},
    input::{self, InputError, TransactionDraft},
    metrics::{MetricsEngine, Totals},
    store::TransactionStore,
    time::{Clock, SystemClock},
};
use crate::domain::{Identifiable, Transaction};
use crate::errors::Result;
use crate::storage::{self, KeyValueStore};

/// Redraws allowed when the supplier hands out an id already in use.
const MAX_ID_ATTEMPTS: usize = 16;

/// Owns the ledger for one session and writes it back after every mutation.
pub struct TransactionController {
    store: TransactionStore,
    storage: Box<dyn KeyValueStore>,
    storage_key: String,
    ids: Box<dyn IdSupplier>,
    clock: Box<dyn Clock>,
    view: GroupMode,
    week_start: WeekStart,
}

impl TransactionController {
    /// Loads whatever is stored under `storage_key`; missing or corrupt data
    /// starts an empty ledger.
    pub fn open(storage: Box<dyn KeyValueStore>, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let loaded = storage::load_transactions(storage.as_ref(), &storage_key);
        let store = TransactionStore::from_transactions(loaded);
        tracing::info!(key = %storage_key, count = store.len(), "ledger opened");
        Self {
            store,
            storage,
            storage_key,
            ids: Box::new(RandomIds),
            clock: Box::new(SystemClock),
            view: GroupMode::default(),
            week_start: WeekStart::default(),
        }
    }

    pub fn with_id_supplier(mut self, ids: Box<dyn IdSupplier>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_week_start(mut self, week_start: WeekStart) -> Self {
        self.week_start = week_start;
        self
    }

    pub fn with_view(mut self, view: GroupMode) -> Self {
        self.view = view;
        self
    }

    /// Validates raw form input and appends the entry. Invalid input is a
    /// silent no-op returning `None`.
    pub fn add(&mut self, draft: &TransactionDraft) -> Option<Uuid> {
        self.try_add(draft).unwrap_or_else(|err| {
            tracing::debug!(error = %err, "ignoring invalid transaction input");
            None
        })
    }

    /// Like [`add`](Self::add) but hands back the validation failure.
    /// `Ok(None)` means the entry was valid yet could not be stored.
    pub fn try_add(
        &mut self,
        draft: &TransactionDraft,
    ) -> std::result::Result<Option<Uuid>, InputError> {
        let entry = draft.validate(self.clock.today())?;
        Ok(self.add_entry(&entry.description, entry.amount, Some(entry.date)))
    }

    /// Appends an already-parsed entry; `date` defaults to today. A blank
    /// description or an amount beyond [`input::MAX_AMOUNT`] is a silent no-op.
    pub fn add_entry(
        &mut self,
        description: &str,
        amount: Decimal,
        date: Option<NaiveDate>,
    ) -> Option<Uuid> {
        let description = description.trim();
        if description.is_empty() {
            tracing::debug!("ignoring transaction without description");
            return None;
        }
        if !input::amount_in_range(amount) {
            tracing::debug!(%amount, "ignoring transaction with out-of-range amount");
            return None;
        }
        let id = self.fresh_id()?;
        let date = date.unwrap_or_else(|| self.clock.today());
        let transaction = Transaction::new(id, description, amount, date);
        if let Err(err) = self.store.insert(transaction) {
            tracing::warn!(error = %err, "transaction not added");
            return None;
        }
        tracing::info!(%id, %amount, %date, "transaction added");
        self.persist();
        Some(id)
    }

    /// Removes the entry with `id`. Unknown ids are a no-op returning `false`.
    pub fn delete(&mut self, id: Uuid) -> bool {
        match self.store.remove(id) {
            Some(_) => {
                tracing::info!(%id, "transaction deleted");
                self.persist();
                true
            }
            None => {
                tracing::debug!(%id, "delete ignored; no such transaction");
                false
            }
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.store.as_slice()
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.store.get(id)
    }

    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    pub fn totals(&self) -> Totals {
        MetricsEngine::totals(self.store.as_slice())
    }

    /// Chart series for the selected view.
    pub fn chart(&self) -> Vec<ChartBucket> {
        self.chart_for(self.view)
    }

    pub fn chart_for(&self, mode: GroupMode) -> Vec<ChartBucket> {
        AggregationEngine::aggregate_with(self.store.as_slice(), mode, self.week_start)
    }

    pub fn view(&self) -> GroupMode {
        self.view
    }

    pub fn set_view(&mut self, view: GroupMode) {
        self.view = view;
    }

    pub fn toggle_view(&mut self) -> GroupMode {
        self.view = self.view.toggle();
        self.view
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard {
            transactions: self.store.as_slice().to_vec(),
            totals: self.totals(),
            view: self.view,
            chart: self.chart(),
        }
    }

    /// Writes the full sequence now, reporting any failure.
    pub fn flush(&self) -> Result<()> {
        storage::save_transactions(
            self.storage.as_ref(),
            &self.storage_key,
            self.store.as_slice(),
        )
    }

    fn persist(&self) {
        if let Err(err) = self.flush() {
            tracing::warn!(key = %self.storage_key, error = %err, "failed to persist transactions");
        }
    }

    fn fresh_id(&self) -> Option<Uuid> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            if !self.store.contains(id) {
                return Some(id);
            }
            tracing::debug!(%id, "id supplier returned an id already in use");
        }
        tracing::warn!("could not obtain an unused transaction id");
        None
    }
}
