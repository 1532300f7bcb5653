//! In-memory ordered ledger of transactions.

use std::collections::HashSet;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Identifiable, Transaction};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("transaction {0} already exists")]
pub struct DuplicateId(pub Uuid);

/// Insertion-ordered transactions with pairwise distinct ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a persisted sequence. Later entries reusing an id
    /// already seen are dropped.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let mut seen = HashSet::with_capacity(transactions.len());
        let mut kept = Vec::with_capacity(transactions.len());
        for txn in transactions {
            if seen.insert(txn.id()) {
                kept.push(txn);
            } else {
                tracing::warn!(id = %txn.id(), "dropping transaction with duplicate id");
            }
        }
        Self { transactions: kept }
    }

    pub fn insert(&mut self, transaction: Transaction) -> Result<Uuid, DuplicateId> {
        let id = transaction.id();
        if self.contains(id) {
            return Err(DuplicateId(id));
        }
        self.transactions.push(transaction);
        Ok(id)
    }

    /// Removes the entry with `id`, keeping the order of the rest.
    pub fn remove(&mut self, id: Uuid) -> Option<Transaction> {
        let index = self.transactions.iter().position(|txn| txn.id() == id)?;
        Some(self.transactions.remove(index))
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id() == id)
    }

    pub fn as_slice(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl<'a> IntoIterator for &'a TransactionStore {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn txn(id: u128, amount: i64) -> Transaction {
        Transaction::new(
            Uuid::from_u128(id),
            format!("entry {id}"),
            Decimal::from(amount),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
    }

    #[test]
    fn insert_refuses_duplicate_ids() {
        let mut store = TransactionStore::new();
        store.insert(txn(1, 10)).unwrap();
        assert_eq!(store.insert(txn(1, 20)), Err(DuplicateId(Uuid::from_u128(1))));
        assert_eq!(store.len(), 1);
        assert_eq!(store.as_slice()[0].amount(), Decimal::from(10));
    }

    #[test]
    fn remove_preserves_remaining_order() {
        let mut store = TransactionStore::from_transactions(vec![txn(1, 1), txn(2, 2), txn(3, 3)]);
        let removed = store.remove(Uuid::from_u128(2)).expect("present");
        assert_eq!(removed.id(), Uuid::from_u128(2));
        let ids: Vec<_> = store.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![Uuid::from_u128(1), Uuid::from_u128(3)]);
        assert!(store.remove(Uuid::from_u128(2)).is_none());
    }

    #[test]
    fn loading_keeps_first_of_duplicate_ids() {
        let store = TransactionStore::from_transactions(vec![txn(5, 1), txn(5, 2), txn(6, 3)]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(Uuid::from_u128(5)).unwrap().amount(), Decimal::from(1));
    }
}
