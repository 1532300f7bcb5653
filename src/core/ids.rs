//! Identifier suppliers for new ledger entries.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Produces a fresh identifier each time an entry is created.
pub trait IdSupplier: Send + Sync {
    fn next_id(&self) -> Uuid;
}

/// Random version 4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSupplier for RandomIds {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Monotonic counter encoded into the UUID space. Deterministic, so handy for
/// tests and reproducible fixtures.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl IdSupplier for SequentialIds {
    fn next_id(&self) -> Uuid {
        let value = self.next.fetch_add(1, Ordering::Relaxed);
        Uuid::from_u128(u128::from(value))
    }
}
