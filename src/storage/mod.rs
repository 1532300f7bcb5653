pub mod json_backend;
pub mod memory;

use chrono::Utc;

use crate::{domain::Transaction, errors::Result};

/// Key under which the full transaction sequence is stored.
pub const STORAGE_KEY: &str = "expense-tracker-data";

const CORRUPT_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Abstraction over a string key-value medium.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` when the key was never written.
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Copies the value under `key` aside, leaving the original untouched.
    /// Returns where the copy went, or `None` when nothing is stored.
    fn preserve(&self, key: &str, tag: &str) -> Result<Option<String>> {
        let Some(value) = self.read(key)? else {
            return Ok(None);
        };
        let copy = format!("{key}.{tag}");
        self.write(&copy, &value)?;
        Ok(Some(copy))
    }
}

/// Encodes the full sequence as a compact JSON array.
pub fn encode_transactions(transactions: &[Transaction]) -> Result<String> {
    Ok(serde_json::to_string(transactions)?)
}

/// Decodes a stored sequence. Blank text and `null` decode to an empty sequence.
pub fn decode_transactions(raw: &str) -> Result<Vec<Transaction>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let decoded: Option<Vec<Transaction>> = serde_json::from_str(raw)?;
    Ok(decoded.unwrap_or_default())
}

/// Loads the sequence stored under `key`. Absent, unreadable or corrupt data
/// yields an empty sequence; corrupt data is first copied aside with
/// [`KeyValueStore::preserve`].
pub fn load_transactions(store: &dyn KeyValueStore, key: &str) -> Vec<Transaction> {
    let raw = match store.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            tracing::warn!(%key, error = %err, "unable to read stored transactions; starting empty");
            return Vec::new();
        }
    };
    match decode_transactions(&raw) {
        Ok(transactions) => transactions,
        Err(err) => {
            tracing::warn!(%key, error = %err, "stored transactions are corrupt; starting empty");
            let tag = format!("corrupt-{}", Utc::now().format(CORRUPT_TIMESTAMP_FORMAT));
            match store.preserve(key, &tag) {
                Ok(Some(copy)) => tracing::warn!(%key, %copy, "kept a copy of the unreadable data"),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(%key, error = %err, "could not keep a copy of the unreadable data")
                }
            }
            Vec::new()
        }
    }
}

/// Replaces the value under `key` with the full sequence.
pub fn save_transactions(
    store: &dyn KeyValueStore,
    key: &str,
    transactions: &[Transaction],
) -> Result<()> {
    let encoded = encode_transactions(transactions)?;
    store.write(key, &encoded)
}

pub use json_backend::JsonFileStore;
pub use memory::MemoryStore;
