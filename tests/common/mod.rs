#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::NaiveDate;
use expense_core::core::{FixedClock, SequentialIds, TransactionController};
use expense_core::storage::{JsonFileStore, STORAGE_KEY};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Fresh directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// Controller over a file store in `dir`, with deterministic ids and a fixed today.
pub fn controller_in(dir: &Path, today: NaiveDate) -> TransactionController {
    let storage = JsonFileStore::new(dir.to_path_buf()).expect("create json file store");
    TransactionController::open(Box::new(storage), STORAGE_KEY)
        .with_id_supplier(Box::new(SequentialIds::starting_at(1)))
        .with_clock(Box::new(FixedClock(today)))
}
