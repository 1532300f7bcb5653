use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    errors::Result,
    utils::paths::{ensure_dir, write_atomic},
};

use super::KeyValueStore;

const FILE_EXTENSION: &str = "json";

/// Filesystem-backed key-value store: one JSON file per key below `root`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: PathBuf) -> Result<Self> {
        ensure_dir(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", canonical_name(key), FILE_EXTENSION))
    }
}

impl KeyValueStore for JsonFileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        write_atomic(&path, value)?;
        tracing::debug!(path = %path.display(), bytes = value.len(), "stored value");
        Ok(())
    }

    /// Byte-for-byte copy next to the key's file: `<key>.json.<tag>`.
    fn preserve(&self, key: &str, tag: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let mut name = path.file_name().map(OsString::from).unwrap_or_default();
        name.push(format!(".{tag}"));
        let copy = path.with_file_name(name);
        fs::copy(&path, &copy)?;
        Ok(Some(copy.display().to_string()))
    }
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches(['_', '-']).is_empty() {
        "store".into()
    } else {
        sanitized
    }
}
