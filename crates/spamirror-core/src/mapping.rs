//! Persistent slug → page mapping (`pages_mapping.json`).
//!
//! Written through after every saved page and flushed once more when the run
//! ends, so the file on disk always lists exactly the pages that exist.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use crate::storage::write_atomic;

/// One saved page. `slug` equals the filename stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub slug: String,
    pub url: String,
    pub filename: String,
}

/// Value stored under a slug in the mapping file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub url: String,
    pub filename: String,
}

#[derive(Debug)]
pub struct MappingStore {
    path: PathBuf,
    entries: BTreeMap<String, MappingEntry>,
}

impl MappingStore {
    /// Opens the mapping at `path` for pages under `out_dir`, merging any
    /// existing file. Entries whose page file is gone are dropped.
    pub fn load(path: &Path, out_dir: &Path) -> Result<Self> {
        let mut entries = match read_entries(path)? {
            Some(e) => e,
            None => BTreeMap::new(),
        };
        entries.retain(|slug, entry| {
            let exists = out_dir.join(&entry.filename).is_file();
            if !exists {
                tracing::warn!(slug = %slug, filename = %entry.filename, "mapped page missing on disk; dropping entry");
            }
            exists
        });
        if !entries.is_empty() {
            tracing::info!(entries = entries.len(), path = %path.display(), "loaded existing page mapping");
        }
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Adds a saved page and writes the mapping through to disk.
    pub fn record(&mut self, record: PageRecord) -> Result<()> {
        if let Some(prev) = self.entries.get(&record.slug) {
            if prev.filename != record.filename {
                tracing::warn!(slug = %record.slug, old = %prev.filename, new = %record.filename, "slug remapped");
            }
        }
        self.entries.insert(
            record.slug,
            MappingEntry {
                url: record.url,
                filename: record.filename,
            },
        );
        self.flush()
    }

    /// Serializes the whole mapping (pretty JSON) atomically.
    pub fn flush(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries).context("serialize page mapping")?;
        write_atomic(&self.path, json.as_bytes())
            .with_context(|| format!("write page mapping: {}", self.path.display()))
    }

    #[cfg(test)]
    fn get(&self, slug: &str) -> Option<&MappingEntry> {
        self.entries.get(slug)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reads a mapping file without touching it. `Ok(None)` if it does not exist.
pub fn read_entries(path: &Path) -> Result<Option<BTreeMap<String, MappingEntry>>> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("read page mapping: {}", path.display())),
    };
    let entries = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse page mapping: {}", path.display()))?;
    Ok(Some(entries))
}

/// Flushes the wrapped store when dropped, whatever path the run exits by.
pub struct FlushOnDrop<'a> {
    store: &'a mut MappingStore,
}

impl<'a> FlushOnDrop<'a> {
    pub fn new(store: &'a mut MappingStore) -> Self {
        Self { store }
    }
}

impl Deref for FlushOnDrop<'_> {
    type Target = MappingStore;

    fn deref(&self) -> &MappingStore {
        self.store
    }
}

impl DerefMut for FlushOnDrop<'_> {
    fn deref_mut(&mut self) -> &mut MappingStore {
        self.store
    }
}

impl Drop for FlushOnDrop<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.store.flush() {
            tracing::error!(error = %e, "final mapping flush failed");
        }
    }
}
