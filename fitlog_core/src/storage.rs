//! Slot-based persistence for the ledger.
//!
//! The ledger persists through a [`LedgerStore`], a small capability with
//! independently addressable slots holding JSON text. [`JsonDirStore`] keeps
//! one file per slot with file locking and atomic replacement;
//! [`MemoryStore`] keeps everything in memory.

use crate::{Error, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A persisted slot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    Measurements,
    Exercises,
    HasSeenIntro,
    UserProfile,
}

impl Slot {
    /// Storage key for this slot
    pub fn key(self) -> &'static str {
        match self {
            Slot::Measurements => "measurements",
            Slot::Exercises => "exercises",
            Slot::HasSeenIntro => "hasSeenIntro",
            Slot::UserProfile => "userProfile",
        }
    }
}

/// Storage capability injected into the ledger
pub trait LedgerStore {
    /// Raw contents of a slot, or `None` if it was never written
    fn read_slot(&self, slot: Slot) -> Result<Option<String>>;

    /// Replace the contents of a slot
    ///
    /// Must be durable before returning.
    fn write_slot(&mut self, slot: Slot, contents: &str) -> Result<()>;

    /// Read a JSON array slot
    ///
    /// Missing slots read as empty. Slots that are not a JSON array are logged
    /// and also read as empty. Inside an array, elements that fail to decode
    /// are logged and dropped while the rest are kept.
    fn read_collection<T: DeserializeOwned>(&self, slot: Slot) -> Result<Vec<T>>
    where
        Self: Sized,
    {
        let Some(contents) = self.read_slot(slot)? else {
            tracing::debug!("Slot {} is empty", slot.key());
            return Ok(Vec::new());
        };

        let elements = match serde_json::from_str::<Vec<Value>>(&contents) {
            Ok(elements) => elements,
            Err(e) => {
                tracing::warn!(
                    "Failed to parse slot {}: {}. Using empty collection.",
                    slot.key(),
                    e
                );
                return Ok(Vec::new());
            }
        };

        let mut items = Vec::with_capacity(elements.len());
        for (index, element) in elements.into_iter().enumerate() {
            match serde_json::from_value::<T>(element) {
                Ok(item) => items.push(item),
                Err(e) => tracing::warn!(
                    "Dropping record {} of slot {}: {}",
                    index,
                    slot.key(),
                    e
                ),
            }
        }
        Ok(items)
    }

    /// Serialize a collection into a slot
    fn write_collection<T: Serialize>(&mut self, slot: Slot, items: &[T]) -> Result<()>
    where
        Self: Sized,
    {
        // Compact JSON, matching what the slot readers expect
        let contents = serde_json::to_string(items)?;
        self.write_slot(slot, &contents)
    }
}

// ============================================================================
// Directory-backed store
// ============================================================================

/// One `<slot>.json` file per slot inside a data directory
#[derive(Clone, Debug)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Create a store rooted at `dir` (created lazily on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing a slot
    pub fn slot_path(&self, slot: Slot) -> PathBuf {
        self.dir.join(format!("{}.json", slot.key()))
    }
}

impl LedgerStore for JsonDirStore {
    fn read_slot(&self, slot: Slot) -> Result<Option<String>> {
        let path = self.slot_path(slot);
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(&path)?;

        // Shared lock so we never observe a writer mid-flush
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            return Err(Error::Io(e));
        }

        file.unlock()?;
        tracing::debug!("Read slot {} from {:?}", slot.key(), path);
        Ok(Some(contents))
    }

    /// Atomically writes a slot by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    fn write_slot(&mut self, slot: Slot, contents: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.slot_path(slot);

        let temp = NamedTempFile::new_in(&self.dir)?;

        // Exclusive lock on the temp file serializes concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Wrote slot {} to {:?}", slot.key(), path);
        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Slots held in a map; nothing touches the filesystem
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    slots: HashMap<Slot, String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a slot with raw contents (does not count as a write)
    pub fn with_slot(mut self, slot: Slot, contents: impl Into<String>) -> Self {
        self.slots.insert(slot, contents.into());
        self
    }

    /// Raw contents of a slot
    pub fn get(&self, slot: Slot) -> Option<&str> {
        self.slots.get(&slot).map(String::as_str)
    }

    /// Number of `write_slot` calls so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl LedgerStore for MemoryStore {
    fn read_slot(&self, slot: Slot) -> Result<Option<String>> {
        Ok(self.slots.get(&slot).cloned())
    }

    fn write_slot(&mut self, slot: Slot, contents: &str) -> Result<()> {
        self.slots.insert(slot, contents.to_string());
        self.writes += 1;
        Ok(())
    }
}
