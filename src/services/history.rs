use crate::error::HistoryError;
use chrono::{DateTime, Utc};
use chroma_color::{Cmykw, Rgb};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Default number of remembered colors
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// A remembered color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub rgb: Rgb,
    pub cmykw: Cmykw,
    pub recorded_at: DateTime<Utc>,
}

/// Recently used colors, oldest first.
///
/// Entries are unique by RGB. Inserting a color already present changes
/// nothing (its position is not refreshed). When full, the oldest entry is
/// evicted.
#[derive(Debug)]
pub struct ColorHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    path: Option<PathBuf>,
}

impl ColorHistory {
    /// In-memory history
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            path: None,
        }
    }

    /// Load the history persisted at `path`.
    ///
    /// A missing or unreadable file yields an empty history. The history is
    /// saved back to `path` after every insertion.
    pub fn load(path: impl Into<PathBuf>, capacity: usize) -> Self {
        let path = path.into();
        let mut history = Self::new(capacity);

        match Self::read_entries(&path) {
            Ok(Some(entries)) => {
                for entry in entries {
                    history.push(entry);
                }
                tracing::debug!(path = %path.display(), entries = history.len(), "Loaded color history");
            }
            Ok(None) => {
                tracing::debug!(path = %path.display(), "No color history yet");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable color history");
            }
        }

        history.path = Some(path);
        history
    }

    fn read_entries(path: &Path) -> Result<Option<Vec<HistoryEntry>>, HistoryError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Insert without persisting. Returns false for a duplicate.
    fn push(&mut self, entry: HistoryEntry) -> bool {
        if self.contains(entry.rgb) {
            return false;
        }

        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                tracing::trace!(rgb = %evicted.rgb, "Evicted from history");
            }
        }
        true
    }

    /// Remember a color. Returns `true` if it was not already present.
    pub fn add(&mut self, rgb: Rgb, cmykw: Cmykw) -> bool {
        let inserted = self.push(HistoryEntry {
            rgb,
            cmykw,
            recorded_at: Utc::now(),
        });

        if inserted {
            self.persist();
        }
        inserted
    }

    pub fn contains(&self, rgb: Rgb) -> bool {
        self.entries.iter().any(|entry| entry.rgb == rgb)
    }

    /// Entries, oldest first
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    /// Write the history to its file, if it has one.
    pub fn save(&self) -> Result<(), HistoryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let entries: Vec<&HistoryEntry> = self.entries.iter().collect();
        let json = serde_json::to_string_pretty(&entries)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            tracing::warn!(error = %e, "Failed to save color history");
        }
    }
}

impl Default for ColorHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
