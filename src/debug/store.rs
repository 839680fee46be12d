//! Debug call log ring buffer
//!
//! Keeps the most recent API calls, newest first, for inspection. The
//! capacity is fixed at construction; inserting past it drops the oldest
//! entry.

use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

use crate::config::DEFAULT_MAX_ENTRIES;
use crate::debug::types::{DebugEntry, DebugFilter};

/// Bounded, newest-first store of finalized call records.
pub struct DebugStore {
    entries: RwLock<VecDeque<DebugEntry>>,
    filter: RwLock<DebugFilter>,
    max_entries: usize,
}

impl DebugStore {
    /// Creates an empty store holding at most `max_entries` records.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: RwLock::new(VecDeque::with_capacity(max_entries)),
            filter: RwLock::new(DebugFilter::All),
            max_entries,
        }
    }

    /// Prepends `entry`, then truncates to capacity (dropping the oldest).
    pub fn add_entry(&self, entry: DebugEntry) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.push_front(entry);
        entries.truncate(self.max_entries);
    }

    pub fn clear_entries(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Changes the current view. Stored entries are untouched.
    pub fn set_filter(&self, filter: DebugFilter) {
        *self.filter.write().unwrap_or_else(PoisonError::into_inner) = filter;
    }

    pub fn filter(&self) -> DebugFilter {
        *self.filter.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// All entries, newest first.
    pub fn entries(&self) -> Vec<DebugEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Entries matching the current filter, newest first.
    pub fn filtered_entries(&self) -> Vec<DebugEntry> {
        get_filtered_entries(&self.entries(), self.filter())
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

impl Default for DebugStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

/// Select the entries `filter` lets through, preserving order.
pub fn get_filtered_entries(entries: &[DebugEntry], filter: DebugFilter) -> Vec<DebugEntry> {
    entries
        .iter()
        .filter(|e| filter.matches(e))
        .cloned()
        .collect()
}
