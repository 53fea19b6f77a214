//! In-memory channel group implementation.
//!
//! This module provides a local implementation of [`ChannelGroup`] suitable
//! for unit testing and local development. Entries live in memory and can be
//! appended while a refresh worker is running, which is how the demo binary
//! simulates schedule data arriving from a backend.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::error::{ErrorContext, GuideError, GuideResult};
use crate::models::{ChannelGroup, EpgEntry, GroupKey};

/// In-memory channel group.
///
/// Cloning yields another handle onto the same data.
///
/// # Example
/// ```
/// use guide_timeline::models::{ChannelGroup, GroupKey};
/// use guide_timeline::providers::LocalChannelGroup;
///
/// let group = LocalChannelGroup::new(GroupKey::tv(1), "Sports");
/// assert_eq!(group.fetch_all_entries().unwrap().len(), 0);
/// ```
#[derive(Clone)]
pub struct LocalChannelGroup {
    key: GroupKey,
    name: String,
    data: Arc<RwLock<LocalGroupData>>,
}

struct LocalGroupData {
    entries: Vec<EpgEntry>,
    is_available: bool,
    fetch_delay: Option<Duration>,
    fetch_count: usize,
}

impl Default for LocalGroupData {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            is_available: true,
            fetch_delay: None,
            fetch_count: 0,
        }
    }
}

impl LocalChannelGroup {
    /// Create a new empty group.
    pub fn new(key: GroupKey, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            data: Arc::new(RwLock::new(LocalGroupData::default())),
        }
    }

    /// Create a group pre-populated with entries.
    pub fn with_entries(key: GroupKey, name: impl Into<String>, entries: Vec<EpgEntry>) -> Self {
        let group = Self::new(key, name);
        group.set_entries(entries);
        group
    }

    /// Replace all entries.
    pub fn set_entries(&self, mut entries: Vec<EpgEntry>) {
        entries.sort_by_key(|e| (e.start, e.channel_id));
        self.data.write().entries = entries;
    }

    /// Append entries, keeping start order.
    pub fn push_entries(&self, entries: impl IntoIterator<Item = EpgEntry>) {
        let mut data = self.data.write();
        data.entries.extend(entries);
        data.entries.sort_by_key(|e| (e.start, e.channel_id));
    }

    /// Toggle availability for simulating backend outages.
    pub fn set_available(&self, available: bool) {
        self.data.write().is_available = available;
    }

    /// Make every fetch sleep first, simulating a slow backend.
    pub fn set_fetch_delay(&self, delay: Option<Duration>) {
        self.data.write().fetch_delay = delay;
    }

    /// Number of `fetch_all_entries` calls so far, failed ones included.
    pub fn fetch_count(&self) -> usize {
        self.data.read().fetch_count
    }

    pub fn entry_count(&self) -> usize {
        self.data.read().entries.len()
    }
}

impl ChannelGroup for LocalChannelGroup {
    fn key(&self) -> GroupKey {
        self.key
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn first_available_date(&self) -> Option<DateTime<Utc>> {
        self.data.read().entries.iter().map(|e| e.start).min()
    }

    fn last_available_date(&self) -> Option<DateTime<Utc>> {
        self.data.read().entries.iter().map(|e| e.end).max()
    }

    fn fetch_all_entries(&self) -> GuideResult<Vec<EpgEntry>> {
        let delay = {
            let mut data = self.data.write();
            data.fetch_count += 1;
            if !data.is_available {
                return Err(GuideError::group_unavailable_with_context(
                    format!("Group '{}' is not available", self.name),
                    ErrorContext::new("fetch_all_entries").with_group(self.key),
                ));
            }
            data.fetch_delay
        };

        if let Some(delay) = delay {
            thread::sleep(delay);
        }

        Ok(self.data.read().entries.clone())
    }
}
