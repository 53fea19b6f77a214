//! Channel groups: the set of channels a timeline is scoped to.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::timeline::EpgEntry;
use crate::error::GuideResult;

/// Value identity of a channel group.
///
/// Two groups are the same group iff their keys are equal, regardless of
/// which handle or provider object they were obtained through.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    pub radio: bool,
    pub id: u32,
}

impl GroupKey {
    pub fn new(radio: bool, id: u32) -> Self {
        Self { radio, id }
    }

    pub fn tv(id: u32) -> Self {
        Self::new(false, id)
    }

    pub fn radio(id: u32) -> Self {
        Self::new(true, id)
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.radio { "radio" } else { "tv" };
        write!(f, "{}/{}", kind, self.id)
    }
}

/// Data provider for one channel group.
///
/// `first_available_date`/`last_available_date` must be cheap; they are
/// called once per refresh cycle. `fetch_all_entries` may be slow and is
/// always called without any lock of this crate held.
pub trait ChannelGroup: Send + Sync {
    /// Value identity used for change detection.
    fn key(&self) -> GroupKey;

    /// Display name, used in log lines and headers.
    fn name(&self) -> &str;

    /// Start of the earliest known entry, `None` when unknown.
    fn first_available_date(&self) -> Option<DateTime<Utc>>;

    /// End of the latest known entry, `None` when unknown.
    fn last_available_date(&self) -> Option<DateTime<Utc>>;

    /// Produce every schedule entry of the group, ordered by start time.
    fn fetch_all_entries(&self) -> GuideResult<Vec<EpgEntry>>;
}

impl PartialEq for dyn ChannelGroup {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for dyn ChannelGroup {}

impl fmt::Debug for dyn ChannelGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelGroup")
            .field("key", &self.key())
            .field("name", &self.name())
            .finish()
    }
}

/// Shared handle to the currently selected channel group.
///
/// The window writes it when the user switches groups; the refresh worker
/// reads it at the start of every cycle.
#[derive(Clone, Default)]
pub struct GroupSelection {
    inner: Arc<RwLock<Option<Arc<dyn ChannelGroup>>>>,
}

impl GroupSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&self, group: Arc<dyn ChannelGroup>) {
        *self.inner.write() = Some(group);
    }

    pub fn clear(&self) {
        *self.inner.write() = None;
    }

    /// The selected group, if any.
    pub fn current(&self) -> Option<Arc<dyn ChannelGroup>> {
        self.inner.read().clone()
    }

    pub fn current_key(&self) -> Option<GroupKey> {
        self.inner.read().as_ref().map(|g| g.key())
    }
}

impl fmt::Debug for GroupSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupSelection")
            .field("current", &self.current_key())
            .finish()
    }
}
