//! Shared refresh state between the guide window and its refresh worker.
//!
//! Every field crossing the thread boundary lives behind one short-held
//! mutex. Critical sections only read or assign fields; the expensive
//! timeline computation always happens outside of them.

use log::debug;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::models::{ChannelGroup, GroupKey, Timeline};

#[derive(Debug, Default)]
struct CoordinatorState {
    /// Refresh requested but not yet claimed by the worker.
    dirty: bool,
    /// Group of the most recent published timeline.
    last_group: Option<GroupKey>,
    /// Latest timeline nobody has taken yet.
    pending: Option<Timeline>,
}

#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    state: Mutex<CoordinatorState>,
    displayed_items: AtomicUsize,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the timeline as out of date. Never blocks on a refresh.
    pub fn request_refresh(&self) {
        self.state.lock().dirty = true;
    }

    /// Read and clear the dirty flag in one step.
    ///
    /// Only the refresh worker calls this; a `true` result obliges it to run
    /// one refresh cycle. Requests made before the claim coalesce into it.
    pub fn claim_if_dirty(&self) -> bool {
        std::mem::take(&mut self.state.lock().dirty)
    }

    /// Store a freshly computed timeline, replacing any unclaimed one.
    pub fn publish(&self, snapshot: Timeline, group: &dyn ChannelGroup) {
        let key = group.key();
        let mut state = self.state.lock();
        if let Some(ref stale) = state.pending {
            debug!(
                "replacing unclaimed timeline for {} ({} entries)",
                stale.group(),
                stale.len()
            );
        }
        state.pending = Some(snapshot);
        state.last_group = Some(key);
    }

    /// Remove and return the pending timeline.
    ///
    /// `None` means "nothing new"; the caller keeps showing what it has.
    pub fn take_pending_snapshot(&self) -> Option<Timeline> {
        let snapshot = self.state.lock().pending.take()?;
        self.displayed_items.store(snapshot.len(), Ordering::Release);
        Some(snapshot)
    }

    /// True when a timeline was published before and `current` is a
    /// different group. The first refresh never counts as a change.
    pub fn detect_group_change(&self, current: &dyn ChannelGroup) -> bool {
        let current = current.key();
        matches!(self.state.lock().last_group, Some(last) if last != current)
    }

    /// Keep a copy of the displayed timeline for a quick reopen.
    ///
    /// Does nothing if a fresher timeline is already pending.
    pub fn stash_for_reuse(&self, snapshot: Timeline) -> bool {
        let mut state = self.state.lock();
        if state.pending.is_some() {
            return false;
        }
        state.pending = Some(snapshot);
        true
    }

    /// Forget the cached group and any pending timeline. Leaves the dirty
    /// flag alone.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.last_group = None;
        state.pending = None;
        self.displayed_items.store(0, Ordering::Release);
    }

    /// Item count of the timeline most recently handed to the foreground.
    pub fn displayed_item_count(&self) -> usize {
        self.displayed_items.load(Ordering::Acquire)
    }

    pub fn is_dirty(&self) -> bool {
        self.state.lock().dirty
    }

    pub fn has_pending(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    pub fn last_group(&self) -> Option<GroupKey> {
        self.state.lock().last_group
    }
}
