//! Foreground notifications emitted by the guide.
//!
//! Notifications are hints: the foreground still polls
//! `RefreshCoordinator::take_pending_snapshot` on its own schedule, so a lost
//! or coalesced notification only delays the next repaint.

use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::mpsc;

use crate::models::GroupKey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GuideEvent {
    /// A new timeline was published and is waiting to be taken.
    TimelineUpdated { group: GroupKey, entries: usize },
    /// Timer state changed; the grid should repaint without new data.
    GridInvalidated,
}

/// Receiver of guide events. Must never block for long.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: GuideEvent);
}

impl<F> NotificationSink for F
where
    F: Fn(GuideEvent) + Send + Sync,
{
    fn notify(&self, event: GuideEvent) {
        self(event)
    }
}

/// Sink forwarding events into an mpsc channel.
pub struct ChannelNotifier {
    sender: mpsc::Sender<GuideEvent>,
}

impl ChannelNotifier {
    pub fn new(sender: mpsc::Sender<GuideEvent>) -> Self {
        Self { sender }
    }

    /// Create a notifier together with the receiving end.
    pub fn channel() -> (Self, mpsc::Receiver<GuideEvent>) {
        let (sender, receiver) = mpsc::channel();
        (Self::new(sender), receiver)
    }
}

impl NotificationSink for ChannelNotifier {
    fn notify(&self, event: GuideEvent) {
        if let Err(mpsc::SendError(event)) = self.sender.send(event) {
            debug!("guide event dropped, receiver gone: {:?}", event);
        }
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl NotificationSink for NullNotifier {
    fn notify(&self, _event: GuideEvent) {}
}
