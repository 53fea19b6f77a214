//! Guide window lifecycle controller.
//!
//! [`GuideWindow`] is the foreground half of the refresh design. It owns the
//! displayed timeline, forwards observer traffic to the
//! [`RefreshCoordinator`] and controls the lifetime of the
//! [`TimelineWorker`]. None of its methods compute a timeline; they only
//! request one, wake the worker, or swap in whatever the worker published.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::GuideConfig;
use crate::error::GuideResult;
use crate::models::{ChannelGroup, GroupKey, GroupSelection, Timeline};
use crate::services::{GuideEvent, NotificationSink, RefreshCoordinator, TimelineWorker, WorkerState};

/// Observer messages delivered to the guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservableMessage {
    Epg,
    EpgContainer,
    ChannelGroup,
    ChannelGroupReset,
    ChannelGroupsLoaded,
    Timers,
    TimersReset,
    Recordings,
}

impl ObservableMessage {
    /// Messages that make the current timeline stale.
    pub fn invalidates_timeline(self) -> bool {
        matches!(
            self,
            Self::Epg | Self::EpgContainer | Self::ChannelGroupReset | Self::ChannelGroup
        )
    }
}

pub struct GuideWindow {
    worker: Option<TimelineWorker>,
    coordinator: Arc<RefreshCoordinator>,
    selection: GroupSelection,
    sink: Arc<dyn NotificationSink>,
    config: GuideConfig,
    displayed: Option<Timeline>,
    open: bool,
}

impl GuideWindow {
    pub fn new(config: GuideConfig, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            worker: None,
            coordinator: Arc::new(RefreshCoordinator::new()),
            selection: GroupSelection::new(),
            sink,
            config,
            displayed: None,
            open: false,
        }
    }

    /// Make `group` the active channel group.
    ///
    /// No refresh is requested here; the next [`update`](Self::update)
    /// notices the change and forces one.
    pub fn select_group(&self, group: Arc<dyn ChannelGroup>) {
        info!("channel group selected: '{}' ({})", group.name(), group.key());
        self.selection.select(group);
    }

    /// Open the window.
    ///
    /// Without a selected group the window waits for
    /// [`ObservableMessage::ChannelGroupsLoaded`] before starting the worker.
    pub fn open(&mut self) -> GuideResult<()> {
        self.open = true;
        if self.selection.current().is_none() {
            debug!("no channel group yet, deferring guide init");
            return Ok(());
        }
        self.init_timeline()
    }

    /// Close the window. Blocks until the worker has exited.
    ///
    /// The displayed timeline is released, but kept in the coordinator so
    /// the next [`open`](Self::open) can show it straight away. A fresher
    /// unclaimed timeline wins over it.
    pub fn close(&mut self) {
        self.stop_worker();
        self.open = false;

        if let Some(displayed) = self.displayed.take() {
            let count = displayed.len();
            if self.coordinator.stash_for_reuse(displayed) {
                debug!("stashed {} entries for reopen", count);
            }
        }
    }

    /// Drop displayed data and the coordinator's cached group and snapshot.
    pub fn clear_data(&mut self) {
        self.coordinator.reset();
        self.displayed = None;
    }

    /// Observer callback. Returns `true` if the message requested a refresh.
    pub fn notify(&self, message: ObservableMessage) -> bool {
        if !message.invalidates_timeline() {
            return false;
        }
        debug!("refresh requested by {:?}", message);
        self.coordinator.request_refresh();
        true
    }

    /// Foreground handler for refresh-list messages.
    ///
    /// Returns whether the displayed timeline changed.
    pub fn on_refresh_list(&mut self, message: ObservableMessage) -> GuideResult<bool> {
        match message {
            ObservableMessage::ChannelGroupsLoaded => {
                if self.open && self.selection.current().is_some() {
                    self.init_timeline()?;
                }
                Ok(false)
            }
            ObservableMessage::Epg
            | ObservableMessage::EpgContainer
            | ObservableMessage::ChannelGroup
            | ObservableMessage::ChannelGroupReset => Ok(self.update()),
            ObservableMessage::Timers | ObservableMessage::TimersReset => {
                self.sink.notify(GuideEvent::GridInvalidated);
                Ok(false)
            }
            ObservableMessage::Recordings => Ok(false),
        }
    }

    /// The grid switched view mode; rebuild data for the new view.
    pub fn change_view_mode(&mut self) -> GuideResult<bool> {
        self.coordinator.request_refresh();
        self.start_worker()?;
        Ok(self.update())
    }

    /// Swap in the latest published timeline.
    ///
    /// A group change since the last publish forces a refresh and waits
    /// briefly for the worker. Returns `true` if the displayed timeline was
    /// replaced; otherwise the previous data stays on screen.
    pub fn update(&mut self) -> bool {
        let group_changed = self
            .selection
            .current()
            .is_some_and(|group| self.coordinator.detect_group_change(group.as_ref()));

        // The coordinator lock is released here; the worker needs it.
        if group_changed {
            self.coordinator.request_refresh();
            if let Some(ref worker) = self.worker {
                if !worker.request_immediate_run() {
                    debug!("forced refresh still running, showing previous data");
                }
            }
        }

        match self.coordinator.take_pending_snapshot() {
            Some(timeline) => {
                debug!("displaying {} entries for {}", timeline.len(), timeline.group());
                self.displayed = Some(timeline);
                true
            }
            None => false,
        }
    }

    pub fn displayed(&self) -> Option<&Timeline> {
        self.displayed.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn selected_group(&self) -> Option<GroupKey> {
        self.selection.current_key()
    }

    pub fn worker_state(&self) -> Option<WorkerState> {
        self.worker.as_ref().map(TimelineWorker::state)
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    fn init_timeline(&mut self) -> GuideResult<()> {
        // A timeline stashed by close() counts as data.
        if self.displayed.is_none() && !self.coordinator.has_pending() {
            self.coordinator.request_refresh();
        }
        self.start_worker()
    }

    fn start_worker(&mut self) -> GuideResult<()> {
        self.stop_worker();
        let mut worker = TimelineWorker::new(
            Arc::clone(&self.coordinator),
            self.selection.clone(),
            Arc::clone(&self.sink),
            &self.config,
        );
        worker.start()?;
        self.worker = Some(worker);
        Ok(())
    }

    fn stop_worker(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.stop();
        }
    }
}

impl Drop for GuideWindow {
    fn drop(&mut self) {
        self.stop_worker();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::NullNotifier;

    #[test]
    fn test_invalidating_messages() {
        assert!(ObservableMessage::Epg.invalidates_timeline());
        assert!(ObservableMessage::EpgContainer.invalidates_timeline());
        assert!(ObservableMessage::ChannelGroup.invalidates_timeline());
        assert!(ObservableMessage::ChannelGroupReset.invalidates_timeline());
        assert!(!ObservableMessage::ChannelGroupsLoaded.invalidates_timeline());
        assert!(!ObservableMessage::Timers.invalidates_timeline());
        assert!(!ObservableMessage::Recordings.invalidates_timeline());
    }

    #[test]
    fn test_notify_marks_dirty() {
        let window = GuideWindow::new(GuideConfig::default(), Arc::new(NullNotifier));
        assert!(!window.notify(ObservableMessage::Timers));
        assert!(!window.coordinator().is_dirty());

        assert!(window.notify(ObservableMessage::EpgContainer));
        assert!(window.coordinator().is_dirty());
    }

    #[test]
    fn test_open_without_group_defers_worker() {
        let mut window = GuideWindow::new(GuideConfig::default(), Arc::new(NullNotifier));
        window.open().unwrap();
        assert!(window.is_open());
        assert!(window.worker_state().is_none());
        assert!(!window.coordinator().is_dirty());
    }

    #[test]
    fn test_message_serialization() {
        let json = serde_json::to_string(&ObservableMessage::ChannelGroupsLoaded).unwrap();
        assert_eq!(json, "\"channel_groups_loaded\"");
    }
}
