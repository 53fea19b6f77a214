//! Public API surface of the guide timeline crate.
//!
//! This file consolidates the types an embedder needs to drive a guide
//! window: the window itself, its configuration, the data model, and the
//! notification types.

pub use crate::config::{GuideConfig, TimelineSettings, WorkerSettings};
pub use crate::error::{ErrorContext, GuideError, GuideResult};
pub use crate::models::ChannelGroup;
pub use crate::models::DisplayWindow;
pub use crate::models::EpgEntry;
pub use crate::models::GroupKey;
pub use crate::models::GroupSelection;
pub use crate::models::Timeline;
pub use crate::providers::LocalChannelGroup;
pub use crate::services::ChannelNotifier;
pub use crate::services::GuideEvent;
pub use crate::services::NotificationSink;
pub use crate::services::NullNotifier;
pub use crate::services::WorkerState;
pub use crate::window::{GuideWindow, ObservableMessage};

use serde::{Deserialize, Serialize};

/// Snapshot of a guide window's state, suitable for logging or reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideStatus {
    pub open: bool,
    pub selected_group: Option<GroupKey>,
    pub displayed_group: Option<GroupKey>,
    pub displayed_entries: usize,
    /// Displayed entries overlapping the display window.
    pub visible_entries: usize,
    pub displayed_window: Option<DisplayWindow>,
    pub worker_running: bool,
}

impl GuideStatus {
    pub fn of(window: &GuideWindow) -> Self {
        let displayed = window.displayed();
        Self {
            open: window.is_open(),
            selected_group: window.selected_group(),
            displayed_group: displayed.map(Timeline::group),
            displayed_entries: displayed.map_or(0, Timeline::len),
            visible_entries: displayed.map_or(0, |t| t.visible_entries().count()),
            displayed_window: displayed.map(Timeline::window),
            worker_running: matches!(
                window.worker_state(),
                Some(WorkerState::Running | WorkerState::Sleeping)
            ),
        }
    }
}
