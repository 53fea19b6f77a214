//! Background timeline refresh worker.
//!
//! One dedicated thread per guide window. Each iteration it asks the
//! coordinator whether a refresh is due, rebuilds the timeline for the
//! selected group without holding any lock, publishes it, notifies the
//! foreground and then sleeps for an adaptive interval. The sleep can be cut
//! short by [`TimelineWorker::request_immediate_run`] or by
//! [`TimelineWorker::stop`], which joins the thread before returning.

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::cadence::RefreshCadence;
use super::coordinator::RefreshCoordinator;
use super::notifier::{GuideEvent, NotificationSink};
use super::signal::Event;
use crate::config::{GuideConfig, WorkerSettings};
use crate::error::{GuideError, GuideResult};
use crate::models::{DisplayWindow, GroupKey, GroupSelection, Timeline};

const THREAD_NAME: &str = "epg-grid-refresh-timeline";

/// What a completed refresh cycle published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub group: GroupKey,
    pub entries: usize,
}

/// Runs a single refresh cycle against the coordinator.
pub struct TimelineRefresher {
    coordinator: Arc<RefreshCoordinator>,
    selection: GroupSelection,
    past_days: u32,
}

impl TimelineRefresher {
    pub fn new(coordinator: Arc<RefreshCoordinator>, selection: GroupSelection, past_days: u32) -> Self {
        Self {
            coordinator,
            selection,
            past_days,
        }
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    /// Refresh the timeline if one was requested.
    ///
    /// Returns `Ok(None)` when nothing was due. On error the request stays
    /// claimed; the next request or forced run retries.
    pub fn refresh(&self, now: DateTime<Utc>) -> GuideResult<Option<RefreshOutcome>> {
        if !self.coordinator.claim_if_dirty() {
            return Ok(None);
        }

        let group = self.selection.current().ok_or_else(|| {
            GuideError::group_unavailable("no channel group selected").with_operation("refresh")
        })?;
        let key = group.key();

        // Can be very expensive. Never call with a lock held.
        let entries = group.fetch_all_entries().map_err(|e| e.with_group(key))?;

        let window = DisplayWindow::clamp(
            group.first_available_date(),
            group.last_available_date(),
            now,
            self.past_days,
        );
        let timeline = Timeline::new(key, entries, window, now);
        let outcome = RefreshOutcome {
            group: key,
            entries: timeline.len(),
        };

        self.coordinator.publish(timeline, group.as_ref());
        debug!(
            "published timeline for '{}' ({}): {} entries, window {} .. {}",
            group.name(),
            key,
            outcome.entries,
            window.start,
            window.end
        );
        Ok(Some(outcome))
    }
}

/// Lifecycle of a [`TimelineWorker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Running,
    Sleeping,
    Stopping,
    Stopped,
}

struct WorkerShared {
    state: Mutex<WorkerState>,
    stop: AtomicBool,
    wake: Event,
    done: Event,
}

impl WorkerShared {
    fn enter(&self, next: WorkerState) {
        let mut state = self.state.lock();
        // Stopping is only left by the final transition to Stopped.
        if *state == WorkerState::Stopping && next != WorkerState::Stopped {
            return;
        }
        *state = next;
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

pub struct TimelineWorker {
    refresher: Arc<TimelineRefresher>,
    sink: Arc<dyn NotificationSink>,
    settings: WorkerSettings,
    shared: Arc<WorkerShared>,
    handle: Option<JoinHandle<()>>,
}

impl TimelineWorker {
    pub fn new(
        coordinator: Arc<RefreshCoordinator>,
        selection: GroupSelection,
        sink: Arc<dyn NotificationSink>,
        config: &GuideConfig,
    ) -> Self {
        let refresher = TimelineRefresher::new(
            coordinator,
            selection,
            config.timeline.past_days_to_display,
        );
        Self {
            refresher: Arc::new(refresher),
            sink,
            settings: config.worker.clone(),
            shared: Arc::new(WorkerShared {
                state: Mutex::new(WorkerState::Idle),
                stop: AtomicBool::new(false),
                wake: Event::new(),
                done: Event::new(),
            }),
            handle: None,
        }
    }

    /// Spawn the refresh loop. A worker starts at most once; calling this in
    /// any state other than `Idle` does nothing.
    pub fn start(&mut self) -> GuideResult<()> {
        {
            let mut state = self.shared.state.lock();
            if *state != WorkerState::Idle {
                debug!("timeline worker start ignored in state {:?}", *state);
                return Ok(());
            }
            *state = WorkerState::Running;
        }

        let refresher = Arc::clone(&self.refresher);
        let sink = Arc::clone(&self.sink);
        let shared = Arc::clone(&self.shared);
        let cadence = RefreshCadence::from_settings(&self.settings);

        let spawned = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || run_loop(refresher, sink, shared, cadence));

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                info!("timeline refresh worker started");
                Ok(())
            }
            Err(e) => {
                *self.shared.state.lock() = WorkerState::Stopped;
                Err(GuideError::worker(format!("failed to spawn {}: {}", THREAD_NAME, e))
                    .with_operation("start"))
            }
        }
    }

    /// Stop the loop and join its thread.
    ///
    /// Blocks until an in-flight refresh cycle has finished. Idempotent.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            let mut state = self.shared.state.lock();
            if *state == WorkerState::Idle {
                *state = WorkerState::Stopped;
            }
            return;
        };

        self.shared.stop.store(true, Ordering::Release);
        self.shared.enter(WorkerState::Stopping);
        // Wake the loop so it can observe the stop flag.
        self.shared.wake.set();

        if handle.join().is_err() {
            error!("timeline refresh worker panicked");
        }
        self.shared.enter(WorkerState::Stopped);
        info!("timeline refresh worker stopped");
    }

    /// Wake the worker now and wait briefly for the cycle to complete.
    ///
    /// Returns `true` if a cycle completed within the configured wait. A
    /// `false` result is not an error: the cycle still runs, the caller just
    /// stops waiting for it.
    pub fn request_immediate_run(&self) -> bool {
        if self.handle.is_none() || self.shared.stop_requested() {
            return false;
        }
        self.shared.done.reset();
        self.shared.wake.set();
        self.shared.done.wait_timeout(self.settings.immediate_run_wait())
    }

    pub fn state(&self) -> WorkerState {
        *self.shared.state.lock()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state(), WorkerState::Running | WorkerState::Sleeping)
    }
}

impl Drop for TimelineWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(
    refresher: Arc<TimelineRefresher>,
    sink: Arc<dyn NotificationSink>,
    shared: Arc<WorkerShared>,
    mut cadence: RefreshCadence,
) {
    while !shared.stop_requested() {
        shared.enter(WorkerState::Running);
        shared.done.reset();

        match refresher.refresh(Utc::now()) {
            Ok(Some(outcome)) if !shared.stop_requested() => {
                sink.notify(GuideEvent::TimelineUpdated {
                    group: outcome.group,
                    entries: outcome.entries,
                });
            }
            Ok(_) => {}
            Err(e) => warn!("timeline refresh skipped: {}", e),
        }

        if shared.stop_requested() {
            break;
        }

        shared.done.set();

        let interval = cadence.next_interval(refresher.coordinator().displayed_item_count());
        debug!(
            "timeline worker sleeping {:?} ({})",
            interval,
            if cadence.is_boosted() { "boost" } else { "steady" }
        );
        shared.enter(WorkerState::Sleeping);
        shared.wake.wait_and_reset(interval);
    }

    shared.wake.reset();
    shared.done.set();
}
