//! Service layer for timeline refresh.
//!
//! This module contains the pieces that keep the guide's timeline fresh:
//! the shared [`coordinator::RefreshCoordinator`], the background
//! [`timeline_worker::TimelineWorker`] driving it, and the supporting
//! cadence, signalling and notification types.

pub mod cadence;
pub mod coordinator;
pub mod notifier;
pub mod signal;
pub mod timeline_worker;



pub use cadence::RefreshCadence;
pub use coordinator::RefreshCoordinator;
pub use notifier::{ChannelNotifier, GuideEvent, NotificationSink, NullNotifier};
pub use signal::Event;
pub use timeline_worker::{RefreshOutcome, TimelineRefresher, TimelineWorker, WorkerState};
