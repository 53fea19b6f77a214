//! # Guide Timeline
//!
//! Background timeline refresh for an electronic program guide grid.
//!
//! Building the guide's timeline (every schedule entry of the selected
//! channel group, clamped to a display window) is expensive. This crate moves
//! that work onto a dedicated worker thread and hands results to the
//! foreground through a small coordinator, so the UI thread never blocks on a
//! data fetch.
//!
//! ## Architecture
//!
//! - [`models`]: channel groups, schedule entries, display windows, timelines
//! - [`services`]: the refresh coordinator, worker thread, adaptive cadence
//!   and foreground notifications
//! - [`window`]: the guide window lifecycle controller tying them together
//! - [`providers`]: in-memory channel group provider
//! - [`config`]: TOML and environment configuration
//! - [`api`]: consolidated re-exports for embedders
//!
//! ## Threading
//!
//! Requests coalesce into a single dirty flag. The worker claims it, computes
//! without holding any lock, and publishes the result; only the latest
//! unclaimed timeline is kept. The foreground takes it on its next pass.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod providers;
pub mod services;
pub mod window;


pub use error::{ErrorContext, GuideError, GuideResult};
