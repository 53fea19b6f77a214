//! Channel group providers.
//!
//! Production providers live with the EPG backend; this crate only ships the
//! in-memory implementation used for tests and the demo driver.
pub mod local;

pub use local::LocalChannelGroup;
