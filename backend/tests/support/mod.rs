#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use parking_lot::{Condvar, Mutex};

use guide_timeline::api::{
    ChannelGroup, EpgEntry, GroupKey, GuideConfig, GuideEvent, GuideResult, NotificationSink,
};

static ENV_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the previous values on unwind and serializes access to the
/// process environment across parallel tests.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock();
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// `count` hour-long entries starting at `first_start`.
pub fn hourly_entries(count: usize, first_start: DateTime<Utc>) -> Vec<EpgEntry> {
    (0..count)
        .map(|i| EpgEntry {
            broadcast_id: i as u32,
            channel_id: (i % 3) as u32,
            title: format!("show-{}", i),
            start: first_start + ChronoDuration::hours(i as i64),
            end: first_start + ChronoDuration::hours(i as i64 + 1),
        })
        .collect()
}

/// Config with short intervals, so worker tests finish quickly.
pub fn fast_config() -> GuideConfig {
    let mut config = GuideConfig::default();
    config.worker.boost_interval_ms = 20;
    config.worker.steady_interval_ms = 40;
    config.worker.immediate_run_wait_ms = 500;
    config
}

/// Config whose sleep intervals outlast any test, so only explicit wakes
/// run a cycle after the first one.
pub fn sleepy_config() -> GuideConfig {
    let mut config = GuideConfig::default();
    config.worker.boost_interval_ms = 60_000;
    config.worker.steady_interval_ms = 60_000;
    config.worker.immediate_run_wait_ms = 2_000;
    config
}

/// Poll `condition` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// Sink that records every event it receives.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<GuideEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<GuideEvent> {
        self.events.lock().clone()
    }

    pub fn updates(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, GuideEvent::TimelineUpdated { .. }))
            .count()
    }

    pub fn invalidations(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, GuideEvent::GridInvalidated))
            .count()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, event: GuideEvent) {
        self.events.lock().push(event);
    }
}

#[derive(Default)]
struct GateState {
    entered: usize,
    released: bool,
    finished: usize,
}

/// Channel group whose fetch blocks until the test releases it.
#[derive(Clone)]
pub struct GatedGroup {
    key: GroupKey,
    entries: Vec<EpgEntry>,
    gate: Arc<(Mutex<GateState>, Condvar)>,
}

impl GatedGroup {
    pub fn new(key: GroupKey, entries: Vec<EpgEntry>) -> Self {
        Self {
            key,
            entries,
            gate: Arc::new((Mutex::new(GateState::default()), Condvar::new())),
        }
    }

    /// Block until a fetch is waiting at the gate.
    pub fn wait_entered(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.gate;
        let mut state = lock.lock();
        let deadline = Instant::now() + timeout;
        while state.entered == 0 {
            if cvar.wait_until(&mut state, deadline).timed_out() {
                return state.entered > 0;
            }
        }
        true
    }

    pub fn release(&self) {
        let (lock, cvar) = &*self.gate;
        lock.lock().released = true;
        cvar.notify_all();
    }

    pub fn finished(&self) -> usize {
        self.gate.0.lock().finished
    }
}

impl ChannelGroup for GatedGroup {
    fn key(&self) -> GroupKey {
        self.key
    }

    fn name(&self) -> &str {
        "gated"
    }

    fn first_available_date(&self) -> Option<DateTime<Utc>> {
        self.entries.first().map(|e| e.start)
    }

    fn last_available_date(&self) -> Option<DateTime<Utc>> {
        self.entries.last().map(|e| e.end)
    }

    fn fetch_all_entries(&self) -> GuideResult<Vec<EpgEntry>> {
        let (lock, cvar) = &*self.gate;
        let mut state = lock.lock();
        state.entered += 1;
        cvar.notify_all();
        while !state.released {
            cvar.wait(&mut state);
        }
        state.finished += 1;
        Ok(self.entries.clone())
    }
}
