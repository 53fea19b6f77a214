//! Guide timeline demo driver.
//!
//! Runs a [`GuideWindow`] against two in-memory channel groups. A feeder
//! thread keeps appending schedule entries and firing EPG notifications while
//! the foreground loop drains guide events and updates the displayed
//! timeline. Half way through, the window switches to the second group.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug GUIDE_DEMO_SECONDS=6 cargo run --bin guide-demo
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log level (default: info)
//! - `GUIDE_CONFIG`: Path to a TOML config file (default: search `guide.toml`)
//! - `GUIDE_DEMO_SECONDS`: Run time in seconds (default: 4)

use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::{Duration as ChronoDuration, Utc};
use serde::Serialize;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use guide_timeline::api::{
    ChannelGroup, ChannelNotifier, EpgEntry, GroupKey, GuideConfig, GuideEvent, GuideStatus, GuideWindow,
    LocalChannelGroup, ObservableMessage,
};

#[derive(Debug, Serialize)]
struct DemoSummary {
    seconds: u64,
    timeline_updates: usize,
    grid_invalidations: usize,
    displayed_swaps: usize,
    fetches: Vec<(GroupKey, usize)>,
    status: GuideStatus,
}

fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_names(true)
        .init();

    let config = load_config()?;
    let seconds: u64 = env::var("GUIDE_DEMO_SECONDS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(4);
    info!("Starting guide demo for {}s", seconds);

    let now = Utc::now();
    let sports = LocalChannelGroup::with_entries(GroupKey::tv(1), "Sports", schedule(0, 24, now));
    let news = LocalChannelGroup::with_entries(GroupKey::tv(2), "News", schedule(1000, 12, now));
    sports.set_fetch_delay(Some(Duration::from_millis(50)));

    let (notifier, events) = ChannelNotifier::channel();
    let mut window = GuideWindow::new(config, Arc::new(notifier));
    window.open()?;
    window.select_group(Arc::new(sports.clone()));
    window.on_refresh_list(ObservableMessage::ChannelGroupsLoaded)?;

    let (messages_tx, messages_rx) = mpsc::channel();
    let running = Arc::new(AtomicBool::new(true));
    let feeder = spawn_feeder(sports.clone(), messages_tx, Arc::clone(&running))?;

    let mut summary = DemoSummary {
        seconds,
        timeline_updates: 0,
        grid_invalidations: 0,
        displayed_swaps: 0,
        fetches: Vec::new(),
        status: GuideStatus::of(&window),
    };

    let deadline = Instant::now() + Duration::from_secs(seconds);
    let switch_at = Instant::now() + Duration::from_secs(seconds / 2);
    let mut switched = false;

    while Instant::now() < deadline {
        while let Ok(message) = messages_rx.try_recv() {
            window.notify(message);
            if window.on_refresh_list(message)? {
                summary.displayed_swaps += 1;
            }
        }

        match events.recv_timeout(Duration::from_millis(100)) {
            Ok(GuideEvent::TimelineUpdated { group, entries }) => {
                summary.timeline_updates += 1;
                info!("timeline updated for {}: {} entries", group, entries);
                if window.update() {
                    summary.displayed_swaps += 1;
                }
            }
            Ok(GuideEvent::GridInvalidated) => summary.grid_invalidations += 1,
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        if !switched && Instant::now() >= switch_at {
            switched = true;
            window.select_group(Arc::new(news.clone()));
            if window.update() {
                summary.displayed_swaps += 1;
            }
        }
    }

    running.store(false, Ordering::Release);
    if feeder.join().is_err() {
        warn!("feeder thread panicked");
    }

    window.close();
    summary.fetches = vec![
        (sports.key(), sports.fetch_count()),
        (news.key(), news.fetch_count()),
    ];
    summary.status = GuideStatus::of(&window);

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn load_config() -> anyhow::Result<GuideConfig> {
    let config = match env::var("GUIDE_CONFIG") {
        Ok(path) => GuideConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {}", path))?
            .with_env_overrides()?,
        Err(_) => match GuideConfig::from_default_location() {
            Ok(config) => config.with_env_overrides()?,
            Err(e) => {
                info!("Using default configuration: {}", e);
                GuideConfig::from_env()?
            }
        },
    };
    Ok(config)
}

fn schedule(first_id: u32, hours: i64, now: chrono::DateTime<Utc>) -> Vec<EpgEntry> {
    (0..hours)
        .map(|h| EpgEntry {
            broadcast_id: first_id + h as u32,
            channel_id: (h % 3) as u32,
            title: format!("Programme {}", first_id + h as u32),
            start: now + ChronoDuration::hours(h),
            end: now + ChronoDuration::hours(h + 1),
        })
        .collect()
}

fn spawn_feeder(
    group: LocalChannelGroup,
    messages: mpsc::Sender<ObservableMessage>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<thread::JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name("guide-demo-feeder".to_string())
        .spawn(move || {
            let mut next_id = 500;
            let mut tick = 0u32;
            while running.load(Ordering::Acquire) {
                thread::sleep(Duration::from_millis(300));
                let start = Utc::now() + ChronoDuration::days(1) + ChronoDuration::minutes(next_id as i64);
                group.push_entries([EpgEntry {
                    broadcast_id: next_id,
                    channel_id: 0,
                    title: format!("Late addition {}", next_id),
                    start,
                    end: start + ChronoDuration::minutes(30),
                }]);
                next_id += 1;
                tick += 1;

                let message = if tick % 5 == 0 {
                    ObservableMessage::Timers
                } else {
                    ObservableMessage::Epg
                };
                if messages.send(message).is_err() {
                    break;
                }
            }
        })
        .context("failed to spawn feeder thread")?;
    Ok(handle)
}
