use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::group::GroupKey;

/// One schedule entry (a broadcast on a channel).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpgEntry {
    pub broadcast_id: u32,
    pub channel_id: u32,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Resolved date range the guide grid displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DisplayWindow {
    /// Resolve the display window from a group's available date range.
    ///
    /// Unknown start falls back to `now`; an unknown end, or one before the
    /// start, collapses to the start. The start is then limited to
    /// `past_days` before `now`. If that pushes the start past the end, the
    /// end follows the start.
    pub fn clamp(
        first: Option<DateTime<Utc>>,
        last: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        past_days: u32,
    ) -> Self {
        let mut start = first.unwrap_or(now);
        let mut end = match last {
            Some(last) if last >= start => last,
            _ => start,
        };

        // A retention too large to represent leaves the start unclamped.
        let max_past = Duration::try_days(i64::from(past_days))
            .and_then(|days| now.checked_sub_signed(days))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        if start < max_past {
            start = max_past;
        }
        if end < start {
            end = start;
        }

        Self { start, end }
    }
}

/// Immutable result of one refresh cycle.
///
/// Ownership moves worker -> coordinator -> foreground; nothing mutates a
/// timeline after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    group: GroupKey,
    entries: Vec<EpgEntry>,
    window: DisplayWindow,
    computed_at: DateTime<Utc>,
}

impl Timeline {
    pub fn new(
        group: GroupKey,
        entries: Vec<EpgEntry>,
        window: DisplayWindow,
        computed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            group,
            entries,
            window,
            computed_at,
        }
    }

    pub fn group(&self) -> GroupKey {
        self.group
    }

    pub fn entries(&self) -> &[EpgEntry] {
        &self.entries
    }

    pub fn window(&self) -> DisplayWindow {
        self.window
    }

    pub fn computed_at(&self) -> DateTime<Utc> {
        self.computed_at
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries overlapping the display window.
    pub fn visible_entries(&self) -> impl Iterator<Item = &EpgEntry> {
        let window = self.window;
        self.entries
            .iter()
            .filter(move |e| e.end >= window.start && e.start <= window.end)
    }
}
