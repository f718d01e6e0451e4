// src/timeline.rs

use crate::error::IndexError;
use crate::index::IntervalIndex;
use crate::model::*;
use rayon::prelude::*;
use tracing::debug;

/// Called once for every day a sweep finishes; may run on any rayon worker.
///
/// The hook is per sweep, not per run: handing the same hook to the open,
/// closed and spoilage sweeps (as [`crate::analyze_with_progress`] does)
/// calls it three times for each day of the window.
pub type DayHook<'a> = &'a (dyn Fn(Day) + Sync);

fn ignore_day(_: Day) {}

/// A hook that ignores every day.
pub fn no_progress() -> DayHook<'static> {
    &ignore_day
}

/// The reported days: every day from the first creation through the last
/// `end`, minus that final boundary day when nothing is alive on it.
///
/// Since intervals are half-open the boundary day is always empty, so in
/// practice the window is `[min_begin, max_end - 1]`.
pub fn day_window(index: &IntervalIndex) -> Result<DayWindow, IndexError> {
    let first = index.global_min_begin()?;
    let max_end = index.global_max_end()?;
    let last = if index.count_at(max_end, |_| true) == 0 { max_end - 1 } else { max_end };
    debug!(first, last, intervals = index.len(), "resolved day window");
    Ok(DayWindow { first, last })
}

/// Count, per day of the window, the intervals alive that day matching `keep`.
pub fn count_series<F>(index: &IntervalIndex, keep: F, on_day: DayHook<'_>) -> Result<DaySeries, IndexError>
where
    F: Fn(&NormalizedInterval) -> bool + Sync,
{
    let window = day_window(index)?;
    Ok(window
        .days()
        .into_par_iter()
        .map(|day| {
            let count = index.count_at(day, &keep);
            on_day(day);
            (day, count)
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect())
}

pub fn open_series(index: &IntervalIndex, on_day: DayHook<'_>) -> Result<DaySeries, IndexError> {
    count_series(index, |iv| iv.state == IssueState::Open, on_day)
}

pub fn closed_series(index: &IntervalIndex, on_day: DayHook<'_>) -> Result<DaySeries, IndexError> {
    count_series(index, |iv| iv.state == IssueState::Closed, on_day)
}
