// src/analyzer.rs

use crate::error::IndexError;
use crate::index::IntervalIndex;
use crate::model::*;
use crate::normalize::normalize_all;
use crate::spoilage::spoilage_series;
use crate::timeline::{closed_series, day_window, no_progress, open_series, DayHook};
use chrono::NaiveDate;
use tracing::{debug, info, instrument};

/// Normalize `records` against `today`, index them, and sweep out the open,
/// closed and spoiled series.
///
/// Bad records are skipped and listed in [`TimelineReport::rejected`]; only
/// an input with no usable record at all is an error.
pub fn analyze(records: &[IssueRecord], today: NaiveDate) -> Result<TimelineReport, IndexError> {
    analyze_with_progress(records, today, no_progress())
}

/// Like [`analyze`], calling `on_day` once per day for each of the three
/// sweeps, so `3 * window.len()` calls in total.
#[instrument(skip_all, fields(records = records.len(), today = %today))]
pub fn analyze_with_progress(
    records: &[IssueRecord],
    today: NaiveDate,
    on_day: DayHook<'_>,
) -> Result<TimelineReport, IndexError> {
    let (epoch, intervals, errors) = normalize_all(records, today);
    let rejected: Vec<Rejection> = errors
        .iter()
        .map(|e| Rejection { issue: Some(e.issue()), reason: e.to_string() })
        .collect();

    let widened = intervals.iter().filter(|iv| iv.was_widened).count();
    let index = IntervalIndex::build(intervals)?;
    debug!(?epoch, intervals = index.len(), widened, "built interval index");

    let window = day_window(&index)?;
    let open = open_series(&index, on_day)?;
    let closed = closed_series(&index, on_day)?;
    let spoiled = spoilage_series(&index, on_day)?;

    info!(
        days = window.len(),
        indexed = index.len(),
        rejected = rejected.len(),
        "aggregated issue timeline"
    );

    Ok(TimelineReport { window, open, closed, spoiled, rejected })
}
