// src/normalize.rs

use crate::error::MalformedRecordError;
use crate::model::*;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::warn;

/// Parse a tracker timestamp down to its calendar date.
///
/// Accepts RFC 3339 (`2021-03-04T12:00:00Z`), a naive date-time, or a bare
/// date. The time of day is discarded.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// The earliest parsable creation date across all records.
pub fn find_epoch(records: &[IssueRecord]) -> Option<NaiveDate> {
    records
        .iter()
        .filter_map(|r| r.created_at.as_deref().and_then(parse_day))
        .min()
}

fn days_between(epoch: NaiveDate, date: NaiveDate) -> Day {
    (date - epoch).num_days()
}

fn required_day(
    record: &IssueRecord,
    field: &'static str,
    value: Option<&str>,
) -> Result<NaiveDate, MalformedRecordError> {
    let value = value.ok_or(MalformedRecordError::MissingTimestamp { issue: record.id, field })?;
    parse_day(value).ok_or_else(|| MalformedRecordError::UnparsableTimestamp {
        issue: record.id,
        field,
        value: value.to_string(),
    })
}

/// Convert one record into its lifetime interval relative to `epoch`.
///
/// Open issues end at `today`. A same-day lifetime is widened to `[b, b + 1)`
/// and flagged.
pub fn normalize(
    record: &IssueRecord,
    epoch: NaiveDate,
    today: NaiveDate,
) -> Result<NormalizedInterval, MalformedRecordError> {
    let label = record.state.as_deref().ok_or(MalformedRecordError::MissingState { issue: record.id })?;
    let state = IssueState::from_label(label).ok_or_else(|| MalformedRecordError::UnknownState {
        issue: record.id,
        label: label.to_string(),
    })?;

    let created = required_day(record, "created_at", record.created_at.as_deref())?;
    let ended = match state {
        IssueState::Closed => required_day(record, "closed_at", record.closed_at.as_deref())?,
        IssueState::Open => today,
    };

    let begin = days_between(epoch, created);
    let end = days_between(epoch, ended);
    if end < begin {
        return Err(MalformedRecordError::EndsBeforeBegin { issue: record.id, begin, end });
    }

    let was_widened = begin == end;
    let end = if was_widened { end + 1 } else { end };
    Ok(NormalizedInterval::new(record.id, begin, end, state, was_widened))
}

/// Normalize every record against a shared epoch, splitting the good from the bad.
///
/// Returns `None` for the epoch when no record carries a usable creation date.
pub fn normalize_all(
    records: &[IssueRecord],
    today: NaiveDate,
) -> (Option<NaiveDate>, Vec<NormalizedInterval>, Vec<MalformedRecordError>) {
    let found = find_epoch(records);
    // Without an epoch every record is bound to fail on its creation date;
    // normalizing against `today` still yields the precise reason.
    let epoch = found.unwrap_or(today);

    let mut intervals = Vec::with_capacity(records.len());
    let mut errors = Vec::new();
    for record in records {
        match normalize(record, epoch, today) {
            Ok(interval) => intervals.push(interval),
            Err(e) => {
                warn!(issue = record.id, "skipping record: {e}");
                errors.push(e);
            }
        }
    }
    (found, intervals, errors)
}
