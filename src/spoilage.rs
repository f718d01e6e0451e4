// src/spoilage.rs

use crate::error::IndexError;
use crate::index::IntervalIndex;
use crate::model::*;
use crate::timeline::{day_window, DayHook};
use rayon::prelude::*;

/// Whether `interval` counts as spoiled while it is alive: its real lifetime
/// spans more than one calendar day. Widened same-day intervals never do.
pub fn is_spoiling(interval: &NormalizedInterval) -> bool {
    !interval.lived_one_day()
}

/// Per day of the window, the number of alive issues that stayed unresolved
/// longer than a single day. Open and closed issues are both eligible.
pub fn spoilage_series(index: &IntervalIndex, on_day: DayHook<'_>) -> Result<Vec<SpoilageRecord>, IndexError> {
    let window = day_window(index)?;
    let mut records: Vec<SpoilageRecord> = window
        .days()
        .into_par_iter()
        .map(|day| {
            // Day offsets before the epoch carry no issues; query day 0 instead.
            let query_day = day.max(0);
            let record = SpoilageRecord {
                day,
                number_open: index.count_at(query_day, is_spoiling),
            };
            on_day(day);
            record
        })
        .collect();
    records.sort_unstable_by_key(|r| r.day);
    Ok(records)
}
