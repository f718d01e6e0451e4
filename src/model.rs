// src/model.rs

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Whole calendar days since the epoch (earliest creation date in the input)
pub type Day = i64;

/// Issue number as reported by the tracker
pub type IssueId = u64;

/// A raw issue as loaded from the tracker dump.
///
/// Text fields accept any JSON value so that a wrong type surfaces as a
/// rejection of this record in the normalizer rather than a load failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    #[serde(rename = "number")]
    pub id: IssueId,
    #[serde(default)]
    pub comments: u64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub closed_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub state: Option<String>,
}

// null -> None, strings as-is, anything else as its JSON text
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    /// Exact, case-sensitive match against the tracker's state label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// The lifetime of one issue as a half-open day range `[begin, end)`.
///
/// Only the normalizer constructs these, so `begin < end` holds for every
/// value that reaches the index. `was_widened` marks intervals whose issue
/// was created and closed on the same day; their `end` was pushed out by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NormalizedInterval {
    pub issue: IssueId,
    pub begin: Day,
    pub end: Day,
    pub state: IssueState,
    pub was_widened: bool,
}

impl NormalizedInterval {
    pub(crate) fn new(issue: IssueId, begin: Day, end: Day, state: IssueState, was_widened: bool) -> Self {
        Self { issue, begin, end, state, was_widened }
    }

    /// Whether `[begin, end)` intersects `[start, stop)`
    pub fn overlaps(&self, start: Day, stop: Day) -> bool {
        self.begin < stop && start < self.end
    }

    /// True when the real (pre-widening) lifetime was at most one calendar day.
    pub fn lived_one_day(&self) -> bool {
        self.was_widened || self.end - self.begin <= 1
    }
}

/// Inclusive range of reported days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub first: Day,
    pub last: Day,
}

impl DayWindow {
    pub fn days(&self) -> std::ops::RangeInclusive<Day> {
        self.first..=self.last
    }

    pub fn len(&self) -> usize {
        usize::try_from(self.last - self.first + 1).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.last < self.first
    }
}

/// Dense day -> count mapping over a [`DayWindow`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DaySeries {
    counts: BTreeMap<Day, usize>,
}

impl DaySeries {
    pub fn get(&self, day: Day) -> Option<usize> {
        self.counts.get(&day).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Day, usize)> + '_ {
        self.counts.iter().map(|(&d, &c)| (d, c))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FromIterator<(Day, usize)> for DaySeries {
    fn from_iter<I: IntoIterator<Item = (Day, usize)>>(iter: I) -> Self {
        Self { counts: iter.into_iter().collect() }
    }
}

/// One day of the spoilage sweep. `number_open` is the number of issues
/// alive that day whose lifetime exceeds a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpoilageRecord {
    pub day: Day,
    pub number_open: usize,
}

/// A record that was refused, with the reason. `issue` is `None` when the
/// entry did not even carry a readable issue number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub issue: Option<IssueId>,
    pub reason: String,
}

/// The complete result of one aggregation run
#[derive(Debug, Clone, Serialize)]
pub struct TimelineReport {
    pub window: DayWindow,
    pub open: DaySeries,
    pub closed: DaySeries,
    pub spoiled: Vec<SpoilageRecord>,
    pub rejected: Vec<Rejection>,
}

impl TimelineReport {
    /// The spoilage records as a day series, for plotting next to open/closed.
    pub fn spoiled_series(&self) -> DaySeries {
        self.spoiled.iter().map(|r| (r.day, r.number_open)).collect()
    }
}
