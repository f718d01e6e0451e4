// src/lib.rs

//! Daily open, closed and spoiled issue counts from issue-tracker lifetimes.
//!
//! Each issue becomes a half-open day interval ([`normalize`]), the intervals
//! go into a static interval tree ([`index`]), and per-day sweeps over that
//! tree produce the series ([`timeline`], [`spoilage`]). [`analyzer`] runs the
//! whole pipeline; [`loader`] and [`renderer`] handle JSON and PNG output.

pub mod analyzer;
pub mod error;
pub mod index;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod renderer;
pub mod spoilage;
pub mod timeline;

pub use analyzer::{analyze, analyze_with_progress};
pub use error::{IndexError, LoadError, MalformedRecordError, RenderError};
pub use index::IntervalIndex;
pub use model::{DaySeries, DayWindow, IssueRecord, IssueState, NormalizedInterval, SpoilageRecord, TimelineReport};
