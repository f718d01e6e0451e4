// src/error.rs

use crate::model::{Day, IssueId};
use std::path::PathBuf;
use thiserror::Error;

/// Why a single issue record could not become an interval.
///
/// Recovered locally: the record is skipped, reported, and the run continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRecordError {
    #[error("issue #{issue} has no {field} timestamp")]
    MissingTimestamp { issue: IssueId, field: &'static str },

    #[error("issue #{issue} has an unparsable {field} timestamp {value:?}")]
    UnparsableTimestamp {
        issue: IssueId,
        field: &'static str,
        value: String,
    },

    #[error("issue #{issue} has no state")]
    MissingState { issue: IssueId },

    #[error("issue #{issue} has unknown state {label:?}")]
    UnknownState { issue: IssueId, label: String },

    #[error("issue #{issue} ends on day {end} before it was created on day {begin}")]
    EndsBeforeBegin { issue: IssueId, begin: Day, end: Day },
}

impl MalformedRecordError {
    pub fn issue(&self) -> IssueId {
        match self {
            Self::MissingTimestamp { issue, .. }
            | Self::UnparsableTimestamp { issue, .. }
            | Self::MissingState { issue }
            | Self::UnknownState { issue, .. }
            | Self::EndsBeforeBegin { issue, .. } => *issue,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// No usable interval exists, so there is no day window to report on.
    #[error("no valid issue intervals to aggregate")]
    Empty,

    /// A degenerate interval reached the index. Indicates a normalizer bug.
    #[error("interval [{begin}, {end}) for issue #{issue} is not strictly positive")]
    InvalidInterval { issue: IssueId, begin: Day, end: Day },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input file {0} is not a .json file")]
    NotJson(PathBuf),

    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON in {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create directory for {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to save chart {path}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
