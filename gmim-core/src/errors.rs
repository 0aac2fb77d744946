use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GmimError {
    #[error("Malformed input at line {line_number}: {reason}: {line:?}")]
    MalformedInput {
        line_number: usize,
        line: String,
        reason: String,
    },

    #[error(
        "Window size {window_size} is not a multiple of the interval width {interval_width} for {chrom}"
    )]
    ConfigurationMismatch {
        chrom: String,
        window_size: u32,
        interval_width: u32,
    },

    #[error("Noise level estimated to be 0 for window {chrom}:{start}-{end} at position {position}")]
    DegenerateNoiseFloor {
        chrom: String,
        start: i64,
        end: i64,
        position: i64,
    },

    #[error("Score cannot be outside the range of 0 to 1: {score} at {chrom}:{start}-{end}")]
    ScoreOutOfRange {
        chrom: String,
        start: u32,
        end: u32,
        score: f64,
    },

    #[error("Score already set for {chrom}:{start}-{end}")]
    ScoreAlreadySet { chrom: String, start: u32, end: u32 },

    #[error("File regions do not match: expected {expected}, found {found}")]
    RegionMismatch { expected: String, found: String },

    #[error("Resource unavailable: {path:?}: {source}")]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Interval end must be greater than start: {chrom}:{start}-{end}")]
    InvalidCoordinates { chrom: String, start: u32, end: u32 },

    #[error("Read count cannot be negative: {0}")]
    NegativeReadCount(i64),

    #[error("Cannot insert into a full window (capacity {0})")]
    WindowFull(usize),

    #[error("Window has not been filled yet ({size} of {capacity})")]
    WindowNotReady { size: usize, capacity: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Timed out after {0:?} waiting for {1} task(s) to finish")]
    PhaseTimeout(std::time::Duration, usize),

    #[error("{0} task(s) ended without reporting a result")]
    TaskLost(usize),

    #[error("Task panicked: {0}")]
    TaskPanicked(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Serializable classification of a [`GmimError`], used in run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    MalformedInput,
    ConfigurationMismatch,
    DegenerateNoiseFloor,
    ScoreOutOfRange,
    RegionMismatch,
    ResourceUnavailable,
    InvalidConfig,
    Timeout,
    Internal,
}

impl GmimError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GmimError::MalformedInput { .. }
            | GmimError::InvalidCoordinates { .. }
            | GmimError::NegativeReadCount(_) => ErrorKind::MalformedInput,
            GmimError::ConfigurationMismatch { .. } => ErrorKind::ConfigurationMismatch,
            GmimError::DegenerateNoiseFloor { .. } => ErrorKind::DegenerateNoiseFloor,
            GmimError::ScoreOutOfRange { .. } => ErrorKind::ScoreOutOfRange,
            GmimError::RegionMismatch { .. } => ErrorKind::RegionMismatch,
            GmimError::ResourceUnavailable { .. } | GmimError::Io(_) => {
                ErrorKind::ResourceUnavailable
            }
            GmimError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            GmimError::PhaseTimeout(..) => ErrorKind::Timeout,
            GmimError::ScoreAlreadySet { .. }
            | GmimError::WindowFull(_)
            | GmimError::WindowNotReady { .. }
            | GmimError::TaskLost(_)
            | GmimError::TaskPanicked(_) => ErrorKind::Internal,
        }
    }

    /// Wrap an io error with the path it happened on.
    pub fn resource(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GmimError::ResourceUnavailable {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GmimError>;
