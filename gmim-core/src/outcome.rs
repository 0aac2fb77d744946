//! Structured per-unit outcomes, so that failures cross task boundaries as values.

use std::fmt::{self, Display};

use serde::Serialize;

use crate::errors::{ErrorKind, GmimError};

/// A failed unit of work (a chromosome, a sample or an integration group).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&GmimError> for FailureRecord {
    fn from(err: &GmimError) -> Self {
        FailureRecord {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<GmimError> for FailureRecord {
    fn from(err: GmimError) -> Self {
        FailureRecord::from(&err)
    }
}

impl Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    Success,
    PartialFailure,
    Failure,
}

impl RunStatus {
    ///
    /// Status of a set of units given how many of them succeeded.
    ///
    pub fn from_counts(succeeded: usize, failed: usize) -> Self {
        match (succeeded, failed) {
            (_, 0) => RunStatus::Success,
            (0, _) => RunStatus::Failure,
            _ => RunStatus::PartialFailure,
        }
    }

    /// Worst-of combination of two statuses.
    pub fn and(self, other: RunStatus) -> RunStatus {
        match (self, other) {
            (RunStatus::Success, RunStatus::Success) => RunStatus::Success,
            (RunStatus::Failure, RunStatus::Failure) => RunStatus::Failure,
            _ => RunStatus::PartialFailure,
        }
    }

    /// Process exit code for this status.
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Success => 0,
            RunStatus::Failure => 1,
            RunStatus::PartialFailure => 2,
        }
    }
}

impl Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunStatus::Success => "success",
            RunStatus::PartialFailure => "partial failure",
            RunStatus::Failure => "failure",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(3, 0, RunStatus::Success)]
    #[case(0, 0, RunStatus::Success)]
    #[case(2, 1, RunStatus::PartialFailure)]
    #[case(0, 4, RunStatus::Failure)]
    fn test_from_counts(#[case] ok: usize, #[case] failed: usize, #[case] expected: RunStatus) {
        assert_eq!(RunStatus::from_counts(ok, failed), expected);
    }

    #[rstest]
    #[case(RunStatus::Success, RunStatus::Success, RunStatus::Success)]
    #[case(RunStatus::Success, RunStatus::Failure, RunStatus::PartialFailure)]
    #[case(RunStatus::Failure, RunStatus::Failure, RunStatus::Failure)]
    #[case(RunStatus::PartialFailure, RunStatus::Success, RunStatus::PartialFailure)]
    fn test_and(#[case] a: RunStatus, #[case] b: RunStatus, #[case] expected: RunStatus) {
        assert_eq!(a.and(b), expected);
    }

    #[rstest]
    fn test_failure_record_from_error() {
        let err = GmimError::RegionMismatch {
            expected: "chr1:0-100".to_string(),
            found: "chr1:100-200".to_string(),
        };
        let record = FailureRecord::from(&err);
        assert_eq!(record.kind, ErrorKind::RegionMismatch);
        assert!(record.message.contains("chr1:100-200"));
    }
}
