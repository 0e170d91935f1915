//! Timetable error types.

use std::path::PathBuf;

use crate::domain::{InvalidStationName, TimeError};

/// Errors from loading or parsing a station timetable.
#[derive(Debug, thiserror::Error)]
pub enum TimetableError {
    /// The file could not be read or its metadata inspected
    #[error("failed to read timetable {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader rejected the input
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The file has no header row
    #[error("timetable is missing its header row")]
    MissingHeader,

    /// The header row is not `<station>,<longitude>,<latitude>`
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// A leg row could not be parsed
    #[error("line {line}: {message}")]
    InvalidRow { line: u64, message: String },
}

impl TimetableError {
    pub(super) fn row(line: u64, message: impl Into<String>) -> Self {
        TimetableError::InvalidRow {
            line,
            message: message.into(),
        }
    }

    pub(super) fn row_time(line: u64, err: TimeError) -> Self {
        Self::row(line, err.to_string())
    }

    pub(super) fn row_station(line: u64, err: InvalidStationName) -> Self {
        Self::row(line, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TimetableError::MissingHeader;
        assert_eq!(err.to_string(), "timetable is missing its header row");

        let err = TimetableError::row(4, "expected 5 fields, found 3");
        assert_eq!(err.to_string(), "line 4: expected 5 fields, found 3");

        let err = TimetableError::Io {
            path: PathBuf::from("/tmp/tt-Alpha"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "failed to read timetable /tmp/tt-Alpha: gone");
    }
}
