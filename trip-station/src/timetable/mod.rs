//! Station timetables.
//!
//! Each station knows only its own timetable: the legs departing from it.
//! The timetable is read from a CSV file at startup and re-read whenever
//! the file changes on disk.

mod catalog;
mod error;
mod loader;
mod source;

pub use catalog::{Coordinates, Timetable};
pub use error::TimetableError;
pub use source::{Refresh, TimetableSource};

use std::path::{Path, PathBuf};

use crate::domain::StationName;

/// Location of a station's timetable file: `<dir>/tt-<station>`.
pub fn timetable_path(dir: impl AsRef<Path>, station: &StationName) -> PathBuf {
    dir.as_ref().join(format!("tt-{}", station))
}
