//! Timetable file with modification-time polling.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info, warn};

use super::catalog::Timetable;
use super::error::TimetableError;

/// Outcome of a reload check.
#[derive(Debug)]
pub enum Refresh {
    /// The file has not changed since it was last read.
    Unchanged,
    /// The file changed and was re-read successfully.
    Reloaded,
    /// The file changed (or vanished) but could not be read; the previous
    /// timetable is still in use and the next poll retries.
    Failed(TimetableError),
}

/// A timetable backed by a file, re-read whenever the file's modification
/// time changes.
#[derive(Debug)]
pub struct TimetableSource {
    path: PathBuf,
    modified: SystemTime,
    timetable: Timetable,

    /// Set after a failed check, cleared by the next good one.
    failing: bool,
}

impl TimetableSource {
    /// Read the timetable file for the first time.
    ///
    /// Fails if the file is missing or malformed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TimetableError> {
        let path = path.into();
        let modified = modified_time(&path)?;
        let timetable = Timetable::load(&path)?;

        info!(
            path = %path.display(),
            station = %timetable.station,
            legs = timetable.len(),
            "loaded timetable"
        );

        Ok(Self {
            path,
            modified,
            timetable,
            failing: false,
        })
    }

    /// Re-read the file if its modification time has changed.
    ///
    /// On failure the existing timetable is preserved. Only the first of a
    /// run of failures is logged as a warning.
    pub fn refresh(&mut self) -> Refresh {
        let modified = match modified_time(&self.path) {
            Ok(m) => m,
            Err(e) => return self.failed(e),
        };

        if modified == self.modified {
            if std::mem::take(&mut self.failing) {
                info!(path = %self.path.display(), "timetable readable again");
            }
            return Refresh::Unchanged;
        }

        match Timetable::load(&self.path) {
            Ok(timetable) => {
                info!(
                    path = %self.path.display(),
                    legs = timetable.len(),
                    "timetable changed; reloaded"
                );
                self.timetable = timetable;
                self.modified = modified;
                self.failing = false;
                Refresh::Reloaded
            }
            Err(e) => self.failed(e),
        }
    }

    fn failed(&mut self, error: TimetableError) -> Refresh {
        if self.failing {
            debug!(path = %self.path.display(), error = %error, "timetable still unreadable");
        } else {
            warn!(path = %self.path.display(), error = %error, "timetable reload failed; keeping previous");
            self.failing = true;
        }
        Refresh::Failed(error)
    }

    /// The timetable currently in use.
    pub fn timetable(&self) -> &Timetable {
        &self.timetable
    }

    /// Get the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn modified_time(path: &Path) -> Result<SystemTime, TimetableError> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|source| TimetableError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::tempdir;

    const ONE_LEG: &str = "Alpha,1.0,2.0\n09:00,Bus_1,Stop1,09:20,Beta\n";
    const TWO_LEGS: &str = "Alpha,1.0,2.0\n09:00,Bus_1,Stop1,09:20,Beta\n09:30,Bus_2,Stop1,09:50,Gamma\n";

    /// Write `contents` and push the mtime forward so the change is visible
    /// even on filesystems with coarse timestamps.
    fn write_with_mtime(path: &Path, contents: &str, bump_secs: u64) {
        std::fs::write(path, contents).unwrap();
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(bump_secs))
            .unwrap();
    }

    #[test]
    fn open_reads_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tt-Alpha");
        std::fs::write(&path, ONE_LEG).unwrap();

        let source = TimetableSource::open(&path).unwrap();
        assert_eq!(source.timetable().len(), 1);
        assert_eq!(source.path(), path.as_path());
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempdir().unwrap();
        let err = TimetableSource::open(dir.path().join("tt-Nowhere")).unwrap_err();
        assert!(matches!(err, TimetableError::Io { .. }));
    }

    #[test]
    fn unchanged_file_not_reloaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tt-Alpha");
        std::fs::write(&path, ONE_LEG).unwrap();

        let mut source = TimetableSource::open(&path).unwrap();
        assert!(matches!(source.refresh(), Refresh::Unchanged));
    }

    #[test]
    fn changed_file_reloaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tt-Alpha");
        std::fs::write(&path, ONE_LEG).unwrap();
        let mut source = TimetableSource::open(&path).unwrap();

        write_with_mtime(&path, TWO_LEGS, 10);

        assert!(matches!(source.refresh(), Refresh::Reloaded));
        assert_eq!(source.timetable().len(), 2);
        assert!(matches!(source.refresh(), Refresh::Unchanged));
    }

    #[test]
    fn broken_reload_keeps_previous_and_retries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tt-Alpha");
        std::fs::write(&path, ONE_LEG).unwrap();
        let mut source = TimetableSource::open(&path).unwrap();

        write_with_mtime(&path, "Alpha,1.0,2.0\nnot,a,valid,row\n", 10);
        assert!(matches!(source.refresh(), Refresh::Failed(_)));
        assert_eq!(source.timetable().len(), 1);

        // Still failing on the next poll, since the stored mtime was not advanced
        assert!(matches!(source.refresh(), Refresh::Failed(_)));

        write_with_mtime(&path, TWO_LEGS, 20);
        assert!(matches!(source.refresh(), Refresh::Reloaded));
        assert_eq!(source.timetable().len(), 2);
    }

    #[test]
    fn deleted_file_keeps_previous() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tt-Alpha");
        std::fs::write(&path, ONE_LEG).unwrap();
        let mut source = TimetableSource::open(&path).unwrap();

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(source.refresh(), Refresh::Failed(TimetableError::Io { .. })));
        assert_eq!(source.timetable().len(), 1);
    }

    #[test]
    fn failure_run_reported_once_until_recovery() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tt-Alpha");
        std::fs::write(&path, ONE_LEG).unwrap();
        let mut source = TimetableSource::open(&path).unwrap();
        assert!(!source.failing);

        std::fs::remove_file(&path).unwrap();
        for _ in 0..3 {
            assert!(matches!(source.refresh(), Refresh::Failed(_)));
            assert!(source.failing);
        }

        write_with_mtime(&path, TWO_LEGS, 10);
        assert!(matches!(source.refresh(), Refresh::Reloaded));
        assert!(!source.failing);

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(source.refresh(), Refresh::Failed(_)));
        assert!(source.failing);
    }
}
