//! # File Handles and Stat Checks
//!
//! A store is opened either from a path or from a handle the caller already
//! owns. The difference matters when re-checking the file: a path is stat'ed
//! again (so a replaced file is noticed), a handle is checked with `fstat`
//! semantics through `File::metadata`.
//!
//! Every check verifies the target is a regular file.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use eyre::Result;

use crate::error::FileError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Path(PathBuf),
    Handle,
}

impl FileSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            FileSource::Path(p) => Some(p),
            FileSource::Handle => None,
        }
    }

    fn owned_path(&self) -> Option<PathBuf> {
        self.path().map(Path::to_path_buf)
    }
}

/// Size and modification time observed by one stat call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl FileStamp {
    /// True when `self` was taken after the file was modified again.
    pub fn is_newer_than(&self, earlier: &FileStamp) -> bool {
        match (self.modified, earlier.modified) {
            (Some(now), Some(then)) => now > then,
            _ => false,
        }
    }
}

pub(crate) fn stat_path(path: &Path) -> Result<FileStamp> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        FileError::access("stat", Some(path.to_path_buf()), Some(e))
    })?;

    stamp(metadata, &FileSource::Path(path.to_path_buf()))
}

pub(crate) fn stat_handle(file: &File) -> Result<FileStamp> {
    let metadata = file
        .metadata()
        .map_err(|e| FileError::access("fstat", None, Some(e)))?;

    stamp(metadata, &FileSource::Handle)
}

pub(crate) fn stat(source: &FileSource, file: &File) -> Result<FileStamp> {
    match source {
        FileSource::Path(path) => stat_path(path),
        FileSource::Handle => stat_handle(file),
    }
}

pub(crate) fn open_path(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        FileError::CannotOpenFile {
            path: path.to_path_buf(),
            source: e,
        }
        .into()
    })
}

fn stamp(metadata: std::fs::Metadata, source: &FileSource) -> Result<FileStamp> {
    if !metadata.is_file() {
        eyre::bail!(FileError::NotAFile {
            path: source.owned_path(),
        });
    }

    Ok(FileStamp {
        size: metadata.len(),
        modified: metadata.modified().ok(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::time::Duration;
    use tempfile::tempdir;

    fn kind(report: &eyre::Report) -> Option<ErrorKind> {
        report.downcast_ref::<FileError>().map(FileError::kind)
    }

    #[test]
    fn stat_regular_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"hello").unwrap();

        let stamp = stat_path(&path).unwrap();

        assert_eq!(stamp.size, 5);
        assert!(stamp.modified.is_some());
    }

    #[test]
    fn stat_directory_is_not_a_file() {
        let dir = tempdir().unwrap();

        let err = stat_path(dir.path()).unwrap_err();

        assert_eq!(kind(&err), Some(ErrorKind::NotAFile));
    }

    #[test]
    fn stat_missing_file_is_access_error() {
        let dir = tempdir().unwrap();

        let err = stat_path(&dir.path().join("missing")).unwrap_err();

        assert_eq!(kind(&err), Some(ErrorKind::FileAccess));
    }

    #[test]
    fn open_missing_file_cannot_open() {
        let dir = tempdir().unwrap();

        let err = open_path(&dir.path().join("missing")).unwrap_err();

        assert_eq!(kind(&err), Some(ErrorKind::CannotOpenFile));
    }

    #[test]
    fn newer_stamp_detected() {
        let then = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let earlier = FileStamp {
            size: 10,
            modified: Some(then),
        };
        let later = FileStamp {
            size: 10,
            modified: Some(then + Duration::from_nanos(1)),
        };

        assert!(later.is_newer_than(&earlier));
        assert!(!earlier.is_newer_than(&later));
        assert!(!earlier.is_newer_than(&earlier));
    }
}
