//! # Error Taxonomy
//!
//! Fallible operations in this crate return `eyre::Result`. When a failure
//! belongs to one of the categories callers are expected to branch on, the
//! report carries a [`FileError`] as its root error:
//!
//! ```ignore
//! match BlockStore::open(path, 4096, 16) {
//!     Ok(store) => { /* ... */ }
//!     Err(report) => match report.downcast_ref::<FileError>().map(FileError::kind) {
//!         Some(ErrorKind::NotAFile) => { /* directory, device, ... */ }
//!         _ => return Err(report),
//!     },
//! }
//! ```
//!
//! Single reads (`get_byte`, `line`, ...) never produce a `FileError`; they
//! return `None` and log the cause at debug level.

use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidParameter,
    NotAFile,
    FileAccess,
    CannotOpenFile,
    Decode,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::InvalidParameter => "invalid parameter",
            ErrorKind::NotAFile => "not a regular file",
            ErrorKind::FileAccess => "file access error",
            ErrorKind::CannotOpenFile => "cannot open file",
            ErrorKind::Decode => "decode error",
        }
    }
}

#[derive(Debug)]
pub enum FileError {
    /// A construction argument is out of range.
    InvalidParameter { reason: String },

    /// The target exists but is not a regular file.
    NotAFile { path: Option<PathBuf> },

    /// A stat, seek or read failed, or a non-final block came back short.
    FileAccess {
        operation: &'static str,
        path: Option<PathBuf>,
        source: Option<std::io::Error>,
    },

    /// The open call itself failed.
    CannotOpenFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Bytes could not be decoded as text.
    Decode { line: u64, offset: u64 },
}

impl FileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FileError::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            FileError::NotAFile { .. } => ErrorKind::NotAFile,
            FileError::FileAccess { .. } => ErrorKind::FileAccess,
            FileError::CannotOpenFile { .. } => ErrorKind::CannotOpenFile,
            FileError::Decode { .. } => ErrorKind::Decode,
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        FileError::InvalidParameter {
            reason: reason.into(),
        }
    }

    pub(crate) fn access(
        operation: &'static str,
        path: Option<PathBuf>,
        source: Option<std::io::Error>,
    ) -> Self {
        FileError::FileAccess {
            operation,
            path,
            source,
        }
    }
}

fn describe(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!("'{}'", p.display()),
        None => "<descriptor>".to_string(),
    }
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileError::InvalidParameter { reason } => {
                write!(f, "{}: {}", self.kind().name(), reason)
            }
            FileError::NotAFile { path } => {
                write!(f, "{} is {}", describe(path), self.kind().name())
            }
            FileError::FileAccess {
                operation,
                path,
                source,
            } => match source {
                Some(e) => write!(f, "{} failed on {}: {}", operation, describe(path), e),
                None => write!(f, "{} failed on {}", operation, describe(path)),
            },
            FileError::CannotOpenFile { path, source } => {
                write!(f, "cannot open file '{}': {}", path.display(), source)
            }
            FileError::Decode { line, offset } => write!(
                f,
                "line {} is not valid UTF-8 (byte offset {})",
                line, offset
            ),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::FileAccess {
                source: Some(e), ..
            } => Some(e),
            FileError::CannotOpenFile { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(
            FileError::invalid("block size 12").kind(),
            ErrorKind::InvalidParameter
        );
        assert_eq!(
            FileError::NotAFile { path: None }.kind(),
            ErrorKind::NotAFile
        );
        assert_eq!(
            FileError::access("read", None, None).kind(),
            ErrorKind::FileAccess
        );
        assert_eq!(
            FileError::Decode { line: 0, offset: 3 }.kind(),
            ErrorKind::Decode
        );
    }

    #[test]
    fn display_includes_context() {
        let err = FileError::access(
            "seek",
            Some(PathBuf::from("/tmp/big.log")),
            Some(std::io::Error::new(std::io::ErrorKind::Other, "boom")),
        );
        let msg = err.to_string();
        assert!(msg.contains("seek"));
        assert!(msg.contains("/tmp/big.log"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn report_downcasts_to_file_error() {
        let report: eyre::Report = FileError::NotAFile { path: None }.into();
        let err = report.downcast_ref::<FileError>().unwrap();
        assert_eq!(err.kind(), ErrorKind::NotAFile);
    }
}
