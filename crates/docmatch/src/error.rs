//! Error types for docmatch

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Which input of a merge an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinSide {
    Left,
    Right,
}

impl fmt::Display for JoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinSide::Left => write!(f, "df1 (left)"),
            JoinSide::Right => write!(f, "df2 (right)"),
        }
    }
}

/// Broad category of a [`DocmatchError`], used by the binary to pick an exit
/// code and log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad keys, missing columns, unsupported extensions, unparsable settings.
    Configuration,
    /// Missing files, permission problems, empty inputs.
    Io,
    /// Anything else. Fatal for the run.
    Unexpected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Io => "io",
            ErrorKind::Unexpected => "unexpected",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum DocmatchError {
    #[error("Config error: {0}")]
    Config(String),

    #[error(
        "Join key lists must be non-empty and of equal length (left: {left:?}, right: {right:?})"
    )]
    KeyMismatch {
        left: Vec<String>,
        right: Vec<String>,
    },

    #[error("Join columns {missing:?} not found in {side}; available columns: {available:?}")]
    MissingColumns {
        side: JoinSide,
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("Unsupported format '{extension}' for {}", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("No data in {}", .0.display())]
    EmptyData(PathBuf),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet read error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Spreadsheet write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl DocmatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DocmatchError::Config(_)
            | DocmatchError::KeyMismatch { .. }
            | DocmatchError::MissingColumns { .. }
            | DocmatchError::UnsupportedFormat { .. } => ErrorKind::Configuration,
            DocmatchError::FileNotFound(_)
            | DocmatchError::PermissionDenied(_)
            | DocmatchError::EmptyData(_)
            | DocmatchError::Io { .. } => ErrorKind::Io,
            DocmatchError::Csv(_)
            | DocmatchError::Spreadsheet(_)
            | DocmatchError::Xlsx(_)
            | DocmatchError::Arrow(_)
            | DocmatchError::InvalidState(_) => ErrorKind::Unexpected,
        }
    }

    /// Map an `io::Error` on `path` onto the not-found / permission / generic
    /// variants.
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => DocmatchError::FileNotFound(path),
            io::ErrorKind::PermissionDenied => DocmatchError::PermissionDenied(path),
            _ => DocmatchError::Io { path, source },
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, DocmatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let err = DocmatchError::KeyMismatch {
            left: vec!["a".into()],
            right: vec![],
        };
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(
            DocmatchError::EmptyData("x.csv".into()).kind(),
            ErrorKind::Io
        );
        assert_eq!(
            DocmatchError::InvalidState("boom".into()).kind(),
            ErrorKind::Unexpected
        );
    }

    #[test]
    fn test_from_io_classification() {
        let not_found = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert!(matches!(
            DocmatchError::from_io("a.csv", not_found),
            DocmatchError::FileNotFound(_)
        ));

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(
            DocmatchError::from_io("a.csv", denied),
            DocmatchError::PermissionDenied(_)
        ));

        let other = io::Error::new(io::ErrorKind::UnexpectedEof, "short");
        let err = DocmatchError::from_io("a.csv", other);
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("a.csv"));
    }

    #[test]
    fn test_missing_columns_message_lists_available() {
        let err = DocmatchError::MissingColumns {
            side: JoinSide::Left,
            missing: vec!["parent".into()],
            available: vec!["file_name".into(), "path".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("parent"));
        assert!(msg.contains("file_name"));
        assert!(msg.contains("df1"));
    }
}
