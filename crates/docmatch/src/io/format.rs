//! Extension-based format dispatch shared by the loader and the exporter.

use crate::error::{DocmatchError, Result};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xls,
    Xlsx,
}

impl FileFormat {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(FileFormat::Csv),
            "xls" => Some(FileFormat::Xls),
            "xlsx" => Some(FileFormat::Xlsx),
            _ => None,
        }
    }

    /// Format to read `path` with. `.csv`, `.xls` and `.xlsx` are accepted.
    pub fn for_load(path: &Path) -> Result<Self> {
        Self::from_path(path)
    }

    /// Format to write `path` with. Only `.csv` and `.xlsx` can be written.
    pub fn for_export(path: &Path) -> Result<Self> {
        match Self::from_path(path)? {
            FileFormat::Xls => Err(unsupported(path)),
            format => Ok(format),
        }
    }

    fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| unsupported(path))
    }
}

fn unsupported(path: &Path) -> DocmatchError {
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_else(|| "(none)".to_string());
    DocmatchError::UnsupportedFormat {
        path: path.to_path_buf(),
        extension,
    }
}
