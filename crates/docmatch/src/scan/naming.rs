//! File naming convention: `YYYYMMDD <doc type> <rest of the name>.<ext>`
//!
//! Parsing is pure. Files that do not follow the convention are reported as
//! [`ParseOutcome::Skipped`]; only paths that cannot be read as a file name at
//! all produce a [`PathError`].

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::Path;

/// Stem grammar: eight digits, whitespace, then the rest of the name.
static FILE_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{8})\s+(.+)$").expect("valid file name pattern"));

const CREATED_DATE_FORMAT: &str = "%d/%m/%Y";

/// Metadata extracted from one conforming file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub full_path: String,
    pub parent_directory: String,
    pub file_name_with_extension: String,
    pub file_name_stem: String,
    /// Extension with its leading dot, or empty.
    pub file_extension: String,
    pub original_file_name: String,
    /// `DD/MM/YYYY`
    pub created_date: String,
    pub doc_type: String,
}

impl FileMetadata {
    /// Column names of the metadata table, in field order.
    pub const COLUMNS: [&'static str; 8] = [
        "full_path",
        "parent_directory",
        "file_name_with_extension",
        "file_name_stem",
        "file_extension",
        "original_file_name",
        "created_date",
        "doc_type",
    ];

    /// Field values in [`FileMetadata::COLUMNS`] order.
    pub fn into_values(self) -> [String; 8] {
        [
            self.full_path,
            self.parent_directory,
            self.file_name_with_extension,
            self.file_name_stem,
            self.file_extension,
            self.original_file_name,
            self.created_date,
            self.doc_type,
        ]
    }
}

/// Why a file was left out of the metadata table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Stem is not `<8 digits><whitespace><name>`.
    PatternMismatch,
    /// The 8 digits are not a real `YYYYMMDD` date.
    InvalidDate,
    /// Nothing but whitespace after the date.
    EmptyName,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::PatternMismatch => write!(f, "name does not match 'YYYYMMDD name'"),
            SkipReason::InvalidDate => write!(f, "invalid date prefix"),
            SkipReason::EmptyName => write!(f, "no name after date prefix"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Matched(FileMetadata),
    Skipped(SkipReason),
}

/// A path that cannot be interpreted as a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathError {
    pub path: String,
    pub message: &'static str,
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl std::error::Error for PathError {}

/// Parse the metadata encoded in `path`'s file name.
pub fn parse_file_name(path: &Path) -> Result<ParseOutcome, PathError> {
    let unreadable = |message| PathError {
        path: path.to_string_lossy().into_owned(),
        message,
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| unreadable("path has no file name"))?
        .to_str()
        .ok_or_else(|| unreadable("file name is not valid UTF-8"))?;
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| unreadable("file stem is not valid UTF-8"))?;

    let Some(caps) = FILE_NAME_PATTERN.captures(stem) else {
        return Ok(ParseOutcome::Skipped(SkipReason::PatternMismatch));
    };
    let (date_digits, rest) = (&caps[1], &caps[2]);

    let Some(date) = parse_compact_date(date_digits) else {
        return Ok(ParseOutcome::Skipped(SkipReason::InvalidDate));
    };

    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let Some(doc_type) = tokens.first() else {
        return Ok(ParseOutcome::Skipped(SkipReason::EmptyName));
    };

    let file_extension = path
        .extension()
        .map(|ext| ext.to_string_lossy())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();

    Ok(ParseOutcome::Matched(FileMetadata {
        full_path: path.to_string_lossy().into_owned(),
        parent_directory: path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default(),
        file_name_with_extension: file_name.to_string(),
        file_name_stem: stem.to_string(),
        file_extension,
        original_file_name: tokens.join(" ").trim().to_string(),
        created_date: date.format(CREATED_DATE_FORMAT).to_string(),
        doc_type: doc_type.trim().to_string(),
    }))
}

/// Strict `YYYYMMDD`. `\d` in the pattern also admits non-ASCII digits, which
/// are rejected here.
fn parse_compact_date(digits: &str) -> Option<NaiveDate> {
    if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = digits[0..4].parse().ok()?;
    let month: u32 = digits[4..6].parse().ok()?;
    let day: u32 = digits[6..8].parse().ok()?;
    if year < 1 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn matched(path: &str) -> FileMetadata {
        match parse_file_name(Path::new(path)).unwrap() {
            ParseOutcome::Matched(meta) => meta,
            other => panic!("expected a match for {path}, got {other:?}"),
        }
    }

    fn skipped(path: &str) -> SkipReason {
        match parse_file_name(Path::new(path)).unwrap() {
            ParseOutcome::Skipped(reason) => reason,
            other => panic!("expected a skip for {path}, got {other:?}"),
        }
    }

    #[test]
    fn test_contract_example() {
        let meta = matched("/docs/court/20240115 Contract FinalDraft.pdf");
        assert_eq!(meta.created_date, "15/01/2024");
        assert_eq!(meta.doc_type, "Contract");
        assert_eq!(meta.original_file_name, "Contract FinalDraft");
        assert_eq!(meta.file_name_stem, "20240115 Contract FinalDraft");
        assert_eq!(meta.file_name_with_extension, "20240115 Contract FinalDraft.pdf");
        assert_eq!(meta.file_extension, ".pdf");
        assert_eq!(meta.parent_directory, "/docs/court");
        assert_eq!(meta.full_path, "/docs/court/20240115 Contract FinalDraft.pdf");
    }

    #[test]
    fn test_whitespace_is_normalized() {
        let meta = matched("20231231   Letter \t to   bank.docx");
        assert_eq!(meta.doc_type, "Letter");
        assert_eq!(meta.original_file_name, "Letter to bank");
        assert_eq!(meta.created_date, "31/12/2023");
    }

    #[test]
    fn test_no_extension() {
        let meta = matched("dir/20200229 Memo");
        assert_eq!(meta.file_extension, "");
        assert_eq!(meta.created_date, "29/02/2020");
    }

    #[test]
    fn test_only_last_extension_is_removed() {
        let meta = matched("20240101 Scan page.tar.gz");
        assert_eq!(meta.file_extension, ".gz");
        assert_eq!(meta.original_file_name, "Scan page.tar");
    }

    #[test]
    fn test_bad_name_is_skipped() {
        assert_eq!(skipped("BadName.pdf"), SkipReason::PatternMismatch);
        assert_eq!(skipped("20240115.pdf"), SkipReason::PatternMismatch);
        assert_eq!(skipped("2024011 Short.pdf"), SkipReason::PatternMismatch);
        assert_eq!(skipped("20240115Contract.pdf"), SkipReason::PatternMismatch);
        assert_eq!(skipped("x20240115 Contract.pdf"), SkipReason::PatternMismatch);
    }

    #[test]
    fn test_invalid_calendar_dates_are_skipped() {
        assert_eq!(skipped("20241301 Contract.pdf"), SkipReason::InvalidDate);
        assert_eq!(skipped("20230229 Contract.pdf"), SkipReason::InvalidDate);
        assert_eq!(skipped("20240100 Contract.pdf"), SkipReason::InvalidDate);
        assert_eq!(skipped("00000101 Contract.pdf"), SkipReason::InvalidDate);
    }

    #[test]
    fn test_non_ascii_digits_are_skipped() {
        // Arabic-Indic digits satisfy \d but are not a date
        assert_eq!(skipped("٢٠٢٤٠١١٥ Contract.pdf"), SkipReason::InvalidDate);
    }

    #[test]
    fn test_trailing_whitespace_only_is_skipped() {
        assert_eq!(skipped("20240115  .pdf"), SkipReason::EmptyName);
    }

    #[test]
    fn test_path_without_file_name_is_an_error() {
        let err = parse_file_name(Path::new("/")).unwrap_err();
        assert_eq!(err.message, "path has no file name");
        assert!(parse_file_name(&PathBuf::from("..")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_name_is_an_error() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"20240115 Caf\xe9.pdf"));
        assert!(parse_file_name(path).is_err());
    }

    #[test]
    fn test_columns_match_field_order() {
        let values = matched("20240115 Contract FinalDraft.pdf").into_values();
        assert_eq!(values.len(), FileMetadata::COLUMNS.len());
        assert_eq!(values[6], "15/01/2024");
        assert_eq!(values[7], "Contract");
    }
}
