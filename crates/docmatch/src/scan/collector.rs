//! Turn a stream of file paths into the metadata table.
//!
//! Paths are consumed one at a time; only matched rows are kept, so memory is
//! O(matched files) regardless of how many paths the walker produces.

use super::naming::{parse_file_name, FileMetadata, ParseOutcome, SkipReason};
use crate::error::Result;
use crate::table::Dataset;
use arrow::array::{ArrayRef, StringBuilder};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Per-run counters for [`collect`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectStats {
    /// Paths consumed from the input
    pub scanned: u64,
    pub matched: u64,
    pub skipped_pattern: u64,
    pub skipped_date: u64,
    pub skipped_empty: u64,
    /// Paths that could not be read as a file name at all
    pub unexpected: u64,
}

impl CollectStats {
    pub fn skipped(&self) -> u64 {
        self.skipped_pattern + self.skipped_date + self.skipped_empty
    }
}

#[derive(Debug, Clone)]
pub struct Collected {
    pub dataset: Dataset,
    pub stats: CollectStats,
}

/// Append-only column builders for the metadata table.
struct MetadataBuilder {
    columns: Vec<StringBuilder>,
}

impl MetadataBuilder {
    fn new() -> Self {
        Self {
            columns: FileMetadata::COLUMNS
                .iter()
                .map(|_| StringBuilder::new())
                .collect(),
        }
    }

    fn push(&mut self, meta: FileMetadata) {
        for (builder, value) in self.columns.iter_mut().zip(meta.into_values()) {
            builder.append_value(value);
        }
    }

    fn finish(mut self) -> Result<Dataset> {
        let columns = FileMetadata::COLUMNS
            .iter()
            .zip(self.columns.iter_mut())
            .map(|(name, builder)| {
                let array: ArrayRef = Arc::new(builder.finish());
                (name.to_string(), array)
            })
            .collect();
        Dataset::new(columns)
    }
}

/// Parse every path and keep the ones that follow the naming convention, in
/// the order they were produced.
pub fn collect<I>(paths: I) -> Result<Collected>
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut builder = MetadataBuilder::new();
    let mut stats = CollectStats::default();

    for path in paths {
        stats.scanned += 1;
        match parse_file_name(&path) {
            Ok(ParseOutcome::Matched(meta)) => {
                debug!(path = %path.display(), doc_type = %meta.doc_type, "Matched file name");
                stats.matched += 1;
                builder.push(meta);
            }
            Ok(ParseOutcome::Skipped(reason)) => {
                match reason {
                    SkipReason::PatternMismatch => {
                        stats.skipped_pattern += 1;
                        warn!(path = %path.display(), "File name does not match expected format, skipping");
                    }
                    SkipReason::InvalidDate => {
                        stats.skipped_date += 1;
                        error!(path = %path.display(), "Invalid date in file name, skipping");
                    }
                    SkipReason::EmptyName => {
                        stats.skipped_empty += 1;
                        warn!(path = %path.display(), %reason, "Skipping file");
                    }
                }
            }
            Err(err) => {
                stats.unexpected += 1;
                error!(error = %err, "Unexpected error while reading file name, skipping");
            }
        }
    }

    let dataset = builder.finish()?;
    Ok(Collected { dataset, stats })
}
