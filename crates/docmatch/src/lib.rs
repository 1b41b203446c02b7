//! Docmatch - dated document metadata and index reconciliation
//!
//! Scans a directory tree for files named `YYYYMMDD <name>.<ext>`, turns the
//! names into a metadata table, and joins that table against an external
//! index (CSV or spreadsheet) to show which documents exist on disk, in the
//! index, or both.
//!
//! ```text
//! FileWalker ──▶ collect ──▶ Dataset ──▶ export (files_details.csv)
//!                               │
//!            load (index) ──▶ merge ──▶ Dataset + source ──▶ export
//! ```

pub mod compare;
pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod scan;
pub mod table;

pub use compare::{merge, merge_with, JoinKeys, MergeOutput, MergeSource, MergeSummary};
pub use config::Settings;
pub use error::{DocmatchError, ErrorKind, JoinSide, Result};
pub use io::{export, load, load_with, LoadOptions};
pub use pipeline::{compare_files, run_pipeline, scan_to_file, PipelineReport};
pub use scan::{collect, parse_file_name, FileMetadata, FileWalker, ParseOutcome, WalkConfig};
pub use table::Dataset;
