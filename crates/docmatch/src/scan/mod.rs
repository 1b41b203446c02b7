//! Scan - file discovery and file name metadata extraction
//!
//! ```text
//! FileWalker (paths) ──▶ parse_file_name ──▶ collect ──▶ Dataset
//! ```

pub mod collector;
pub mod naming;
pub mod walker;

pub use collector::{collect, CollectStats, Collected};
pub use naming::{parse_file_name, FileMetadata, ParseOutcome, PathError, SkipReason};
pub use walker::{list_files, FileWalker, WalkConfig};
