//! Flat-file input and output.

pub mod exporter;
pub mod format;
pub mod loader;

pub use exporter::export;
pub use format::FileFormat;
pub use loader::{load, load_with, LoadOptions};
