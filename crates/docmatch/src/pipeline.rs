//! End-to-end flows: scan a tree, export the metadata, join it against an
//! external index.

use crate::compare::{merge_with, MergeOutput};
use crate::config::Settings;
use crate::error::Result;
use crate::io::{export, load_with};
use crate::scan::{collect, CollectStats, Collected, FileWalker, WalkConfig};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Result of [`run_pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub collect_stats: CollectStats,
    /// Rows in the exported metadata table
    pub metadata_rows: usize,
    /// Rows in the comparison file
    pub comparison_rows: usize,
    pub merged: MergeOutput,
}

/// Walk `root`, build the metadata table and write it to `output`.
pub fn scan_to_file(root: &Path, output: &Path, config: &WalkConfig) -> Result<Collected> {
    let start = Instant::now();
    let walker = FileWalker::new(root, config)?;
    let collected = collect(walker)?;
    export(&collected.dataset, output)?;

    let stats = &collected.stats;
    info!(
        root = %root.display(),
        output = %output.display(),
        scanned = stats.scanned,
        matched = stats.matched,
        skipped = stats.skipped(),
        unexpected = stats.unexpected,
        duration_ms = start.elapsed().as_millis() as u64,
        "Metadata exported"
    );
    Ok(collected)
}

/// Load both comparison inputs from disk and join them. Writes the merged
/// table when `compare.output` is set.
pub fn compare_files(settings: &Settings) -> Result<MergeOutput> {
    let cmp = &settings.compare;
    let left = load_with(&cmp.df1.file_path, &cmp.df1.load_options())?;
    let right = load_with(&cmp.df2.file_path, &cmp.df2.load_options())?;

    let merged = merge_with(&left, &right, &settings.join_keys())?;
    write_merged(settings, &merged)?;
    Ok(merged)
}

/// Scan, export, load the comparison file, merge and optionally export the
/// merged table. The freshly built metadata is used as the left input.
pub fn run_pipeline(settings: &Settings) -> Result<PipelineReport> {
    let start = Instant::now();
    info!(root = %settings.scan.path.display(), "Starting pipeline");

    let collected = scan_to_file(
        &settings.scan.path,
        &settings.scan.output_csv,
        &settings.scan.walk_config(),
    )?;

    let df2 = &settings.compare.df2;
    let comparison = load_with(&df2.file_path, &df2.load_options())?;
    info!(
        path = %df2.file_path.display(),
        rows = comparison.num_rows(),
        "Comparison file loaded"
    );

    let merged = merge_with(&collected.dataset, &comparison, &settings.join_keys())?;
    write_merged(settings, &merged)?;

    info!(
        rows = merged.summary.total(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Pipeline complete"
    );

    Ok(PipelineReport {
        metadata_rows: collected.dataset.num_rows(),
        comparison_rows: comparison.num_rows(),
        collect_stats: collected.stats,
        merged,
    })
}

fn write_merged(settings: &Settings, merged: &MergeOutput) -> Result<()> {
    if let Some(output) = &settings.compare.output {
        export(&merged.dataset, output)?;
        info!(output = %output.display(), rows = merged.dataset.num_rows(), "Merged table exported");
    }
    Ok(())
}
