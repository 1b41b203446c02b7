//! Terminal output for CLI commands

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use docmatch::compare::{MergeSource, MergeSummary, SOURCE_COLUMN};
use docmatch::scan::CollectStats;
use docmatch::{Dataset, Result};

/// First `rows` rows of `dataset` as a table. Nulls render blank.
pub fn dataset_table(dataset: &Dataset, rows: usize) -> Result<Table> {
    let preview = dataset.head(rows);
    let mut table = new_table();

    let header_cells: Vec<Cell> = preview
        .column_names()
        .into_iter()
        .map(|h| Cell::new(h).fg(Color::Cyan))
        .collect();
    table.set_header(header_cells);

    let source_col = preview.column_index(SOURCE_COLUMN);
    for row in preview.to_string_rows()? {
        let cells: Vec<Cell> = row
            .into_iter()
            .enumerate()
            .map(|(idx, value)| {
                let text = value.unwrap_or_default();
                match (Some(idx) == source_col, MergeSource::from_label(&text)) {
                    (true, Some(source)) => Cell::new(text).fg(color_for_source(source)),
                    _ => Cell::new(text),
                }
            })
            .collect();
        table.add_row(cells);
    }
    Ok(table)
}

pub fn summary_table(summary: &MergeSummary) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new(SOURCE_COLUMN).fg(Color::Cyan),
        Cell::new("rows").fg(Color::Cyan),
    ]);
    for source in [MergeSource::Both, MergeSource::OnlyLeft, MergeSource::OnlyRight] {
        table.add_row(vec![
            Cell::new(source.label()).fg(color_for_source(source)),
            Cell::new(summary.count(source)),
        ]);
    }
    table.add_row(vec![Cell::new("total"), Cell::new(summary.total())]);
    table
}

pub fn print_preview(dataset: &Dataset, rows: usize, summary: &MergeSummary) -> Result<()> {
    println!(
        "Merged {} rows x {} columns (showing {})",
        dataset.num_rows(),
        dataset.num_columns(),
        rows.min(dataset.num_rows())
    );
    println!("{}", dataset_table(dataset, rows)?);
    println!("{}", summary_table(summary));
    Ok(())
}

pub fn print_scan_stats(stats: &CollectStats) {
    println!(
        "Scanned {} files: {} matched, {} skipped, {} unreadable",
        stats.scanned,
        stats.matched,
        stats.skipped(),
        stats.unexpected
    );
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn color_for_source(source: MergeSource) -> Color {
    match source {
        MergeSource::Both => Color::Green,
        MergeSource::OnlyLeft => Color::Yellow,
        MergeSource::OnlyRight => Color::Magenta,
    }
}
