//! Load CSV and spreadsheet files into a [`Dataset`].

use super::format::FileFormat;
use crate::error::{DocmatchError, Result};
use crate::table::{column_from_cells, Cell, Dataset};
use arrow::array::ArrayRef;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::Timelike;
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Worksheet to read; the first sheet when unset. Ignored for CSV.
    pub sheet: Option<String>,
    /// Type columns as integer/float/bool/date when every value allows it.
    /// When off every column is text.
    pub infer_types: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sheet: None,
            infer_types: true,
        }
    }
}

pub fn load(path: impl AsRef<Path>) -> Result<Dataset> {
    load_with(path, &LoadOptions::default())
}

pub fn load_with(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Dataset> {
    let path = path.as_ref();
    let format = FileFormat::for_load(path)?;

    let meta = fs::metadata(path).map_err(|e| DocmatchError::from_io(path, e))?;
    if meta.is_dir() {
        return Err(DocmatchError::Config(format!(
            "expected a file, found a directory: {}",
            path.display()
        )));
    }

    let dataset = match format {
        FileFormat::Csv => load_csv(path, options)?,
        FileFormat::Xls | FileFormat::Xlsx => load_spreadsheet(path, options)?,
    };

    info!(
        path = %path.display(),
        rows = dataset.num_rows(),
        columns = dataset.num_columns(),
        "Loaded dataset"
    );
    Ok(dataset)
}

fn load_csv(path: &Path, options: &LoadOptions) -> Result<Dataset> {
    let file = File::open(path).map_err(|e| DocmatchError::from_io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let raw_headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            if idx == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();
    if raw_headers.is_empty() || raw_headers.iter().all(|h| h.trim().is_empty()) {
        return Err(DocmatchError::EmptyData(path.to_path_buf()));
    }
    let headers = column_names_from_header(raw_headers);

    let mut columns: Vec<Vec<Option<Cell>>> = vec![Vec::new(); headers.len()];
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > headers.len() {
            return Err(DocmatchError::InvalidState(format!(
                "{}: line {} has {} fields, header has {}",
                path.display(),
                idx + 2,
                record.len(),
                headers.len()
            )));
        }
        for (col, values) in columns.iter_mut().enumerate() {
            let cell = record.get(col).and_then(|raw| text_cell(raw, options.infer_types));
            values.push(cell);
        }
    }

    build_dataset(headers, columns)
}

fn text_cell(raw: &str, infer: bool) -> Option<Cell> {
    if infer {
        Cell::infer(raw)
    } else if raw.is_empty() {
        None
    } else {
        Some(Cell::Text(raw.to_string()))
    }
}

fn load_spreadsheet(path: &Path, options: &LoadOptions) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names();
    let sheet = match &options.sheet {
        Some(name) if sheet_names.contains(name) => name.clone(),
        Some(name) => {
            return Err(DocmatchError::Config(format!(
                "sheet '{}' not found in {}; available sheets: {:?}",
                name,
                path.display(),
                sheet_names
            )))
        }
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| DocmatchError::EmptyData(path.to_path_buf()))?,
    };
    debug!(path = %path.display(), sheet = %sheet, "Reading worksheet");

    let range = workbook.worksheet_range(&sheet)?;
    let mut rows = range.rows();
    let header_row = match rows.next() {
        Some(row) if !range.is_empty() => row,
        _ => return Err(DocmatchError::EmptyData(path.to_path_buf())),
    };
    let headers = column_names_from_header(
        header_row
            .iter()
            .map(|cell| match cell {
                Data::Empty => String::new(),
                other => other.to_string(),
            })
            .collect(),
    );

    let mut columns: Vec<Vec<Option<Cell>>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (col, values) in columns.iter_mut().enumerate() {
            let cell = row
                .get(col)
                .and_then(|data| spreadsheet_cell(data, options.infer_types));
            values.push(cell);
        }
    }

    build_dataset(headers, columns)
}

fn spreadsheet_cell(data: &Data, infer: bool) -> Option<Cell> {
    let cell = match data {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) if s.trim().is_empty() => return None,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(v) => Cell::Int(*v),
        Data::Float(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Cell::Int(*v as i64),
        Data::Float(v) => Cell::Float(*v),
        Data::Bool(v) => Cell::Bool(*v),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ts) if ts.time().num_seconds_from_midnight() == 0 => Cell::Date(ts.date()),
            Some(ts) => Cell::Text(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Cell::Text(data.to_string()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    };
    if infer {
        Some(cell)
    } else {
        Some(match cell {
            Cell::Text(s) => Cell::Text(s),
            Cell::Int(v) => Cell::Text(v.to_string()),
            Cell::Float(v) => Cell::Text(v.to_string()),
            Cell::Bool(v) => Cell::Text(v.to_string()),
            Cell::Date(d) => Cell::Text(d.format("%Y-%m-%d").to_string()),
        })
    }
}

/// Blank header cells become `Unnamed: <index>`; repeated names get `.1`,
/// `.2`, ... appended in order of appearance.
fn column_names_from_header(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let name = if name.trim().is_empty() {
                format!("Unnamed: {idx}")
            } else {
                name
            };
            let count = seen.entry(name.clone()).or_insert(0);
            let unique = if *count == 0 {
                name
            } else {
                format!("{name}.{count}")
            };
            *count += 1;
            unique
        })
        .collect()
}

fn build_dataset(headers: Vec<String>, columns: Vec<Vec<Option<Cell>>>) -> Result<Dataset> {
    let columns: Vec<(String, ArrayRef)> = headers
        .into_iter()
        .zip(columns)
        .map(|(name, cells)| (name, column_from_cells(cells)))
        .collect();
    Dataset::new(columns)
}
