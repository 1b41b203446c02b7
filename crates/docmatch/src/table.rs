//! In-memory tables.
//!
//! Every dataset in the pipeline (the scanned metadata, the loaded comparison
//! index, the merge result) is a [`Dataset`]: named, nullable, typed columns
//! held in a single Arrow `RecordBatch`.

use crate::error::{DocmatchError, Result};
use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use chrono::NaiveDate;
use std::sync::Arc;

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const UNIX_EPOCH_CE_DAYS: i32 = 719_163;

/// A table with a runtime-determined schema.
#[derive(Debug, Clone)]
pub struct Dataset {
    batch: RecordBatch,
}

impl Dataset {
    /// Build a dataset from `(name, column)` pairs. All columns must have the
    /// same length.
    pub fn new(columns: Vec<(String, ArrayRef)>) -> Result<Self> {
        let row_count = columns.first().map(|(_, a)| a.len()).unwrap_or(0);
        let fields: Vec<Field> = columns
            .iter()
            .map(|(name, array)| Field::new(name, array.data_type().clone(), true))
            .collect();
        let arrays: Vec<ArrayRef> = columns.into_iter().map(|(_, a)| a).collect();
        let batch = RecordBatch::try_new_with_options(
            Arc::new(Schema::new(fields)),
            arrays,
            &RecordBatchOptions::new().with_row_count(Some(row_count)),
        )?;
        Ok(Self { batch })
    }

    /// Zero-row dataset with `Utf8` columns.
    pub fn empty(column_names: &[&str]) -> Self {
        let fields: Vec<Field> = column_names
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, true))
            .collect();
        let schema: SchemaRef = Arc::new(Schema::new(fields));
        Self {
            batch: RecordBatch::new_empty(schema),
        }
    }

    /// Build an all-`Utf8` dataset from row-major values. Short rows are padded
    /// with nulls; long rows are an error.
    pub fn from_string_rows<S: AsRef<str>>(
        column_names: &[S],
        rows: Vec<Vec<Option<String>>>,
    ) -> Result<Self> {
        let width = column_names.len();
        let mut by_column: Vec<Vec<Option<String>>> =
            (0..width).map(|_| Vec::with_capacity(rows.len())).collect();

        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(DocmatchError::InvalidState(format!(
                    "row {} has {} values but the table has {} columns",
                    idx,
                    row.len(),
                    width
                )));
            }
            let mut values = row.into_iter();
            for column in by_column.iter_mut() {
                column.push(values.next().flatten());
            }
        }

        let columns = column_names
            .iter()
            .zip(by_column)
            .map(|(name, values)| {
                let array: ArrayRef = Arc::new(StringArray::from(values));
                (name.as_ref().to_string(), array)
            })
            .collect();
        Self::new(columns)
    }

    pub fn record_batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.batch
            .schema()
            .fields()
            .iter()
            .position(|f| f.name() == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.column_index(name).map(|idx| self.batch.column(idx))
    }

    pub fn column_at(&self, index: usize) -> &ArrayRef {
        self.batch.column(index)
    }

    /// The first `n` rows (fewer if the table is shorter).
    pub fn head(&self, n: usize) -> Dataset {
        let len = n.min(self.num_rows());
        Self {
            batch: self.batch.slice(0, len),
        }
    }

    /// Display form of one cell, `None` for null.
    pub fn cell_string(&self, row: usize, column: &str) -> Result<Option<String>> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| DocmatchError::InvalidState(format!("no column named '{column}'")))?;
        if row >= self.num_rows() {
            return Err(DocmatchError::InvalidState(format!(
                "row {row} out of range ({} rows)",
                self.num_rows()
            )));
        }
        let formatter = StringColumn::new(self.batch.column(idx))?;
        Ok(formatter.get(row))
    }

    /// Every row as display strings, in column order.
    pub fn to_string_rows(&self) -> Result<Vec<Vec<Option<String>>>> {
        let columns = self
            .batch
            .columns()
            .iter()
            .map(StringColumn::new)
            .collect::<Result<Vec<_>>>()?;
        Ok((0..self.num_rows())
            .map(|row| columns.iter().map(|c| c.get(row)).collect())
            .collect())
    }
}

/// Renders the cells of one column as strings.
pub(crate) struct StringColumn<'a> {
    array: &'a ArrayRef,
    formatter: ArrayFormatter<'a>,
}

impl<'a> StringColumn<'a> {
    pub(crate) fn new(array: &'a ArrayRef) -> Result<Self> {
        let formatter = ArrayFormatter::try_new(array.as_ref(), &FormatOptions::default())?;
        Ok(Self { array, formatter })
    }

    pub(crate) fn get(&self, row: usize) -> Option<String> {
        if self.array.is_null(row) {
            None
        } else {
            Some(self.formatter.value(row).to_string())
        }
    }
}

/// A single typed input value, before column types are decided.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl Cell {
    /// Classify a raw text value the way a CSV column is typed: booleans,
    /// integers, floats, otherwise text. Blank values are null.
    pub fn infer(raw: &str) -> Option<Cell> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Some(Cell::Bool(true));
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Some(Cell::Bool(false));
        }
        // Codes such as "007" keep their zeros and stay text
        if has_leading_zero(trimmed) {
            return Some(Cell::Text(raw.to_string()));
        }
        if let Ok(v) = trimmed.parse::<i64>() {
            return Some(Cell::Int(v));
        }
        // "inf"/"nan" parse as f64 but are names, not numbers
        if trimmed.chars().any(|c| c.is_ascii_digit()) {
            if let Ok(v) = trimmed.parse::<f64>() {
                return Some(Cell::Float(v));
            }
        }
        Some(Cell::Text(raw.to_string()))
    }

    fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) => v.to_string(),
            Cell::Bool(v) => v.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

fn has_leading_zero(value: &str) -> bool {
    let digits = value.strip_prefix(['-', '+']).unwrap_or(value).as_bytes();
    digits.len() > 1 && digits[0] == b'0' && digits[1].is_ascii_digit()
}

#[derive(Debug, Default, Clone, Copy)]
struct TypeTracker {
    texts: bool,
    ints: bool,
    floats: bool,
    bools: bool,
    dates: bool,
}

impl TypeTracker {
    fn observe(&mut self, cell: &Cell) {
        match cell {
            Cell::Text(_) => self.texts = true,
            Cell::Int(_) => self.ints = true,
            Cell::Float(_) => self.floats = true,
            Cell::Bool(_) => self.bools = true,
            Cell::Date(_) => self.dates = true,
        }
    }

    fn data_type(&self) -> DataType {
        let numeric = self.ints || self.floats;
        match (self.texts, numeric, self.bools, self.dates) {
            (false, true, false, false) if self.floats => DataType::Float64,
            (false, true, false, false) => DataType::Int64,
            (false, false, true, false) => DataType::Boolean,
            (false, false, false, true) => DataType::Date32,
            _ => DataType::Utf8,
        }
    }
}

/// Turn a column of cells into the narrowest Arrow array that holds all of
/// them. Mixed kinds fall back to `Utf8`; an all-null column is `Utf8`.
pub fn column_from_cells(cells: Vec<Option<Cell>>) -> ArrayRef {
    let mut tracker = TypeTracker::default();
    for cell in cells.iter().flatten() {
        tracker.observe(cell);
    }

    match tracker.data_type() {
        DataType::Int64 => Arc::new(Int64Array::from_iter(cells.into_iter().map(|c| match c {
            Some(Cell::Int(v)) => Some(v),
            _ => None,
        }))),
        DataType::Float64 => {
            Arc::new(Float64Array::from_iter(cells.into_iter().map(|c| match c {
                Some(Cell::Int(v)) => Some(v as f64),
                Some(Cell::Float(v)) => Some(v),
                _ => None,
            })))
        }
        DataType::Boolean => {
            Arc::new(BooleanArray::from_iter(cells.into_iter().map(|c| match c {
                Some(Cell::Bool(v)) => Some(v),
                _ => None,
            })))
        }
        DataType::Date32 => Arc::new(Date32Array::from_iter(cells.into_iter().map(|c| match c {
            Some(Cell::Date(d)) => Some(date_to_days(d)),
            _ => None,
        }))),
        _ => Arc::new(StringArray::from_iter(
            cells.into_iter().map(|c| c.map(|cell| cell.render())),
        )),
    }
}

fn date_to_days(date: NaiveDate) -> i32 {
    use chrono::Datelike;
    date.num_days_from_ce() - UNIX_EPOCH_CE_DAYS
}
